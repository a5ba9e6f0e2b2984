//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document (disable with `MEDILINK_ENABLE_SWAGGER=false`)
//! - Root banner and health routes
//! - `/messaging` conversation and message routes
//! - `/doctors` directory routes
//! - `/appointments` booking routes

mod appointments;
pub mod doc;
mod doctors;
mod health;
mod messaging;

use crate::middleware::{cors, trace};
use crate::state::AppState;
use axum::{Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(doctors::router())
        .merge(appointments::router())
        .nest("/messaging", messaging::router());

    let mut app = Router::new().merge(api_router);

    if state.config.enable_swagger {
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()),
        );
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(&state.config)))
        .layer(middleware::from_fn(trace::trace_middleware))
        .with_state(state)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::entities::SqliteStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn app() -> Router {
        let store = SqliteStore::in_memory().await.unwrap();
        let state = Arc::new(AppState::new(Config::default(), store));
        build(state)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_query(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_json_body(method: &str, uri: &str, raw: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(raw.into())
            .unwrap()
    }

    fn doctor_body(name: &str, specialty: &str) -> Value {
        json!({ "name": name, "specialty": specialty, "latitude": 5.6, "longitude": -0.2 })
    }

    #[tokio::test]
    async fn create_conversation_is_idempotent_over_http() {
        let app = app().await;

        let (status, first) = send(
            &app,
            post_query("/messaging/conversations?patient_id=P1&doctor_id=D1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["patient_id"], "P1");
        assert_eq!(first["doctor_id"], "D1");
        assert!(!first["id"].as_str().unwrap().is_empty());

        let (status, second) = send(
            &app,
            post_json(
                "/messaging/conversations",
                json!({ "patient_id": "P1", "doctor_id": "D1" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["id"], second["id"]);

        let (_, listed) = send(&app, get("/messaging/conversations")).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn send_then_list_messages_over_http() {
        let app = app().await;
        let (_, conv) = send(
            &app,
            post_query("/messaging/conversations?patient_id=P1&doctor_id=D1"),
        )
        .await;
        let conv_id = conv["id"].as_str().unwrap().to_owned();

        let (status, msg) = send(
            &app,
            post_json(
                "/messaging/messages",
                json!({ "conversation_id": conv_id, "content": "hello" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(msg["content"], "hello");
        assert_eq!(msg["conversation_id"], conv_id.as_str());

        let (status, listed) = send(
            &app,
            get(&format!("/messaging/messages?conversation_id={conv_id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let listed = listed.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["content"], "hello");
        assert_eq!(listed[0]["id"], msg["id"]);
    }

    #[tokio::test]
    async fn empty_conversation_lists_no_messages() {
        let app = app().await;
        let (status, listed) = send(&app, get("/messaging/messages?conversation_id=C1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn sending_to_missing_conversation_is_404() {
        let app = app().await;
        let (status, body) = send(
            &app,
            post_query("/messaging/messages?conversation_id=C1&content=hello"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("C1"));
    }

    #[tokio::test]
    async fn missing_parameters_are_bad_requests() {
        let app = app().await;

        let (status, body) = send(&app, post_query("/messaging/conversations?patient_id=P1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("doctor_id"));

        let (status, _) = send(&app, get("/messaging/messages")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn conversations_filter_by_participant() {
        let app = app().await;
        for (p, d) in [("P1", "D1"), ("P2", "D2")] {
            send(
                &app,
                post_query(&format!("/messaging/conversations?patient_id={p}&doctor_id={d}")),
            )
            .await;
        }

        let (_, all) = send(&app, get("/messaging/conversations")).await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, mine) = send(&app, get("/messaging/conversations?participant_id=D2")).await;
        let mine = mine.as_array().unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0]["patient_id"], "P2");
    }

    #[tokio::test]
    async fn doctor_directory_lookups() {
        let app = app().await;
        for (name, specialty) in [("Dr. Osei", "cardiology"), ("Dr. Alvarez", "dermatology")] {
            let (status, _) = send(
                &app,
                post_json("/doctors", doctor_body(name, specialty)),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, all) = send(&app, get("/doctors")).await;
        let all = all.as_array().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["name"], "Dr. Alvarez");

        let (_, cardio) = send(&app, get("/doctors?specialty=cardiology")).await;
        let cardio = cardio.as_array().unwrap();
        assert_eq!(cardio.len(), 1);
        let id = cardio[0]["id"].as_str().unwrap();

        let (status, one) = send(&app, get(&format!("/doctors/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(one["name"], "Dr. Osei");

        let (status, _) = send(&app, get("/doctors/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn responses_carry_trace_id() {
        let app = app().await;
        let resp = app.clone().oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(trace::X_TRACE_ID));
    }

    #[tokio::test]
    async fn create_and_send_responses_match_stored_rows() {
        let app = app().await;
        let uri = "/messaging/conversations?patient_id=P1&doctor_id=D1";
        let (_, first) = send(&app, post_query(uri)).await;
        let (_, second) = send(&app, post_query(uri)).await;
        assert_eq!(first, second);

        let conv_id = first["id"].as_str().unwrap().to_owned();
        let (_, msg) = send(
            &app,
            post_query(&format!("/messaging/messages?conversation_id={conv_id}&content=hi")),
        )
        .await;
        let (_, listed) = send(
            &app,
            get(&format!("/messaging/messages?conversation_id={conv_id}")),
        )
        .await;
        assert_eq!(listed[0]["sent_at"], msg["sent_at"]);
        assert_eq!(listed[0], msg);
    }

    #[tokio::test]
    async fn unparsable_input_is_a_json_error() {
        let app = app().await;
        let requests = [
            with_json_body("POST", "/messaging/conversations", "{not json"),
            with_json_body("POST", "/messaging/messages", ""),
            with_json_body("POST", "/doctors", r#"{"name": "Dr. Osei"}"#),
            get("/messaging/messages?conversation_id=a&conversation_id=b"),
        ];
        for req in requests {
            let uri = req.uri().to_string();
            let (status, body) = send(&app, req).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(!body["error"].as_str().unwrap().is_empty(), "{uri}");
        }

        // Without a JSON content type the body is ignored and the query wins.
        let req = Request::post("/messaging/conversations?patient_id=P1&doctor_id=D1")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("ignored"))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn appointment_lifecycle_over_http() {
        let app = app().await;
        let (_, doctor) = send(&app, post_json("/doctors", doctor_body("Dr. Osei", "cardiology")))
            .await;
        let doctor_id = doctor["id"].as_str().unwrap().to_owned();

        let day = (chrono::Utc::now() + chrono::Duration::days(1)).date_naive();
        let at = |hour: u32| day.and_hms_opt(hour, 0, 0).unwrap().and_utc().to_rfc3339();
        let booking = |patient: &str, hour: u32| {
            json!({
                "doctor_id": doctor_id,
                "patient_id": patient,
                "appointment_date": at(hour),
                "appointment_type": "REGULAR",
                "reason": "checkup",
                "duration_minutes": 60
            })
        };

        let (status, created) = send(&app, post_json("/appointments", booking("P1", 9))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "SCHEDULED");
        assert_eq!(created["appointment_date"], at(9));
        let id = created["id"].as_str().unwrap().to_owned();

        let (status, body) = send(&app, post_json("/appointments", booking("P2", 9))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains(&id));

        let mut stranger = booking("P2", 11);
        stranger["doctor_id"] = json!("nobody");
        let (status, _) = send(&app, post_json("/appointments", stranger)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        send(&app, post_json("/appointments", booking("P2", 11))).await;

        let (_, fetched) = send(&app, get(&format!("/appointments/{id}"))).await;
        assert_eq!(fetched, created);

        let (status, confirmed) = send(
            &app,
            with_json_body(
                "PUT",
                &format!("/appointments/{id}"),
                json!({ "status": "CONFIRMED", "notes": "fasting" }).to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(confirmed["status"], "CONFIRMED");
        assert_eq!(confirmed["notes"], "fasting");

        let (_, mine) = send(&app, get("/appointments?patient_id=P1&status=CONFIRMED")).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        let (_, active) = send(
            &app,
            get(&format!("/appointments?doctor_id={doctor_id}&status=SCHEDULED&status=CONFIRMED")),
        )
        .await;
        assert_eq!(active.as_array().unwrap().len(), 2);

        let req = Request::delete(format!("/appointments/{id}")).body(Body::empty()).unwrap();
        let (status, cancelled) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "CANCELLED");

        let (status, _) = send(
            &app,
            with_json_body(
                "PUT",
                &format!("/appointments/{id}"),
                json!({ "status": "CONFIRMED" }).to_string(),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&app, get("/appointments?status=PENDING")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, get("/appointments/unknown")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
