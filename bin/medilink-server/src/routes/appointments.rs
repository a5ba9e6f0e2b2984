//! Appointment booking endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::entities::{AppointmentStatus, AppointmentType};
use crate::error::ServerError;
use crate::extract::{ApiJson, ApiQuery};
use crate::handlers::appointments::AppointmentService;
use crate::schemas::appointments::{
    AppointmentResponse, CreateAppointmentRequest, UpdateAppointmentRequest, parse_list_query,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        create_appointment,
        list_appointments,
        get_appointment,
        update_appointment,
        cancel_appointment
    ),
    components(schemas(
        CreateAppointmentRequest,
        UpdateAppointmentRequest,
        AppointmentResponse,
        AppointmentType,
        AppointmentStatus
    ))
)]
pub struct AppointmentsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/appointments",
            get(list_appointments).post(create_appointment),
        )
        .route(
            "/appointments/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(cancel_appointment),
        )
}

#[utoipa::path(
    post,
    path = "/appointments",
    tag = "appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentResponse),
        (status = 400, description = "Invalid date, duration or reason, or malformed JSON"),
        (status = 404, description = "Doctor not found"),
        (status = 409, description = "Doctor already booked for an overlapping slot"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ServerError> {
    let appointment = AppointmentService::create(state.store.as_ref(), req.into()).await?;
    Ok((StatusCode::CREATED, Json(appointment.to_response())))
}

#[utoipa::path(
    get,
    path = "/appointments",
    tag = "appointments",
    params(
        ("doctor_id" = Option<String>, Query, description = "Only this doctor's appointments"),
        ("patient_id" = Option<String>, Query, description = "Only this patient's appointments"),
        ("start_date" = Option<String>, Query,
            description = "RFC 3339 time or YYYY-MM-DD; appointments starting at or after it"),
        ("end_date" = Option<String>, Query,
            description = "RFC 3339 time (exclusive) or YYYY-MM-DD (whole day included)"),
        ("status" = Option<Vec<AppointmentStatus>>, Query,
            description = "Repeat the parameter or separate values with commas"),
    ),
    responses(
        (status = 200, description = "Appointments by start time", body = Vec<AppointmentResponse>),
        (status = 400, description = "Unknown status or unparsable date"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    ApiQuery(pairs): ApiQuery<Vec<(String, String)>>,
) -> Result<Json<Vec<AppointmentResponse>>, ServerError> {
    let filter = parse_list_query(pairs)?;
    let appointments = AppointmentService::list(state.store.as_ref(), &filter).await?;
    Ok(Json(appointments.iter().map(|a| a.to_response()).collect()))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    tag = "appointments",
    params(
        ("id" = String, Path, description = "Appointment id")
    ),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentResponse),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, ServerError> {
    let appointment = AppointmentService::get(state.store.as_ref(), &id).await?;
    Ok(Json(appointment.to_response()))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    tag = "appointments",
    params(
        ("id" = String, Path, description = "Appointment id")
    ),
    request_body = UpdateAppointmentRequest,
    responses(
        (status = 200, description = "Appointment updated", body = AppointmentResponse),
        (status = 400, description = "Invalid date, duration or reason, or malformed JSON"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Status change not allowed or slot already taken"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ServerError> {
    let appointment = AppointmentService::update(state.store.as_ref(), &id, req.into()).await?;
    Ok(Json(appointment.to_response()))
}

#[utoipa::path(
    delete,
    path = "/appointments/{id}",
    tag = "appointments",
    params(
        ("id" = String, Path, description = "Appointment id")
    ),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentResponse),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already completed, cancelled or missed"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, ServerError> {
    let appointment = AppointmentService::cancel(state.store.as_ref(), &id).await?;
    Ok(Json(appointment.to_response()))
}
