//! Doctor directory endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::entities::{Doctor, DoctorStore};
use crate::error::ServerError;
use crate::extract::{ApiJson, ApiQuery};
use crate::schemas::doctors::{CreateDoctorRequest, DoctorListQuery, DoctorResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_doctors, create_doctor, get_doctor),
    components(schemas(CreateDoctorRequest, DoctorResponse))
)]
pub struct DoctorsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/doctors", get(list_doctors).post(create_doctor))
        .route("/doctors/{id}", get(get_doctor))
}

#[utoipa::path(
    get,
    path = "/doctors",
    tag = "doctors",
    params(DoctorListQuery),
    responses(
        (status = 200, description = "Doctors ordered by name", body = Vec<DoctorResponse>),
        (status = 500, description = "Database error"),
    )
)]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<DoctorListQuery>,
) -> Result<Json<Vec<DoctorResponse>>, ServerError> {
    let doctors = state.store.list_doctors(q.specialty.as_deref()).await?;
    Ok(Json(doctors.iter().map(|d| d.to_response()).collect()))
}

#[utoipa::path(
    post,
    path = "/doctors",
    tag = "doctors",
    request_body = CreateDoctorRequest,
    responses(
        (status = 200, description = "Doctor registered", body = DoctorResponse),
        (status = 400, description = "Malformed JSON body"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateDoctorRequest>,
) -> Result<Json<DoctorResponse>, ServerError> {
    let doctor = Doctor {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        specialty: req.specialty,
        latitude: req.latitude,
        longitude: req.longitude,
    };
    state.store.insert_doctor(&doctor).await?;
    info!(doctor_id = %doctor.id, specialty = %doctor.specialty, "doctor registered");
    Ok(Json(doctor.to_response()))
}

#[utoipa::path(
    get,
    path = "/doctors/{id}",
    tag = "doctors",
    params(
        ("id" = String, Path, description = "Doctor id")
    ),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 404, description = "Doctor not found"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DoctorResponse>, ServerError> {
    let doctor = state
        .store
        .get_doctor(&id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("doctor {id} not found")))?;
    Ok(Json(doctor.to_response()))
}
