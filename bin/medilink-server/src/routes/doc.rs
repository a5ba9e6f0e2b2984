use crate::routes::{appointments, doctors, health, messaging};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "medilink-server",
    description = "Patient/doctor messaging, doctor directory and appointment API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(messaging::MessagingApi::openapi());
    root.merge(doctors::DoctorsApi::openapi());
    root.merge(appointments::AppointmentsApi::openapi());
    root
}
