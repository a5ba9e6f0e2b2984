use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{Appointment, AppointmentFilter, AppointmentStatus, AppointmentType};
use crate::error::ServerError;
use crate::handlers::appointments::{AppointmentChanges, DEFAULT_DURATION_MINUTES, NewAppointment};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAppointmentRequest {
    pub doctor_id: String,
    pub patient_id: String,
    /// RFC 3339 start time; must not be in the past.
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub reason: String,
    /// Defaults to 30 minutes; at most 480.
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    pub notes: Option<String>,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

impl From<CreateAppointmentRequest> for NewAppointment {
    fn from(req: CreateAppointmentRequest) -> Self {
        NewAppointment {
            doctor_id: req.doctor_id,
            patient_id: req.patient_id,
            appointment_date: req.appointment_date,
            appointment_type: req.appointment_type,
            reason: req.reason,
            duration_minutes: req.duration_minutes,
            notes: req.notes,
        }
    }
}

/// Every field is optional; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateAppointmentRequest {
    pub appointment_date: Option<DateTime<Utc>>,
    pub appointment_type: Option<AppointmentType>,
    pub reason: Option<String>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl From<UpdateAppointmentRequest> for AppointmentChanges {
    fn from(req: UpdateAppointmentRequest) -> Self {
        AppointmentChanges {
            appointment_date: req.appointment_date,
            appointment_type: req.appointment_type,
            reason: req.reason,
            duration_minutes: req.duration_minutes,
            notes: req.notes,
            status: req.status,
        }
    }
}

/// Build a filter from the raw query pairs of `GET /appointments`, so that
/// `status` may repeat. Unknown keys are ignored.
pub fn parse_list_query(pairs: Vec<(String, String)>) -> Result<AppointmentFilter, ServerError> {
    let mut filter = AppointmentFilter::default();
    for (key, value) in pairs {
        match key.as_str() {
            "doctor_id" => filter.doctor_id = Some(value),
            "patient_id" => filter.patient_id = Some(value),
            "start_date" => filter.starts_from = Some(parse_bound(&key, &value, false)?),
            "end_date" => filter.starts_before = Some(parse_bound(&key, &value, true)?),
            "status" => {
                for raw in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
                    let status = AppointmentStatus::from_str(raw).map_err(|_| {
                        ServerError::BadRequest(format!("unknown appointment status '{raw}'"))
                    })?;
                    if !filter.statuses.contains(&status) {
                        filter.statuses.push(status);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(filter)
}

/// A bare date as an upper bound covers that whole day.
fn parse_bound(key: &str, value: &str, upper: bool) -> Result<DateTime<Utc>, ServerError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ServerError::BadRequest(format!("{key} must be an RFC 3339 time or YYYY-MM-DD"))
    })?;
    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    Ok(if upper { midnight + Duration::days(1) } else { midnight })
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub appointment_date: String,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub duration_minutes: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Appointment {
    pub fn to_response(&self) -> AppointmentResponse {
        AppointmentResponse {
            id: self.id.clone(),
            doctor_id: self.doctor_id.clone(),
            patient_id: self.patient_id.clone(),
            appointment_date: self.appointment_date.to_rfc3339(),
            appointment_type: self.appointment_type,
            reason: self.reason.clone(),
            notes: self.notes.clone(),
            status: self.status,
            duration_minutes: self.duration_minutes,
            created_at: self.created_at.to_rfc3339(),
            updated_at: self.updated_at.to_rfc3339(),
        }
    }
}
