//! Appointment booking rules.
//!
//! A doctor cannot hold two active (scheduled or confirmed) appointments whose
//! time ranges overlap. New bookings and reschedules are checked against the
//! doctor's active appointments before anything is written.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use tracing::info;
use uuid::Uuid;

use crate::entities::{
    Appointment, AppointmentFilter, AppointmentStatus, AppointmentStore, AppointmentType,
    DoctorStore, now_ts,
};
use crate::error::ServerError;

/// Upper bound for a single appointment.
pub const MAX_DURATION_MINUTES: i64 = 480;
pub const DEFAULT_DURATION_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub doctor_id: String,
    pub patient_id: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub duration_minutes: i64,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct AppointmentChanges {
    pub appointment_date: Option<DateTime<Utc>>,
    pub appointment_type: Option<AppointmentType>,
    pub reason: Option<String>,
    pub duration_minutes: Option<i64>,
    pub notes: Option<String>,
    pub status: Option<AppointmentStatus>,
}

pub struct AppointmentService;

impl AppointmentService {
    pub async fn create<S: AppointmentStore + DoctorStore>(
        store: &S,
        req: NewAppointment,
    ) -> Result<Appointment, ServerError> {
        check_duration(req.duration_minutes)?;
        check_reason(&req.reason)?;
        let start = req.appointment_date.trunc_subsecs(6);
        let now = now_ts();
        check_not_past(start, now)?;

        if store.get_doctor(&req.doctor_id).await?.is_none() {
            return Err(ServerError::NotFound(format!("doctor {} not found", req.doctor_id)));
        }

        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            doctor_id: req.doctor_id,
            patient_id: req.patient_id,
            appointment_date: start,
            appointment_type: req.appointment_type,
            reason: req.reason,
            notes: req.notes,
            status: AppointmentStatus::Scheduled,
            duration_minutes: req.duration_minutes,
            created_at: now,
            updated_at: now,
        };
        ensure_slot_free(store, &appointment).await?;
        store.insert_appointment(&appointment).await?;
        info!(
            appointment_id = %appointment.id,
            doctor_id = %appointment.doctor_id,
            patient_id = %appointment.patient_id,
            appointment_date = %appointment.appointment_date,
            "appointment booked"
        );
        Ok(appointment)
    }

    pub async fn list<S: AppointmentStore>(
        store: &S,
        filter: &AppointmentFilter,
    ) -> Result<Vec<Appointment>, ServerError> {
        Ok(store.list_appointments(filter).await?)
    }

    pub async fn get<S: AppointmentStore>(store: &S, id: &str) -> Result<Appointment, ServerError> {
        store
            .get_appointment(id)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("appointment {id} not found")))
    }

    /// Apply `changes`. Moving or resizing the slot is only allowed while the
    /// appointment is active, and status changes must follow
    /// [`AppointmentStatus::can_become`].
    pub async fn update<S: AppointmentStore>(
        store: &S,
        id: &str,
        changes: AppointmentChanges,
    ) -> Result<Appointment, ServerError> {
        let current = Self::get(store, id).await?;
        let mut next = current.clone();
        let now = now_ts();

        let reschedule = changes.appointment_date.is_some() || changes.duration_minutes.is_some();
        if reschedule {
            if !current.status.is_active() {
                return Err(ServerError::Conflict(format!(
                    "appointment {id} is {} and cannot be rescheduled",
                    current.status
                )));
            }
            if let Some(date) = changes.appointment_date {
                let date = date.trunc_subsecs(6);
                check_not_past(date, now)?;
                next.appointment_date = date;
            }
            if let Some(minutes) = changes.duration_minutes {
                check_duration(minutes)?;
                next.duration_minutes = minutes;
            }
        }

        if let Some(status) = changes.status {
            if !current.status.can_become(status) {
                return Err(ServerError::Conflict(format!(
                    "appointment {id} cannot go from {} to {status}",
                    current.status
                )));
            }
            next.status = status;
        }
        if let Some(kind) = changes.appointment_type {
            next.appointment_type = kind;
        }
        if let Some(reason) = changes.reason {
            check_reason(&reason)?;
            next.reason = reason;
        }
        if changes.notes.is_some() {
            next.notes = changes.notes;
        }

        if reschedule && next.status.is_active() {
            ensure_slot_free(store, &next).await?;
        }

        next.updated_at = now;
        if !store.update_appointment(&next).await? {
            return Err(ServerError::NotFound(format!("appointment {id} not found")));
        }
        if next.status != current.status {
            info!(
                appointment_id = %id,
                from = %current.status,
                to = %next.status,
                "appointment status changed"
            );
        }
        Ok(next)
    }

    pub async fn cancel<S: AppointmentStore>(
        store: &S,
        id: &str,
    ) -> Result<Appointment, ServerError> {
        let changes = AppointmentChanges {
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };
        Self::update(store, id, changes).await
    }
}

fn check_duration(minutes: i64) -> Result<(), ServerError> {
    if (1..=MAX_DURATION_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(ServerError::BadRequest(format!(
            "duration_minutes must be between 1 and {MAX_DURATION_MINUTES}"
        )))
    }
}

fn check_reason(reason: &str) -> Result<(), ServerError> {
    if reason.trim().is_empty() {
        return Err(ServerError::BadRequest("reason must not be empty".into()));
    }
    Ok(())
}

fn check_not_past(date: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), ServerError> {
    if date < now {
        return Err(ServerError::BadRequest("appointment_date must not be in the past".into()));
    }
    Ok(())
}

/// Conflict when another active appointment of the same doctor overlaps
/// `appointment`'s slot.
async fn ensure_slot_free<S: AppointmentStore>(
    store: &S,
    appointment: &Appointment,
) -> Result<(), ServerError> {
    let start = appointment.appointment_date;
    let end = appointment.ends_at();
    let filter = AppointmentFilter {
        doctor_id: Some(appointment.doctor_id.clone()),
        starts_from: Some(start - Duration::minutes(MAX_DURATION_MINUTES)),
        starts_before: Some(end),
        statuses: AppointmentStatus::ACTIVE.to_vec(),
        ..Default::default()
    };
    let clash = store
        .list_appointments(&filter)
        .await?
        .into_iter()
        .find(|other| other.id != appointment.id && other.overlaps(start, end));
    match clash {
        Some(other) => Err(ServerError::Conflict(format!(
            "doctor {} already has appointment {} at {}",
            appointment.doctor_id,
            other.id,
            other.appointment_date.to_rfc3339()
        ))),
        None => Ok(()),
    }
}
