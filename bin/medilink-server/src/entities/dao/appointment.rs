use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Kind of visit. Stored as the SCREAMING_SNAKE_CASE name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    Regular,
    FollowUp,
    Emergency,
}

/// Lifecycle of an appointment.
///
/// `SCHEDULED -> CONFIRMED -> COMPLETED | NO_SHOW`, and either of the first
/// two may be `CANCELLED`. The last three are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses whose appointments still occupy the doctor's time.
    pub const ACTIVE: [AppointmentStatus; 2] =
        [AppointmentStatus::Scheduled, AppointmentStatus::Confirmed];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    /// Setting the current status again is accepted as a no-op.
    pub fn can_become(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        self == next
            || matches!(
                (self, next),
                (Scheduled, Confirmed | Cancelled) | (Confirmed, Completed | Cancelled | NoShow)
            )
    }
}

/// A row in the `appointments` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_id: String,
    pub appointment_date: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub reason: String,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub duration_minutes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.appointment_date + Duration::minutes(self.duration_minutes)
    }

    /// Half-open interval overlap: back-to-back slots do not clash.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.appointment_date < end && start < self.ends_at()
    }
}
