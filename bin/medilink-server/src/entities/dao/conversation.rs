use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::now_ts;

/// A row in the `conversations` table.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Fresh record with a new UUID v4 identifier.
    pub fn new(patient_id: impl Into<String>, doctor_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            patient_id: patient_id.into(),
            doctor_id: doctor_id.into(),
            created_at: now_ts(),
        }
    }
}
