use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::now_ts;

/// A single row in the `messages` table. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl Message {
    /// New message stamped with the current time.
    pub fn new(conversation_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.into(),
            content: content.into(),
            sent_at: now_ts(),
        }
    }
}
