use std::future::Future;

use crate::entities::{Conversation, SqliteStore, decode_ts, encode_ts};

type ConversationRow = (String, String, String, String);

pub trait ConversationStore: Send + Sync + 'static {
    /// All conversations, oldest first. With `participant_id`, only those where
    /// it is the patient or the doctor.
    fn list_conversations(
        &self,
        participant_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Conversation>, sqlx::Error>> + Send;

    fn get_conversation(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Conversation>, sqlx::Error>> + Send;

    /// Exact match on the ordered `(patient_id, doctor_id)` pair.
    fn find_conversation(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> impl Future<Output = Result<Option<Conversation>, sqlx::Error>> + Send;

    /// Insert unless a conversation for the same pair already exists.
    /// Returns `true` when this call wrote the row.
    fn insert_conversation_if_absent(
        &self,
        conversation: &Conversation,
    ) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

impl ConversationStore for SqliteStore {
    async fn list_conversations(
        &self,
        participant_id: Option<&str>,
    ) -> Result<Vec<Conversation>, sqlx::Error> {
        let rows: Vec<ConversationRow> = if let Some(user) = participant_id {
            sqlx::query_as(
                "SELECT id, patient_id, doctor_id, created_at FROM conversations \
                 WHERE patient_id = ?1 OR doctor_id = ?1 ORDER BY created_at ASC, rowid ASC",
            )
            .bind(user)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT id, patient_id, doctor_id, created_at FROM conversations \
                 ORDER BY created_at ASC, rowid ASC",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>, sqlx::Error> {
        let row: Option<ConversationRow> = sqlx::query_as(
            "SELECT id, patient_id, doctor_id, created_at FROM conversations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn find_conversation(
        &self,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<Option<Conversation>, sqlx::Error> {
        let row: Option<ConversationRow> = sqlx::query_as(
            "SELECT id, patient_id, doctor_id, created_at FROM conversations \
             WHERE patient_id = ?1 AND doctor_id = ?2",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn insert_conversation_if_absent(
        &self,
        conversation: &Conversation,
    ) -> Result<bool, sqlx::Error> {
        let created_at = encode_ts(&conversation.created_at);
        let result = sqlx::query(
            "INSERT INTO conversations (id, patient_id, doctor_id, created_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(patient_id, doctor_id) DO NOTHING",
        )
        .bind(&conversation.id)
        .bind(&conversation.patient_id)
        .bind(&conversation.doctor_id)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

fn from_row((id, patient_id, doctor_id, created_at): ConversationRow) -> Conversation {
    Conversation {
        id,
        patient_id,
        doctor_id,
        created_at: decode_ts(&created_at, "conversations.created_at"),
    }
}
