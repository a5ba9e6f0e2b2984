use std::future::Future;

use crate::entities::{Message, SqliteStore, decode_ts, encode_ts};

pub trait MessageStore: Send + Sync + 'static {
    fn insert_message(&self, msg: &Message) -> impl Future<Output = Result<(), sqlx::Error>> + Send;

    /// Messages of one conversation, ascending by `sent_at` then insertion order.
    fn list_messages(
        &self,
        conversation_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>, sqlx::Error>> + Send;
}

impl MessageStore for SqliteStore {
    async fn insert_message(&self, msg: &Message) -> Result<(), sqlx::Error> {
        let sent_at = encode_ts(&msg.sent_at);
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, content, sent_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&msg.id)
        .bind(&msg.conversation_id)
        .bind(&msg.content)
        .bind(&sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_messages(&self, conversation_id: &str) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<(String, String, String, String)> = sqlx::query_as(
            "SELECT id, conversation_id, content, sent_at \
             FROM messages WHERE conversation_id = ?1 ORDER BY sent_at ASC, rowid ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(id, conversation_id, content, sent_at)| Message {
                id,
                conversation_id,
                content,
                sent_at: decode_ts(&sent_at, "messages.sent_at"),
            })
            .collect())
    }
}
