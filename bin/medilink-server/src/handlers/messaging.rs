//! Conversation resolution and message storage for patient/doctor messaging.
//!
//! Both operations are thin over the store traits. The only real logic is the
//! get-or-create path: a read, then an insert that defers to the
//! `(patient_id, doctor_id)` unique index, then a re-read if another request
//! inserted the same pair in between.

use tracing::{debug, info};

use crate::entities::{Conversation, ConversationStore, Message, MessageStore};
use crate::error::ServerError;

pub struct MessagingService;

impl MessagingService {
    pub async fn list_conversations<S: ConversationStore>(
        store: &S,
        participant_id: Option<&str>,
    ) -> Result<Vec<Conversation>, ServerError> {
        Ok(store.list_conversations(participant_id).await?)
    }

    /// Return the conversation for `(patient_id, doctor_id)`, creating it on
    /// first use. Repeated and concurrent calls for the same pair agree on
    /// one id.
    pub async fn get_or_create_conversation<S: ConversationStore>(
        store: &S,
        patient_id: &str,
        doctor_id: &str,
    ) -> Result<Conversation, ServerError> {
        if let Some(existing) = store.find_conversation(patient_id, doctor_id).await? {
            debug!(conversation_id = %existing.id, "conversation exists");
            return Ok(existing);
        }

        let candidate = Conversation::new(patient_id, doctor_id);
        if store.insert_conversation_if_absent(&candidate).await? {
            info!(
                conversation_id = %candidate.id,
                patient_id,
                doctor_id,
                "conversation created"
            );
            return Ok(candidate);
        }

        // Lost the race to a concurrent insert for the same pair.
        let winner = store
            .find_conversation(patient_id, doctor_id)
            .await?
            .ok_or_else(|| {
                ServerError::Internal(format!(
                    "conversation for ({patient_id}, {doctor_id}) vanished after conflicting insert"
                ))
            })?;
        debug!(conversation_id = %winner.id, "conversation created concurrently");
        Ok(winner)
    }

    /// Messages of a conversation in send order. Unknown ids yield an empty list.
    pub async fn list_messages<S: MessageStore>(
        store: &S,
        conversation_id: &str,
    ) -> Result<Vec<Message>, ServerError> {
        Ok(store.list_messages(conversation_id).await?)
    }

    pub async fn send_message<S: ConversationStore + MessageStore>(
        store: &S,
        conversation_id: &str,
        content: &str,
    ) -> Result<Message, ServerError> {
        if store.get_conversation(conversation_id).await?.is_none() {
            return Err(ServerError::NotFound(format!(
                "conversation {conversation_id} not found"
            )));
        }

        let msg = Message::new(conversation_id, content);
        store.insert_message(&msg).await?;
        info!(conversation_id, message_id = %msg.id, "message sent");
        Ok(msg)
    }
}
