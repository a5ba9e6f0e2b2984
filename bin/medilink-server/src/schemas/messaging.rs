use crate::entities::{Conversation, Message};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Parameters for `POST /messaging/conversations`, accepted from the query
/// string or a JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateConversationRequest {
    pub patient_id: Option<String>,
    pub doctor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConversationListQuery {
    /// Only conversations where this id is the patient or the doctor.
    pub participant_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageListQuery {
    pub conversation_id: Option<String>,
}

/// Parameters for `POST /messaging/messages`, accepted from the query string
/// or a JSON body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SendMessageRequest {
    pub conversation_id: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationResponse {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub content: String,
    pub sent_at: String,
}

impl Conversation {
    pub fn to_response(&self) -> ConversationResponse {
        ConversationResponse {
            id: self.id.clone(),
            patient_id: self.patient_id.clone(),
            doctor_id: self.doctor_id.clone(),
            created_at: self.created_at.to_rfc3339(),
        }
    }
}

impl Message {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            conversation_id: self.conversation_id.clone(),
            content: self.content.clone(),
            sent_at: self.sent_at.to_rfc3339(),
        }
    }
}

/// Pick a required parameter, preferring the JSON body over the query string.
pub fn required(
    name: &str,
    body: Option<String>,
    query: Option<String>,
) -> Result<String, ServerError> {
    body.or(query)
        .ok_or_else(|| ServerError::BadRequest(format!("missing required parameter '{name}'")))
}
