//! Patient/doctor messaging endpoints under `/messaging`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::extract::{ApiQuery, OptionalJson};
use crate::handlers::messaging::MessagingService;
use crate::schemas::messaging::{
    ConversationListQuery, ConversationResponse, CreateConversationRequest, MessageListQuery,
    MessageResponse, SendMessageRequest, required,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_conversations, create_conversation, list_messages, send_message),
    components(schemas(
        CreateConversationRequest,
        SendMessageRequest,
        ConversationResponse,
        MessageResponse
    ))
)]
pub struct MessagingApi;

/// Register messaging routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route("/messages", get(list_messages).post(send_message))
}

#[utoipa::path(
    get,
    path = "/messaging/conversations",
    tag = "messaging",
    params(ConversationListQuery),
    responses(
        (status = 200, description = "Conversations listed", body = Vec<ConversationResponse>),
        (status = 500, description = "Database error"),
    )
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<ConversationListQuery>,
) -> Result<Json<Vec<ConversationResponse>>, ServerError> {
    let conversations =
        MessagingService::list_conversations(state.store.as_ref(), q.participant_id.as_deref())
            .await?;
    Ok(Json(conversations.iter().map(|c| c.to_response()).collect()))
}

#[utoipa::path(
    post,
    path = "/messaging/conversations",
    tag = "messaging",
    params(CreateConversationRequest),
    request_body(
        content = CreateConversationRequest,
        description = "Alternative to query parameters"
    ),
    responses(
        (status = 200, description = "Existing or new conversation", body = ConversationResponse),
        (status = 400, description = "Missing patient_id or doctor_id, or malformed JSON body"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<CreateConversationRequest>,
    body: OptionalJson<CreateConversationRequest>,
) -> Result<Json<ConversationResponse>, ServerError> {
    let body = body.into_inner().unwrap_or_default();
    let patient_id = required("patient_id", body.patient_id, query.patient_id)?;
    let doctor_id = required("doctor_id", body.doctor_id, query.doctor_id)?;

    let conversation =
        MessagingService::get_or_create_conversation(state.store.as_ref(), &patient_id, &doctor_id)
            .await?;
    Ok(Json(conversation.to_response()))
}

#[utoipa::path(
    get,
    path = "/messaging/messages",
    tag = "messaging",
    params(MessageListQuery),
    responses(
        (status = 200, description = "Messages in send order", body = Vec<MessageResponse>),
        (status = 400, description = "Missing conversation_id"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    ApiQuery(q): ApiQuery<MessageListQuery>,
) -> Result<Json<Vec<MessageResponse>>, ServerError> {
    let conversation_id = required("conversation_id", None, q.conversation_id)?;
    let messages = MessagingService::list_messages(state.store.as_ref(), &conversation_id).await?;
    Ok(Json(messages.iter().map(|m| m.to_response()).collect()))
}

#[utoipa::path(
    post,
    path = "/messaging/messages",
    tag = "messaging",
    params(SendMessageRequest),
    request_body(content = SendMessageRequest, description = "Alternative to query parameters"),
    responses(
        (status = 200, description = "Message stored", body = MessageResponse),
        (status = 400, description = "Missing conversation_id or content, or malformed JSON"),
        (status = 404, description = "Conversation not found"),
        (status = 500, description = "Database error"),
    )
)]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SendMessageRequest>,
    body: OptionalJson<SendMessageRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    let body = body.into_inner().unwrap_or_default();
    let conversation_id = required("conversation_id", body.conversation_id, query.conversation_id)?;
    let content = required("content", body.content, query.content)?;

    let msg =
        MessagingService::send_message(state.store.as_ref(), &conversation_id, &content).await?;
    Ok(Json(msg.to_response()))
}
