//! v1 Message handlers: history and the send-message pipeline entry point.

use axum::extract::{Path, State};

use crate::api::v1::dto::chat::{
    ListMessagesResponse, MessageExchangeResponse, MessageResponse, SendMessageRequest,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;
use crate::db::{ChatStore, MessageStore};
use crate::models::{Message, Role};
use crate::realtime::MessagePairEvent;

/// `GET /api/v1/chats/{chatId}/messages`
#[utoipa::path(
    get,
    path = "/api/v1/chats/{chatId}/messages",
    tag = "messages",
    params(("chatId" = String, Path, description = "Chat identifier")),
    responses(
        (status = 200, description = "Messages ordered by creation time", body = ListMessagesResponse),
        (status = 404, description = "Chat not found", body = ApiError),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> ApiResponse<ListMessagesResponse> {
    match state.db.get_chat(&chat_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return ApiResponse::error(ErrorCode::NotFound, format!("Chat {chat_id} not found"))
        }
        Err(e) => return e.into(),
    }

    match state.db.list_messages(&chat_id).await {
        Ok(messages) => {
            let messages: Vec<MessageResponse> = messages.into_iter().map(Into::into).collect();
            let total = messages.len() as u64;
            ApiResponse::success_with_meta(
                ListMessagesResponse { messages },
                ResponseMeta { total: Some(total) },
            )
        }
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/chats/{chatId}/messages`
///
/// Stores the user message, runs the response pipeline, stores the
/// assistant reply and multicasts the pair to realtime listeners. The
/// pipeline itself never fails; a degraded reply is still a reply.
#[utoipa::path(
    post,
    path = "/api/v1/chats/{chatId}/messages",
    tag = "messages",
    params(("chatId" = String, Path, description = "Chat identifier")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Stored user/assistant message pair", body = MessageExchangeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Chat not found", body = ApiError),
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    axum::Json(req): axum::Json<SendMessageRequest>,
) -> ApiResponse<MessageExchangeResponse> {
    if req.content.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Message content cannot be empty");
    }

    match state.db.get_chat(&chat_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return ApiResponse::error(ErrorCode::NotFound, format!("Chat {chat_id} not found"))
        }
        Err(e) => return e.into(),
    }

    let user_message = Message::new(&chat_id, Role::User, req.content.clone()).voice(req.is_voice);
    if let Err(e) = state.db.create_message(&user_message).await {
        return e.into();
    }

    let reply = state.composer.respond(&req.content).await;

    let assistant_message = Message::new(&chat_id, Role::Assistant, reply);
    if let Err(e) = state.db.create_message(&assistant_message).await {
        return e.into();
    }

    let event = MessagePairEvent {
        user_message,
        assistant_message,
    };
    state.registry.broadcast(&chat_id, &event);

    ApiResponse::success(event.into())
}
