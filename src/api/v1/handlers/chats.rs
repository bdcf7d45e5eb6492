//! v1 Chat CRUD handlers.

use axum::extract::{Path, State};

use crate::api::v1::dto::chat::{
    ChatResponse, ChatSummaryResponse, CreateChatRequest, ListChatsResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::AppState;
use crate::db::ChatStore;
use crate::models::Chat;

/// `POST /api/v1/chats`
#[utoipa::path(
    post,
    path = "/api/v1/chats",
    tag = "chats",
    request_body = CreateChatRequest,
    responses(
        (status = 201, description = "Chat created", body = ChatResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn create_chat(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<CreateChatRequest>,
) -> ApiResponse<ChatResponse> {
    if req.title.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Title cannot be empty");
    }

    let chat = Chat::new(req.title.trim());
    match state.db.create_chat(&chat).await {
        Ok(()) => ApiResponse::created(chat.into()),
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/chats`
#[utoipa::path(
    get,
    path = "/api/v1/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Chats with last-message previews", body = ListChatsResponse),
    )
)]
pub async fn list_chats(State(state): State<AppState>) -> ApiResponse<ListChatsResponse> {
    match state.db.list_chats().await {
        Ok(summaries) => {
            let chats: Vec<ChatSummaryResponse> =
                summaries.into_iter().map(Into::into).collect();
            let total = chats.len() as u64;
            ApiResponse::success_with_meta(
                ListChatsResponse { chats },
                ResponseMeta { total: Some(total) },
            )
        }
        Err(e) => e.into(),
    }
}

/// `GET /api/v1/chats/{chatId}`
#[utoipa::path(
    get,
    path = "/api/v1/chats/{chatId}",
    tag = "chats",
    params(("chatId" = String, Path, description = "Chat identifier")),
    responses(
        (status = 200, description = "The chat", body = ChatResponse),
        (status = 404, description = "Chat not found", body = ApiError),
    )
)]
pub async fn get_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> ApiResponse<ChatResponse> {
    match state.db.get_chat(&chat_id).await {
        Ok(Some(chat)) => ApiResponse::success(chat.into()),
        Ok(None) => ApiResponse::error(ErrorCode::NotFound, format!("Chat {chat_id} not found")),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/chats/{chatId}`
#[utoipa::path(
    delete,
    path = "/api/v1/chats/{chatId}",
    tag = "chats",
    params(("chatId" = String, Path, description = "Chat identifier")),
    responses(
        (status = 200, description = "Chat deleted"),
        (status = 404, description = "Chat not found", body = ApiError),
    )
)]
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
) -> ApiResponse<()> {
    match state.db.delete_chat(&chat_id).await {
        Ok(true) => ApiResponse::success(()),
        Ok(false) => ApiResponse::error(ErrorCode::NotFound, format!("Chat {chat_id} not found")),
        Err(e) => e.into(),
    }
}
