use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sova API",
        version = "1.0.0",
        description = "Self-hostable AI chat backend. Routes messages through a news-aware response pipeline and exposes voice transcription/synthesis.",
    ),
    paths(
        handlers::health::health_check,
        handlers::chats::create_chat,
        handlers::chats::list_chats,
        handlers::chats::get_chat,
        handlers::chats::delete_chat,
        handlers::messages::list_messages,
        handlers::messages::send_message,
        handlers::voice::transcribe,
        handlers::voice::synthesize,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Chats & messages
        dto::chat::CreateChatRequest,
        dto::chat::ChatResponse,
        dto::chat::ChatSummaryResponse,
        dto::chat::ListChatsResponse,
        dto::chat::SendMessageRequest,
        dto::chat::MessageResponse,
        dto::chat::ListMessagesResponse,
        dto::chat::MessageExchangeResponse,
        // Voice
        dto::voice::TranscriptionResponse,
        dto::voice::SynthesizeRequest,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::LlmStatus,
        handlers::health::SearchStatus,
        handlers::health::SpeechStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "chats", description = "Chat CRUD and listing"),
        (name = "messages", description = "Message history and the response pipeline"),
        (name = "voice", description = "Speech-to-text and text-to-speech"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
