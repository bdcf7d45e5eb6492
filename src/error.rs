use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SovaError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("API authentication error: {0}")]
    ApiAuth(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Search error: {0}")]
    Search(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Speech unavailable: {0}")]
    SpeechUnavailable(String),
}

impl IntoResponse for SovaError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SovaError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            SovaError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            SovaError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            SovaError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            SovaError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            SovaError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            SovaError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            SovaError::ApiAuth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            SovaError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SovaError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            SovaError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            SovaError::LlmRateLimit { retry_after } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("LLM rate limit exceeded, retry after {retry_after:?} seconds"),
            ),
            SovaError::Search(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            SovaError::Speech(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            SovaError::SpeechUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SovaError>;
