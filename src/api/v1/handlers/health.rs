//! v1 Health handler.

use axum::extract::State;
use serde::Serialize;

use crate::api::v1::response::{ApiError, ApiResponse};
use crate::api::AppState;
use crate::db::ChatStore;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub database: DatabaseStatus,
    pub llm: LlmStatus,
    pub search: SearchStatus,
    pub speech: SpeechStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub connected: bool,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LlmStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchStatus {
    pub available: bool,
    pub provider: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpeechStatus {
    pub available: bool,
}

/// `GET /api/v1/health`
///
/// Reports availability of every external collaborator. Always returns 200;
/// degraded components show up as `available: false`.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health", body = HealthData),
        (status = 500, description = "Health check failed", body = ApiError),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let database_connected = state.db.list_chats().await.is_ok();

    ApiResponse::success(HealthData {
        status: if database_connected { "ok" } else { "degraded" }.to_string(),
        database: DatabaseStatus {
            connected: database_connected,
        },
        llm: LlmStatus {
            available: state.llm.is_available(),
            model: state.config.llm.as_ref().map(|llm| llm.model.clone()),
        },
        search: SearchStatus {
            available: state.search.is_available(),
            provider: state.config.search.provider.clone(),
        },
        speech: SpeechStatus {
            available: state.speech.is_available(),
        },
    })
}
