//! v1 Voice handlers: thin pass-throughs to the speech vendor.

use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::api::v1::dto::voice::{SynthesizeRequest, TranscriptionResponse};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppState;

const DEFAULT_AUDIO_CONTENT_TYPE: &str = "audio/wav";

/// `POST /api/v1/voice:transcribe`
///
/// Accepts a multipart form with a `file` field carrying the audio and
/// returns the recognized text.
#[utoipa::path(
    post,
    path = "/api/v1/voice:transcribe",
    tag = "voice",
    responses(
        (status = 200, description = "Recognized text", body = TranscriptionResponse),
        (status = 400, description = "Invalid upload", body = ApiError),
        (status = 501, description = "Speech vendor not configured", body = ApiError),
    )
)]
pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResponse<TranscriptionResponse> {
    let mut audio: Option<(Vec<u8>, String)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }

                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_AUDIO_CONTENT_TYPE)
                    .to_string();

                match field.bytes().await {
                    Ok(bytes) => {
                        audio = Some((bytes.to_vec(), content_type));
                        break;
                    }
                    Err(e) => {
                        return ApiResponse::error(
                            ErrorCode::InvalidRequest,
                            format!("Failed to read upload: {e}"),
                        )
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return ApiResponse::error(
                    ErrorCode::InvalidRequest,
                    format!("Invalid multipart body: {e}"),
                )
            }
        }
    }

    let Some((bytes, content_type)) = audio else {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Missing 'file' field");
    };

    match state.speech.transcribe(&bytes, &content_type).await {
        Ok(text) => ApiResponse::success(TranscriptionResponse { text }),
        Err(e) => e.into(),
    }
}

/// `POST /api/v1/voice:synthesize`
///
/// Renders text as speech and streams the audio bytes back.
#[utoipa::path(
    post,
    path = "/api/v1/voice:synthesize",
    tag = "voice",
    request_body = SynthesizeRequest,
    responses(
        (status = 200, description = "Synthesized audio", body = Vec<u8>, content_type = "audio/ogg"),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 501, description = "Speech vendor not configured", body = ApiError),
    )
)]
pub async fn synthesize(
    State(state): State<AppState>,
    axum::Json(req): axum::Json<SynthesizeRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return ApiResponse::<()>::error(ErrorCode::InvalidRequest, "Text is required")
            .into_response();
    }

    match state
        .speech
        .synthesize(&req.text, req.voice.as_deref())
        .await
    {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/ogg")], audio).into_response(),
        Err(e) => ApiResponse::<()>::from(e).into_response(),
    }
}
