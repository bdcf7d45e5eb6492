//! Voice endpoint DTOs for the v1 API.

use serde::{Deserialize, Serialize};

/// Response for `POST /v1/voice:transcribe`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptionResponse {
    /// Recognized text.
    pub text: String,
}

/// Request body for `POST /v1/voice:synthesize`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    /// Text to render as speech.
    pub text: String,
    /// Vendor voice identifier; the configured default applies when absent.
    #[serde(default)]
    pub voice: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesize_request_voice_is_optional() {
        let req: SynthesizeRequest =
            serde_json::from_str(r#"{"text": "привет"}"#).expect("deserialize");
        assert_eq!(req.text, "привет");
        assert!(req.voice.is_none());
    }
}
