use tracing::{info, warn};

use crate::config::SpeechConfig;
use crate::error::{Result, SovaError};

use super::api::SpeechApiClient;

#[derive(Clone)]
enum SpeechBackend {
    Api { client: SpeechApiClient },
    Unavailable { reason: String },
}

/// Facade over the speech vendor used by the voice endpoints.
///
/// The core response pipeline never touches this layer; it only serves the
/// explicit transcribe/synthesize routes.
#[derive(Clone)]
pub struct SpeechProvider {
    backend: SpeechBackend,
    config: SpeechConfig,
}

impl SpeechProvider {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let backend = match SpeechApiClient::new(config) {
            Ok(client) => {
                info!("Speech API backend initialized");
                SpeechBackend::Api { client }
            }
            Err(e) => {
                let reason = format!("Speech API backend unavailable: {e}");
                warn!("{}", reason);
                SpeechBackend::Unavailable { reason }
            }
        };

        Ok(Self {
            backend,
            config: config.clone(),
        })
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: SpeechBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: SpeechConfig::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, SpeechBackend::Unavailable { .. })
    }

    pub fn max_file_size(&self) -> u64 {
        self.config.max_file_size
    }

    pub async fn transcribe(&self, audio_bytes: &[u8], content_type: &str) -> Result<String> {
        if audio_bytes.is_empty() {
            return Err(SovaError::Validation("Audio payload is empty".to_string()));
        }
        if audio_bytes.len() as u64 > self.config.max_file_size {
            return Err(SovaError::Validation(format!(
                "Audio payload exceeds the {} byte limit",
                self.config.max_file_size
            )));
        }

        match &self.backend {
            SpeechBackend::Api { client } => client.transcribe(audio_bytes, content_type).await,
            SpeechBackend::Unavailable { reason } => {
                Err(SovaError::SpeechUnavailable(reason.clone()))
            }
        }
    }

    pub async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        match &self.backend {
            SpeechBackend::Api { client } => client.synthesize(text, voice).await,
            SpeechBackend::Unavailable { reason } => {
                Err(SovaError::SpeechUnavailable(reason.clone()))
            }
        }
    }
}
