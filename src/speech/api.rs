use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use nanoid::nanoid;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SpeechConfig;
use crate::error::{Result, SovaError};

/// Refresh the token this early, as a fraction of its lifetime.
const TOKEN_REFRESH_FRACTION: f64 = 0.1;
const TOKEN_REFRESH_MAX_BUFFER_SECS: i64 = 300;

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    result: Vec<String>,
}

/// Speech vendor REST client: OAuth token exchange plus the synchronous
/// STT/TTS endpoints.
///
/// The vendor authenticates with a pre-encoded Basic key exchanged for a
/// short-lived bearer token; the token is cached and refreshed ahead of
/// expiry so request latency stays flat.
#[derive(Clone)]
pub struct SpeechApiClient {
    client: Client,
    config: SpeechConfig,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl SpeechApiClient {
    pub fn new(config: &SpeechConfig) -> Result<Self> {
        let Some(auth_key) = &config.auth_key else {
            return Err(SovaError::Speech(
                "Authorization key required for the speech API".to_string(),
            ));
        };

        // The key is sent verbatim as `Basic <key>`, so it must already be
        // base64 of `client_id:client_secret`.
        match base64::engine::general_purpose::STANDARD.decode(auth_key) {
            Ok(decoded) if decoded.contains(&b':') => {}
            Ok(_) => warn!("Speech auth key decodes without a client:secret separator"),
            Err(_) => warn!("Speech auth key is not valid base64"),
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SovaError::Speech(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config: config.clone(),
            token: Arc::new(Mutex::new(None)),
        })
    }

    pub async fn transcribe(&self, audio_bytes: &[u8], content_type: &str) -> Result<String> {
        let token = self.ensure_valid_token().await?;

        let url = format!("{}/speech:recognize", self.config.base_url);
        debug!(url = %url, bytes = audio_bytes.len(), "Sending recognition request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Type", content_type)
            .header("X-Request-ID", nanoid!())
            .query(&[("language", self.config.language.as_str())])
            .body(audio_bytes.to_vec())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_http_error("recognition", status, &error_body));
        }

        let recognized: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| SovaError::Speech(format!("Failed to parse recognition response: {e}")))?;

        let text = recognized.result.join(" ").trim().to_string();
        if text.is_empty() {
            return Err(SovaError::Speech(
                "Recognition response contained no text".to_string(),
            ));
        }

        Ok(text)
    }

    pub async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(SovaError::Validation("Text cannot be empty".to_string()));
        }

        let token = self.ensure_valid_token().await?;

        let voice = voice.unwrap_or(&self.config.voice);
        let url = format!("{}/text:synthesize", self.config.base_url);
        debug!(url = %url, voice = %voice, "Sending synthesis request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header("Content-Type", "application/text")
            .header("X-Request-ID", nanoid!())
            .query(&[("voice", voice), ("format", "opus")])
            .body(text.to_string())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_http_error("synthesis", status, &error_body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SovaError::Speech(format!("Failed to read synthesized audio: {e}")))?;

        Ok(audio.to_vec())
    }

    async fn ensure_valid_token(&self) -> Result<String> {
        {
            let cached = self.token.lock().unwrap();
            if let Some(token) = cached.as_ref() {
                if Utc::now() < token.expires_at {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let fresh = self.fetch_token().await?;
        let access_token = fresh.access_token.clone();
        *self.token.lock().unwrap() = Some(fresh);
        Ok(access_token)
    }

    async fn fetch_token(&self) -> Result<CachedToken> {
        let auth_key = self
            .config
            .auth_key
            .as_ref()
            .ok_or_else(|| SovaError::Speech("Authorization key not configured".to_string()))?;

        let response = self
            .client
            .post(&self.config.auth_url)
            .header("Authorization", format!("Basic {auth_key}"))
            .header("RqUID", nanoid!())
            .header("Accept", "application/json")
            .form(&[("scope", self.config.scope.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(map_http_error("token", status, &error_body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SovaError::Speech(format!("Failed to parse token response: {e}")))?;

        let buffer_secs = ((token.expires_in as f64 * TOKEN_REFRESH_FRACTION) as i64)
            .min(TOKEN_REFRESH_MAX_BUFFER_SECS);
        let expires_at = Utc::now() + chrono::Duration::seconds(token.expires_in - buffer_secs);
        debug!(expires_at = %expires_at, "Speech token refreshed");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> SovaError {
    if error.is_timeout() {
        SovaError::Speech("Request timeout".to_string())
    } else {
        SovaError::Speech(format!("Request failed: {error}"))
    }
}

fn map_http_error(operation: &str, status: StatusCode, error_body: &str) -> SovaError {
    match status {
        StatusCode::UNAUTHORIZED => SovaError::Speech(format!(
            "Speech {operation} authentication failed (401): {error_body}"
        )),
        StatusCode::TOO_MANY_REQUESTS => SovaError::Speech(format!(
            "Speech {operation} rate limit exceeded (429): {error_body}"
        )),
        _ => SovaError::Speech(format!(
            "Speech {operation} API error ({status}): {error_body}"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base: &MockServer) -> SpeechConfig {
        SpeechConfig {
            auth_key: Some("dGVzdDp0ZXN0".to_string()),
            auth_url: format!("{}/oauth", base.uri()),
            scope: "SPEECH_TEST".to_string(),
            base_url: base.uri(),
            voice: "May_24000".to_string(),
            language: "ru-RU".to_string(),
            timeout_secs: 5,
            max_file_size: 1024 * 1024,
        }
    }

    async fn mount_token(server: &MockServer, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth"))
            .and(header("Authorization", "Basic dGVzdDp0ZXN0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "bearer-token",
                "expires_in": 3600
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    #[test]
    fn test_client_requires_auth_key() {
        let config = SpeechConfig::default();
        assert!(SpeechApiClient::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_transcribe_joins_result_chunks() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/speech:recognize"))
            .and(header("Authorization", "Bearer bearer-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": ["привет", "мир"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SpeechApiClient::new(&test_config(&server)).unwrap();
        let text = client.transcribe(b"audio-bytes", "audio/ogg").await.unwrap();
        assert_eq!(text, "привет мир");
    }

    #[tokio::test]
    async fn test_token_is_cached_between_calls() {
        let server = MockServer::start().await;
        // One token fetch serves both API calls.
        mount_token(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/speech:recognize"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": ["ok"]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = SpeechApiClient::new(&test_config(&server)).unwrap();
        client.transcribe(b"one", "audio/wav").await.unwrap();
        client.transcribe(b"two", "audio/wav").await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        mount_token(&server, 1).await;

        Mock::given(method("POST"))
            .and(path("/text:synthesize"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"OggS-audio".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let client = SpeechApiClient::new(&test_config(&server)).unwrap();
        let audio = client.synthesize("привет", None).await.unwrap();
        assert_eq!(audio, b"OggS-audio".to_vec());
    }

    #[tokio::test]
    async fn test_synthesize_rejects_empty_text() {
        let server = MockServer::start().await;
        let client = SpeechApiClient::new(&test_config(&server)).unwrap();
        let result = client.synthesize("   ", None).await;
        assert!(matches!(result, Err(SovaError::Validation(_))));
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_speech_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let client = SpeechApiClient::new(&test_config(&server)).unwrap();
        let result = client.transcribe(b"audio", "audio/wav").await;
        assert!(matches!(result, Err(SovaError::Speech(msg)) if msg.contains("401")));
    }
}
