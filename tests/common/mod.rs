//! Shared helpers for integration tests: wiremock-backed providers and a
//! fully wired test application.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sova::api::{create_router, AppState};
use sova::config::{Config, LlmConfig, SearchConfig};
use sova::db::{ChatBackend, Database, LibSqlBackend};
use sova::llm::LlmProvider;
use sova::search::SearchGateway;
use sova::speech::SpeechProvider;

pub fn llm_config(server: &MockServer) -> LlmConfig {
    LlmConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_secs: 5,
        max_retries: 0,
    }
}

pub fn llm_provider(server: &MockServer) -> LlmProvider {
    LlmProvider::new(Some(&llm_config(server)))
}

pub fn search_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        provider: "tavily".to_string(),
        api_key: Some("tvly-test".to_string()),
        base_url: Some(server.uri()),
        max_results: 5,
        timeout_secs: 5,
    }
}

pub fn search_gateway(server: &MockServer) -> SearchGateway {
    SearchGateway::new(&search_config(server))
}

pub fn completion_body(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

/// Answer chat-completion requests whose prompt contains `needle`.
///
/// Mount specific matchers before any catch-all: wiremock evaluates mocks in
/// mount order.
pub async fn mount_completion_containing(server: &MockServer, needle: &str, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains(needle))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

/// Catch-all chat-completion answer for prompts no earlier mock matched.
pub async fn mount_completion_fallback(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .mount(server)
        .await;
}

/// Boot the full application against wiremock-backed LLM/search providers.
/// Returns the listening address and the guards keeping the database alive.
pub async fn setup_test_app(
    llm_server: Option<&MockServer>,
    search_server: Option<&MockServer>,
    speech: Option<SpeechProvider>,
) -> (SocketAddr, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("sova.db");

    let mut config = Config::from_env();
    config.database.url = format!("file:{}", db_path.display());
    config.server.api_keys = vec!["test-key".to_string()];
    config.llm = llm_server.map(llm_config);
    if let Some(server) = search_server {
        config.search = search_config(server);
    } else {
        config.search.provider = "none".to_string();
    }

    let db = Database::new(&config.database)
        .await
        .expect("Failed to create database");
    let db: Arc<dyn ChatBackend> = Arc::new(LibSqlBackend::new(db));

    let llm = match llm_server {
        Some(server) => llm_provider(server),
        None => LlmProvider::unavailable("tests"),
    };
    let search = match search_server {
        Some(server) => search_gateway(server),
        None => SearchGateway::unavailable("tests"),
    };
    let speech = speech.unwrap_or_else(|| SpeechProvider::unavailable("tests"));

    let state = AppState::new(config, db, llm, search, speech);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().expect("Failed to get local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    (addr, temp_dir)
}
