use std::time::Duration;

use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{Result, SovaError};
use crate::models::{SearchMode, SearchResult};

const TAVILY_BASE_URL: &str = "https://api.tavily.com";

#[derive(Clone)]
enum SearchBackend {
    Tavily { base_url: String, api_key: String },
    Searxng { base_url: String },
    Unavailable { reason: String },
}

/// External web/news search, normalized to [`SearchResult`] records.
///
/// Provider failures never cross the public contract: `search` returns an
/// empty list on any error so the caller's pipeline keeps moving.
#[derive(Clone)]
pub struct SearchGateway {
    backend: SearchBackend,
    http: reqwest::Client,
    max_results: usize,
}

impl SearchGateway {
    pub fn new(config: &SearchConfig) -> Self {
        let backend = match config.provider.to_lowercase().as_str() {
            "tavily" => match &config.api_key {
                Some(api_key) => SearchBackend::Tavily {
                    base_url: config
                        .base_url
                        .clone()
                        .unwrap_or_else(|| TAVILY_BASE_URL.to_string()),
                    api_key: api_key.clone(),
                },
                None => SearchBackend::Unavailable {
                    reason: "SEARCH_API_KEY required for tavily".to_string(),
                },
            },
            "searxng" => match &config.base_url {
                Some(base_url) => SearchBackend::Searxng {
                    base_url: base_url.clone(),
                },
                None => SearchBackend::Unavailable {
                    reason: "SEARCH_BASE_URL required for searxng".to_string(),
                },
            },
            other => SearchBackend::Unavailable {
                reason: format!("Unknown search provider: {other}"),
            },
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            backend,
            http,
            max_results: config.max_results,
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: SearchBackend::Unavailable {
                reason: reason.to_string(),
            },
            http: reqwest::Client::new(),
            max_results: 0,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, SearchBackend::Unavailable { .. })
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Run a search, returning at most `limit` normalized results.
    ///
    /// Any provider failure yields an empty list, logged at `warn`.
    pub async fn search(&self, query: &str, mode: SearchMode, limit: usize) -> Vec<SearchResult> {
        match self.search_inner(query, mode, limit).await {
            Ok(results) => results,
            Err(error) => {
                tracing::warn!(error = %error, query, "Search failed, returning no results");
                Vec::new()
            }
        }
    }

    async fn search_inner(
        &self,
        query: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let raw = match &self.backend {
            SearchBackend::Tavily { base_url, api_key } => {
                self.fetch_tavily(base_url, api_key, query, mode, limit).await?
            }
            SearchBackend::Searxng { base_url } => {
                self.fetch_searxng(base_url, query, mode).await?
            }
            SearchBackend::Unavailable { reason } => {
                return Err(SovaError::Search(reason.clone()));
            }
        };

        Ok(raw
            .iter()
            .filter_map(normalize_entry)
            .take(limit)
            .collect())
    }

    async fn fetch_tavily(
        &self,
        base_url: &str,
        api_key: &str,
        query: &str,
        mode: SearchMode,
        limit: usize,
    ) -> Result<Vec<Value>> {
        let mut body = serde_json::json!({
            "query": query,
            "search_depth": "basic",
            "max_results": limit,
            "include_answer": false,
            "include_raw_content": false,
        });
        if mode == SearchMode::News {
            body["topic"] = Value::String("news".to_string());
        }

        let response = self
            .http
            .post(format!("{base_url}/search"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SovaError::Search(format!(
                "tavily returned status {status}: {body}"
            )));
        }

        let payload: Value = response.json().await?;
        Ok(payload
            .get("results")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_searxng(
        &self,
        base_url: &str,
        query: &str,
        mode: SearchMode,
    ) -> Result<Vec<Value>> {
        let mut request = self
            .http
            .get(format!("{base_url}/search"))
            .query(&[("q", query), ("format", "json")]);
        if mode == SearchMode::News {
            request = request.query(&[("categories", "news")]);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SovaError::Search(format!(
                "searxng returned status {status}"
            )));
        }

        let payload: Value = response.json().await?;
        Ok(payload
            .get("results")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default())
    }
}

/// Normalize one raw provider entry into a [`SearchResult`].
///
/// Tolerates the three shapes search tooling is known to hand back:
/// a key/value record with varying key names, a document-like object with
/// `metadata` plus `page_content`, and a bare string. Entries without a
/// resolvable URL are dropped.
pub fn normalize_entry(value: &Value) -> Option<SearchResult> {
    if let Some(text) = value.as_str() {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        return Some(SearchResult {
            title: truncate_chars(trimmed, 80),
            url: trimmed.to_string(),
            snippet: String::new(),
            source: None,
            published: None,
        });
    }

    let obj = value.as_object()?;

    if let Some(meta) = obj.get("metadata").and_then(|m| m.as_object()) {
        let url = string_field(meta, &["source", "url", "link"])?;
        let content = obj
            .get("page_content")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let title = if content.is_empty() {
            url.clone()
        } else {
            truncate_chars(content, 80)
        };
        return Some(SearchResult {
            title,
            url,
            snippet: truncate_chars(content, 150),
            source: string_field(meta, &["source_name", "publisher"]),
            published: string_field(meta, &["published_date", "published", "date"]),
        });
    }

    let url = string_field(obj, &["url", "link", "href", "source"])?;
    let title = string_field(obj, &["title", "text"]).unwrap_or_else(|| url.clone());
    let snippet = string_field(obj, &["body", "snippet", "content"]).unwrap_or_default();

    Some(SearchResult {
        title,
        url,
        snippet,
        source: string_field(obj, &["source", "source_name", "publisher"]),
        published: string_field(obj, &["published_date", "published", "date"]),
    })
}

fn string_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        obj.get(*key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tavily_config(base_url: String) -> SearchConfig {
        SearchConfig {
            provider: "tavily".to_string(),
            api_key: Some("tvly-test".to_string()),
            base_url: Some(base_url),
            max_results: 5,
            timeout_secs: 5,
        }
    }

    #[test]
    fn test_normalize_key_value_record() {
        let entry = json!({
            "title": "Big story",
            "link": "https://news.example/story",
            "snippet": "Something happened",
            "source": "Example News",
            "published_date": "2025-06-01"
        });

        let result = normalize_entry(&entry).expect("normalized");
        assert_eq!(result.title, "Big story");
        assert_eq!(result.url, "https://news.example/story");
        assert_eq!(result.snippet, "Something happened");
        assert_eq!(result.published.as_deref(), Some("2025-06-01"));
    }

    #[test]
    fn test_normalize_prefers_url_over_alternate_keys() {
        let entry = json!({
            "title": "Story",
            "url": "https://primary.example",
            "href": "https://secondary.example"
        });

        let result = normalize_entry(&entry).expect("normalized");
        assert_eq!(result.url, "https://primary.example");
    }

    #[test]
    fn test_normalize_document_like_object() {
        let entry = json!({
            "page_content": "A long body of extracted text about the event",
            "metadata": {"source": "https://docs.example/page"}
        });

        let result = normalize_entry(&entry).expect("normalized");
        assert_eq!(result.url, "https://docs.example/page");
        assert!(result.title.starts_with("A long body"));
        assert!(!result.snippet.is_empty());
    }

    #[test]
    fn test_normalize_bare_string() {
        let entry = json!("https://plain.example/article");
        let result = normalize_entry(&entry).expect("normalized");
        assert_eq!(result.url, "https://plain.example/article");
        assert_eq!(result.title, "https://plain.example/article");
        assert_eq!(result.snippet, "");
    }

    #[test]
    fn test_normalize_drops_entry_without_url() {
        let entry = json!({"title": "No link here", "snippet": "text"});
        assert!(normalize_entry(&entry).is_none());

        let entry = json!(42);
        assert!(normalize_entry(&entry).is_none());
    }

    #[test]
    fn test_unconfigured_provider_is_unavailable() {
        let config = SearchConfig {
            provider: "none".to_string(),
            api_key: None,
            base_url: None,
            max_results: 5,
            timeout_secs: 5,
        };
        let gateway = SearchGateway::new(&config);
        assert!(!gateway.is_available());
    }

    #[test]
    fn test_tavily_without_key_is_unavailable() {
        let config = SearchConfig {
            provider: "tavily".to_string(),
            api_key: None,
            base_url: None,
            max_results: 5,
            timeout_secs: 5,
        };
        let gateway = SearchGateway::new(&config);
        assert!(!gateway.is_available());
    }

    #[tokio::test]
    async fn test_tavily_search_normalizes_results() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "One", "url": "https://a.example", "content": "first"},
                    {"title": "No url entry"},
                    "https://b.example",
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = SearchGateway::new(&tavily_config(mock_server.uri()));
        let results = gateway.search("tesla", SearchMode::General, 5).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://a.example");
        assert_eq!(results[1].url, "https://b.example");
    }

    #[tokio::test]
    async fn test_tavily_news_mode_sets_topic() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({"topic": "news"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let gateway = SearchGateway::new(&tavily_config(mock_server.uri()));
        let results = gateway.search("tesla", SearchMode::News, 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_yields_empty_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let gateway = SearchGateway::new(&tavily_config(mock_server.uri()));
        let results = gateway.search("tesla", SearchMode::General, 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let mock_server = MockServer::start().await;

        let entries: Vec<_> = (0..10)
            .map(|i| json!({"title": format!("T{i}"), "url": format!("https://x.example/{i}")}))
            .collect();

        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": entries})))
            .mount(&mock_server)
            .await;

        let gateway = SearchGateway::new(&tavily_config(mock_server.uri()));
        let results = gateway.search("query", SearchMode::General, 3).await;
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn test_searxng_search() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("categories", "news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Local story", "url": "https://sx.example/1", "content": "body"}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = SearchConfig {
            provider: "searxng".to_string(),
            api_key: None,
            base_url: Some(mock_server.uri()),
            max_results: 5,
            timeout_secs: 5,
        };
        let gateway = SearchGateway::new(&config);
        let results = gateway.search("story", SearchMode::News, 5).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Local story");
    }
}
