use std::collections::HashSet;

use url::Url;

use crate::agent::ArticleFetcher;
use crate::config::AgentConfig;
use crate::llm::{prompts, LlmProvider};
use crate::models::{Article, SearchMode, SearchResult};
use crate::search::SearchGateway;

/// Domains that resist text extraction and never yield usable article bodies.
const BLOCKED_DOMAINS: &[&str] = &["youtube.com", "youtu.be", "quora.com"];

/// Header of the canonical source list appended to every digest.
pub const SOURCES_HEADER: &str = "Sources:";

/// Builds a cited multi-paragraph news digest for a query.
///
/// Returns an empty string whenever nothing usable could be assembled; the
/// composer treats that as "no digest available" and falls back.
#[derive(Clone)]
pub struct DigestBuilder {
    llm: LlmProvider,
    gateway: SearchGateway,
    fetcher: ArticleFetcher,
    max_articles: usize,
    overfetch_factor: usize,
    reply_language: String,
}

impl DigestBuilder {
    pub fn new(llm: LlmProvider, gateway: SearchGateway, config: &AgentConfig) -> Self {
        Self {
            llm,
            gateway,
            fetcher: ArticleFetcher::new(config.article_excerpt_len),
            max_articles: config.max_digest_articles,
            overfetch_factor: config.overfetch_factor,
            reply_language: config.reply_language.clone(),
        }
    }

    pub async fn build_digest(&self, query: &str, max_results: usize) -> String {
        let wanted = max_results.min(self.max_articles);
        if wanted == 0 {
            return String::new();
        }

        // English keywords pull noticeably more results from news indexes.
        let search_query = self.translate_if_needed(query).await;

        let raw = self
            .gateway
            .search(
                &search_query,
                SearchMode::News,
                wanted * self.overfetch_factor,
            )
            .await;

        let articles = self.collect_articles(&raw, wanted).await;
        if articles.is_empty() {
            return String::new();
        }

        let prompt = prompts::digest_prompt(query, &articles, &self.reply_language);
        let summary = self.llm.invoke(&prompt, "").await;

        // The source list is appended here, not left to the model, so every
        // digest cites its inputs even when the model omits them.
        format!(
            "{}\n\n{}\n{}",
            summary.trim_end(),
            SOURCES_HEADER,
            prompts::source_list(&articles)
        )
        .trim_start()
        .to_string()
    }

    async fn collect_articles(&self, raw: &[SearchResult], wanted: usize) -> Vec<Article> {
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut articles = Vec::new();

        for result in raw {
            if articles.len() >= wanted {
                break;
            }

            if !seen_urls.insert(result.url.clone()) {
                continue;
            }

            if is_blocked_domain(&result.url) {
                continue;
            }

            articles.push(self.fetcher.fetch(result).await);
        }

        articles
    }

    async fn translate_if_needed(&self, text: &str) -> String {
        if !contains_cyrillic(text) {
            return text.to_string();
        }

        let translated = self.llm.invoke(&prompts::translation_prompt(text), text).await;
        translated
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string()
    }
}

fn contains_cyrillic(text: &str) -> bool {
    text.chars()
        .any(|c| ('а'..='я').contains(&c.to_lowercase().next().unwrap_or(c)) || c == 'ё' || c == 'Ё')
}

fn is_blocked_domain(raw_url: &str) -> bool {
    let host = Url::parse(raw_url)
        .ok()
        .and_then(|url| url.host_str().map(ToString::to_string));

    match host {
        Some(host) => BLOCKED_DOMAINS
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}"))),
        // Unparseable URLs fall back to a substring check.
        None => BLOCKED_DOMAINS.iter().any(|domain| raw_url.contains(domain)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, SearchConfig};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm_for(server: &MockServer) -> LlmProvider {
        LlmProvider::new(Some(&LlmConfig {
            model: "openai/gpt-4o-mini".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(server.uri()),
            timeout_secs: 5,
            max_retries: 0,
        }))
    }

    fn gateway_for(server: &MockServer) -> SearchGateway {
        SearchGateway::new(&SearchConfig {
            provider: "tavily".to_string(),
            api_key: Some("tvly-test".to_string()),
            base_url: Some(server.uri()),
            max_results: 5,
            timeout_secs: 5,
        })
    }

    async fn mount_completion(server: &MockServer, content: &str) {
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": content},
                    "finish_reason": "stop"
                }]
            })))
            .mount(server)
            .await;
    }

    fn builder(llm: LlmProvider, gateway: SearchGateway) -> DigestBuilder {
        DigestBuilder::new(llm, gateway, &AgentConfig::default())
    }

    #[test]
    fn test_blocked_domains() {
        assert!(is_blocked_domain("https://www.youtube.com/watch?v=abc"));
        assert!(is_blocked_domain("https://youtu.be/abc"));
        assert!(is_blocked_domain("https://quora.com/What-is"));
        assert!(!is_blocked_domain("https://reuters.com/article"));
        assert!(!is_blocked_domain("https://notyoutube.example/page"));
    }

    #[test]
    fn test_contains_cyrillic() {
        assert!(contains_cyrillic("новости Tesla"));
        assert!(contains_cyrillic("Ёлка"));
        assert!(!contains_cyrillic("Tesla news today"));
    }

    #[tokio::test]
    async fn test_empty_search_yields_empty_digest() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;
        mount_completion(&server, "should never be used").await;

        let digest = builder(llm_for(&server), gateway_for(&server))
            .build_digest("tesla news", 5)
            .await;
        assert_eq!(digest, "");
    }

    #[tokio::test]
    async fn test_digest_appends_source_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Story A", "url": format!("{}/a", server.uri()), "content": "snippet a"},
                    {"title": "Story B", "url": format!("{}/b", server.uri()), "content": "snippet b"}
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><body><p>Article body with details.</p></body></html>",
            ))
            .mount(&server)
            .await;
        mount_completion(&server, "A detailed overview citing [1] and [2].").await;

        let digest = builder(llm_for(&server), gateway_for(&server))
            .build_digest("tesla news", 5)
            .await;

        assert!(digest.contains("A detailed overview"));
        assert!(digest.contains(SOURCES_HEADER));
        assert!(digest.contains("[1] Story A"));
        assert!(digest.contains("[2] Story B"));
    }

    #[tokio::test]
    async fn test_digest_deduplicates_and_filters_urls() {
        let server = MockServer::start().await;
        let dup = format!("{}/same", server.uri());
        Mock::given(method("POST"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"title": "Dup 1", "url": dup.clone(), "content": "first"},
                    {"title": "Dup 2", "url": dup, "content": "second"},
                    {"title": "Video", "url": "https://youtube.com/watch?v=1", "content": "video"},
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>body</p>"))
            .mount(&server)
            .await;
        mount_completion(&server, "Overview of the one real story.").await;

        let digest = builder(llm_for(&server), gateway_for(&server))
            .build_digest("tesla", 5)
            .await;

        assert!(digest.contains("[1] Dup 1"));
        assert!(!digest.contains("[2]"));
        assert!(!digest.contains("youtube.com"));
    }

    #[tokio::test]
    async fn test_cyrillic_query_is_translated_before_search() {
        let server = MockServer::start().await;

        // The translation call goes to the LLM first.
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains("Translate the following phrase"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-test",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "\"Tesla latest news\""},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        // The search then carries the translated query.
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_string_contains("Tesla latest news"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let digest = builder(llm_for(&server), gateway_for(&server))
            .build_digest("последние новости Tesla", 5)
            .await;
        assert_eq!(digest, "");
    }
}
