use serde_json::Value;

use crate::agent::{DigestBuilder, QueryClassifier, QueryRewriter};
use crate::config::AgentConfig;
use crate::error::Result;
use crate::llm::{prompts, LlmProvider};
use crate::models::{QueryKind, SearchMode};
use crate::search::SearchGateway;

/// Upstream warning banners carry this marker; a response containing it is
/// not a real answer.
const WARNING_MARKER: char = '⚠';

/// Returned when every path came back empty.
const APOLOGY_REPLY: &str = "Извините, мне не удалось подготовить ответ на этот запрос. \
                             Попробуйте переформулировать вопрос.";

/// Prefix of the reply produced when the pipeline itself fails.
const ERROR_REPLY_PREFIX: &str = "Произошла ошибка при обработке запроса: ";

/// Top-level response pipeline.
///
/// Sequences classifier → rewriter → digest → fallbacks and always returns
/// a non-empty reply: sub-threshold candidates trigger the next fallback,
/// and the outer boundary converts unexpected errors into a readable error
/// reply instead of propagating them to the transport layer.
#[derive(Clone)]
pub struct ResponseComposer {
    classifier: QueryClassifier,
    rewriter: QueryRewriter,
    digest: DigestBuilder,
    gateway: SearchGateway,
    llm: LlmProvider,
    min_len: usize,
    max_digest_articles: usize,
    reply_language: String,
}

impl ResponseComposer {
    pub fn new(llm: LlmProvider, gateway: SearchGateway, config: &AgentConfig) -> Self {
        Self {
            classifier: QueryClassifier::new(llm.clone(), config),
            rewriter: QueryRewriter::new(llm.clone(), config),
            digest: DigestBuilder::new(llm.clone(), gateway.clone(), config),
            gateway,
            llm,
            min_len: config.min_response_len,
            max_digest_articles: config.max_digest_articles,
            reply_language: config.reply_language.clone(),
        }
    }

    /// Produce the assistant reply for one user message.
    ///
    /// Never returns an empty string and never fails.
    pub async fn respond(&self, raw_message: &str) -> String {
        match self.respond_inner(raw_message).await {
            Ok(response) if !response.trim().is_empty() => response,
            Ok(_) => APOLOGY_REPLY.to_string(),
            Err(error) => {
                tracing::error!(error = %error, "Response pipeline failed");
                format!("{ERROR_REPLY_PREFIX}{error}")
            }
        }
    }

    async fn respond_inner(&self, raw_message: &str) -> Result<String> {
        let message = coerce_message(raw_message);
        let mut response = String::new();

        if self.classifier.classify(&message).await == QueryKind::News {
            let news_query = self.rewriter.rewrite(&message, SearchMode::News).await;

            let digest = self
                .digest
                .build_digest(&news_query, self.max_digest_articles)
                .await;
            if self.acceptable(&digest) {
                response = digest;
            } else {
                // Secondary news attempt: free-form sourced overview.
                let fallback = self.news_agent_answer(&news_query).await;
                if self.meets_threshold(&fallback) {
                    response = fallback;
                }
            }
        }

        if !self.acceptable(&response) {
            let direct = self.llm.invoke(&message, "").await;

            if self.meets_threshold(&direct) {
                response = direct;
            } else if self.classifier.needs_web_search(&message).await {
                let web = self.answer_with_web_search(&message).await;
                response = if self.meets_threshold(&web) {
                    web
                } else if !direct.trim().is_empty() {
                    direct
                } else {
                    web
                };
            } else {
                response = direct;
            }
        }

        Ok(response)
    }

    /// Answer from live general-search results, citing them by index.
    async fn answer_with_web_search(&self, message: &str) -> String {
        let query = self.rewriter.rewrite(message, SearchMode::General).await;

        let results = self
            .gateway
            .search(&query, SearchMode::General, self.gateway.max_results())
            .await;
        if results.is_empty() {
            return String::new();
        }

        let prompt = prompts::sourced_answer_prompt(message, &results, &self.reply_language);
        self.llm.invoke(&prompt, "").await
    }

    /// Independent news-oriented fallback used when the digest falls short.
    async fn news_agent_answer(&self, query: &str) -> String {
        let results = self
            .gateway
            .search(query, SearchMode::News, self.gateway.max_results())
            .await;
        if results.is_empty() {
            return String::new();
        }

        let prompt = prompts::news_overview_prompt(query, &results, &self.reply_language);
        self.llm.invoke(&prompt, "").await
    }

    fn meets_threshold(&self, text: &str) -> bool {
        text.trim().chars().count() >= self.min_len
    }

    fn acceptable(&self, text: &str) -> bool {
        self.meets_threshold(text) && !text.contains(WARNING_MARKER)
    }
}

/// Coerce the incoming payload into plain message text.
///
/// Clients occasionally send an already-serialized JSON object; its
/// `content` field is the actual message. Anything unparseable degrades to
/// the raw text rather than being rejected.
fn coerce_message(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
            if let Some(content) = value.get("content") {
                return match content {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
            }
        }
    }

    trimmed.to_string()
}
