use unicode_segmentation::UnicodeSegmentation;

use crate::config::AgentConfig;
use crate::llm::{prompts, LlmProvider};
use crate::models::SearchMode;

/// Compresses a free-form user message into a terse search query.
///
/// Rewriting is best-effort: inputs that are already short pass through
/// unchanged, and any model failure falls back to the original text so the
/// pipeline never stalls here.
#[derive(Clone)]
pub struct QueryRewriter {
    llm: LlmProvider,
    skip_words: usize,
    max_len: usize,
}

impl QueryRewriter {
    pub fn new(llm: LlmProvider, config: &AgentConfig) -> Self {
        Self {
            llm,
            skip_words: config.rewrite_skip_words,
            max_len: config.rewrite_max_len,
        }
    }

    pub async fn rewrite(&self, text: &str, mode: SearchMode) -> String {
        let trimmed = text.trim();

        if trimmed.unicode_words().count() <= self.skip_words {
            return trimmed.to_string();
        }

        let rewritten = self
            .llm
            .invoke(&prompts::rewrite_prompt(trimmed, mode), trimmed)
            .await;
        let rewritten = rewritten.trim();

        if rewritten.is_empty() {
            return trimmed.to_string();
        }

        truncate_chars(rewritten, self.max_len)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
