use regex::RegexSet;

use crate::agent::DecisionCache;
use crate::config::AgentConfig;
use crate::llm::{prompts, LlmProvider};
use crate::models::QueryKind;

/// Greeting and small-talk phrases that never need a model round-trip.
const GREETING_TRIGGERS: &[&str] = &[
    "привет",
    "здравствуй",
    "здравствуйте",
    "добрый день",
    "доброе утро",
    "добрый вечер",
    "как дела",
    "как у тебя дела",
    "hello",
    "good morning",
    "good evening",
    "how are you",
];

/// Question markers across the languages the agent serves.
const INTERROGATIVE_PATTERNS: &[&str] = &[
    r"\?",
    r"\b(что|когда|кто|почему|зачем|как|сколько|где|какой|какие)\b",
    r"\b(what|when|who|why|how|where|which)\b",
];

/// Topics the model reliably knows on its own (recipes, basic how-to), so a
/// web search would only add noise.
const LOCAL_KNOWLEDGE_PATTERNS: &[&str] = &[
    r"рецепт",
    r"приготови",
    r"пирог",
    r"яблочн",
    r"блины",
    r"каша",
    r"как сделать",
    r"как сварить",
    r"как приготовить",
    r"\bcook\b",
    r"\brecipe\b",
    r"\bcake\b",
    r"\bpie\b",
    r"how to cook",
    r"how to make",
];

/// Routes a message to the news pipeline or plain chat, and decides whether
/// a non-news message still warrants a web search.
///
/// Both decisions are idempotent for identical text, so they are memoized in
/// bounded LRU caches; the model is consulted at most once per distinct
/// input.
#[derive(Clone)]
pub struct QueryClassifier {
    llm: LlmProvider,
    kind_cache: DecisionCache<QueryKind>,
    search_cache: DecisionCache<bool>,
    interrogative: RegexSet,
    local_knowledge: RegexSet,
    greeting_max_len: usize,
    self_contained_len: usize,
}

impl QueryClassifier {
    pub fn new(llm: LlmProvider, config: &AgentConfig) -> Self {
        let interrogative =
            RegexSet::new(INTERROGATIVE_PATTERNS).expect("static interrogative patterns");
        let local_knowledge =
            RegexSet::new(LOCAL_KNOWLEDGE_PATTERNS).expect("static local-knowledge patterns");

        Self {
            llm,
            kind_cache: DecisionCache::new(config.classify_cache_size),
            search_cache: DecisionCache::new(config.classify_cache_size),
            interrogative,
            local_knowledge,
            greeting_max_len: config.greeting_max_len,
            self_contained_len: config.self_contained_len,
        }
    }

    /// Decide whether `text` is a news request or ordinary chat.
    ///
    /// Short greetings skip the model entirely; everything else goes through
    /// a strict one-word classification prompt. Model failure is treated as
    /// chat so a flaky model never triggers spurious searches.
    pub async fn classify(&self, text: &str) -> QueryKind {
        if let Some(cached) = self.kind_cache.get(text) {
            return cached;
        }

        let kind = if self.is_greeting(text) {
            QueryKind::Chat
        } else {
            let answer = self
                .llm
                .invoke(&prompts::classification_prompt(text), "chat")
                .await;
            if answer.trim().to_lowercase().starts_with("news") {
                QueryKind::News
            } else {
                QueryKind::Chat
            }
        };

        self.kind_cache.put(text, kind);
        kind
    }

    /// Decide whether a (non-news) message still needs a live web search.
    pub async fn needs_web_search(&self, text: &str) -> bool {
        if let Some(cached) = self.search_cache.get(text) {
            return cached;
        }

        let needed = self.needs_web_search_uncached(text).await;
        self.search_cache.put(text, needed);
        needed
    }

    async fn needs_web_search_uncached(&self, text: &str) -> bool {
        let lower = text.to_lowercase();

        // Cooking and similar how-to topics are answered from model memory.
        if self.local_knowledge.is_match(&lower) {
            return false;
        }

        if self.interrogative.is_match(&lower) {
            return true;
        }

        // Long texts without a question read as self-contained statements.
        if lower.chars().count() > self.self_contained_len {
            return false;
        }

        let answer = self.llm.invoke(&prompts::search_need_prompt(text), "no").await;
        answer.trim().to_lowercase().starts_with('y')
    }

    fn is_greeting(&self, text: &str) -> bool {
        let trimmed = text.trim().to_lowercase();
        if trimmed.chars().count() >= self.greeting_max_len {
            return false;
        }
        GREETING_TRIGGERS
            .iter()
            .any(|trigger| trimmed.contains(trigger))
    }
}
