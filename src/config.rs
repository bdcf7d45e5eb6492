use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: Option<LlmConfig>,
    pub search: SearchConfig,
    pub speech: SpeechConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// External web/news search provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Provider name: `tavily`, `searxng`, or `none`.
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_results: usize,
    pub timeout_secs: u64,
}

/// Speech vendor (STT/TTS) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// Pre-encoded Basic authorization key for the vendor OAuth endpoint.
    pub auth_key: Option<String>,
    pub auth_url: String,
    pub scope: String,
    pub base_url: String,
    pub voice: String,
    pub language: String,
    pub timeout_secs: u64,
    pub max_file_size: u64,
}

/// Tuning knobs for the response-composition pipeline.
///
/// The numeric thresholds mirror empirically tuned production values; they
/// are exposed through the environment rather than re-derived.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Minimum length for a candidate response to be accepted.
    pub min_response_len: usize,
    /// Texts shorter than this can take the greeting fast path.
    pub greeting_max_len: usize,
    /// Texts longer than this are assumed self-contained statements.
    pub self_contained_len: usize,
    /// Queries with at most this many words skip rewriting.
    pub rewrite_skip_words: usize,
    /// Rewritten search queries are capped to this many characters.
    pub rewrite_max_len: usize,
    /// Hard cap on articles per news digest.
    pub max_digest_articles: usize,
    /// Raw results requested per article wanted, to survive dedup/filtering.
    pub overfetch_factor: usize,
    /// Per-article excerpt length fed into the digest prompt.
    pub article_excerpt_len: usize,
    /// Entry bound for the classification memo caches.
    pub classify_cache_size: usize,
    /// Language the agent answers in.
    pub reply_language: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            auth_key: None,
            auth_url: "https://ngw.devices.sberbank.ru:9443/api/v2/oauth".to_string(),
            scope: "SALUTE_SPEECH_PERS".to_string(),
            base_url: "https://smartspeech.sber.ru/rest/v1".to_string(),
            voice: "May_24000".to_string(),
            language: "ru-RU".to_string(),
            timeout_secs: 30,
            max_file_size: 10485760,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            min_response_len: 30,
            greeting_max_len: 40,
            self_contained_len: 120,
            rewrite_skip_words: 3,
            rewrite_max_len: 120,
            max_digest_articles: 7,
            overfetch_factor: 2,
            article_excerpt_len: 2000,
            classify_cache_size: 256,
            reply_language: "Russian".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SOVA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("SOVA_PORT", 3000),
                api_keys: env::var("SOVA_API_KEYS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:sova.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
            }),
            search: SearchConfig {
                provider: env::var("SEARCH_PROVIDER").unwrap_or_else(|_| "none".to_string()),
                api_key: env::var("SEARCH_API_KEY").ok(),
                base_url: env::var("SEARCH_BASE_URL").ok(),
                max_results: parse_env_or("SEARCH_MAX_RESULTS", 5),
                timeout_secs: parse_env_or("SEARCH_TIMEOUT", 10),
            },
            speech: SpeechConfig {
                auth_key: env::var("SPEECH_AUTH_KEY").ok(),
                auth_url: env::var("SPEECH_AUTH_URL")
                    .unwrap_or_else(|_| SpeechConfig::default().auth_url),
                scope: env::var("SPEECH_SCOPE").unwrap_or_else(|_| SpeechConfig::default().scope),
                base_url: env::var("SPEECH_BASE_URL")
                    .unwrap_or_else(|_| SpeechConfig::default().base_url),
                voice: env::var("SPEECH_VOICE").unwrap_or_else(|_| SpeechConfig::default().voice),
                language: env::var("SPEECH_LANGUAGE")
                    .unwrap_or_else(|_| SpeechConfig::default().language),
                timeout_secs: parse_env_or("SPEECH_TIMEOUT", 30),
                max_file_size: parse_env_or("SPEECH_MAX_FILE_SIZE", 10485760),
            },
            agent: AgentConfig {
                min_response_len: parse_env_or("AGENT_MIN_RESPONSE_LEN", 30),
                greeting_max_len: parse_env_or("AGENT_GREETING_MAX_LEN", 40),
                self_contained_len: parse_env_or("AGENT_SELF_CONTAINED_LEN", 120),
                rewrite_skip_words: parse_env_or("AGENT_REWRITE_SKIP_WORDS", 3),
                rewrite_max_len: parse_env_or("AGENT_REWRITE_MAX_LEN", 120),
                max_digest_articles: parse_env_or("AGENT_MAX_DIGEST_ARTICLES", 7),
                overfetch_factor: parse_env_or("AGENT_OVERFETCH_FACTOR", 2),
                article_excerpt_len: parse_env_or("AGENT_ARTICLE_EXCERPT_LEN", 2000),
                classify_cache_size: parse_env_or("AGENT_CLASSIFY_CACHE_SIZE", 256),
                reply_language: env::var("AGENT_REPLY_LANGUAGE")
                    .unwrap_or_else(|_| "Russian".to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
