use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the classifier routed a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    News,
    Chat,
}

/// Flavor of an outgoing search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    News,
    General,
}

/// One normalized result from the external search provider.
///
/// Produced transiently per query; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: Option<String>,
    pub published: Option<String>,
}

/// A fetched article ready for summarization. Single-request lifetime.
#[derive(Debug, Clone)]
pub struct Article {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub published: Option<String>,
    /// Extracted visible text, truncated to the configured excerpt length.
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_kind_serialization() {
        assert_eq!(
            serde_json::to_value(QueryKind::News).unwrap(),
            serde_json::json!("news")
        );
        assert_eq!(
            serde_json::to_value(QueryKind::Chat).unwrap(),
            serde_json::json!("chat")
        );
    }

    #[test]
    fn test_search_mode_serialization() {
        assert_eq!(
            serde_json::to_value(SearchMode::General).unwrap(),
            serde_json::json!("general")
        );
    }
}
