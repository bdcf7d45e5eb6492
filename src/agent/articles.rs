use std::time::Duration;

use chrono::Utc;
use scraper::{Html, Selector};

use crate::error::{Result, SovaError};
use crate::models::{Article, SearchResult};

/// Desktop browser User-Agent so news sites do not block the fetcher.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0";

const FETCH_TIMEOUT_SECS: u64 = 10;
const TEXT_RENDER_WIDTH: usize = 80;

/// Fetches article pages and extracts readable text for the digest builder.
#[derive(Clone)]
pub struct ArticleFetcher {
    http: reqwest::Client,
    excerpt_len: usize,
}

impl ArticleFetcher {
    pub fn new(excerpt_len: usize) -> Self {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self { http, excerpt_len }
    }

    /// Turn one search result into an [`Article`].
    ///
    /// Fetch or extraction failure falls back to the search snippet, so a
    /// dead link still contributes whatever the provider knew about it. A
    /// result that arrived without a title gets the page `<title>`.
    pub async fn fetch(&self, result: &SearchResult) -> Article {
        let (content, page_title) = match self.fetch_page(&result.url).await {
            Ok((text, title)) if !text.trim().is_empty() => {
                (truncate_chars(&text, self.excerpt_len), title)
            }
            Ok((_, title)) => (result.snippet.clone(), title),
            Err(error) => {
                tracing::debug!(url = %result.url, error = %error, "Article fetch failed, using snippet");
                (result.snippet.clone(), None)
            }
        };

        let title = if result.title.trim().is_empty() {
            page_title.unwrap_or_else(|| result.url.clone())
        } else {
            result.title.clone()
        };

        Article {
            title,
            url: result.url.clone(),
            source: result.source.clone(),
            published: result.published.clone(),
            content,
            fetched_at: Utc::now(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<(String, Option<String>)> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SovaError::Search(format!(
                "page fetch returned status {status}"
            )));
        }

        let html = response.text().await?;

        // Rendering HTML to text is CPU-bound; keep it off the async workers.
        tokio::task::spawn_blocking(move || {
            let title = extract_title(&html);
            let text = extract_visible_text(&html)?;
            Ok((text, title))
        })
        .await
        .map_err(|e| SovaError::Internal(format!("extraction task failed: {e}")))?
    }
}

/// Extract human-visible text from an HTML document.
fn extract_visible_text(html: &str) -> Result<String> {
    let text = html2text::from_read(html.as_bytes(), TEXT_RENDER_WIDTH)
        .map_err(|e| SovaError::Search(format!("text extraction failed: {e}")))?;
    Ok(text.trim().to_string())
}

/// Best-effort `<title>` lookup, for results that arrived without one.
fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search_result(url: String) -> SearchResult {
        SearchResult {
            title: "A story".to_string(),
            url,
            snippet: "provider snippet".to_string(),
            source: Some("Example".to_string()),
            published: None,
        }
    }

    #[test]
    fn test_extract_visible_text_strips_markup() {
        let html = "<html><body><h1>Headline</h1><p>First paragraph.</p></body></html>";
        let text = extract_visible_text(html).unwrap();
        assert!(text.contains("Headline"));
        assert!(text.contains("First paragraph."));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Page Title </title></head><body></body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Page Title"));
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[tokio::test]
    async fn test_fetch_extracts_page_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>Full article body text.</p></body></html>"),
            )
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(2000);
        let article = fetcher
            .fetch(&search_result(format!("{}/article", server.uri())))
            .await;

        assert!(article.content.contains("Full article body text."));
        assert_eq!(article.title, "A story");
    }

    #[tokio::test]
    async fn test_fetch_derives_missing_title_from_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/titled"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>Page headline</title></head><body><p>Body.</p></body></html>",
            ))
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(2000);
        let mut result = search_result(format!("{}/titled", server.uri()));
        result.title = String::new();

        let article = fetcher.fetch(&result).await;
        assert_eq!(article.title, "Page headline");
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_to_snippet() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(2000);
        let article = fetcher
            .fetch(&search_result(format!("{}/gone", server.uri())))
            .await;

        assert_eq!(article.content, "provider snippet");
    }

    #[tokio::test]
    async fn test_fetch_truncates_to_excerpt_len() {
        let server = MockServer::start().await;
        let body = format!("<html><body><p>{}</p></body></html>", "word ".repeat(1000));
        Mock::given(method("GET"))
            .and(path("/long"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let fetcher = ArticleFetcher::new(100);
        let article = fetcher
            .fetch(&search_result(format!("{}/long", server.uri())))
            .await;

        assert!(article.content.chars().count() <= 100);
    }
}
