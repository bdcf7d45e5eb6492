//! Prompt templates for the message-routing agent
//!
//! Templates use `format!()` interpolation so missing variables are
//! compile-time errors. All prompts are written in English; the desired
//! reply language is passed in where it matters.

use crate::models::{Article, SearchMode, SearchResult};

/// Build the strict one-word news/chat classification prompt.
///
/// The model must answer `news` or `chat` and nothing else; the caller
/// treats any answer starting with `news` as a news classification.
///
/// # Example
/// ```
/// use sova::llm::prompts::classification_prompt;
///
/// let prompt = classification_prompt("Latest Tesla news please");
/// assert!(prompt.contains("Tesla"));
/// assert!(prompt.contains("one word"));
/// ```
pub fn classification_prompt(text: &str) -> String {
    format!(
        r#"Classify the user request with STRICTLY one word:
news - the user asks for current news, analysis of recent events, or a media roundup;
chat - friendly conversation, a personal question, philosophical or everyday advice, a recipe, instructions, learning material, or any question that does NOT require looking at media coverage from the last few days.

Examples (-> answer):
"How are you?" -> chat
"Расскажи последние новости про Tesla" -> news
"How do I bake an apple pie?" -> chat
"What's new in the tech world?" -> news
"Привет!" -> chat
"Какие тренды на рынке нефти сейчас?" -> news

Return ONLY one word (news or chat). No extra text.

Request: {text}"#
    )
}

/// Yes/no prompt for whether a request needs a live web search.
pub fn search_need_prompt(text: &str) -> String {
    format!(
        "Does answering the following request correctly require a web search? \
         Answer with one word, 'yes' or 'no'. Request: {text}"
    )
}

/// Build the query-compression prompt for a given search mode.
pub fn rewrite_prompt(text: &str, mode: SearchMode) -> String {
    let mode_hint = match mode {
        SearchMode::News => "news search about the last few days",
        SearchMode::General => "precise factual lookup",
    };

    format!(
        "Rewrite the user request into a terse keyword query optimized for {mode_hint}.\n\
         Do not add extra words; drop filler and politeness words (tell me, please, etc).\n\
         Return only the query itself, without quotes.\n\n\
         Original: {text}"
    )
}

/// Ask the model to translate a query into English for search purposes.
pub fn translation_prompt(text: &str) -> String {
    format!(
        "Translate the following phrase into English so it can be used as a \
         search query. Return ONLY the translation, without quotes: {text}"
    )
}

/// Compose the digest prompt over fetched articles.
///
/// Excerpts are labeled `ARTICLE [i]` and the numbered source list uses the
/// same indices, so bracketed citations in the output can be resolved.
pub fn digest_prompt(query: &str, articles: &[Article], reply_language: &str) -> String {
    let content_block = articles
        .iter()
        .enumerate()
        .map(|(idx, article)| {
            format!(
                "ARTICLE [{}]:\nSource: {}\nDate: {}\nURL: {}\n{}\n",
                idx + 1,
                article.source.as_deref().unwrap_or(""),
                article.published.as_deref().unwrap_or(""),
                article.url,
                article.content,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let sources_block = source_list(articles);

    format!(
        r#"You are an experienced news analyst. Based on the articles below, write a detailed overview of the topic: "{query}".

Requirements:
1. Start with a thorough introductory overview (7-10 sentences).
2. Then list the key facts and events as a detailed bulleted list. For each fact include as many specifics as the articles provide: numbers, names, titles.
3. When describing each key fact or event, naturally work in WHO acted, WHAT exactly was done, and WHAT results or effects followed (with figures and dates when available), without splitting these into separate sections.
4. If the articles present diverging viewpoints, cover them separately, also in detail.
5. Cite sources as bracketed numbers, e.g. [2], using the numbers from the source list below.
6. The answer should be at least 300-400 words if the source material allows.

Write concretely, without invented facts.

===== ARTICLE CONTENT =====
{content_block}
===== END OF CONTENT =====

Source list (use these numbers for citations):
{sources_block}

Write the answer in {reply_language}."#
    )
}

/// Canonical numbered source list for a digest, appended verbatim after the
/// model output.
pub fn source_list(articles: &[Article]) -> String {
    articles
        .iter()
        .enumerate()
        .map(|(idx, article)| format!("[{}] {} — {}", idx + 1, article.title, article.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt the model to answer a question from search results only, with
/// bracketed index citations.
pub fn sourced_answer_prompt(
    query: &str,
    results: &[SearchResult],
    reply_language: &str,
) -> String {
    let sources_text = results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            format!(
                "[{}] {}\nURL: {}\n{}",
                idx + 1,
                result.title,
                result.url,
                result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an assistant that answers questions relying only on the provided sources.

User question: "{query}"

Sources:
{sources_text}

Formulate a brief, precise answer in {reply_language}, citing the numbers of the sources you used in square brackets."#
    )
}

/// Free-form news overview prompt used by the secondary news agent.
pub fn news_overview_prompt(
    query: &str,
    results: &[SearchResult],
    reply_language: &str,
) -> String {
    let news_text = results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            format!(
                "[{}] {} ({})\n{}",
                idx + 1,
                result.title,
                result.source.as_deref().unwrap_or("unknown source"),
                result.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Based on the following news items, produce a structured overview of the topic: "{query}"

Collected news:
{news_text}

Do the following:
1. A short summary of the main events and trends (5-7 sentences)
2. Key facts and details (as a bulleted list)
3. Differing viewpoints, if any are present
4. Reference the sources by their bracketed numbers

Format the answer as a clearly structured report with headings, in {reply_language}."#
    )
}
