//! Encyclopedia lookup tool using the MediaWiki API
//!
//! Searches Wikipedia for matching page titles, then returns the plain-text
//! introduction of the top pages.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::tool::{Tool, ToolResult};
use crate::llm::{define_tool, ToolDefinition};

/// Queries longer than this are cut before searching
const MAX_QUERY_LENGTH: usize = 300;
/// Cap on the combined summary text
const MAX_OUTPUT_LENGTH: usize = 4000;
const USER_AGENT: &str = concat!("hangsearch/", env!("CARGO_PKG_VERSION"));

pub const WIKIPEDIA_TOOL: &str = "wikipedia";
pub const NO_RESULT_MESSAGE: &str = "No good Wikipedia Search Result was found";

/// Wikipedia lookup tool
pub struct WikipediaTool {
    api_url: String,
    top_k: usize,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WikipediaInput {
    query: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: Vec<ExtractPage>,
}

#[derive(Debug, Deserialize)]
struct ExtractPage {
    title: String,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

/// A page title with its summary
#[derive(Debug, Clone, PartialEq)]
pub struct PageSummary {
    pub title: String,
    pub summary: String,
}

impl WikipediaTool {
    /// Create a lookup tool for `<lang>.wikipedia.org` returning up to `top_k` pages
    pub fn new(lang: &str, top_k: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_url: format!("https://{}.wikipedia.org/w/api.php", lang),
            top_k: top_k.max(1),
            client,
        })
    }

    /// Use a different MediaWiki API endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn search_titles(&self, query: &str) -> Result<Vec<String>> {
        let limit = self.top_k.to_string();
        let response: SearchResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", limit.as_str()),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .context("Failed to send Wikipedia search request")?
            .error_for_status()
            .context("Wikipedia search returned an error status")?
            .json()
            .await
            .context("Failed to parse Wikipedia search response")?;

        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).collect())
            .unwrap_or_default())
    }

    async fn fetch_summary(&self, title: &str) -> Result<Option<PageSummary>> {
        let response: ExtractResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
                ("formatversion", "2"),
            ])
            .send()
            .await
            .context("Failed to send Wikipedia extract request")?
            .error_for_status()
            .context("Wikipedia extract returned an error status")?
            .json()
            .await
            .context("Failed to parse Wikipedia extract response")?;

        let page = response
            .query
            .and_then(|q| q.pages.into_iter().find(|p| !p.missing));

        Ok(page.and_then(|p| {
            let summary = p.extract.unwrap_or_default().trim().to_string();
            if summary.is_empty() {
                None
            } else {
                Some(PageSummary {
                    title: p.title,
                    summary,
                })
            }
        }))
    }

    /// Look up a query and return formatted page summaries
    pub async fn lookup(&self, query: &str) -> Result<String> {
        let query: String = query.chars().take(MAX_QUERY_LENGTH).collect();
        tracing::info!("Looking up Wikipedia: {}", query);

        let titles = self.search_titles(&query).await?;
        let mut pages = Vec::new();
        let mut first_error = None;
        for title in titles.iter().take(self.top_k) {
            match self.fetch_summary(title).await {
                Ok(Some(page)) => pages.push(page),
                Ok(None) => tracing::debug!("No extract for page: {}", title),
                Err(e) => {
                    tracing::warn!("Failed to fetch summary for {}: {:#}", title, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        // Matching pages exist but none could be read: report the failure
        if pages.is_empty() {
            if let Some(e) = first_error {
                return Err(e.context(format!("no summary could be fetched for '{}'", query)));
            }
        }

        tracing::debug!("Wikipedia lookup completed: {} pages", pages.len());
        Ok(format_summaries(&pages))
    }
}

/// Join summaries as `Page:`/`Summary:` blocks, capped in total length
pub fn format_summaries(pages: &[PageSummary]) -> String {
    if pages.is_empty() {
        return NO_RESULT_MESSAGE.to_string();
    }

    let joined = pages
        .iter()
        .map(|p| format!("Page: {}\nSummary: {}", p.title, p.summary))
        .collect::<Vec<_>>()
        .join("\n\n");

    joined.chars().take(MAX_OUTPUT_LENGTH).collect()
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        WIKIPEDIA_TOOL
    }

    fn description(&self) -> &str {
        "Look up general background and stable reference information on Wikipedia."
    }

    fn definition(&self) -> ToolDefinition {
        define_tool(
            WIKIPEDIA_TOOL,
            self.description(),
            json!({
                "query": {
                    "type": "string",
                    "description": "Topic or page title to look up"
                }
            }),
            vec!["query".to_string()],
        )
    }

    async fn execute(&self, input: &Value) -> Result<ToolResult> {
        let wiki_input: WikipediaInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(ToolResult::error(format!("Invalid wikipedia input: {}", e))),
        };

        let query = wiki_input.query.trim();
        if query.is_empty() {
            return Ok(ToolResult::error("The 'query' parameter must not be empty"));
        }

        let output = self.lookup(query).await?;
        Ok(ToolResult::success(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summaries() {
        let pages = vec![
            PageSummary {
                title: "Tim Berners-Lee".to_string(),
                summary: "English computer scientist.".to_string(),
            },
            PageSummary {
                title: "World Wide Web".to_string(),
                summary: "Information system.".to_string(),
            },
        ];
        assert_eq!(
            format_summaries(&pages),
            "Page: Tim Berners-Lee\nSummary: English computer scientist.\n\n\
             Page: World Wide Web\nSummary: Information system."
        );
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_summaries(&[]), NO_RESULT_MESSAGE);
    }

    #[test]
    fn test_format_caps_length() {
        let pages = vec![PageSummary {
            title: "Long".to_string(),
            summary: "x".repeat(10_000),
        }];
        assert_eq!(format_summaries(&pages).chars().count(), MAX_OUTPUT_LENGTH);
    }

    #[test]
    fn test_parse_extract_response() {
        let raw = json!({
            "batchcomplete": true,
            "query": { "pages": [
                { "ns": 0, "title": "Missing", "missing": true },
                { "pageid": 1, "ns": 0, "title": "Rust", "extract": "A language." }
            ]}
        });
        let parsed: ExtractResponse = serde_json::from_value(raw).unwrap();
        let pages = parsed.query.unwrap().pages;
        assert!(pages[0].missing);
        assert_eq!(pages[1].extract.as_deref(), Some("A language."));
    }

    #[test]
    fn test_api_url_uses_language() {
        let tool = WikipediaTool::new("de", 3, Duration::from_secs(5)).unwrap();
        assert_eq!(tool.api_url, "https://de.wikipedia.org/w/api.php");
    }

    #[tokio::test]
    async fn test_invalid_input_is_error_result() {
        let tool = WikipediaTool::new("en", 3, Duration::from_secs(5)).unwrap();
        let result = tool.execute(&json!({ "topic": 5 })).await.unwrap();
        assert!(result.is_error);
    }
}
