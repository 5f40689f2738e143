//! Web search tool using the Tavily API
//!
//! Returns ranked result snippets with their URLs so the model can cite them.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use super::tool::{Tool, ToolResult};
use crate::config::clamp_search_results;
use crate::llm::{define_tool, ToolDefinition};

/// Tavily API endpoint for searching
const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
/// Maximum characters kept from one result snippet
const MAX_SNIPPET_LENGTH: usize = 800;

pub const WEB_SEARCH_TOOL: &str = "web_search";

/// Web search tool backed by Tavily
pub struct WebSearchTool {
    api_key: String,
    max_results: u8,
    endpoint: String,
    client: reqwest::Client,
}

/// Input for the web search tool
#[derive(Debug, Deserialize)]
struct WebSearchInput {
    query: String,
}

/// Tavily search request
#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    query: &'a str,
    max_results: u8,
    search_depth: &'static str,
}

/// Tavily search response
#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<TavilySearchResult>,
}

/// Individual search result from Tavily
#[derive(Debug, Deserialize)]
struct TavilySearchResult {
    title: Option<String>,
    url: String,
    #[serde(default)]
    content: Option<String>,
}

impl WebSearchTool {
    /// Create a web search tool
    ///
    /// `max_results` is clamped into 1..=10.
    pub fn new(api_key: impl Into<String>, max_results: u8, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.into(),
            max_results: clamp_search_results(max_results),
            endpoint: TAVILY_SEARCH_URL.to_string(),
            client,
        })
    }

    /// Use a different search endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn max_results(&self) -> u8 {
        self.max_results
    }

    /// Search the web and return formatted results
    async fn search(&self, query: &str) -> Result<String> {
        tracing::info!("Searching web: {} (max {} results)", query, self.max_results);

        let request_body = TavilySearchRequest {
            query,
            max_results: self.max_results,
            search_depth: "basic",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .context("Failed to send search request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Tavily API error ({}): {}", status, error_text);
        }

        let search_response: TavilySearchResponse = response
            .json()
            .await
            .context("Failed to parse search response")?;

        let output = format_results(query, &search_response.results);
        tracing::debug!("Search completed: {} results", search_response.results.len());
        Ok(output)
    }
}

fn format_results(query: &str, results: &[TavilySearchResult]) -> String {
    let mut output = format!("# Search Results for: {}\n\n", query);

    if results.is_empty() {
        output.push_str("No results found.\n");
        return output;
    }

    output.push_str(&format!("Found {} results:\n\n", results.len()));
    for (i, result) in results.iter().enumerate() {
        let title = result.title.as_deref().unwrap_or("No title");
        output.push_str(&format!("## {}. {}\n", i + 1, title));
        output.push_str(&format!("URL: {}\n", result.url));

        if let Some(content) = &result.content {
            let snippet: String = content.chars().take(MAX_SNIPPET_LENGTH).collect();
            output.push_str(&format!("\n{}\n", snippet.trim()));
        }
        output.push('\n');
    }
    output
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        WEB_SEARCH_TOOL
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date facts, news, or current names. Returns ranked results with URLs."
    }

    fn definition(&self) -> ToolDefinition {
        define_tool(
            WEB_SEARCH_TOOL,
            self.description(),
            json!({
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            }),
            vec!["query".to_string()],
        )
    }

    async fn execute(&self, input: &Value) -> Result<ToolResult> {
        let search_input: WebSearchInput = match serde_json::from_value(input.clone()) {
            Ok(parsed) => parsed,
            Err(e) => return Ok(ToolResult::error(format!("Invalid web search input: {}", e))),
        };

        if search_input.query.trim().is_empty() {
            return Ok(ToolResult::error("The 'query' parameter must not be empty"));
        }

        let output = self.search(search_input.query.trim()).await?;
        Ok(ToolResult::success(output))
    }
}
