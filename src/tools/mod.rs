//! Tool system for the research agent
//!
//! This module provides the Tool trait, the ToolRegistry, and the two research
//! tools: web search and Wikipedia lookup.

mod registry;
mod tool;
pub mod web_search;
pub mod wikipedia;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolResult};
pub use web_search::WebSearchTool;
pub use wikipedia::WikipediaTool;

use anyhow::Result;

use crate::config::ToolsConfig;

/// Build the research tool registry for one question
///
/// Web search is left out when no search credential is configured.
pub fn research_tools(config: &ToolsConfig, search_max_results: u8) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    match config.tavily_api_key {
        Some(ref key) => registry.register(WebSearchTool::new(
            key.clone(),
            search_max_results,
            config.timeout,
        )?),
        None => tracing::warn!("Web search disabled: no search API key configured"),
    }

    registry.register(WikipediaTool::new(
        &config.wiki_lang,
        config.wiki_top_k,
        config.timeout,
    )?);

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(key: Option<&str>) -> ToolsConfig {
        ToolsConfig {
            tavily_api_key: key.map(String::from),
            wiki_top_k: 3,
            wiki_lang: "en".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_research_tools_with_search() {
        let registry = research_tools(&config(Some("tvly")), 5).unwrap();
        assert_eq!(registry.tool_names(), vec!["web_search", "wikipedia"]);
    }

    #[test]
    fn test_research_tools_without_search_key() {
        let registry = research_tools(&config(None), 5).unwrap();
        assert_eq!(registry.tool_names(), vec!["wikipedia"]);
    }
}
