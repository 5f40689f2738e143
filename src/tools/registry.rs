//! Tool registry
//!
//! Holds the tools exposed to the model and runs calls by name.

use std::sync::Arc;

use serde_json::Value;

use super::tool::{Tool, ToolResult};
use crate::core::{error::is_timeout, AppError};
use crate::llm::ToolDefinition;

/// Registry of available tools, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        tracing::debug!("Registering tool: {}", tool.name());
        self.tools.retain(|t| t.name() != tool.name());
        self.tools.push(Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Definitions of every registered tool
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Execute a tool call
    ///
    /// Never fails: an unknown tool or a failing tool becomes an error result
    /// the model can read and recover from.
    pub async fn execute(&self, name: &str, input: &Value) -> ToolResult {
        let Some(tool) = self.get(name) else {
            tracing::warn!("Model requested unknown tool: {}", name);
            return ToolResult::error(format!("Unknown tool: {}", name));
        };

        match tool.execute(input).await {
            Ok(result) => {
                if result.is_error {
                    tracing::warn!("Tool {} returned an error: {}", name, result.output);
                }
                result
            }
            Err(e) => {
                let message = if is_timeout(&e) {
                    "request timed out".to_string()
                } else {
                    format!("{:#}", e)
                };
                let failure = AppError::ToolExecutionFailure {
                    tool: name.to_string(),
                    message,
                };
                tracing::warn!("{}", failure);
                ToolResult::error(failure.to_string())
            }
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
