//! LLM provider trait

use anyhow::Result;
use async_trait::async_trait;

use super::types::{Message, MessageResponse, ToolDefinition};

/// A chat model that can answer with text or tool calls
///
/// The conversation passed in already contains the system message, so
/// providers never add one of their own.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the conversation, optionally exposing tools to the model
    async fn send_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        temperature: Option<f32>,
    ) -> Result<MessageResponse>;

    /// Send the conversation without tools and return the reply text
    async fn send_message(&self, messages: &[Message], temperature: Option<f32>) -> Result<String> {
        let response = self.send_with_tools(messages, &[], temperature).await?;
        Ok(response.text)
    }

    /// Model identifier
    fn model(&self) -> String;

    /// Short provider name used in logs and errors
    fn provider_name(&self) -> &str;
}
