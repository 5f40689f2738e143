//! OpenAI API client
//!
//! This module provides a direct HTTP client for the OpenAI Chat Completions API,
//! translating between the crate's message types and the OpenAI wire format.
//!
//! # Authentication
//!
//! Uses an OpenAI API key (`OPENAI_API_KEY`, or passed directly).
//!
//! ```ignore
//! // From loaded configuration
//! let llm = OpenAiProvider::from_config(&config.llm)?;
//!
//! // With explicit API key
//! let llm = OpenAiProvider::new("sk-...")?.with_model("gpt-4o-mini");
//! ```

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::provider::LlmProvider;
use super::types::{Message, MessageResponse, Role, StopReason, ToolCall, ToolDefinition, Usage};
use crate::config::{LlmConfig, OPENAI_API_KEY};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// OpenAI-specific request/response types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiToolCall {
    id: String,
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    arguments: String, // JSON string
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: OpenAiFunctionDefinition,
}

#[derive(Debug, Serialize)]
struct OpenAiFunctionDefinition {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameters: Option<Value>,
}

// Response types

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    id: String,
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

// ============================================================================
// OpenAiProvider
// ============================================================================

/// OpenAI LLM provider
///
/// All internal types are provider-neutral; translation happens at the boundary.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    api_base: String,
}

impl OpenAiProvider {
    /// Create a provider from the loaded configuration
    ///
    /// Fails when the API key is absent; callers decide whether that is fatal.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        tracing::info!("Creating OpenAI provider from configuration");

        let api_key = config
            .api_key
            .clone()
            .with_context(|| format!("{} environment variable not set", OPENAI_API_KEY))?;

        tracing::info!("Using model: {}", config.model);
        tracing::info!("Max tokens: {}", config.max_tokens);
        if let Some(ref url) = config.base_url {
            tracing::info!("Using custom base URL: {}", url);
        }

        Ok(Self {
            client: build_client(config.timeout)?,
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_base: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    /// Create a new OpenAI provider with a specific API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(DEFAULT_TIMEOUT)?,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1024,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Set the model to use
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the max tokens for responses
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Point the provider at an OpenAI-compatible endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base = base_url.into();
        self
    }

    /// Reasoning models (o-series, gpt-5.x) take max_completion_tokens and no temperature
    fn is_reasoning_model(&self) -> bool {
        self.model.starts_with("o1")
            || self.model.starts_with("o3")
            || self.model.starts_with("o4")
            || self.model.starts_with("gpt-5")
    }

    // ========================================================================
    // Format conversion: Internal -> OpenAI
    // ========================================================================

    /// Convert internal messages to OpenAI format
    fn convert_messages(&self, messages: &[Message]) -> Vec<OpenAiMessage> {
        messages
            .iter()
            .map(|msg| match msg.role {
                Role::Assistant => OpenAiMessage {
                    role: "assistant".to_string(),
                    content: if msg.content.is_empty() {
                        None
                    } else {
                        Some(msg.content.clone())
                    },
                    tool_calls: if msg.tool_calls.is_empty() {
                        None
                    } else {
                        Some(msg.tool_calls.iter().map(convert_tool_call).collect())
                    },
                    tool_call_id: None,
                },
                Role::Tool => {
                    // Tool results are separate messages with role "tool"
                    let content = if msg.is_error && !msg.content.starts_with("Error:") {
                        format!("Error: {}", msg.content)
                    } else {
                        msg.content.clone()
                    };
                    OpenAiMessage {
                        role: "tool".to_string(),
                        content: Some(content),
                        tool_calls: None,
                        tool_call_id: msg.tool_call_id.clone(),
                    }
                }
                Role::System | Role::User => OpenAiMessage {
                    role: msg.role.as_str().to_string(),
                    content: Some(msg.content.clone()),
                    tool_calls: None,
                    tool_call_id: None,
                },
            })
            .collect()
    }

    /// Convert internal tool definitions to OpenAI format
    fn convert_tools(&self, tools: &[ToolDefinition]) -> Option<Vec<OpenAiTool>> {
        if tools.is_empty() {
            return None;
        }

        let openai_tools = tools
            .iter()
            .map(|tool| {
                let mut params = serde_json::json!({
                    "type": tool.input_schema.schema_type,
                    "properties": tool.input_schema.properties.clone().unwrap_or_else(|| serde_json::json!({})),
                });
                if let Some(ref req) = tool.input_schema.required {
                    params["required"] = serde_json::json!(req);
                }

                OpenAiTool {
                    tool_type: "function".to_string(),
                    function: OpenAiFunctionDefinition {
                        name: tool.name.clone(),
                        description: tool.description.clone(),
                        parameters: Some(params),
                    },
                }
            })
            .collect();

        Some(openai_tools)
    }

    // ========================================================================
    // Format conversion: OpenAI -> Internal
    // ========================================================================

    /// Convert OpenAI response to internal MessageResponse format
    fn convert_response(&self, openai_resp: OpenAiResponse) -> Result<MessageResponse> {
        let choice = openai_resp
            .choices
            .into_iter()
            .next()
            .context("No choices in OpenAI response")?;

        let stop_reason = choice.finish_reason.as_deref().map(|r| match r {
            "stop" => StopReason::EndTurn,
            "length" => StopReason::MaxTokens,
            "tool_calls" => StopReason::ToolUse,
            "content_filter" => StopReason::Refusal,
            _ => StopReason::EndTurn,
        });

        let usage = openai_resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                // Arguments are passed through; unparseable JSON is kept as a string
                let input: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or(Value::String(call.function.arguments));
                ToolCall::new(call.id, call.function.name, input)
            })
            .collect();

        Ok(MessageResponse {
            id: openai_resp.id,
            model: openai_resp.model,
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            stop_reason,
            usage,
        })
    }

    // ========================================================================
    // API methods
    // ========================================================================

    /// Build an OpenAiRequest from internal types
    fn build_request(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        temperature: Option<f32>,
    ) -> OpenAiRequest {
        let openai_tools = self.convert_tools(tools);
        let tool_choice = openai_tools.as_ref().map(|_| "auto".to_string());

        let (max_tokens, max_completion_tokens, temperature) = if self.is_reasoning_model() {
            (None, Some(self.max_tokens), None)
        } else {
            (Some(self.max_tokens), None, temperature)
        };

        OpenAiRequest {
            model: self.model.clone(),
            messages: self.convert_messages(messages),
            max_tokens,
            max_completion_tokens,
            temperature,
            tools: openai_tools,
            tool_choice,
        }
    }

    /// Send a non-streaming request to the OpenAI API
    async fn send_openai_request(&self, request: &OpenAiRequest) -> Result<OpenAiResponse> {
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));

        let request_json =
            serde_json::to_string(request).context("Failed to serialize OpenAI request")?;
        tracing::debug!("[OpenAI] Request JSON: {}", request_json);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .body(request_json)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read OpenAI response body")?;

        tracing::debug!("[OpenAI] Response status: {}", status);
        tracing::debug!("[OpenAI] Response body: {}", response_text);

        if !status.is_success() {
            tracing::error!("[OpenAI] API error: {} - {}", status, response_text);
            anyhow::bail!("OpenAI API error ({}): {}", status, response_text);
        }

        serde_json::from_str(&response_text).context("Failed to parse OpenAI API response")
    }
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

fn convert_tool_call(call: &ToolCall) -> OpenAiToolCall {
    let arguments = match &call.input {
        Value::String(raw) => raw.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| "{}".to_string()),
    };
    OpenAiToolCall {
        id: call.id.clone(),
        tool_type: "function".to_string(),
        function: OpenAiFunctionCall {
            name: call.name.clone(),
            arguments,
        },
    }
}

// ============================================================================
// LlmProvider implementation
// ============================================================================

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn send_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        temperature: Option<f32>,
    ) -> Result<MessageResponse> {
        tracing::info!("[OpenAI] Sending message with tools");
        tracing::debug!("[OpenAI] Messages count: {}", messages.len());
        tracing::debug!("[OpenAI] Tools count: {}", tools.len());

        let request = self.build_request(messages, tools, temperature);
        let openai_response = self.send_openai_request(&request).await?;
        let response = self.convert_response(openai_response)?;

        tracing::info!(
            "[OpenAI] Response: {} tool call(s), stop_reason: {:?}, tokens in/out: {}/{}",
            response.tool_calls.len(),
            response.stop_reason,
            response.usage.input_tokens,
            response.usage.output_tokens
        );
        Ok(response)
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}
