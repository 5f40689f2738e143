//! Testing utilities
//!
//! `ScriptedProvider` replays canned responses so the word selector, the agent
//! loop and the session can be exercised without network access.

use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::llm::{LlmProvider, Message, MessageResponse, ToolDefinition};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// Return this response
    Respond(MessageResponse),
    /// Fail the call with this message
    Fail(String),
}

/// A request the provider received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
    pub temperature: Option<f32>,
}

/// A provider that returns scripted replies in order
///
/// When the script runs out it either repeats the last reply (`repeat_last`)
/// or fails the call.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<ScriptedReply>>,
    last: Mutex<Option<ScriptedReply>>,
    repeat_last: bool,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    /// Create a provider with scripted replies
    pub fn new(replies: Vec<ScriptedReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            repeat_last: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider that answers with plain text replies
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            texts
                .into_iter()
                .map(|t| ScriptedReply::Respond(MessageResponse::text(t)))
                .collect(),
        )
    }

    /// Keep returning the final reply once the script is exhausted
    pub fn repeat_last(mut self) -> Self {
        self.repeat_last = true;
        self
    }

    /// Number of calls received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Every request received, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn next_reply(&self) -> Option<ScriptedReply> {
        let mut replies = self.replies.lock().ok()?;
        let mut last = self.last.lock().ok()?;
        match replies.pop_front() {
            Some(reply) => {
                *last = Some(reply.clone());
                Some(reply)
            }
            None if self.repeat_last => last.clone(),
            None => None,
        }
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn send_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        temperature: Option<f32>,
    ) -> Result<MessageResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                messages: messages.to_vec(),
                tool_names: tools.iter().map(|t| t.name.clone()).collect(),
                temperature,
            });
        }

        match self.next_reply() {
            Some(ScriptedReply::Respond(response)) => Ok(response),
            Some(ScriptedReply::Fail(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("scripted provider has no replies left"),
        }
    }

    fn model(&self) -> String {
        "scripted".to_string()
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}
