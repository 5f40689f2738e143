//! Agent loop with tool calling support
//!
//! The loop alternates between two states until the model answers:
//! - Agent: send the conversation to the model
//! - ToolExecution: run every tool call the model requested
//!
//! A response without tool calls ends the loop. The number of model round
//! trips is bounded so a model that keeps requesting tools cannot spin forever.

use futures::future::join_all;
use std::sync::Arc;

use super::system_prompt::default_system_prompt;
use crate::conversation::Conversation;
use crate::core::{AppError, AppResult};
use crate::llm::{LlmProvider, Message, Role, ToolCall};
use crate::tools::ToolRegistry;

/// Default bound on model round trips per question
pub const DEFAULT_MAX_ITERATIONS: usize = 8;
/// Characters of message content kept in a trace step
const TRACE_PREVIEW_CHARS: usize = 220;

/// Loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Agent,
    ToolExecution,
    Done,
}

/// One message added during a run, condensed for display
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub role: Role,
    pub preview: String,
    pub is_error: bool,
}

impl TraceStep {
    fn from_message(message: &Message) -> Self {
        let mut text = message.content.clone();
        for call in &message.tool_calls {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&format!("-> {}({})", call.name, call.input));
        }

        let mut preview: String = text.chars().take(TRACE_PREVIEW_CHARS).collect();
        if text.chars().count() > TRACE_PREVIEW_CHARS {
            preview.push_str("...");
        }

        Self {
            role: message.role,
            preview,
            is_error: message.is_error,
        }
    }
}

/// Outcome of one completed run
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Content of the final assistant message
    pub answer: String,
    /// Messages appended during the run, in order
    pub transcript: Vec<Message>,
    /// Times the model was called
    pub agent_visits: usize,
    /// Times pending tool calls were executed
    pub tool_visits: usize,
}

impl AgentRun {
    /// Condensed view of the transcript
    pub fn trace(&self) -> Vec<TraceStep> {
        self.transcript.iter().map(TraceStep::from_message).collect()
    }

    /// Every tool call the model made during the run
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.transcript.iter().flat_map(|m| m.tool_calls.iter())
    }
}

/// Research agent: a model plus the tools it may call
pub struct ResearchAgent {
    llm: Arc<dyn LlmProvider>,
    tools: ToolRegistry,
    system_prompt: String,
    max_iterations: usize,
    temperature: Option<f32>,
}

impl ResearchAgent {
    /// Create an agent with the default system prompt and iteration bound
    pub fn new(llm: Arc<dyn LlmProvider>, tools: ToolRegistry) -> Self {
        tracing::info!(
            "Creating research agent (model: {}, tools: {:?})",
            llm.model(),
            tools.tool_names()
        );
        Self {
            llm,
            tools,
            system_prompt: default_system_prompt().to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Bound the number of model round trips (at least one)
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// A fresh conversation seeded with this agent's system prompt
    pub fn new_conversation(&self) -> Conversation {
        Conversation::new(self.system_prompt.clone())
    }

    /// Answer a single question in a fresh conversation
    pub async fn ask(&self, question: &str) -> AppResult<AgentRun> {
        let mut conversation = Conversation::with_question(self.system_prompt.clone(), question);
        self.run(&mut conversation).await
    }

    /// Run the loop on a conversation that ends with a user question
    ///
    /// Every message produced along the way is appended to `conversation`.
    pub async fn run(&self, conversation: &mut Conversation) -> AppResult<AgentRun> {
        if !conversation.has_user_message() {
            return Err(AppError::Conversation(
                "the conversation has no question to answer".to_string(),
            ));
        }

        tracing::info!("Starting agent loop for conversation {}", conversation.id());

        let start = conversation.len();
        let definitions = self.tools.get_definitions();
        let mut state = AgentState::Agent;
        let mut pending: Vec<ToolCall> = Vec::new();
        let mut answer = String::new();
        let mut agent_visits = 0;
        let mut tool_visits = 0;

        loop {
            match state {
                AgentState::Agent => {
                    if agent_visits == self.max_iterations {
                        tracing::warn!(
                            "Maximum agent iterations ({}) reached without a final answer",
                            self.max_iterations
                        );
                        return Err(AppError::AgentLoopExceeded(self.max_iterations));
                    }
                    agent_visits += 1;

                    let response = self
                        .llm
                        .send_with_tools(conversation.messages(), &definitions, self.temperature)
                        .await
                        .map_err(|e| AppError::from_provider(self.llm.provider_name(), e))?;

                    let message = response.into_message();
                    if message.has_tool_calls() {
                        tracing::info!(
                            "Iteration {}: model requested {} tool call(s)",
                            agent_visits,
                            message.tool_calls.len()
                        );
                        pending = message.tool_calls.clone();
                        state = AgentState::ToolExecution;
                    } else {
                        tracing::info!("Iteration {}: final answer produced", agent_visits);
                        answer = message.content.clone();
                        state = AgentState::Done;
                    }
                    conversation.push(message)?;
                }
                AgentState::ToolExecution => {
                    tool_visits += 1;
                    for result in self.execute_tool_calls(&pending).await {
                        conversation.push(result)?;
                    }
                    pending.clear();
                    state = AgentState::Agent;
                }
                AgentState::Done => break,
            }
        }

        Ok(AgentRun {
            answer,
            transcript: conversation.since(start).to_vec(),
            agent_visits,
            tool_visits,
        })
    }

    /// Run all calls concurrently; results come back in request order
    async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Vec<Message> {
        join_all(calls.iter().map(|call| async move {
            tracing::info!("Tool use requested: {} ({})", call.name, call.id);
            let result = self.tools.execute(&call.name, &call.input).await;
            Message::tool_result(call.id.clone(), result.output, result.is_error)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageResponse;
    use crate::testing::{ScriptedProvider, ScriptedReply};
    use serde_json::json;

    #[test]
    fn test_trace_step_preview() {
        let message = Message::assistant_with_tool_calls(
            "",
            vec![ToolCall::new("c1", "wikipedia", json!({ "query": "Rust" }))],
        );
        let step = TraceStep::from_message(&message);
        assert_eq!(step.role, Role::Assistant);
        assert_eq!(step.preview, r#"-> wikipedia({"query":"Rust"})"#);

        let long = Message::assistant("x".repeat(500));
        let step = TraceStep::from_message(&long);
        assert_eq!(step.preview.chars().count(), TRACE_PREVIEW_CHARS + 3);
    }

    #[tokio::test]
    async fn test_direct_answer_needs_one_visit() {
        let provider = Arc::new(ScriptedProvider::with_texts(["Paris (https://en.wikipedia.org/wiki/Paris)"]));
        let agent = ResearchAgent::new(provider.clone(), ToolRegistry::new()).with_temperature(0.2);

        let run = agent.ask("Capital of France?").await.unwrap();
        assert_eq!(run.agent_visits, 1);
        assert_eq!(run.tool_visits, 0);
        assert!(run.answer.starts_with("Paris"));
        assert_eq!(run.transcript.len(), 1);

        let request = &provider.requests()[0];
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.temperature, Some(0.2));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let provider = Arc::new(ScriptedProvider::new(vec![ScriptedReply::Fail(
            "OpenAI API error (500)".to_string(),
        )]));
        let agent = ResearchAgent::new(provider, ToolRegistry::new());

        match agent.ask("hello?").await {
            Err(AppError::Provider { service, .. }) => assert_eq!(service, "scripted"),
            other => panic!("Expected provider error, got {:?}", other.map(|r| r.answer)),
        }
    }

    #[tokio::test]
    async fn test_requires_question() {
        let provider = Arc::new(ScriptedProvider::with_texts(["unused"]));
        let agent = ResearchAgent::new(provider.clone(), ToolRegistry::new());

        let mut conversation = agent.new_conversation();
        assert!(matches!(
            agent.run(&mut conversation).await,
            Err(AppError::Conversation(_))
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_fed_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedReply::Respond(MessageResponse::tool_calls(
                "",
                vec![ToolCall::new("c1", "calculator", json!({ "expr": "1+1" }))],
            )),
            ScriptedReply::Respond(MessageResponse::text("Sorry, I cannot calculate.")),
        ]));
        let agent = ResearchAgent::new(provider, ToolRegistry::new());

        let run = agent.ask("1+1?").await.unwrap();
        assert_eq!(run.answer, "Sorry, I cannot calculate.");
        let tool_message = &run.transcript[1];
        assert_eq!(tool_message.role, Role::Tool);
        assert!(tool_message.is_error);
        assert!(tool_message.content.contains("Unknown tool: calculator"));
        assert_eq!(run.tool_calls().count(), 1);
    }

    #[test]
    fn test_max_iterations_at_least_one() {
        let provider = Arc::new(ScriptedProvider::with_texts(["x"]));
        let agent = ResearchAgent::new(provider, ToolRegistry::new()).with_max_iterations(0);
        assert_eq!(agent.max_iterations(), 1);
    }
}
