//! Conversation history for the research agent
//!
//! A conversation always starts with exactly one system message.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{AppError, AppResult};
use crate::llm::{Message, Role};

/// Ordered message history of one research session or question
#[derive(Debug, Clone)]
pub struct Conversation {
    id: String,
    created_at: DateTime<Utc>,
    messages: Vec<Message>,
}

impl Conversation {
    /// Start a conversation with its system message
    pub fn new(system_prompt: impl Into<String>) -> Self {
        let conversation = Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            messages: vec![Message::system(system_prompt)],
        };
        tracing::debug!("Conversation created: {}", conversation.id);
        conversation
    }

    /// Start a conversation and ask its first question
    pub fn with_question(system_prompt: impl Into<String>, question: impl Into<String>) -> Self {
        let mut conversation = Self::new(system_prompt);
        conversation.messages.push(Message::user(question));
        conversation
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Messages from `index` onward
    pub fn since(&self, index: usize) -> &[Message] {
        &self.messages[index.min(self.messages.len())..]
    }

    /// Append a user message
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append any non-system message
    pub fn push(&mut self, message: Message) -> AppResult<()> {
        if message.role == Role::System {
            return Err(AppError::Conversation(
                "a conversation holds exactly one system message".to_string(),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Drop messages past `len`; the system message is always kept
    pub fn truncate(&mut self, len: usize) {
        self.messages.truncate(len.max(1));
    }

    /// Whether the conversation has at least one user message
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }
}
