//! Hangsearch: an LLM-backed Hangman game and a tool-augmented research agent
//!
//! - `game`: Hangman state machine and LLM secret-word selection
//! - `agent`: bounded agent loop over web search and Wikipedia tools
//! - `citations`: source URL extraction from answers
//! - `session`: per-player state the terminal front end drives

pub mod agent;
pub mod citations;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod core;
pub mod game;
pub mod llm;
pub mod logging;
pub mod session;
pub mod testing;
pub mod tools;

pub use agent::{AgentRun, ResearchAgent};
pub use citations::extract_urls;
pub use config::AppConfig;
pub use conversation::Conversation;
pub use crate::core::{AppError, AppResult};
pub use game::{GameState, GameStatus, SecretWordSelector};
pub use session::{Answer, ConversationMode, Session};
