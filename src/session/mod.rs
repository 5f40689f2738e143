//! Interactive session state
//!
//! A `Session` owns everything private to one player: the current game, the
//! research conversation (in continuous mode) and the adjustable settings.
//! The front end calls one operation per user action and re-renders from the
//! resulting state.

use std::sync::Arc;

use crate::agent::{AgentRun, ResearchAgent};
use crate::citations::extract_urls;
use crate::config::{
    clamp_search_results, clamp_temperature, AppConfig, GameConfig, ToolsConfig, OPENAI_API_KEY,
};
use crate::conversation::Conversation;
use crate::core::{AppError, AppResult};
use crate::game::{GameState, GuessOutcome, SecretWordSelector};
use crate::llm::LlmProvider;
use crate::tools::{research_tools, ToolRegistry};

/// How questions relate to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationMode {
    /// Every question starts a fresh conversation
    PerQuestion,
    /// Questions accumulate in one conversation
    Continuous,
}

/// Runtime knobs the player can adjust
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub temperature: f32,
    pub search_max_results: u8,
    pub show_trace: bool,
    pub mode: ConversationMode,
}

/// A rendered-ready answer
#[derive(Debug, Clone)]
pub struct Answer {
    pub run: AgentRun,
    pub citations: Vec<String>,
}

/// State private to one interactive session
pub struct Session {
    llm: Option<Arc<dyn LlmProvider>>,
    game_config: GameConfig,
    tools_config: ToolsConfig,
    max_iterations: usize,
    settings: Settings,
    game: Option<GameState>,
    conversation: Option<Conversation>,
    tools_override: Option<ToolRegistry>,
}

impl Session {
    /// Create a session; `llm` is `None` when no credential is configured
    pub fn new(config: &AppConfig, llm: Option<Arc<dyn LlmProvider>>) -> Self {
        Self {
            llm,
            game_config: config.game.clone(),
            tools_config: config.tools.clone(),
            max_iterations: config.agent.max_iterations,
            settings: Settings {
                temperature: config.agent.temperature,
                search_max_results: config.agent.search_max_results,
                show_trace: false,
                mode: ConversationMode::PerQuestion,
            },
            game: None,
            conversation: None,
            tools_override: None,
        }
    }

    /// Use a fixed tool registry instead of building one per question
    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools_override = Some(tools);
        self
    }

    fn llm(&self) -> AppResult<Arc<dyn LlmProvider>> {
        self.llm
            .clone()
            .ok_or(AppError::MissingCredential(OPENAI_API_KEY))
    }

    // ------------------------------------------------------------------
    // Game
    // ------------------------------------------------------------------

    /// Start a new game with an LLM-selected word
    ///
    /// On failure the previous game, if any, is kept.
    pub async fn new_game(&mut self) -> AppResult<&GameState> {
        let selector = SecretWordSelector::from_config(self.llm()?, &self.game_config)?;
        let secret = selector.select().await?;
        let game = GameState::new(secret, self.game_config.max_lives)?;
        tracing::info!("New game started ({} letters)", game.secret().len());
        let game = self.game.insert(game);
        Ok(&*game)
    }

    /// Apply a guess to the current game
    pub fn guess(&mut self, input: &str) -> AppResult<GuessOutcome> {
        let game = self.game.as_mut().ok_or_else(|| {
            AppError::InvalidGuess("no game in progress; start a new game first".to_string())
        })?;
        game.apply_guess(input)
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    // ------------------------------------------------------------------
    // Research
    // ------------------------------------------------------------------

    /// Answer a question with the research agent
    pub async fn ask(&mut self, question: &str) -> AppResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Conversation("the question is empty".to_string()));
        }

        let tools = match self.tools_override {
            Some(ref tools) => tools.clone(),
            None => research_tools(&self.tools_config, self.settings.search_max_results)
                .map_err(|e| AppError::Config(format!("{:#}", e)))?,
        };
        let agent = ResearchAgent::new(self.llm()?, tools)
            .with_max_iterations(self.max_iterations)
            .with_temperature(self.settings.temperature);

        let run = match self.settings.mode {
            ConversationMode::PerQuestion => agent.ask(question).await?,
            ConversationMode::Continuous => {
                let conversation = self
                    .conversation
                    .get_or_insert_with(|| agent.new_conversation());
                let before = conversation.len();
                conversation.push_user(question);
                match agent.run(conversation).await {
                    Ok(run) => run,
                    Err(e) => {
                        // Keep the conversation replayable after a failed question
                        conversation.truncate(before);
                        return Err(e);
                    }
                }
            }
        };

        let citations = extract_urls(&run.answer);
        Ok(Answer { run, citations })
    }

    /// Forget the accumulated research conversation
    pub fn reset_conversation(&mut self) {
        self.conversation = None;
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_temperature(&mut self, temperature: f32) -> f32 {
        self.settings.temperature = clamp_temperature(temperature);
        self.settings.temperature
    }

    pub fn set_search_max_results(&mut self, max_results: u8) -> u8 {
        self.settings.search_max_results = clamp_search_results(max_results);
        self.settings.search_max_results
    }

    pub fn set_show_trace(&mut self, show: bool) {
        self.settings.show_trace = show;
    }

    /// Switch conversation mode; leaving continuous mode drops the history
    pub fn set_mode(&mut self, mode: ConversationMode) {
        if mode == ConversationMode::PerQuestion {
            self.conversation = None;
        }
        self.settings.mode = mode;
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }
}
