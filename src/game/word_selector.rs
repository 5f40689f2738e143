//! Secret word selection via the LLM
//!
//! The model is asked for a single word; the reply is searched for the first
//! token that satisfies the length and alphabet rule. Failed attempts are
//! retried up to a fixed bound.

use regex::Regex;
use std::sync::Arc;

use super::state::{is_valid_secret, MAX_SECRET_LEN, MIN_SECRET_LEN};
use crate::config::GameConfig;
use crate::core::{AppError, AppResult};
use crate::llm::{LlmProvider, Message};

/// Sampling temperature for word selection
const SELECTION_TEMPERATURE: f32 = 0.8;
const DEFAULT_ATTEMPTS: u32 = 3;

const WORD_SELECTION_USER_PROMPT: &str = "Choose a secret word for hangman now. \
     Return only the word with no explanation, no quotes, and no punctuation.";

/// Characters stripped around a candidate token
const TOKEN_PUNCTUATION: &[char] = &[
    '"', '\'', '`', '.', ',', '!', '?', ':', ';', '(', ')', '[', ']', '{', '}', '*', '<', '>',
];

fn word_selection_system_prompt(min_len: usize, max_len: usize) -> String {
    format!(
        "You are selecting a secret word for a Hangman game.\n\
         Return ONLY a single lowercase English word a-z, {}-{} letters, no spaces, no punctuation.",
        min_len, max_len
    )
}

/// Picks secret words for new games
pub struct SecretWordSelector {
    llm: Arc<dyn LlmProvider>,
    pattern: Regex,
    min_len: usize,
    max_len: usize,
    max_attempts: u32,
    fallback_word: Option<String>,
}

impl SecretWordSelector {
    /// Create a selector with the default bounds (4 to 10 letters, 3 attempts)
    pub fn new(llm: Arc<dyn LlmProvider>) -> AppResult<Self> {
        Self::with_bounds(llm, MIN_SECRET_LEN, 10, DEFAULT_ATTEMPTS)
    }

    /// Create a selector with explicit length bounds and retry count
    pub fn with_bounds(
        llm: Arc<dyn LlmProvider>,
        min_len: usize,
        max_len: usize,
        max_attempts: u32,
    ) -> AppResult<Self> {
        if min_len < MIN_SECRET_LEN || max_len > MAX_SECRET_LEN || min_len > max_len {
            return Err(AppError::Config(format!(
                "secret length bounds {}..={} must lie within {}..={}",
                min_len, max_len, MIN_SECRET_LEN, MAX_SECRET_LEN
            )));
        }

        let pattern = Regex::new(&format!("^[a-z]{{{},{}}}$", min_len, max_len))
            .map_err(|e| AppError::Config(format!("invalid word pattern: {}", e)))?;

        Ok(Self {
            llm,
            pattern,
            min_len,
            max_len,
            max_attempts: max_attempts.max(1),
            fallback_word: None,
        })
    }

    /// Create a selector from the game configuration
    pub fn from_config(llm: Arc<dyn LlmProvider>, config: &GameConfig) -> AppResult<Self> {
        let selector =
            Self::with_bounds(llm, config.word_min_len, config.word_max_len, config.word_attempts)?;
        match config.fallback_word {
            Some(ref word) => selector.with_fallback_word(word.clone()),
            None => Ok(selector),
        }
    }

    /// Use `word` instead of failing when no valid word is obtained
    ///
    /// Off by default. The word must satisfy the same rule as selected words.
    pub fn with_fallback_word(mut self, word: impl Into<String>) -> AppResult<Self> {
        let word = word.into();
        if !self.pattern.is_match(&word) || !is_valid_secret(&word) {
            return Err(AppError::InvalidSecret(word));
        }
        self.fallback_word = Some(word);
        Ok(self)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pull a valid word out of a free-text reply
    ///
    /// The whole reply is tried first, then each whitespace-separated token in
    /// order, each stripped of surrounding quotes and punctuation.
    pub fn extract_word(&self, reply: &str) -> Option<String> {
        let whole = reply.trim().trim_matches(TOKEN_PUNCTUATION);
        if self.pattern.is_match(whole) {
            return Some(whole.to_string());
        }

        reply
            .split_whitespace()
            .map(|token| token.trim_matches(TOKEN_PUNCTUATION))
            .find(|token| self.pattern.is_match(token))
            .map(str::to_string)
    }

    /// Ask the model for a secret word, retrying up to the attempt bound
    pub async fn select(&self) -> AppResult<String> {
        let messages = [
            Message::system(word_selection_system_prompt(self.min_len, self.max_len)),
            Message::user(WORD_SELECTION_USER_PROMPT),
        ];

        for attempt in 1..=self.max_attempts {
            match self
                .llm
                .send_message(&messages, Some(SELECTION_TEMPERATURE))
                .await
            {
                Ok(reply) => {
                    if let Some(word) = self.extract_word(&reply) {
                        tracing::info!(
                            "Secret word selected on attempt {} ({} letters)",
                            attempt,
                            word.len()
                        );
                        return Ok(word);
                    }
                    tracing::warn!(
                        "Attempt {}/{}: no valid word in reply {:?}",
                        attempt,
                        self.max_attempts,
                        reply
                    );
                }
                Err(e) => {
                    let err = AppError::from_provider(self.llm.provider_name(), e);
                    tracing::warn!("Attempt {}/{}: {}", attempt, self.max_attempts, err);
                }
            }
        }

        if let Some(ref word) = self.fallback_word {
            tracing::warn!(
                "Word selection failed after {} attempts, using configured fallback word",
                self.max_attempts
            );
            return Ok(word.clone());
        }

        Err(AppError::WordSelectionFailure {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedProvider, ScriptedReply};

    fn selector(provider: ScriptedProvider) -> SecretWordSelector {
        SecretWordSelector::new(Arc::new(provider)).unwrap()
    }

    #[test]
    fn test_extract_word() {
        let s = selector(ScriptedProvider::with_texts(Vec::<String>::new()));
        assert_eq!(s.extract_word("planet"), Some("planet".to_string()));
        assert_eq!(s.extract_word("  \"garden\".\n"), Some("garden".to_string()));
        assert_eq!(s.extract_word("Sure: rocket!"), Some("rocket".to_string()));
        assert_eq!(s.extract_word("ok no"), None);
        assert_eq!(s.extract_word("APPLE"), None);
        assert_eq!(s.extract_word("extraordinary"), None);
        assert_eq!(s.extract_word(""), None);
    }

    #[tokio::test]
    async fn test_select_retries_until_valid() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            ScriptedReply::Respond(crate::llm::MessageResponse::text("Hmm!")),
            ScriptedReply::Fail("503 from upstream".to_string()),
            ScriptedReply::Respond(crate::llm::MessageResponse::text("castle")),
        ]));
        let s = SecretWordSelector::new(provider.clone()).unwrap();

        assert_eq!(s.select().await.unwrap(), "castle");
        assert_eq!(provider.call_count(), 3);

        let request = &provider.requests()[0];
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.temperature, Some(SELECTION_TEMPERATURE));
        assert!(request.tool_names.is_empty());
    }

    #[tokio::test]
    async fn test_select_fails_after_bound() {
        let provider = Arc::new(ScriptedProvider::with_texts(["no", "??", "NOPE", "later"]));
        let s = SecretWordSelector::new(provider.clone()).unwrap();

        let err = s.select().await.unwrap_err();
        assert!(matches!(err, AppError::WordSelectionFailure { attempts: 3 }));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_fallback_word_is_opt_in() {
        let provider = Arc::new(ScriptedProvider::with_texts(["?", "?", "?"]));
        let s = SecretWordSelector::new(provider)
            .unwrap()
            .with_fallback_word("hangman")
            .unwrap();
        assert_eq!(s.select().await.unwrap(), "hangman");
    }

    #[test]
    fn test_fallback_word_must_be_valid() {
        let s = selector(ScriptedProvider::with_texts(Vec::<String>::new()));
        assert!(matches!(
            s.with_fallback_word("Nope"),
            Err(AppError::InvalidSecret(_))
        ));
    }

    #[test]
    fn test_bounds_validated() {
        let provider: Arc<dyn LlmProvider> = Arc::new(ScriptedProvider::with_texts(["x"]));
        assert!(SecretWordSelector::with_bounds(provider.clone(), 3, 10, 3).is_err());
        assert!(SecretWordSelector::with_bounds(provider.clone(), 5, 13, 3).is_err());
        assert!(SecretWordSelector::with_bounds(provider.clone(), 8, 6, 3).is_err());

        let s = SecretWordSelector::with_bounds(provider, 5, 12, 0).unwrap();
        assert_eq!(s.max_attempts(), 1);
        assert!(s.extract_word("four").is_none());
        assert_eq!(s.extract_word("twelveletter"), Some("twelveletter".to_string()));
    }
}
