//! Hangman: LLM-selected secret word and letter-guessing state machine

pub mod state;
pub mod word_selector;

pub use state::{
    is_valid_secret, GameState, GameStatus, GuessOutcome, DEFAULT_MAX_LIVES, MAX_SECRET_LEN,
    MIN_SECRET_LEN,
};
pub use word_selector::SecretWordSelector;
