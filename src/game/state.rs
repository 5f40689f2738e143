//! Hangman game state and guess transitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::core::{AppError, AppResult};

/// Shortest allowed secret word
pub const MIN_SECRET_LEN: usize = 4;
/// Longest allowed secret word
pub const MAX_SECRET_LEN: usize = 12;
/// Lives a new game starts with unless configured otherwise
pub const DEFAULT_MAX_LIVES: u32 = 6;

/// Where the game stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

/// What one accepted guess did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessOutcome {
    pub letter: char,
    pub hit: bool,
    pub status: GameStatus,
}

/// State of a single Hangman game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    secret: String,
    max_lives: u32,
    lives_remaining: u32,
    correct_letters: BTreeSet<char>,
    wrong_letters: BTreeSet<char>,
    revealed: Vec<Option<char>>,
    status: GameStatus,
    history: Vec<String>,
}

impl GameState {
    /// Start a game with the given secret
    ///
    /// The secret must be 4 to 12 lowercase ASCII letters.
    pub fn new(secret: impl Into<String>, max_lives: u32) -> AppResult<Self> {
        let secret = secret.into();
        if !is_valid_secret(&secret) || max_lives == 0 {
            return Err(AppError::InvalidSecret(secret));
        }

        let revealed = vec![None; secret.len()];
        let history = vec![format!(
            "New game started. Secret word is {} letters long.",
            secret.len()
        )];

        Ok(Self {
            secret,
            max_lives,
            lives_remaining: max_lives,
            correct_letters: BTreeSet::new(),
            wrong_letters: BTreeSet::new(),
            revealed,
            status: GameStatus::InProgress,
            history,
        })
    }

    /// Apply one guess
    ///
    /// Rejected input leaves the state untouched: `InvalidGuess` for malformed
    /// input or a finished game, `DuplicateGuess` for a letter already tried.
    pub fn apply_guess(&mut self, input: &str) -> AppResult<GuessOutcome> {
        if self.status.is_terminal() {
            return Err(AppError::InvalidGuess("the game is already over".to_string()));
        }

        let letter = parse_letter(input)?;
        if self.correct_letters.contains(&letter) || self.wrong_letters.contains(&letter) {
            return Err(AppError::DuplicateGuess(letter));
        }

        let upper = letter.to_ascii_uppercase();
        let hit = self.secret.contains(letter);
        if hit {
            self.correct_letters.insert(letter);
            for (slot, c) in self.revealed.iter_mut().zip(self.secret.chars()) {
                if c == letter {
                    *slot = Some(upper);
                }
            }
            self.history.push(format!("Correct: {}", upper));
        } else {
            self.wrong_letters.insert(letter);
            self.lives_remaining = self.lives_remaining.saturating_sub(1);
            self.history.push(format!("Wrong: {}", upper));
        }

        // Won is checked first: completing the word on the last life still wins
        if self.revealed.iter().all(Option::is_some) {
            self.status = GameStatus::Won;
            self.history.push("You solved the word!".to_string());
        } else if self.lives_remaining == 0 {
            self.status = GameStatus::Lost;
            self.history.push(format!(
                "Out of lives. The word was {}.",
                self.secret.to_ascii_uppercase()
            ));
        }

        tracing::debug!(
            "Guess {} ({}), lives {}/{}, status {:?}",
            upper,
            if hit { "hit" } else { "miss" },
            self.lives_remaining,
            self.max_lives,
            self.status
        );

        Ok(GuessOutcome {
            letter,
            hit,
            status: self.status,
        })
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    pub fn correct_letters(&self) -> &BTreeSet<char> {
        &self.correct_letters
    }

    /// Wrong letters in alphabetical order
    pub fn wrong_letters(&self) -> &BTreeSet<char> {
        &self.wrong_letters
    }

    pub fn revealed(&self) -> &[Option<char>] {
        &self.revealed
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    /// Game log, oldest entry first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Revealed word with `_` placeholders, e.g. `T _ _ _ _`
    pub fn masked_word(&self) -> String {
        self.revealed
            .iter()
            .map(|slot| slot.unwrap_or('_').to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One bar per remaining life
    pub fn lives_bar(&self) -> String {
        "|".repeat(self.lives_remaining as usize)
    }
}

/// Whether a word can be a secret
pub fn is_valid_secret(word: &str) -> bool {
    (MIN_SECRET_LEN..=MAX_SECRET_LEN).contains(&word.len())
        && word.chars().all(|c| c.is_ascii_lowercase())
}

fn parse_letter(input: &str) -> AppResult<char> {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_lowercase()),
        _ => Err(AppError::InvalidGuess(
            "please enter a single letter (A-Z)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(secret: &str) -> GameState {
        GameState::new(secret, DEFAULT_MAX_LIVES).unwrap()
    }

    #[test]
    fn test_new_game() {
        let g = game("train");
        assert_eq!(g.masked_word(), "_ _ _ _ _");
        assert_eq!(g.lives_remaining(), 6);
        assert_eq!(g.status(), GameStatus::InProgress);
        assert_eq!(g.history(), ["New game started. Secret word is 5 letters long."]);
    }

    #[test]
    fn test_rejects_bad_secrets() {
        for bad in ["abc", "Train", "thirteenchars", "tr4in", "", "trâin"] {
            assert!(
                matches!(GameState::new(bad, 6), Err(AppError::InvalidSecret(_))),
                "accepted {:?}",
                bad
            );
        }
        assert!(GameState::new("train", 0).is_err());
    }

    #[test]
    fn test_train_walkthrough() {
        let mut g = game("train");

        let outcome = g.apply_guess("t").unwrap();
        assert!(outcome.hit);
        assert_eq!(g.masked_word(), "T _ _ _ _");

        g.apply_guess("r").unwrap();
        g.apply_guess("a").unwrap();

        let outcome = g.apply_guess("z").unwrap();
        assert!(!outcome.hit);
        assert_eq!(g.lives_remaining(), 5);

        assert!(matches!(g.apply_guess("z"), Err(AppError::DuplicateGuess('z'))));
        assert_eq!(g.lives_remaining(), 5);

        g.apply_guess("q").unwrap();
        assert_eq!(g.lives_remaining(), 4);

        g.apply_guess("i").unwrap();
        let outcome = g.apply_guess("n").unwrap();
        assert_eq!(g.masked_word(), "T R A I N");
        assert_eq!(outcome.status, GameStatus::Won);
        assert_eq!(g.lives_remaining(), 4);
        assert_eq!(g.history().last().unwrap(), "You solved the word!");
    }

    #[test]
    fn test_reveals_every_position() {
        let mut g = game("banana");
        g.apply_guess("a").unwrap();
        assert_eq!(g.masked_word(), "_ A _ A _ A");
    }

    #[test]
    fn test_input_is_normalized() {
        let mut g = game("train");
        let outcome = g.apply_guess("  T ").unwrap();
        assert_eq!(outcome.letter, 't');
        assert!(g.correct_letters().contains(&'t'));
    }

    #[test]
    fn test_invalid_guesses_leave_state_untouched() {
        let mut g = game("train");
        for bad in ["", "ab", "1", "?", "é"] {
            assert!(matches!(g.apply_guess(bad), Err(AppError::InvalidGuess(_))));
        }
        assert_eq!(g.lives_remaining(), 6);
        assert_eq!(g.history().len(), 1);
    }

    #[test]
    fn test_lose_then_terminal() {
        let mut g = GameState::new("train", 2).unwrap();
        g.apply_guess("x").unwrap();
        let outcome = g.apply_guess("y").unwrap();
        assert_eq!(outcome.status, GameStatus::Lost);
        assert_eq!(g.lives_remaining(), 0);
        assert_eq!(g.history().last().unwrap(), "Out of lives. The word was TRAIN.");

        assert!(matches!(g.apply_guess("t"), Err(AppError::InvalidGuess(_))));
        assert_eq!(g.status(), GameStatus::Lost);
        assert!(g.correct_letters().is_empty());
    }

    #[test]
    fn test_won_with_one_life_left() {
        let mut g = GameState::new("abba", 1).unwrap();
        g.apply_guess("a").unwrap();
        let outcome = g.apply_guess("b").unwrap();
        assert_eq!(outcome.status, GameStatus::Won);
        assert_eq!(g.lives_remaining(), 1);
    }

    #[test]
    fn test_lives_bar_and_wrong_letters_sorted() {
        let mut g = game("train");
        g.apply_guess("z").unwrap();
        g.apply_guess("b").unwrap();
        assert_eq!(g.lives_bar(), "||||");
        assert_eq!(g.wrong_letters().iter().collect::<String>(), "bz");
    }
}
