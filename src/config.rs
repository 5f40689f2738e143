//! Runtime configuration
//!
//! Everything comes from the process environment, optionally seeded from a
//! `.env` file. Missing credentials are recorded as warnings rather than
//! failing startup; the actions that need them fail later with
//! `MissingCredential`.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::{AppError, AppResult};
use crate::game::{MAX_SECRET_LEN, MIN_SECRET_LEN};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const TAVILY_API_KEY: &str = "TAVILY_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_LIVES: u32 = 6;
const DEFAULT_WORD_ATTEMPTS: u32 = 3;
const DEFAULT_WORD_MIN_LEN: usize = 4;
const DEFAULT_WORD_MAX_LEN: usize = 10;
const DEFAULT_MAX_AGENT_ITERATIONS: usize = 8;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_SEARCH_RESULTS: u8 = 5;
const DEFAULT_WIKI_TOP_K: usize = 3;
const DEFAULT_WIKI_LANG: &str = "en";
const DEFAULT_LOG_DIR: &str = "logs";

/// Settings for the chat model
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Settings for the Hangman game
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub max_lives: u32,
    pub word_attempts: u32,
    pub word_min_len: usize,
    pub word_max_len: usize,
    /// Opt-in secret used when word selection fails
    pub fallback_word: Option<String>,
}

/// Settings for the research tools
#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub tavily_api_key: Option<String>,
    pub wiki_top_k: usize,
    pub wiki_lang: String,
    pub timeout: Duration,
}

/// Settings for the research agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_iterations: usize,
    pub temperature: f32,
    pub search_max_results: u8,
}

/// Full application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub game: GameConfig,
    pub tools: ToolsConfig,
    pub agent: AgentConfig,
    pub log_dir: PathBuf,
    /// Settings that were ignored or clamped while loading
    notices: Vec<String>,
}

impl AppConfig {
    /// Load `.env` (if present) and read the environment
    pub fn load() -> AppResult<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(AppError::Config(format!("failed to read .env: {}", e)));
            }
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut notices = Vec::new();

        let timeout = Duration::from_secs(parse_clamped(
            &read,
            &mut notices,
            "HANGSEARCH_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
            1,
            u64::MAX,
        ));

        let word_min_len = parse_clamped(
            &read,
            &mut notices,
            "HANGSEARCH_WORD_MIN_LEN",
            DEFAULT_WORD_MIN_LEN as u64,
            MIN_SECRET_LEN as u64,
            MAX_SECRET_LEN as u64,
        ) as usize;
        let word_max_len = parse_clamped(
            &read,
            &mut notices,
            "HANGSEARCH_WORD_MAX_LEN",
            DEFAULT_WORD_MAX_LEN as u64,
            MIN_SECRET_LEN as u64,
            MAX_SECRET_LEN as u64,
        ) as usize;
        if word_min_len > word_max_len {
            return Err(AppError::Config(format!(
                "word length bounds are inverted ({} > {})",
                word_min_len, word_max_len
            )));
        }

        let fallback_word = read("HANGSEARCH_FALLBACK_WORD")
            .map(|w| w.to_lowercase())
            .filter(|word| {
                let usable = (word_min_len..=word_max_len).contains(&word.len())
                    && word.chars().all(|c| c.is_ascii_lowercase());
                if !usable {
                    notices.push(format!(
                        "ignoring HANGSEARCH_FALLBACK_WORD={:?}: it must be {} to {} letters a-z",
                        word, word_min_len, word_max_len
                    ));
                }
                usable
            });

        let config = Self {
            llm: LlmConfig {
                api_key: read(OPENAI_API_KEY),
                model: read("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: read("OPENAI_BASE_URL"),
                max_tokens: parse_clamped(
                    &read,
                    &mut notices,
                    "OPENAI_MAX_TOKENS",
                    DEFAULT_MAX_TOKENS as u64,
                    1,
                    u32::MAX as u64,
                ) as u32,
                timeout,
            },
            game: GameConfig {
                max_lives: parse_clamped(
                    &read,
                    &mut notices,
                    "HANGSEARCH_MAX_LIVES",
                    DEFAULT_MAX_LIVES as u64,
                    1,
                    u32::MAX as u64,
                ) as u32,
                word_attempts: parse_clamped(
                    &read,
                    &mut notices,
                    "HANGSEARCH_WORD_ATTEMPTS",
                    DEFAULT_WORD_ATTEMPTS as u64,
                    1,
                    u32::MAX as u64,
                ) as u32,
                word_min_len,
                word_max_len,
                fallback_word,
            },
            tools: ToolsConfig {
                tavily_api_key: read(TAVILY_API_KEY),
                wiki_top_k: parse_clamped(
                    &read,
                    &mut notices,
                    "HANGSEARCH_WIKI_TOP_K",
                    DEFAULT_WIKI_TOP_K as u64,
                    1,
                    10,
                ) as usize,
                wiki_lang: read("HANGSEARCH_WIKI_LANG").unwrap_or_else(|| DEFAULT_WIKI_LANG.to_string()),
                timeout,
            },
            agent: AgentConfig {
                max_iterations: parse_clamped(
                    &read,
                    &mut notices,
                    "HANGSEARCH_MAX_AGENT_ITERATIONS",
                    DEFAULT_MAX_AGENT_ITERATIONS as u64,
                    1,
                    u32::MAX as u64,
                ) as usize,
                temperature: parse_temperature(&read, &mut notices),
                search_max_results: parse_clamped(
                    &read,
                    &mut notices,
                    "HANGSEARCH_SEARCH_RESULTS",
                    DEFAULT_SEARCH_RESULTS as u64,
                    1,
                    10,
                ) as u8,
            },
            log_dir: read("HANGSEARCH_LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            notices,
        };

        Ok(config)
    }

    /// Startup warnings: ignored or clamped settings, then missing credentials
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = self.notices.clone();
        if self.llm.api_key.is_none() {
            warnings.push(format!(
                "{} is not set: new games and questions will fail until it is provided",
                OPENAI_API_KEY
            ));
        }
        if self.tools.tavily_api_key.is_none() {
            warnings.push(format!(
                "{} is not set: web search is disabled, only Wikipedia will be used",
                TAVILY_API_KEY
            ));
        }
        warnings
    }
}

/// Clamp a sampling temperature into 0.0..=1.0
pub fn clamp_temperature(value: f32) -> f32 {
    if value.is_nan() {
        DEFAULT_TEMPERATURE
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a search result count into 1..=10
pub fn clamp_search_results(value: u8) -> u8 {
    value.clamp(1, 10)
}

/// Read an integer setting and clamp it into `min..=max`
///
/// Parsed as u64 so values beyond the field's own type still clamp. A
/// malformed value keeps the default; both cases are recorded in `notices`.
fn parse_clamped<F>(
    read: &F,
    notices: &mut Vec<String>,
    key: &str,
    default: u64,
    min: u64,
    max: u64,
) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = read(key) else {
        return default;
    };
    match raw.parse::<u64>() {
        Ok(value) => {
            let clamped = value.clamp(min, max);
            if clamped != value {
                notices.push(format!("{}={} is out of range, using {}", key, raw, clamped));
            }
            clamped
        }
        Err(e) => {
            notices.push(format!("ignoring {}={:?} ({}), using default {}", key, raw, e, default));
            default
        }
    }
}

fn parse_temperature<F>(read: &F, notices: &mut Vec<String>) -> f32
where
    F: Fn(&str) -> Option<String>,
{
    const KEY: &str = "HANGSEARCH_TEMPERATURE";
    let Some(raw) = read(KEY) else {
        return DEFAULT_TEMPERATURE;
    };
    match raw.parse::<f32>() {
        Ok(value) => {
            let clamped = clamp_temperature(value);
            if clamped != value {
                notices.push(format!("{}={} is out of range, using {}", KEY, raw, clamped));
            }
            clamped
        }
        Err(e) => {
            notices.push(format!(
                "ignoring {}={:?} ({}), using default {}",
                KEY, raw, e, DEFAULT_TEMPERATURE
            ));
            DEFAULT_TEMPERATURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.timeout, Duration::from_secs(30));
        assert_eq!(config.game.max_lives, 6);
        assert_eq!(config.game.word_attempts, 3);
        assert_eq!((config.game.word_min_len, config.game.word_max_len), (4, 10));
        assert!(config.game.fallback_word.is_none());
        assert_eq!(config.agent.max_iterations, 8);
        assert_eq!(config.agent.search_max_results, 5);
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn test_missing_credentials_are_warnings() {
        let config = config_from(&[]).unwrap();
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains(OPENAI_API_KEY));
        assert!(warnings[1].contains(TAVILY_API_KEY));

        let config = config_from(&[(OPENAI_API_KEY, "sk-test"), (TAVILY_API_KEY, "tvly")]).unwrap();
        assert!(config.warnings().is_empty());
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config = config_from(&[(OPENAI_API_KEY, "   ")]).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = config_from(&[
            ("HANGSEARCH_TEMPERATURE", "3.5"),
            ("HANGSEARCH_SEARCH_RESULTS", "40"),
            ("HANGSEARCH_WORD_MAX_LEN", "20"),
        ])
        .unwrap();
        assert_eq!(config.agent.temperature, 1.0);
        assert_eq!(config.agent.search_max_results, 10);
        assert_eq!(config.game.word_max_len, MAX_SECRET_LEN);
    }

    #[test]
    fn test_malformed_number_falls_back() {
        let config = config_from(&[("HANGSEARCH_MAX_LIVES", "lots")]).unwrap();
        assert_eq!(config.game.max_lives, 6);
    }

    #[test]
    fn test_ignored_and_clamped_settings_are_reported() {
        let config = config_from(&[
            (OPENAI_API_KEY, "sk-test"),
            (TAVILY_API_KEY, "tvly"),
            ("HANGSEARCH_MAX_AGENT_ITERATIONS", "eight"),
            ("HANGSEARCH_SEARCH_RESULTS", "300"),
        ])
        .unwrap();

        assert_eq!(config.agent.max_iterations, 8);
        // Wider than u8, still clamped rather than reset to the default
        assert_eq!(config.agent.search_max_results, 10);

        let warnings = config.warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.contains("HANGSEARCH_MAX_AGENT_ITERATIONS") && w.contains("eight")));
        assert!(warnings.iter().any(|w| w.contains("300") && w.contains("using 10")));
    }

    #[test]
    fn test_invalid_fallback_word_is_dropped() {
        let config = config_from(&[("HANGSEARCH_FALLBACK_WORD", "ab")]).unwrap();
        assert!(config.game.fallback_word.is_none());
        assert!(config
            .warnings()
            .iter()
            .any(|w| w.contains("HANGSEARCH_FALLBACK_WORD")));

        // Valid in general but longer than the configured maximum
        let config = config_from(&[
            ("HANGSEARCH_FALLBACK_WORD", "mountains"),
            ("HANGSEARCH_WORD_MAX_LEN", "6"),
        ])
        .unwrap();
        assert!(config.game.fallback_word.is_none());

        let config = config_from(&[("HANGSEARCH_FALLBACK_WORD", " Planet ")]).unwrap();
        assert_eq!(config.game.fallback_word.as_deref(), Some("planet"));
    }

    #[test]
    fn test_inverted_word_bounds_rejected() {
        let result = config_from(&[
            ("HANGSEARCH_WORD_MIN_LEN", "9"),
            ("HANGSEARCH_WORD_MAX_LEN", "5"),
        ]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
