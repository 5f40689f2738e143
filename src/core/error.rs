//! Error types for hangsearch
//!
//! Every failure that reaches the interactive surface is one of these kinds.
//! Provider code works with `anyhow::Result` and is converted at the
//! selector/agent boundary through [`AppError::from_provider`].

use thiserror::Error;

/// Result alias used across the crate
pub type AppResult<T> = Result<T, AppError>;

/// Errors surfaced by the game, the agent loop and the session
#[derive(Debug, Error)]
pub enum AppError {
    /// The LLM never produced a usable secret word within the retry bound
    #[error("failed to obtain a valid secret word after {attempts} attempt(s); try starting a new game")]
    WordSelectionFailure { attempts: u32 },

    /// Malformed guess or a guess against a finished game
    #[error("invalid guess: {0}")]
    InvalidGuess(String),

    /// The letter was already tried (informational)
    #[error("you already tried '{}'", .0.to_ascii_uppercase())]
    DuplicateGuess(char),

    /// A tool call failed at the provider
    #[error("tool '{tool}' failed: {message}")]
    ToolExecutionFailure { tool: String, message: String },

    /// The agent loop hit its round-trip bound without a final answer
    #[error("could not produce an answer within {0} model round trips")]
    AgentLoopExceeded(usize),

    /// A network call exceeded the configured timeout
    #[error("{service} request timed out")]
    Timeout { service: String },

    /// Any other provider-side failure
    #[error("{service} error: {message}")]
    Provider { service: String, message: String },

    /// A credential needed for this action is not configured
    #[error("{0} is not set")]
    MissingCredential(&'static str),

    /// A secret word that breaks the game's alphabet or length rules
    #[error("invalid secret word '{0}'")]
    InvalidSecret(String),

    /// Conversation invariant violation
    #[error("conversation error: {0}")]
    Conversation(String),

    /// Configuration problem
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Convert a provider-level error into `Timeout` or `Provider`
    ///
    /// The whole error chain is inspected so a reqwest timeout wrapped in
    /// `anyhow` context is still reported as a timeout.
    pub fn from_provider(service: impl Into<String>, err: anyhow::Error) -> Self {
        let service = service.into();
        if is_timeout(&err) {
            return AppError::Timeout { service };
        }
        AppError::Provider {
            service,
            message: format!("{:#}", err),
        }
    }

    /// Whether the error ends the action, as opposed to a reprompt
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AppError::InvalidGuess(_) | AppError::DuplicateGuess(_))
    }
}

/// Check whether any error in the chain is a transport timeout
pub fn is_timeout(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<reqwest::Error>()
            .map(|e| e.is_timeout())
            .unwrap_or(false)
            || cause
                .downcast_ref::<tokio::time::error::Elapsed>()
                .is_some()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_guess_message() {
        let err = AppError::DuplicateGuess('z');
        assert_eq!(err.to_string(), "you already tried 'Z'");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_from_provider_keeps_context() {
        let err = anyhow::anyhow!("connection refused").context("Failed to send request");
        match AppError::from_provider("openai", err) {
            AppError::Provider { service, message } => {
                assert_eq!(service, "openai");
                assert!(message.contains("Failed to send request"));
                assert!(message.contains("connection refused"));
            }
            other => panic!("Expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_from_provider_detects_elapsed() {
        let elapsed = tokio::time::timeout(
            std::time::Duration::from_millis(1),
            std::future::pending::<()>(),
        )
        .await
        .unwrap_err();
        let err = anyhow::Error::new(elapsed).context("search");

        assert!(matches!(
            AppError::from_provider("tavily", err),
            AppError::Timeout { .. }
        ));
    }

    #[test]
    fn test_loop_exceeded_is_fatal() {
        assert!(AppError::AgentLoopExceeded(8).is_fatal());
    }
}
