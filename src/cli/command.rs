//! Console command parsing

use thiserror::Error;

use crate::session::ConversationMode;

/// One line of user input, parsed
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Guess a letter (validated by the game)
    Guess(String),
    NewGame,
    /// Show the secret word (for testing)
    Reveal,
    /// Show the game log, newest first
    Log,
    Ask(String),
    /// Ask one of the sample questions (1-based)
    AskExample(usize),
    Examples,
    Trace(bool),
    Temperature(f32),
    Results(u8),
    Mode(ConversationMode),
    /// Clear the accumulated conversation
    Reset,
    Status,
    Help,
    Quit,
    Empty,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid value '{value}' for '{command}'")]
    InvalidValue { command: &'static str, value: String },
}

/// Parse one input line
pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Command::Empty);
    }

    let (head, rest) = match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    };

    let command = match head.to_lowercase().as_str() {
        "quit" | "exit" => Command::Quit,
        "help" | "?" => Command::Help,
        "new" => Command::NewGame,
        "reveal" => Command::Reveal,
        "log" => Command::Log,
        "status" => Command::Status,
        "examples" => Command::Examples,
        "reset" => Command::Reset,
        "guess" | "g" => Command::Guess(required(rest, "guess")?.to_string()),
        "ask" => {
            let question = required(rest, "ask")?;
            match question.parse::<usize>() {
                Ok(n) => Command::AskExample(n),
                Err(_) => Command::Ask(question.to_string()),
            }
        }
        "trace" => match required(rest, "trace")?.to_lowercase().as_str() {
            "on" => Command::Trace(true),
            "off" => Command::Trace(false),
            _ => return Err(invalid("trace", rest)),
        },
        "temp" => {
            let raw = required(rest, "temp")?;
            let value: f32 = raw.parse().map_err(|_| invalid("temp", raw))?;
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid("temp", raw));
            }
            Command::Temperature(value)
        }
        "results" => {
            let raw = required(rest, "results")?;
            match raw.parse::<u8>() {
                Ok(n) if (1..=10).contains(&n) => Command::Results(n),
                _ => return Err(invalid("results", raw)),
            }
        }
        "mode" => match required(rest, "mode")?.to_lowercase().as_str() {
            "single" => Command::Mode(ConversationMode::PerQuestion),
            "chat" => Command::Mode(ConversationMode::Continuous),
            _ => return Err(invalid("mode", rest)),
        },
        // A bare single character is a guess
        _ if rest.is_empty() && input.chars().count() == 1 => Command::Guess(input.to_string()),
        _ => return Err(CommandError::Unknown(head.to_string())),
    };

    Ok(command)
}

fn required<'a>(rest: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(rest)
    }
}

fn invalid(command: &'static str, value: &str) -> CommandError {
    CommandError::InvalidValue {
        command,
        value: value.to_string(),
    }
}
