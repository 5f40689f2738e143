use colored::*;
use std::io::{self, Write};

use crate::agent::{TraceStep, EXAMPLE_QUESTIONS};
use crate::game::{GameState, GameStatus, GuessOutcome};
use crate::llm::Role;
use crate::session::{Answer, ConversationMode, Settings};

/// Console handles all terminal I/O with colored formatting
pub struct Console {
    user_color: Color,
    assistant_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            user_color: Color::Cyan,
            assistant_color: Color::Green,
        }
    }

    /// Print a welcome banner
    pub fn print_banner(&self) {
        println!("{}", "=".repeat(60).bright_blue());
        println!("{}", "  Hangsearch - LLM Hangman & Research Agent".bright_blue().bold());
        println!("{}", "=".repeat(60).bright_blue());
        println!();
        println!("Type a letter to guess, 'ask <question>' to research, 'help' for commands.");
        println!();
    }

    pub fn print_help(&self) {
        let rows = [
            ("<letter> | guess <letter>", "guess a letter"),
            ("new", "start a new game with an LLM-picked word"),
            ("reveal", "show the secret word"),
            ("log", "show the game log, newest first"),
            ("ask <question>", "ask the research agent"),
            ("ask <1-4>", "ask one of the sample questions"),
            ("examples", "list the sample questions"),
            ("trace on|off", "show or hide the agent trace"),
            ("temp <0.0-1.0>", "set the agent temperature"),
            ("results <1-10>", "set the number of web search results"),
            ("mode single|chat", "fresh conversation per question, or one running chat"),
            ("reset", "clear the running chat"),
            ("status", "show game and settings"),
            ("quit | exit", "leave"),
        ];
        for (command, description) in rows {
            println!("  {:<28} {}", command.color(self.user_color), description);
        }
    }

    /// Print the board: masked word, lives and wrong letters
    pub fn render_game(&self, game: &GameState) {
        self.print_separator();
        println!("  {}", game.masked_word().bold());
        println!(
            "  Lives: {} ({}/{})",
            game.lives_bar().red().bold(),
            game.lives_remaining(),
            game.max_lives()
        );
        let wrong: Vec<String> = game
            .wrong_letters()
            .iter()
            .map(|c| c.to_ascii_uppercase().to_string())
            .collect();
        if wrong.is_empty() {
            println!("  Wrong letters: {}", "none".bright_black());
        } else {
            println!("  Wrong letters: {}", wrong.join(", ").yellow());
        }

        match game.status() {
            GameStatus::Won => println!("  {}", "You won!".green().bold()),
            GameStatus::Lost => println!(
                "  {} The word was {}.",
                "You lost.".red().bold(),
                game.secret().to_ascii_uppercase().bold()
            ),
            GameStatus::InProgress => {}
        }
        self.print_separator();
    }

    pub fn print_guess(&self, outcome: &GuessOutcome) {
        let letter = outcome.letter.to_ascii_uppercase();
        if outcome.hit {
            println!("{} {}", "Correct:".green().bold(), letter);
        } else {
            println!("{} {}", "Wrong:".red().bold(), letter);
        }
    }

    /// Print the game log, newest entry first
    pub fn print_game_log(&self, game: &GameState) {
        for entry in game.history().iter().rev() {
            println!("  {}", entry.bright_black());
        }
    }

    /// Print an agent answer with its numbered sources
    pub fn render_answer(&self, answer: &Answer, show_trace: bool) {
        if show_trace {
            self.print_trace(&answer.run.trace());
        }

        if answer.run.answer.trim().is_empty() {
            self.print_system("No response produced.");
        } else {
            self.print_assistant(&answer.run.answer);
        }

        if !answer.citations.is_empty() {
            println!();
            println!("{}", "Sources:".bold());
            for (i, url) in answer.citations.iter().enumerate() {
                println!("  {}. {}", i + 1, url.underline());
            }
        }
    }

    pub fn print_trace(&self, steps: &[TraceStep]) {
        println!("{}", "Trace:".bright_black().bold());
        for (i, step) in steps.iter().enumerate() {
            let role = match step.role {
                Role::Assistant => "assistant".color(self.assistant_color),
                Role::Tool if step.is_error => "tool".red(),
                Role::Tool => "tool".magenta(),
                Role::User => "user".color(self.user_color),
                Role::System => "system".yellow(),
            };
            println!("  {:>2}. [{}] {}", i + 1, role, step.preview.bright_black());
        }
        println!();
    }

    pub fn print_settings(&self, settings: &Settings) {
        let mode = match settings.mode {
            ConversationMode::PerQuestion => "single",
            ConversationMode::Continuous => "chat",
        };
        println!(
            "  temperature {:.2} | search results {} | trace {} | mode {}",
            settings.temperature,
            settings.search_max_results,
            if settings.show_trace { "on" } else { "off" },
            mode
        );
    }

    pub fn print_examples(&self) {
        for (i, (label, question)) in EXAMPLE_QUESTIONS.iter().enumerate() {
            println!("  {}. {} {}", i + 1, label.bold(), question.bright_black());
        }
    }

    /// Print a user message with colored formatting
    pub fn print_user(&self, message: &str) {
        println!("{} {}", "You:".color(self.user_color).bold(), message);
    }

    /// Print a complete assistant message with colored formatting
    pub fn print_assistant(&self, message: &str) {
        println!(
            "{} {}",
            "Assistant:".color(self.assistant_color).bold(),
            message.color(self.assistant_color)
        );
    }

    /// Print a system message (info, rejected input, etc.)
    pub fn print_system(&self, message: &str) {
        println!("{} {}", "System:".yellow().bold(), message);
    }

    pub fn print_warning(&self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow().bold(), message);
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }

    /// Print a status line while a slow call runs
    pub fn print_pending(&self, message: &str) {
        println!("{}", message.bright_black().italic());
    }

    /// Read a line of input from the user; `None` on end of input
    pub fn read_input(&self) -> io::Result<Option<String>> {
        print!("{} ", ">".color(self.user_color).bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    }

    /// Print a separator line
    pub fn print_separator(&self) {
        println!("{}", "-".repeat(60).bright_black());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}
