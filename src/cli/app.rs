//! Interactive loop: read a command, run the session operation, re-render

use anyhow::Result;

use super::command::{parse_command, Command};
use super::console::Console;
use crate::agent::EXAMPLE_QUESTIONS;
use crate::core::AppError;
use crate::session::{ConversationMode, Session};

/// Terminal front end over a [`Session`]
pub struct App {
    console: Console,
    session: Session,
}

impl App {
    pub fn new(console: Console, session: Session) -> Self {
        Self { console, session }
    }

    /// Run until the user quits or input ends
    pub async fn run(&mut self) -> Result<()> {
        self.console.print_banner();

        if self.session.has_llm() {
            self.start_game().await;
        } else {
            self.console
                .print_system("Game and research are disabled until OPENAI_API_KEY is set.");
        }

        while let Some(line) = self.console.read_input()? {
            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(e) => {
                    self.console.print_system(&e.to_string());
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }
            self.handle(command).await;
        }

        tracing::info!("Session ended");
        println!("Goodbye!");
        Ok(())
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Empty | Command::Quit => {}
            Command::Help => self.console.print_help(),
            Command::NewGame => self.start_game().await,
            Command::Guess(input) => match self.session.guess(&input) {
                Ok(outcome) => {
                    self.console.print_guess(&outcome);
                    if let Some(game) = self.session.game() {
                        self.console.render_game(game);
                    }
                }
                Err(e) => self.report(&e),
            },
            Command::Reveal => match self.session.game() {
                Some(game) => self
                    .console
                    .print_system(&format!("The word is {}.", game.secret().to_ascii_uppercase())),
                None => self.console.print_system("No game in progress."),
            },
            Command::Log => match self.session.game() {
                Some(game) => self.console.print_game_log(game),
                None => self.console.print_system("No game in progress."),
            },
            Command::Status => {
                if let Some(game) = self.session.game() {
                    self.console.render_game(game);
                }
                self.console.print_settings(self.session.settings());
            }
            Command::Ask(question) => self.ask(&question).await,
            Command::AskExample(n) => match n.checked_sub(1).and_then(|i| EXAMPLE_QUESTIONS.get(i)) {
                Some((_, question)) => self.ask(question).await,
                None => self.console.print_system(&format!(
                    "There are {} sample questions; type 'examples' to list them.",
                    EXAMPLE_QUESTIONS.len()
                )),
            },
            Command::Examples => self.console.print_examples(),
            Command::Trace(show) => {
                self.session.set_show_trace(show);
                self.console.print_settings(self.session.settings());
            }
            Command::Temperature(value) => {
                self.session.set_temperature(value);
                self.console.print_settings(self.session.settings());
            }
            Command::Results(value) => {
                self.session.set_search_max_results(value);
                self.console.print_settings(self.session.settings());
            }
            Command::Mode(mode) => {
                self.session.set_mode(mode);
                self.console.print_settings(self.session.settings());
            }
            Command::Reset => {
                self.session.reset_conversation();
                self.console.print_system("Conversation cleared.");
            }
        }
    }

    async fn start_game(&mut self) {
        self.console.print_pending("Picking a secret word...");
        match self.session.new_game().await {
            Ok(game) => self.console.render_game(game),
            Err(e) => {
                self.report(&e);
                if let Some(game) = self.session.game() {
                    self.console.print_system("Keeping the current game.");
                    self.console.render_game(game);
                }
            }
        }
    }

    async fn ask(&mut self, question: &str) {
        self.console.print_user(question);
        self.console.print_pending("Researching...");
        match self.session.ask(question).await {
            Ok(answer) => {
                tracing::info!(
                    "Answered in {} model call(s), {} citation(s)",
                    answer.run.agent_visits,
                    answer.citations.len()
                );
                self.console
                    .render_answer(&answer, self.session.settings().show_trace);
                if self.session.settings().mode == ConversationMode::Continuous {
                    if let Some(conversation) = self.session.conversation() {
                        tracing::debug!(
                            "Chat {} started {}: {} messages",
                            conversation.id(),
                            conversation.created_at().format("%H:%M:%S"),
                            conversation.len()
                        );
                    }
                }
            }
            Err(e) => self.report(&e),
        }
    }

    fn report(&self, error: &AppError) {
        if error.is_fatal() {
            tracing::error!("{}", error);
            self.console.print_error(&error.to_string());
        } else {
            self.console.print_system(&error.to_string());
        }
    }
}
