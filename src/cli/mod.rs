pub mod app;
pub mod command;
pub mod console;

pub use app::App;
pub use command::{parse_command, Command, CommandError};
pub use console::Console;
