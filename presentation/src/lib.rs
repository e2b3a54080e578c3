//! Presentation layer for gaia
//!
//! This crate contains CLI definitions, the interactive confirmation
//! prompt, output formatters, progress reporters, and the chat REPL.

pub mod chat;
pub mod cli;
pub mod confirmation;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::ChatRepl;
pub use cli::commands::{
    AskArgs, CacheCommand, ChatArgs, Cli, Command, ConfigCommand, InvestigateArgs,
    ToolCommandArgs,
};
pub use cli::input::{compose_message, read_piped_stdin};
pub use confirmation::InteractiveConfirmation;
pub use output::console::ConsoleFormatter;
pub use progress::{OperatorProgressReporter, StreamingPrinter};
