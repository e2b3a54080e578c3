//! Interactive chat module
//!
//! Provides a reedline-based interactive chat interface.

mod repl;

pub use repl::{ChatInput, ChatRepl, ReplError, parse_chat_input};
