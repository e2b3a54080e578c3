//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::{ConsoleFormatter, RULE};
use crate::progress::StreamingPrinter;
use colored::Colorize;
use gaia_application::{CacheMode, RunAskInput, RunAskUseCase};
use gaia_domain::ChatHistory;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

const HISTORY_SIZE: usize = 500;

#[derive(Error, Debug)]
pub enum ReplError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// What a line typed at the prompt asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum ChatInput<'a> {
    Empty,
    Exit,
    /// Forget the conversation so far
    Clear,
    Message(&'a str),
}

pub fn parse_chat_input(line: &str) -> ChatInput<'_> {
    match line.trim() {
        "" => ChatInput::Empty,
        "exit" | "quit" | "/exit" | "/quit" => ChatInput::Exit,
        "/clear" => ChatInput::Clear,
        message => ChatInput::Message(message),
    }
}

/// Interactive chat REPL
///
/// The conversation lives in a [`ChatHistory`] owned by the loop; every
/// message is answered with the whole history as context.
pub struct ChatRepl {
    use_case: Arc<RunAskUseCase>,
    role: Option<String>,
    cache_mode: CacheMode,
    show_role: bool,
    history_path: Option<PathBuf>,
}

impl ChatRepl {
    pub fn new(use_case: Arc<RunAskUseCase>) -> Self {
        Self {
            use_case,
            role: None,
            cache_mode: CacheMode::default(),
            show_role: false,
            history_path: dirs::data_dir().map(|p| p.join("gaia").join("chat_history.txt")),
        }
    }

    /// Use this role for every message instead of detecting one
    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_role_trace(mut self, show: bool) -> Self {
        self.show_role = show;
        self
    }

    pub fn with_history_path(mut self, path: Option<PathBuf>) -> Self {
        self.history_path = path;
        self
    }

    fn line_editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_path else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "chat history unavailable");
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&self) -> Result<(), ReplError> {
        let mut line_editor = self.line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("You".to_string()),
            DefaultPromptSegment::Empty,
        );
        let mut history = ChatHistory::new();

        println!("Starting chat session. Type 'exit' to end the chat.");
        println!("{}", RULE);

        loop {
            let line = match line_editor.read_line(&prompt)? {
                Signal::Success(line) => line,
                Signal::CtrlC => continue,
                _ => {
                    println!("\nChat session ended (EOF received).");
                    break;
                }
            };

            match parse_chat_input(&line) {
                ChatInput::Empty => continue,
                ChatInput::Exit => {
                    println!("Chat session ended.");
                    break;
                }
                ChatInput::Clear => {
                    history.clear();
                    println!("{}", "Conversation cleared.".dimmed());
                }
                ChatInput::Message(message) => {
                    self.process_message(message, &mut history).await;
                }
            }
            println!("{}", RULE);
        }

        Ok(())
    }

    async fn process_message(&self, message: &str, history: &mut ChatHistory) {
        let printer = StreamingPrinter::new().with_role_trace(self.show_role);
        printer.start_spinner();

        let input = RunAskInput::new(message)
            .with_role(self.role.clone())
            .with_cache_mode(self.cache_mode);
        let result = self
            .use_case
            .execute_with_progress(input, history, &printer)
            .await;
        printer.finish();

        if let Err(e) = result {
            eprintln!("{}", ConsoleFormatter::error(&format!("processing message: {}", e)));
            println!("You can continue chatting or type 'exit' to end the session.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_input() {
        assert_eq!(parse_chat_input("   "), ChatInput::Empty);
        assert_eq!(parse_chat_input("exit"), ChatInput::Exit);
        assert_eq!(parse_chat_input(" quit \n"), ChatInput::Exit);
        assert_eq!(parse_chat_input("/clear"), ChatInput::Clear);
        assert_eq!(
            parse_chat_input("  how do I exit vim? "),
            ChatInput::Message("how do I exit vim?")
        );
    }
}
