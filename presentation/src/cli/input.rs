//! Prompt assembly from arguments and piped stdin

use std::io::{self, IsTerminal, Read};
use tracing::warn;

/// Read stdin when it is piped; `None` for a terminal or empty input.
pub fn read_piped_stdin() -> Option<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut buf = String::new();
    if let Err(e) = stdin.lock().read_to_string(&mut buf) {
        // Keep whatever arrived before the error
        warn!(error = %e, "error reading from stdin");
    }
    let trimmed = buf.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Piped input first, then the prompt words, separated by a space.
pub fn compose_message(piped: Option<&str>, words: &[String]) -> String {
    let prompt = words.join(" ");
    let prompt = prompt.trim();
    match piped.map(str::trim).filter(|p| !p.is_empty()) {
        Some(piped) if prompt.is_empty() => piped.to_string(),
        Some(piped) => format!("{} {}", piped, prompt),
        None => prompt.to_string(),
    }
}
