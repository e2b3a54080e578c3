//! Terminal yes/no prompt implementing [`ConfirmationPort`].
//!
//! ```text
//! Run medium-risk command: rm build.log [y/N]
//! ```
//!
//! Only `y` or `yes` (any case) approves. Empty input and EOF decline.

use async_trait::async_trait;
use colored::Colorize;
use gaia_application::{ConfirmationError, ConfirmationPort};
use std::io::{self, BufRead, Write};

/// Asks on stderr and reads the answer from stdin on a blocking thread.
pub struct InteractiveConfirmation;

impl InteractiveConfirmation {
    pub fn new() -> Self {
        Self
    }
}

impl Default for InteractiveConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print `message [y/N] ` to `output` and read one line from `input`.
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<bool, ConfirmationError> {
    let io_err = |e: io::Error| ConfirmationError::Io(e.to_string());

    // Starts on a fresh line even after a streamed reply without one
    write!(output, "\n{} {} ", message.bold(), "[y/N]".dimmed()).map_err(io_err)?;
    output.flush().map_err(io_err)?;

    let mut answer = String::new();
    let read = input.read_line(&mut answer).map_err(io_err)?;
    if read == 0 {
        // EOF: nobody is there to approve
        writeln!(output).map_err(io_err)?;
        return Ok(false);
    }
    Ok(is_affirmative(&answer))
}

#[async_trait]
impl ConfirmationPort for InteractiveConfirmation {
    async fn confirm(&self, message: &str) -> Result<bool, ConfirmationError> {
        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut stderr = io::stderr();
            ask_yes_no(&mut stdin.lock(), &mut stderr, &message)
        })
        .await
        .map_err(|e| ConfirmationError::Io(format!("confirmation prompt failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn answer(input: &str) -> bool {
        let mut out = Vec::new();
        ask_yes_no(&mut Cursor::new(input.as_bytes()), &mut out, "Proceed?").unwrap()
    }

    #[test]
    fn test_affirmative_answers() {
        assert!(answer("y\n"));
        assert!(answer("YES\n"));
        assert!(answer("  Yes  \n"));
    }

    #[test]
    fn test_everything_else_declines() {
        assert!(!answer("\n"));
        assert!(!answer("n\n"));
        assert!(!answer("yep\n"));
        assert!(!answer(""));
    }

    #[test]
    fn test_prompt_is_written() {
        let mut out = Vec::new();
        ask_yes_no(&mut Cursor::new(b"n\n".as_slice()), &mut out, "Run `ls`?").unwrap();
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("Run `ls`?"));
        assert!(shown.contains("[y/N]"));
    }
}
