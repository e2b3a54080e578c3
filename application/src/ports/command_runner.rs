//! Command runner port
//!
//! Two ways of starting processes:
//!
//! - [`CommandRunner::run`]: a shell command line (`sh -c`), used by the
//!   operator's `run_cmd` tool and for tool-action context capture
//! - [`ActionLauncher::launch`]: an argv template with placeholders, no
//!   shell, used to apply a model's response (`git commit -F {file}`)

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Captured output of a finished process, trailing whitespace trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }
}

/// Errors from running a command.
///
/// `Failed` still carries whatever the process printed so the caller can
/// show it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    EmptyCommand,

    #[error("command failed with exit code {code}")]
    Failed { code: i32, output: CommandOutput },

    #[error("failed to execute command: {0}")]
    Spawn(String),

    #[error("command timed out after {0} seconds")]
    TimedOut(u64),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("invalid command template: {0}")]
    Template(String),
}

impl CommandError {
    /// Output captured before the failure, if any.
    pub fn output(&self) -> Option<&CommandOutput> {
        match self {
            CommandError::Failed { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CommandError::Cancelled)
    }
}

/// Runs shell command lines.
///
/// Exit code 1 is not an error (grep, diff and friends use it for "nothing
/// found"); any other non-zero exit is [`CommandError::Failed`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, CommandError>;
}

/// Values substituted into an action template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionValues {
    /// `{response}`; also the contents of the `{file}` temp file
    pub response: String,
    /// `{output}`: output of the context command
    pub output: String,
}

/// Runs an argv template without a shell, attached to the terminal so
/// editors and pagers work.
#[async_trait]
pub trait ActionLauncher: Send + Sync {
    async fn launch(
        &self,
        template: &str,
        values: &ActionValues,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError>;
}

/// Runner that never starts a process and always succeeds with no output.
///
/// Useful for tests and for wiring the operator without shell access.
pub struct NoopCommandRunner;

#[async_trait]
impl CommandRunner for NoopCommandRunner {
    async fn run(
        &self,
        _command: &str,
        _cancel: &CancellationToken,
    ) -> Result<CommandOutput, CommandError> {
        Ok(CommandOutput::default())
    }
}
