//! Shell command runner: `sh -c <command>`

use async_trait::async_trait;
use gaia_application::{CommandError, CommandOutput, CommandRunner};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Runs command lines through a POSIX shell, capturing output.
///
/// The child is killed when the run is cancelled or times out.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    shell: String,
    timeout: Option<Duration>,
}

impl Default for ShellCommandRunner {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            timeout: None,
        }
    }
}

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    async fn spawn_and_wait(&self, command: &str) -> Result<std::process::Output, CommandError> {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::Spawn(e.to_string()))?;

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, wait)
                .await
                .map_err(|_| CommandError::TimedOut(timeout.as_secs()))?,
            None => wait.await,
        };
        output.map_err(|e| CommandError::Spawn(e.to_string()))
    }
}

#[async_trait]
impl CommandRunner for ShellCommandRunner {
    async fn run(
        &self,
        command: &str,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, CommandError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(CommandError::EmptyCommand);
        }

        let start = Instant::now();
        let output = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CommandError::Cancelled),
            result = self.spawn_and_wait(command) => result?,
        };

        let captured = CommandOutput::new(
            String::from_utf8_lossy(&output.stdout).trim_end(),
            String::from_utf8_lossy(&output.stderr).trim_end(),
        );
        let code = output.status.code();
        debug!(
            command,
            exit_code = ?code,
            duration_ms = start.elapsed().as_millis() as u64,
            "command finished"
        );

        match code {
            // 1 means "nothing found" for grep, diff and friends
            Some(0) | Some(1) => Ok(captured),
            Some(code) => Err(CommandError::Failed {
                code,
                output: captured,
            }),
            // Killed by a signal
            None => Err(CommandError::Failed {
                code: -1,
                output: captured,
            }),
        }
    }
}
