//! Runs a tool action's `execute_command` attached to the terminal.

use super::template::{
    FILE_PLACEHOLDER, OUTPUT_PLACEHOLDER, RESPONSE_PLACEHOLDER, build_command_args,
};
use async_trait::async_trait;
use gaia_application::{ActionLauncher, ActionValues, CommandError, CommandOutput};
use std::collections::HashMap;
use std::io::Write;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Spawns argv templates directly (no shell) with inherited stdio, so
/// editors opened by e.g. `git commit -F {file} -e` work.
///
/// `{file}` is a temp file holding the response, deleted after the
/// command exits.
#[derive(Debug, Clone, Default)]
pub struct ProcessActionLauncher;

impl ProcessActionLauncher {
    pub fn new() -> Self {
        Self
    }
}

fn write_response_file(response: &str) -> Result<NamedTempFile, CommandError> {
    let io_err = |e: std::io::Error| {
        CommandError::Spawn(format!("failed to prepare temporary file: {}", e))
    };
    let mut file = tempfile::Builder::new()
        .prefix("gaia-")
        .suffix(".txt")
        .tempfile()
        .map_err(io_err)?;
    file.write_all(response.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;
    Ok(file)
}

#[async_trait]
impl ActionLauncher for ProcessActionLauncher {
    async fn launch(
        &self,
        template: &str,
        values: &ActionValues,
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        // Kept alive until the command exits; dropping it deletes the file
        let response_file = if template.contains(FILE_PLACEHOLDER) {
            Some(write_response_file(&values.response)?)
        } else {
            None
        };

        let mut replacements = HashMap::from([
            (RESPONSE_PLACEHOLDER, values.response.trim().to_string()),
            (OUTPUT_PLACEHOLDER, values.output.clone()),
        ]);
        if let Some(file) = &response_file {
            replacements.insert(FILE_PLACEHOLDER, file.path().display().to_string());
        }

        let argv = build_command_args(template, &replacements)?;
        debug!(program = %argv[0], args = argv.len() - 1, "launching action");

        let mut child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CommandError::Spawn(format!("{}: {}", argv[0], e)))?;

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CommandError::Cancelled),
            status = child.wait() => status.map_err(|e| CommandError::Spawn(e.to_string()))?,
        };

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::Failed {
                code: status.code().unwrap_or(-1),
                output: CommandOutput::default(),
            })
        }
    }
}
