//! Runs tools with output truncation.

use super::registry::{Tool, ToolCallError, ToolOutput};
use gaia_domain::ToolArgs;
use gaia_domain::operator::policy::DEFAULT_OUTPUT_MAX_BYTES;
use gaia_domain::util::truncate_output;
use tokio_util::sync::CancellationToken;

/// Invokes tools and caps stdout and stderr independently.
#[derive(Debug, Clone, Copy)]
pub struct Executor {
    max_output_bytes: usize,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_MAX_BYTES)
    }
}

impl Executor {
    /// `0` selects the default limit.
    pub fn new(max_output_bytes: usize) -> Self {
        let max_output_bytes = if max_output_bytes == 0 {
            DEFAULT_OUTPUT_MAX_BYTES
        } else {
            max_output_bytes
        };
        Self { max_output_bytes }
    }

    pub fn max_output_bytes(&self) -> usize {
        self.max_output_bytes
    }

    pub async fn run(
        &self,
        tool: &Tool,
        args: &ToolArgs,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolCallError> {
        let output = tool.handler.call(args, cancel).await?;
        Ok(ToolOutput {
            stdout: truncate_output(&output.stdout, self.max_output_bytes),
            stderr: truncate_output(&output.stderr, self.max_output_bytes),
            error: output.error,
        })
    }
}
