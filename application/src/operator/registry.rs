//! Tool registry: name → executable tool.

use crate::ports::command_runner::CommandRunner;
use async_trait::async_trait;
use gaia_domain::{CMD_ARG, ToolArgs, ToolDefinition, run_cmd_definition};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Result of invoking a tool. Execution problems are data here, not
/// errors: they are shown to the model as part of the observation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn success(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// The only tool failure that aborts the operator loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolCallError {
    #[error("Operation cancelled")]
    Cancelled,
}

/// Executable half of a tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(
        &self,
        args: &ToolArgs,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolCallError>;
}

/// A registered tool: static definition plus handler.
#[derive(Clone)]
pub struct Tool {
    pub definition: ToolDefinition,
    pub handler: Arc<dyn ToolHandler>,
}

impl Tool {
    pub fn new(definition: ToolDefinition, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// `run_cmd`: hands the `cmd` argument to a [`CommandRunner`].
pub struct ShellTool {
    runner: Arc<dyn CommandRunner>,
}

impl ShellTool {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    pub fn into_tool(self) -> Tool {
        Tool::new(run_cmd_definition(), Arc::new(self))
    }
}

#[async_trait]
impl ToolHandler for ShellTool {
    async fn call(
        &self,
        args: &ToolArgs,
        cancel: &CancellationToken,
    ) -> Result<ToolOutput, ToolCallError> {
        let cmd = args.get(CMD_ARG).map(String::as_str).unwrap_or_default();
        match self.runner.run(cmd, cancel).await {
            Ok(output) => Ok(ToolOutput::success(output.stdout, output.stderr)),
            Err(e) if e.is_cancelled() => Err(ToolCallError::Cancelled),
            Err(e) => {
                let partial = e.output().cloned().unwrap_or_default();
                Ok(ToolOutput::success(partial.stdout, partial.stderr).with_error(e.to_string()))
            }
        }
    }
}

/// Tools by name.
///
/// Lookups take a read lock and registration a write lock, so one registry
/// can be shared between concurrent runs.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, silently replacing any tool with the same name.
    pub fn register(&self, tool: Tool) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.insert(tool.name().to_string(), tool.clone()).is_some() {
            debug!(tool = tool.name(), "Replaced registered tool");
        }
    }

    pub fn with_tool(self, tool: Tool) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Tool> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Definitions of every tool, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|t| t.definition.clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Registry holding only the built-in `run_cmd` tool.
    pub fn with_defaults(runner: Arc<dyn CommandRunner>) -> Self {
        Self::new().with_tool(ShellTool::new(runner).into_tool())
    }
}
