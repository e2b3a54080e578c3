//! Run Tool Action use case.
//!
//! `gaia tool git commit`: capture context with a shell command, have the
//! model draft something from it, let the user approve, then hand the
//! draft to a real program.

use crate::config::ToolAction;
use crate::ports::command_runner::{ActionLauncher, ActionValues, CommandError, CommandRunner};
use crate::ports::confirmation::{AutoApproveConfirmation, ConfirmationError, ConfirmationPort};
use crate::ports::progress::{NoResponseProgress, ResponseProgressNotifier};
use crate::use_cases::run_ask::{CacheMode, RunAskError, RunAskInput, RunAskUseCase};
use gaia_domain::{ChatHistory, DEFAULT_ROLE};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ToolActionError {
    #[error("no context or arguments provided for tool action '{tool}.{action}'")]
    NoInput { tool: String, action: String },

    #[error("failed to get context: {0}")]
    Context(#[source] CommandError),

    #[error("failed to generate response: {0}")]
    Ask(#[from] RunAskError),

    #[error("confirmation failed: {0}")]
    Confirmation(#[from] ConfirmationError),

    #[error("failed to execute command '{command}': {source}")]
    Execute {
        command: String,
        source: CommandError,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RunToolActionInput {
    pub tool: String,
    pub action: String,
    /// Free-text description from the command line
    pub args: Vec<String>,
    pub config: ToolAction,
    pub cache_mode: CacheMode,
}

impl RunToolActionInput {
    pub fn new(tool: impl Into<String>, action: impl Into<String>, config: ToolAction) -> Self {
        Self {
            tool: tool.into(),
            action: action.into(),
            args: Vec::new(),
            config,
            cache_mode: CacheMode::default(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }
}

/// How a tool action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolActionOutcome {
    /// `execute_command` ran with the response
    Executed { response: String },
    /// No `execute_command`; the response is the result
    Printed { response: String },
    /// The user declined
    Declined { response: String },
}

impl ToolActionOutcome {
    pub fn response(&self) -> &str {
        match self {
            ToolActionOutcome::Executed { response }
            | ToolActionOutcome::Printed { response }
            | ToolActionOutcome::Declined { response } => response,
        }
    }
}

pub struct RunToolActionUseCase {
    ask: Arc<RunAskUseCase>,
    runner: Arc<dyn CommandRunner>,
    launcher: Arc<dyn ActionLauncher>,
    confirmation: Arc<dyn ConfirmationPort>,
    cancellation_token: Option<CancellationToken>,
}

impl RunToolActionUseCase {
    pub fn new(
        ask: Arc<RunAskUseCase>,
        runner: Arc<dyn CommandRunner>,
        launcher: Arc<dyn ActionLauncher>,
    ) -> Self {
        Self {
            ask,
            runner,
            launcher,
            confirmation: Arc::new(AutoApproveConfirmation),
            cancellation_token: None,
        }
    }

    pub fn with_confirmation(mut self, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub async fn execute(
        &self,
        input: RunToolActionInput,
    ) -> Result<ToolActionOutcome, ToolActionError> {
        self.execute_with_progress(input, &NoResponseProgress).await
    }

    pub async fn execute_with_progress(
        &self,
        input: RunToolActionInput,
        progress: &dyn ResponseProgressNotifier,
    ) -> Result<ToolActionOutcome, ToolActionError> {
        let token = self.cancellation_token.clone().unwrap_or_default();
        let config = &input.config;
        info!(tool = %input.tool, action = %input.action, "Running tool action");

        let context = if config.context_command.trim().is_empty() {
            String::new()
        } else {
            debug!(command = %config.context_command, "Capturing context");
            match self.runner.run(&config.context_command, &token).await {
                Ok(output) => output.stdout,
                Err(e) if e.is_cancelled() => return Err(ToolActionError::Cancelled),
                Err(e) => return Err(ToolActionError::Context(e)),
            }
        };

        let prompt = build_prompt(&input.args, &context).ok_or_else(|| ToolActionError::NoInput {
            tool: input.tool.clone(),
            action: input.action.clone(),
        })?;

        let role = match config.role.trim() {
            "" => DEFAULT_ROLE.to_string(),
            role => role.to_string(),
        };
        let ask_input = RunAskInput::new(prompt)
            .with_role(Some(role))
            .with_cache_mode(input.cache_mode);
        let response = self
            .ask
            .execute_with_progress(ask_input, &mut ChatHistory::new(), progress)
            .await
            .map_err(|e| match e {
                RunAskError::Cancelled => ToolActionError::Cancelled,
                other => ToolActionError::Ask(other),
            })?
            .response
            .trim()
            .to_string();

        let command = config.execute_command.trim();
        if command.is_empty() {
            return Ok(ToolActionOutcome::Printed { response });
        }

        let question = format!("Run `{}` with this response?", command);
        let approved = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(ToolActionError::Cancelled),
            answer = self.confirmation.confirm(&question) => answer?,
        };
        if !approved {
            return Ok(ToolActionOutcome::Declined { response });
        }

        let values = ActionValues {
            response: response.clone(),
            output: context,
        };
        match self.launcher.launch(command, &values, &token).await {
            Ok(()) => Ok(ToolActionOutcome::Executed { response }),
            Err(e) if e.is_cancelled() => Err(ToolActionError::Cancelled),
            Err(source) => Err(ToolActionError::Execute {
                command: command.to_string(),
                source,
            }),
        }
    }
}

/// Description first, captured context after; `None` when both are empty.
fn build_prompt(args: &[String], context: &str) -> Option<String> {
    let description = args.join(" ");
    let description = description.trim();
    match (description.is_empty(), context.is_empty()) {
        (true, true) => None,
        (true, false) => Some(context.to_string()),
        (false, true) => Some(description.to_string()),
        (false, false) => Some(format!("{}\n\nContext:\n{}", description, context)),
    }
}
