//! Resolves guard verdicts, asking a human when the policy says so.

use crate::ports::confirmation::{AutoApproveConfirmation, ConfirmationPort};
use gaia_domain::operator::guard::evaluate;
use gaia_domain::{GuardOptions, GuardVerdict, ToolArgs, ToolDefinition};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Final answer for one tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allowed,
    Blocked(String),
    /// The run was cancelled while waiting for confirmation
    Cancelled,
}

/// Pure policy from [`evaluate`] plus the confirmation port.
pub struct SafetyGuard {
    options: GuardOptions,
    confirmation: Arc<dyn ConfirmationPort>,
}

impl SafetyGuard {
    /// Guard that approves every confirmation request.
    pub fn new(options: GuardOptions) -> Self {
        Self {
            options,
            confirmation: Arc::new(AutoApproveConfirmation),
        }
    }

    pub fn with_confirmation(mut self, confirmation: Arc<dyn ConfirmationPort>) -> Self {
        self.confirmation = confirmation;
        self
    }

    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    /// Resolve the verdict for one call. A pending confirmation is raced
    /// against `cancel`.
    pub async fn check(
        &self,
        tool: &ToolDefinition,
        args: &ToolArgs,
        cancel: &CancellationToken,
    ) -> GuardOutcome {
        let message = match evaluate(tool, args, &self.options) {
            GuardVerdict::Allow => return GuardOutcome::Allowed,
            GuardVerdict::Block(reason) => {
                debug!(tool = %tool.name, %reason, "Tool call blocked");
                return GuardOutcome::Blocked(reason);
            }
            GuardVerdict::Confirm(message) => message,
        };

        let answer = tokio::select! {
            biased;
            _ = cancel.cancelled() => return GuardOutcome::Cancelled,
            answer = self.confirmation.confirm(&message) => answer,
        };
        match answer {
            Ok(true) => GuardOutcome::Allowed,
            Ok(false) => GuardOutcome::Blocked("user declined".to_string()),
            Err(e) => {
                warn!(tool = %tool.name, error = %e, "Confirmation failed");
                GuardOutcome::Blocked(format!("confirmation failed: {}", e))
            }
        }
    }
}
