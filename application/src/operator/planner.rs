//! Asks the model for the next decision.

use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use gaia_domain::operator::prompt::planner_messages;
use gaia_domain::{
    CompletionRequest, ConversationState, DecisionError, ParsedDecision, ToolDefinition,
    parse_decision,
};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Operation cancelled")]
    Cancelled,

    /// The reply arrived but is not a usable decision.
    #[error("invalid decision: {0}")]
    Invalid(#[from] DecisionError),
}

pub struct Planner {
    gateway: Arc<dyn LlmGateway>,
    model: String,
}

impl Planner {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One completion call, raced against `cancel`.
    pub async fn decide(
        &self,
        state: &ConversationState,
        tools: &[ToolDefinition],
        cancel: &CancellationToken,
    ) -> Result<ParsedDecision, PlannerError> {
        let request = CompletionRequest::new(&self.model)
            .with_messages(planner_messages(state, tools));
        debug!(model = %self.model, messages = request.messages.len(), "Planner request");

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PlannerError::Cancelled),
            reply = self.gateway.complete(&request) => reply,
        };
        let reply = match reply {
            Err(GatewayError::Cancelled) => return Err(PlannerError::Cancelled),
            other => other?,
        };
        trace!(reply = %reply, "Planner reply");

        Ok(parse_decision(&reply)?)
    }
}
