//! Progress ports
//!
//! Lets the presentation layer trace an investigate run turn by turn
//! (the `--debug` output) and stream `ask` replies without the use cases
//! knowing how either is displayed.

use gaia_domain::{Decision, DecisionError, DetectionResult};

/// Callbacks fired by `RunOperatorUseCase` as the loop advances.
///
/// All methods default to no-ops.
pub trait OperatorProgressNotifier: Send + Sync {
    /// A planner call is about to start.
    fn on_step_start(&self, _step: usize, _max_steps: usize) {}

    /// The model's reply parsed into a decision.
    fn on_decision(&self, _decision: &Decision) {}

    /// The model's reply could not be parsed.
    fn on_parse_error(&self, _error: &DecisionError) {}

    /// An observation was appended to the conversation.
    fn on_observation(&self, _observation: &str) {}
}

/// No-op notifier for when progress reporting is not needed
pub struct NoOperatorProgress;

impl OperatorProgressNotifier for NoOperatorProgress {}

/// Callbacks fired while answering an `ask` or chat message.
pub trait ResponseProgressNotifier: Send + Sync {
    /// The role that will shape the system prompt.
    fn on_role_detected(&self, _result: &DetectionResult) {}

    /// A piece of the reply. A cache hit arrives as a single chunk.
    fn on_chunk(&self, _chunk: &str) {}
}

pub struct NoResponseProgress;

impl ResponseProgressNotifier for NoResponseProgress {}
