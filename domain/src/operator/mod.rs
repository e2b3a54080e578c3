//! Operator domain: the pure half of the investigate loop.
//!
//! The operator lets a model investigate a goal by requesting one tool call
//! per turn. Everything here is deterministic and free of I/O; the loop that
//! drives it (planner calls, confirmation prompts, process execution) lives
//! in the application layer.
//!
//! ```text
//!  model reply ──▶ extract_json ──▶ parse_decision ──▶ Decision
//!                                                        │
//!        ┌───────────────────────────────────────────────┤
//!        ▼                                               ▼
//!  answer (done)                              guard::evaluate(tool, args)
//!                                                        │
//!                                     Allow / Block(reason) / Confirm(message)
//! ```
//!
//! - [`state::ConversationState`]: goal plus append-only step log
//! - [`decision::Decision`]: parsed model output
//! - [`guard::GuardOptions`]: per-run safety policy
//! - [`observation`]: text fed back to the model after each attempt
//! - [`policy::OperatorPolicy`]: loop bounds

pub mod decision;
pub mod guard;
pub mod json_extract;
pub mod observation;
pub mod policy;
pub mod prompt;
pub mod state;

pub use decision::{Decision, DecisionAction, DecisionError, ParsedDecision, parse_decision};
pub use guard::{GuardOptions, GuardVerdict, evaluate};
pub use json_extract::extract_json;
pub use observation::format_observation;
pub use policy::OperatorPolicy;
pub use state::{ConversationState, Step};
