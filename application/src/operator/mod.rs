//! Operator components that need ports: tool registry, executor, guard
//! resolution and the planner.
//!
//! ```text
//! Planner ──▶ SafetyGuard ──▶ Executor ──▶ ConversationState
//!   │             │              │
//!   ▼             ▼              ▼
//! LlmGateway  ConfirmationPort  ToolRegistry ──▶ CommandRunner
//! ```
//!
//! The loop that ties them together is
//! [`RunOperatorUseCase`](crate::use_cases::run_operator::RunOperatorUseCase).

pub mod executor;
pub mod guard;
pub mod planner;
pub mod registry;

pub use executor::Executor;
pub use guard::{GuardOutcome, SafetyGuard};
pub use planner::{Planner, PlannerError};
pub use registry::{ShellTool, Tool, ToolCallError, ToolHandler, ToolOutput, ToolRegistry};
