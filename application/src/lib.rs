//! Application layer for gaia
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod operator;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DetectionSettings, Endpoint, RoleCatalog, ToolAction};
pub use operator::{Executor, SafetyGuard, ShellTool, Tool, ToolHandler, ToolRegistry};
pub use ports::{
    cache::{CacheError, DetectionCache, NoCache, ResponseCache, ResponseCacheKey},
    command_runner::{
        ActionLauncher, ActionValues, CommandError, CommandOutput, CommandRunner,
        NoopCommandRunner,
    },
    confirmation::{
        AutoApproveConfirmation, AutoRejectConfirmation, ConfirmationError, ConfirmationPort,
    },
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    progress::{
        NoOperatorProgress, NoResponseProgress, OperatorProgressNotifier,
        ResponseProgressNotifier,
    },
};
pub use use_cases::detect_role::{DetectRoleError, DetectRoleUseCase};
pub use use_cases::run_ask::{CacheMode, RunAskError, RunAskInput, RunAskOutput, RunAskUseCase};
pub use use_cases::run_operator::{OperatorError, RunOperatorInput, RunOperatorUseCase};
pub use use_cases::tool_action::{
    RunToolActionInput, RunToolActionUseCase, ToolActionError, ToolActionOutcome,
};
