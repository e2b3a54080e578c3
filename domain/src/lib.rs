//! Domain layer for gaia
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Operator
//!
//! The operator investigates a goal by letting a model request one tool call
//! per turn. The model's replies are untrusted: they are parsed defensively
//! ([`operator::decision`]), and every tool call passes a risk-aware guard
//! ([`operator::guard`]) before anything runs.
//!
//! ## Roles
//!
//! A role is a system-prompt template. [`role::heuristic`] scores roles by
//! keyword overlap so most messages never need an extra LLM round-trip to
//! pick one.

pub mod core;
pub mod operator;
pub mod role;
pub mod session;
pub mod tool;
pub mod util;

// Re-export commonly used types
pub use core::error::DomainError;
pub use operator::{
    ConversationState, Decision, DecisionAction, DecisionError, GuardOptions, GuardVerdict,
    OperatorPolicy, ParsedDecision, Step, extract_json, format_observation, parse_decision,
};
pub use role::{
    DEFAULT_ROLE, DetectionMethod, DetectionMode, DetectionResult, HeuristicMatch, RoleKeywords,
    classification_prompt, default_role_templates, parse_classification, render_role_template,
};
pub use session::{
    entities::{ChatHistory, CompletionRequest, Message, Role},
    stream::StreamEvent,
};
pub use tool::{
    CMD_ARG, RUN_CMD, RiskLevel, ToolArgs, ToolDefinition, ToolParameter, run_cmd_definition,
};
