//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod detect_role;
pub mod run_ask;
pub mod run_operator;
pub mod tool_action;
