//! Tool domain module
//!
//! Tools are the only way the operator touches the machine. Every tool is a
//! static [`ToolDefinition`] (name, description, argument schema, risk
//! level); the executable half lives behind a port in the application layer.
//!
//! | Risk | Handling |
//! |------|----------|
//! | **Low** | Runs after list checks |
//! | **Medium** / **High** | May require human confirmation |
//! | **Critical** | Never runs |

pub mod entities;

pub use entities::{
    CMD_ARG, RUN_CMD, RiskLevel, ToolArgs, ToolDefinition, ToolParameter, run_cmd_definition,
};
