//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod cache;
pub mod command_runner;
pub mod confirmation;
pub mod llm_gateway;
pub mod progress;
