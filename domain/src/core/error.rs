//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid risk level: {0}")]
    InvalidRiskLevel(String),

    #[error("Invalid detection mode: {0} (expected off, heuristic or hybrid)")]
    InvalidDetectionMode(String),

    #[error("Invalid detection method: {0}")]
    InvalidDetectionMethod(String),
}
