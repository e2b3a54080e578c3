//! Confirmation port for risky operations.
//!
//! # Architecture
//!
//! - **Port**: [`ConfirmationPort`] - defined here in application layer
//! - **Adapter**: `InteractiveConfirmation` - terminal prompt in presentation layer
//!
//! # Built-in Implementations
//!
//! - [`AutoApproveConfirmation`] - Always approves
//! - [`AutoRejectConfirmation`] - Always declines (non-interactive runs)

use async_trait::async_trait;
use thiserror::Error;

/// Failures while asking, as opposed to the user saying no.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationError {
    #[error("Operation cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(String),
}

/// Asks a human to approve an action.
///
/// Implementations may block on terminal input; the operator loop is
/// sequential, so nothing else is waiting.
#[async_trait]
pub trait ConfirmationPort: Send + Sync {
    async fn confirm(&self, message: &str) -> Result<bool, ConfirmationError>;
}

/// Approves everything.
pub struct AutoApproveConfirmation;

#[async_trait]
impl ConfirmationPort for AutoApproveConfirmation {
    async fn confirm(&self, _message: &str) -> Result<bool, ConfirmationError> {
        Ok(true)
    }
}

/// Declines everything.
pub struct AutoRejectConfirmation;

#[async_trait]
impl ConfirmationPort for AutoRejectConfirmation {
    async fn confirm(&self, _message: &str) -> Result<bool, ConfirmationError> {
        Ok(false)
    }
}
