//! Application error types

use thiserror::Error;
use tickwatch_domain::{DecodeError, RecordError};

/// Application-level errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplicationError {
    /// A received payload did not match its required shape.
    #[error("invalid payload: {0}")]
    Validation(#[from] DecodeError),

    /// The request failed at the network layer.
    #[error("transport error: {0}")]
    Transport(String),

    /// The operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// The remote service answered with an error message.
    #[error("{0}")]
    Service(String),

    /// User input was rejected before any request was made.
    #[error("{0}")]
    Record(#[from] RecordError),
}

impl ApplicationError {
    /// Returns true for failures that happened below the payload level.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
