//! Domain error types

use thiserror::Error;

/// A network payload did not match its required shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not a JSON object.
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required field is absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A field holds a value of the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongType {
        /// Name of the offending field.
        field: &'static str,
        /// Description of the expected type.
        expected: &'static str,
    },

    /// A timestamp field is not a valid ISO-8601 date-time.
    #[error("field `{field}` is not an ISO-8601 date-time: {value:?}")]
    InvalidTimestamp {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A count field is negative.
    #[error("field `{field}` must be >= 0, got {value}")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
}

/// Configuration values that cannot be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The provided URL is invalid or uses an unsupported scheme.
    #[error("invalid URL for `{field}`: {reason}")]
    InvalidUrl {
        /// Configuration key.
        field: &'static str,
        /// Why the URL was rejected.
        reason: String,
    },

    /// A timeout was configured as zero.
    #[error("`{0}` must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Result type alias for payload decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;
