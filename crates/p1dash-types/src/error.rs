//! Error types for data parsing in p1dash-types.

use thiserror::Error;

/// Errors that can occur when turning raw meter data into a [`Reading`](crate::Reading).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A required field was absent or null.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The timestamp could not be interpreted as an instant.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// The payload itself was unreadable.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using p1dash-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
