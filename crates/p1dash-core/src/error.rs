//! Error types for p1dash-core.
//!
//! Only two things can stop a generation pass: an empty reading set and a
//! configuration the loader cannot work with. Everything that goes wrong with a
//! single reading is logged and the reading is dropped.
//!
//! | Error | Raised by | Recovery |
//! |-------|-----------|----------|
//! | [`Error::NoData`] | loader, dashboard | Wait for the collector or import data |
//! | [`Error::InvalidTimezone`] | [`LoaderOptions`](crate::LoaderOptions) | Fix `dashboard.timezone` |
//! | [`Error::InvalidConfig`] | loader | Fix the configuration and retry |
//! | [`Error::Io`] | [`load_log`](crate::loader::load_log) | Check the log file |

use thiserror::Error;

/// Errors that can occur in the loader and aggregation engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The reading set was empty after loading.
    #[error("No data found")]
    NoData,

    /// The configured timezone name is not a known IANA zone.
    #[error("Unknown timezone: {0}")]
    InvalidTimezone(String),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A single record could not be turned into a reading.
    #[error(transparent)]
    Parse(#[from] p1dash_types::ParseError),

    /// Reading a raw log failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using p1dash-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::NoData.to_string(), "No data found");
        assert_eq!(
            Error::InvalidTimezone("Mars/Olympus".into()).to_string(),
            "Unknown timezone: Mars/Olympus"
        );
    }

    #[test]
    fn test_parse_error_is_transparent() {
        let err: Error = p1dash_types::ParseError::MissingField("timestamp").into();
        assert_eq!(err.to_string(), "Missing required field: timestamp");
    }
}
