//! # Source Errors
//!
//! Failures of a downstream asset source.
//!
//! "No data for this customer" is not an error: clients report it as
//! [`SourceFetch::Missing`](super::traits::SourceFetch::Missing).
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::infrastructure::sources::error::SourceError;
//!
//! let error = SourceError::http_status(503, "maintenance");
//! assert_eq!(error.to_string(), "source returned HTTP 503: maintenance");
//! ```

use thiserror::Error;

/// Error type for source client operations.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Transport-level timeout.
    #[error("source timeout: {message}")]
    Timeout {
        /// Error message.
        message: String,
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// Network or connection error.
    #[error("source connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// Non-success HTTP status other than "not found".
    #[error("source returned HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response excerpt.
        message: String,
    },

    /// Response body could not be understood.
    #[error("source invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },

    /// Client could not be built or configured.
    #[error("source configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// The request was abandoned by the caller.
    #[error("source request cancelled")]
    Cancelled,

    /// Unclassified failure.
    #[error("source error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl SourceError {
    /// Creates a timeout error with duration.
    #[must_use]
    pub fn timeout_with_duration(message: impl Into<String>, timeout_ms: u64) -> Self {
        Self::Timeout {
            message: message.into(),
            timeout_ms,
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            message: message.into(),
        }
    }

    /// Creates an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_keeps_duration() {
        let err = SourceError::timeout_with_duration("slow", 250);
        assert!(matches!(
            err,
            SourceError::Timeout {
                timeout_ms: 250,
                ..
            }
        ));
    }

    #[test]
    fn display_format() {
        let display = SourceError::http_status(500, "boom").to_string();
        assert!(display.contains("500"));
        assert!(display.contains("boom"));
    }
}
