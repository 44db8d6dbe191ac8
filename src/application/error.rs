//! # Application Errors
//!
//! Error types for the aggregation use case.
//!
//! # Error Hierarchy
//!
//! ```text
//! ApplicationError
//! ├── Validation(String)            - Blank or malformed input
//! ├── AggregationFailed { .. }      - A source FAILED or timed out
//! ├── MissingRate(ConversionError)  - Unconvertible currency pair
//! ├── DurableWrite(..)              - Persistence exhausted its retries
//! ├── Repository(RepositoryError)   - Snapshot store failure
//! ├── Domain(DomainError)           - Invariant violations
//! └── Configuration(String)         - Invalid settings
//! ```
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::application::error::ApplicationError;
//!
//! let err = ApplicationError::validation("customerId must not be blank");
//! assert!(err.is_validation());
//! ```

use crate::application::services::retry::DurableWriteError;
use crate::domain::entities::{ExecutionSummary, OutcomeCause};
use crate::domain::errors::DomainError;
use crate::domain::services::ConversionError;
use crate::domain::value_objects::{CustomerId, SourceType};
use crate::infrastructure::persistence::RepositoryError;
use thiserror::Error;

/// Application layer error.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Request validation failed.
    #[error("validation error: {0}")]
    Validation(String),

    /// At least one source could not be resolved.
    #[error("{message}")]
    AggregationFailed {
        /// Human-readable summary naming the customer and first cause.
        message: String,
        /// Failed or timed-out sources, in source order.
        failed_sources: Vec<SourceType>,
        /// First available root cause.
        #[source]
        cause: Option<OutcomeCause>,
    },

    /// A currency pair could not be converted.
    #[error(transparent)]
    MissingRate(ConversionError),

    /// A durable write ran out of retries.
    #[error(transparent)]
    DurableWrite(#[from] DurableWriteError<RepositoryError>),

    /// Store failure outside the retried raw writes.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Domain invariant violated.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Creates a validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates an aggregation failure.
    #[must_use]
    pub fn aggregation_failed(
        message: impl Into<String>,
        failed_sources: Vec<SourceType>,
        cause: Option<OutcomeCause>,
    ) -> Self {
        Self::AggregationFailed {
            message: message.into(),
            failed_sources,
            cause,
        }
    }

    /// Creates the aggregation failure for a summary with FAILED or TIMEOUT
    /// outcomes, naming the customer and the first available cause.
    #[must_use]
    pub fn unresolved_sources(customer_id: &CustomerId, summary: &ExecutionSummary) -> Self {
        let cause = summary.first_failure_cause();
        let message = match &cause {
            Some(cause) => {
                format!("Failed to aggregate assets for customer {customer_id} due to {cause}")
            }
            None => format!("Failed to aggregate assets for customer {customer_id}"),
        };
        Self::aggregation_failed(message, summary.failed_sources(), cause)
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an aggregation failure.
    #[must_use]
    pub fn is_aggregation_failed(&self) -> bool {
        matches!(self, Self::AggregationFailed { .. })
    }

    /// Returns true if a currency pair was unconvertible.
    #[must_use]
    pub fn is_missing_rate(&self) -> bool {
        matches!(self, Self::MissingRate(_))
    }

    /// Returns the failed sources of an aggregation failure.
    #[must_use]
    pub fn failed_sources(&self) -> &[SourceType] {
        match self {
            Self::AggregationFailed { failed_sources, .. } => failed_sources,
            _ => &[],
        }
    }
}

impl From<ConversionError> for ApplicationError {
    fn from(error: ConversionError) -> Self {
        match error {
            ConversionError::InvalidRateKey(_) | ConversionError::NonPositiveRate { .. } => {
                Self::Configuration(error.to_string())
            }
            other => Self::MissingRate(other),
        }
    }
}

/// Result type for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::sync::Arc;

    #[test]
    fn validation_error() {
        let err = ApplicationError::validation("customerId must not be blank");
        assert!(err.is_validation());
        assert!(err.to_string().contains("customerId"));
    }

    #[test]
    fn aggregation_failed_exposes_sources_and_cause() {
        let cause: OutcomeCause = Arc::new(RepositoryError::connection("down"));
        let err = ApplicationError::aggregation_failed(
            "Failed to aggregate assets for customer C001 due to down",
            vec![SourceType::Securities],
            Some(cause),
        );
        assert!(err.is_aggregation_failed());
        assert_eq!(err.failed_sources(), &[SourceType::Securities]);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Failed to aggregate"));
    }

    #[test]
    fn conversion_errors_split_by_kind() {
        let missing: ApplicationError = ConversionError::missing_rate("JPY", "TWD").into();
        assert!(missing.is_missing_rate());

        let bad_key: ApplicationError = ConversionError::InvalidRateKey("X".into()).into();
        assert!(matches!(bad_key, ApplicationError::Configuration(_)));
    }

    #[test]
    fn other_errors_have_no_failed_sources() {
        let err: ApplicationError = RepositoryError::query("x").into();
        assert!(err.failed_sources().is_empty());
    }
}
