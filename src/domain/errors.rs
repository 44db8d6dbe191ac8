//! # Domain Errors
//!
//! Invariant violations raised while constructing domain values.

use thiserror::Error;

/// Error type for domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A required identifier was empty or whitespace.
    #[error("{0} must not be blank")]
    BlankIdentifier(&'static str),

    /// A currency code could not be normalised.
    #[error("invalid currency code: {0}")]
    InvalidCurrency(String),

    /// A component violated its construction invariants.
    #[error("invalid component: {0}")]
    InvalidComponent(String),

    /// An execution summary did not hold one outcome per source.
    #[error("incomplete execution summary: {0}")]
    IncompleteSummary(String),

    /// A running sum of amounts no longer fits a decimal.
    #[error("amount overflow while summing {0}")]
    AmountOverflow(String),
}

impl DomainError {
    /// Creates an invalid component error.
    #[must_use]
    pub fn invalid_component(msg: impl Into<String>) -> Self {
        Self::InvalidComponent(msg.into())
    }

    /// Creates an invalid currency error.
    #[must_use]
    pub fn invalid_currency(code: impl Into<String>) -> Self {
        Self::InvalidCurrency(code.into())
    }

    /// Creates an amount overflow error.
    #[must_use]
    pub fn amount_overflow(what: impl Into<String>) -> Self {
        Self::AmountOverflow(what.into())
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
