//! # Domain Enums
//!
//! Enumeration types for aggregation concepts.
//!
//! - [`SourceType`] - The three downstream asset sources
//! - [`ComponentStatus`] - Per-source outcome classification
//! - [`AggregationStatus`] - Overall status of an aggregated result
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, `FromStr`, and Serde traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an enum from a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Downstream asset source.
///
/// The set is closed. Declaration order is the iteration order used when
/// building components and the currency breakdown.
///
/// # Examples
///
/// ```
/// use asset_aggregator::domain::value_objects::enums::SourceType;
///
/// assert_eq!(SourceType::ALL[0], SourceType::Bank);
/// assert_eq!(SourceType::Securities.to_string(), "SECURITIES");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    /// Bank accounts.
    Bank,
    /// Securities holdings.
    Securities,
    /// Insurance policies.
    Insurance,
}

impl SourceType {
    /// All sources in deterministic processing order.
    pub const ALL: [SourceType; 3] = [Self::Bank, Self::Securities, Self::Insurance];

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bank => "BANK",
            Self::Securities => "SECURITIES",
            Self::Insurance => "INSURANCE",
        }
    }

    /// Returns the lower-case path segment used by the source services.
    #[must_use]
    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Securities => "securities",
            Self::Insurance => "insurance",
        }
    }

    /// Payload keys that hold the itemised asset list, expected key first.
    #[must_use]
    pub const fn detail_keys(self) -> &'static [&'static str] {
        match self {
            Self::Bank => &["bankAssets", "accounts"],
            Self::Securities => &["securitiesAssets", "holdings"],
            Self::Insurance => &["insuranceAssets", "policies"],
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BANK" => Ok(Self::Bank),
            "SECURITIES" => Ok(Self::Securities),
            "INSURANCE" => Ok(Self::Insurance),
            _ => Err(ParseEnumError::new("source type", s)),
        }
    }
}

/// Classification of one source's fetch-and-persist attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentStatus {
    /// Data fetched and raw document persisted.
    Success,
    /// Source reported that it holds no data for the customer.
    Missing,
    /// Transport, logic or durable-write failure.
    Failed,
    /// The shared deadline elapsed before the source replied.
    Timeout,
}

impl ComponentStatus {
    /// Returns true for FAILED and TIMEOUT.
    #[inline]
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failed | Self::Timeout)
    }

    /// Returns true for SUCCESS.
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Missing => "MISSING",
            Self::Failed => "FAILED",
            Self::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for ComponentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(Self::Success),
            "MISSING" => Ok(Self::Missing),
            "FAILED" => Ok(Self::Failed),
            "TIMEOUT" => Ok(Self::Timeout),
            _ => Err(ParseEnumError::new("component status", s)),
        }
    }
}

/// Overall status of an aggregation.
///
/// `Failed` exists for completeness of the vocabulary; a failed aggregation
/// is reported as an error and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregationStatus {
    /// Every source succeeded.
    Completed,
    /// No failures, at least one source missing.
    Partial,
    /// At least one source failed or timed out.
    Failed,
}

impl AggregationStatus {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for AggregationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => Ok(Self::Completed),
            "PARTIAL" => Ok(Self::Partial),
            "FAILED" => Ok(Self::Failed),
            _ => Err(ParseEnumError::new("aggregation status", s)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn source_type_order_is_stable() {
        let mut sorted = SourceType::ALL;
        sorted.sort();
        assert_eq!(sorted, SourceType::ALL);
    }

    #[test]
    fn source_type_from_str_is_case_insensitive() {
        assert_eq!(" bank ".parse::<SourceType>().unwrap(), SourceType::Bank);
        assert_eq!(
            "Securities".parse::<SourceType>().unwrap(),
            SourceType::Securities
        );
        assert!("broker".parse::<SourceType>().is_err());
    }

    #[test]
    fn source_type_serde_uses_upper_case() {
        let json = serde_json::to_string(&SourceType::Insurance).unwrap();
        assert_eq!(json, "\"INSURANCE\"");
    }

    #[test]
    fn detail_keys_start_with_expected_key() {
        assert_eq!(SourceType::Bank.detail_keys()[0], "bankAssets");
        assert_eq!(SourceType::Securities.detail_keys()[1], "holdings");
        assert_eq!(SourceType::Insurance.detail_keys()[1], "policies");
    }

    #[test]
    fn component_status_failure_classes() {
        assert!(ComponentStatus::Failed.is_failure());
        assert!(ComponentStatus::Timeout.is_failure());
        assert!(!ComponentStatus::Missing.is_failure());
        assert!(!ComponentStatus::Success.is_failure());
    }

    #[test]
    fn aggregation_status_round_trips_through_display() {
        for status in [
            AggregationStatus::Completed,
            AggregationStatus::Partial,
            AggregationStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<AggregationStatus>().unwrap(), status);
        }
    }
}
