//! # Source Client Trait
//!
//! Port definition for the three downstream asset sources.
//!
//! A fetch either finds data, reports that the source holds none for the
//! customer, or fails with a [`SourceError`](super::error::SourceError).
//!
//! # Examples
//!
//! ```ignore
//! use asset_aggregator::infrastructure::sources::traits::{SourceClient, SourceFetch};
//!
//! #[async_trait::async_trait]
//! impl SourceClient for MyBankClient {
//!     fn source(&self) -> SourceType { SourceType::Bank }
//!     async fn fetch(&self, customer: &CustomerId, trace: &TraceId) -> SourceResult<SourceFetch> {
//!         // ...
//!     }
//! }
//! ```

use crate::domain::value_objects::{CurrencyAmount, CustomerId, SourceType, Timestamp, TraceId};
use crate::infrastructure::sources::error::SourceResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use std::fmt;

/// Data returned by a source that holds assets for the customer.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Customer the data belongs to.
    pub customer_id: CustomerId,
    /// Unmodified response body.
    pub payload: Value,
    /// Source-reported aggregate amount.
    pub amount: Decimal,
    /// Source-reported currency code.
    pub currency: String,
    /// Per-currency sub-totals (bank only).
    pub currency_summary: Vec<CurrencyAmount>,
    /// When the data was fetched.
    pub fetched_at: Timestamp,
    /// The source's own correlation id, if it sent one.
    pub trace_id: Option<String>,
}

impl FetchResult {
    /// Creates a fetch result with no sub-totals and no source trace id.
    #[must_use]
    pub fn new(
        customer_id: CustomerId,
        payload: Value,
        amount: Decimal,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            payload,
            amount,
            currency: currency.into(),
            currency_summary: Vec::new(),
            fetched_at: Timestamp::now(),
            trace_id: None,
        }
    }

    /// Sets the per-currency sub-totals.
    #[must_use]
    pub fn with_currency_summary(mut self, summary: Vec<CurrencyAmount>) -> Self {
        self.currency_summary = summary;
        self
    }

    /// Sets the source trace id.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Sets the fetch time.
    #[must_use]
    pub fn with_fetched_at(mut self, fetched_at: Timestamp) -> Self {
        self.fetched_at = fetched_at;
        self
    }
}

/// Result of a successful source call.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceFetch {
    /// The source returned data.
    Found(FetchResult),
    /// The source holds no data for the customer.
    Missing,
}

/// A downstream asset source.
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent aggregations.
#[async_trait]
pub trait SourceClient: Send + Sync + fmt::Debug {
    /// Which source this client talks to.
    fn source(&self) -> SourceType;

    /// Fetches the customer's assets from the source.
    ///
    /// # Errors
    ///
    /// Returns `SourceError` for transport and protocol failures.
    async fn fetch(&self, customer_id: &CustomerId, trace_id: &TraceId)
    -> SourceResult<SourceFetch>;
}
