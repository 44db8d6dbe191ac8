//! # Source Outcomes
//!
//! The classified result of fetching and persisting one source, and the
//! per-request summary that joins all three.
//!
//! An outcome's amount is zero and its reference id is absent unless its
//! status is SUCCESS; the constructors are the only way to build one.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::payload::PayloadMap;
use crate::domain::value_objects::{
    AggregationStatus, ComponentStatus, CurrencyAmount, DocumentId, SourceType, Timestamp,
    TraceId,
};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;

/// Shared handle to the error that caused a non-successful outcome.
pub type OutcomeCause = Arc<dyn Error + Send + Sync>;

/// Data carried by a successful outcome.
#[derive(Debug, Clone)]
pub struct SuccessDetails {
    /// Source-reported aggregate amount, in source currency.
    pub amount: Decimal,
    /// Source-reported currency code.
    pub currency: String,
    /// When the source data was fetched.
    pub fetched_at: Timestamp,
    /// Correlation id reported by the source.
    pub raw_trace_id: TraceId,
    /// Id of the persisted raw document.
    pub reference_id: DocumentId,
    /// Unmodified source payload.
    pub payload: Value,
    /// Per-currency sub-totals (bank only).
    pub currency_summary: Vec<CurrencyAmount>,
    /// Itemised entries extracted from the payload.
    pub asset_details: Vec<PayloadMap>,
}

/// Result of attempting to fetch and persist one source.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    source: SourceType,
    status: ComponentStatus,
    amount: Decimal,
    currency: Option<String>,
    fetched_at: Timestamp,
    raw_trace_id: TraceId,
    reference_id: Option<DocumentId>,
    payload: Value,
    currency_summary: Vec<CurrencyAmount>,
    asset_details: Vec<PayloadMap>,
    error: Option<OutcomeCause>,
}

impl SourceOutcome {
    /// Creates a SUCCESS outcome.
    #[must_use]
    pub fn success(source: SourceType, details: SuccessDetails) -> Self {
        Self {
            source,
            status: ComponentStatus::Success,
            amount: details.amount,
            currency: Some(details.currency),
            fetched_at: details.fetched_at,
            raw_trace_id: details.raw_trace_id,
            reference_id: Some(details.reference_id),
            payload: details.payload,
            currency_summary: details.currency_summary,
            asset_details: details.asset_details,
            error: None,
        }
    }

    /// Creates a MISSING outcome.
    #[must_use]
    pub fn missing(source: SourceType, trace_id: TraceId) -> Self {
        Self::empty(source, ComponentStatus::Missing, trace_id, None)
    }

    /// Creates a FAILED outcome retaining its cause.
    #[must_use]
    pub fn failed(source: SourceType, trace_id: TraceId, cause: OutcomeCause) -> Self {
        Self::empty(source, ComponentStatus::Failed, trace_id, Some(cause))
    }

    /// Creates a TIMEOUT outcome.
    #[must_use]
    pub fn timeout(source: SourceType, trace_id: TraceId, cause: OutcomeCause) -> Self {
        Self::empty(source, ComponentStatus::Timeout, trace_id, Some(cause))
    }

    fn empty(
        source: SourceType,
        status: ComponentStatus,
        trace_id: TraceId,
        error: Option<OutcomeCause>,
    ) -> Self {
        Self {
            source,
            status,
            amount: Decimal::ZERO,
            currency: None,
            fetched_at: Timestamp::now(),
            raw_trace_id: trace_id,
            reference_id: None,
            payload: Value::Object(PayloadMap::new()),
            currency_summary: Vec::new(),
            asset_details: Vec::new(),
            error,
        }
    }

    /// Returns the source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> SourceType {
        self.source
    }

    /// Returns the classification.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    /// Returns the source-currency amount (zero unless SUCCESS).
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the source currency, if the source reported one.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    /// Returns when the outcome's data was fetched (or classified).
    #[inline]
    #[must_use]
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Returns the correlation id attached to this outcome.
    #[inline]
    #[must_use]
    pub fn raw_trace_id(&self) -> &TraceId {
        &self.raw_trace_id
    }

    /// Returns the persisted raw document id (SUCCESS only).
    #[must_use]
    pub fn reference_id(&self) -> Option<&DocumentId> {
        self.reference_id.as_ref()
    }

    /// Returns the raw payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns per-currency sub-totals.
    #[inline]
    #[must_use]
    pub fn currency_summary(&self) -> &[CurrencyAmount] {
        &self.currency_summary
    }

    /// Returns the extracted asset detail records.
    #[inline]
    #[must_use]
    pub fn asset_details(&self) -> &[PayloadMap] {
        &self.asset_details
    }

    /// Returns the retained cause, if any.
    #[must_use]
    pub fn error(&self) -> Option<&OutcomeCause> {
        self.error.as_ref()
    }

    /// Returns true for FAILED or TIMEOUT.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }
}

/// One outcome per source, joined after coordination.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    outcomes: BTreeMap<SourceType, SourceOutcome>,
}

impl ExecutionSummary {
    /// Builds a summary holding exactly one outcome per source.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IncompleteSummary` on a duplicate or absent
    /// source.
    pub fn new(outcomes: impl IntoIterator<Item = SourceOutcome>) -> DomainResult<Self> {
        let mut map = BTreeMap::new();
        for outcome in outcomes {
            let source = outcome.source();
            if map.insert(source, outcome).is_some() {
                return Err(DomainError::IncompleteSummary(format!(
                    "duplicate outcome for {source}"
                )));
            }
        }
        if let Some(absent) = SourceType::ALL.iter().find(|s| !map.contains_key(s)) {
            return Err(DomainError::IncompleteSummary(format!(
                "no outcome for {absent}"
            )));
        }
        Ok(Self { outcomes: map })
    }

    /// Returns the outcome for `source`.
    #[must_use]
    pub fn outcome(&self, source: SourceType) -> Option<&SourceOutcome> {
        self.outcomes.get(&source)
    }

    /// Iterates outcomes in source order.
    pub fn outcomes(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes.values()
    }

    /// Returns true if any source FAILED or timed out.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes().any(SourceOutcome::is_failure)
    }

    /// Returns true if any source reported no data.
    #[must_use]
    pub fn has_missing_data(&self) -> bool {
        self.outcomes()
            .any(|outcome| outcome.status() == ComponentStatus::Missing)
    }

    /// Failed or timed-out sources, in source order.
    #[must_use]
    pub fn failed_sources(&self) -> Vec<SourceType> {
        self.outcomes()
            .filter(|outcome| outcome.is_failure())
            .map(SourceOutcome::source)
            .collect()
    }

    /// The first retained cause among failed sources, in source order.
    #[must_use]
    pub fn first_failure_cause(&self) -> Option<OutcomeCause> {
        self.outcomes()
            .filter(|outcome| outcome.is_failure())
            .find_map(|outcome| outcome.error().cloned())
    }

    /// Derives the aggregation status implied by the outcomes.
    #[must_use]
    pub fn aggregation_status(&self) -> AggregationStatus {
        if self.has_failures() {
            AggregationStatus::Failed
        } else if self.has_missing_data() {
            AggregationStatus::Partial
        } else {
            AggregationStatus::Completed
        }
    }
}
