//! # Aggregated Result
//!
//! Per-source components, normalised asset entries, the persisted snapshot
//! and the response projection built from it.
//!
//! The response is always derived from the snapshot so the two views share
//! every computed value.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::money::{round_amount, round_rate, unit_rate, zero_amount};
use crate::domain::value_objects::payload::PayloadMap;
use crate::domain::value_objects::{
    AggregationStatus, ComponentStatus, CurrencyAmount, CustomerId, DocumentId, SourceType,
    Timestamp, TraceId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Inputs for [`AggregatedComponent::new`].
#[derive(Debug, Clone)]
pub struct ComponentParts {
    /// Source of the component.
    pub source: SourceType,
    /// Outcome classification.
    pub status: ComponentStatus,
    /// Amount converted into base currency.
    pub amount_in_base: Decimal,
    /// Currency the source reported in.
    pub source_currency: String,
    /// Rate applied to reach base currency.
    pub exchange_rate: Decimal,
    /// Correlation id reported by the source.
    pub raw_trace_id: TraceId,
    /// When the source data was fetched.
    pub fetched_at: Timestamp,
    /// Itemised entries from the raw payload.
    pub asset_details: Vec<PayloadMap>,
    /// Persisted raw document id.
    pub reference_id: Option<DocumentId>,
}

/// One source's contribution to an aggregated result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedComponent {
    source: SourceType,
    status: ComponentStatus,
    amount_in_base: Decimal,
    source_currency: String,
    exchange_rate: Decimal,
    raw_trace_id: TraceId,
    fetched_at: Timestamp,
    asset_details: Vec<PayloadMap>,
    reference_id: Option<DocumentId>,
}

impl AggregatedComponent {
    /// Builds a component, pinning amount and rate scales.
    ///
    /// Non-SUCCESS components are forced to `0.00` at rate `1.0000` with no
    /// reference id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidComponent` for a SUCCESS component
    /// without a reference id.
    pub fn new(parts: ComponentParts) -> DomainResult<Self> {
        let success = parts.status.is_success();
        if success && parts.reference_id.is_none() {
            return Err(DomainError::invalid_component(format!(
                "{} succeeded without a reference id",
                parts.source
            )));
        }
        let (amount_in_base, exchange_rate, reference_id) = if success {
            (
                round_amount(parts.amount_in_base),
                round_rate(parts.exchange_rate),
                parts.reference_id,
            )
        } else {
            (zero_amount(), unit_rate(), None)
        };
        Ok(Self {
            source: parts.source,
            status: parts.status,
            amount_in_base,
            source_currency: parts.source_currency,
            exchange_rate,
            raw_trace_id: parts.raw_trace_id,
            fetched_at: parts.fetched_at,
            asset_details: parts.asset_details,
            reference_id,
        })
    }

    /// Returns the source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> SourceType {
        self.source
    }

    /// Returns the status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ComponentStatus {
        self.status
    }

    /// Returns the base-currency amount (2 dp).
    #[inline]
    #[must_use]
    pub fn amount_in_base(&self) -> Decimal {
        self.amount_in_base
    }

    /// Returns the source currency.
    #[inline]
    #[must_use]
    pub fn source_currency(&self) -> &str {
        &self.source_currency
    }

    /// Returns the applied exchange rate (4 dp).
    #[inline]
    #[must_use]
    pub fn exchange_rate(&self) -> Decimal {
        self.exchange_rate
    }

    /// Returns the raw trace id.
    #[inline]
    #[must_use]
    pub fn raw_trace_id(&self) -> &TraceId {
        &self.raw_trace_id
    }

    /// Returns the fetch time.
    #[inline]
    #[must_use]
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Returns the itemised asset details.
    #[inline]
    #[must_use]
    pub fn asset_details(&self) -> &[PayloadMap] {
        &self.asset_details
    }

    /// Returns the raw document reference (SUCCESS only).
    #[must_use]
    pub fn reference_id(&self) -> Option<&DocumentId> {
        self.reference_id.as_ref()
    }
}

/// A normalised per-item asset record stored with the snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// Customer the item belongs to.
    pub customer_id: CustomerId,
    /// Source that reported the item.
    pub source: SourceType,
    /// Status of the owning component.
    pub status: ComponentStatus,
    /// Display name: account id, symbol or policy number.
    pub asset_name: Option<String>,
    /// Asset type tag.
    pub asset_type: Option<String>,
    /// Item currency; the base currency when the item names none.
    pub currency: String,
    /// Rate from `currency` to base currency, 6 dp.
    pub exchange_rate: Decimal,
    /// Currency of `amount_in_base`.
    pub base_currency: String,
    /// Item amount converted into base currency, 2 dp.
    pub amount_in_base: Decimal,
    /// Bank account balance, 2 dp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,
    /// Security market value, 2 dp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_value: Option<Decimal>,
    /// Insurance coverage, 2 dp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coverage: Option<Decimal>,
    /// Insurance policy number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_number: Option<String>,
    /// Insurance policy type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_type: Option<String>,
    /// Premium payment status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_status: Option<String>,
    /// Security risk level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,
    /// Security ticker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// Holdings quantity, 4 dp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Decimal>,
    /// Bank account id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// When the source was fetched.
    pub fetched_at: Timestamp,
    /// When the aggregation ran.
    pub aggregated_at: Timestamp,
    /// Request trace id.
    pub trace_id: TraceId,
    /// Raw document the item was read from.
    pub reference_id: Option<DocumentId>,
    /// Total of the whole aggregation, 2 dp.
    pub total_asset_value: Decimal,
    /// Status of the whole aggregation.
    pub aggregation_status: AggregationStatus,
}

/// The latest persisted aggregation for a customer.
///
/// At most one snapshot exists per customer; `id` is assigned by the store
/// on first insert and preserved across updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    /// Store-assigned identity.
    pub id: Option<DocumentId>,
    /// Customer the snapshot belongs to.
    pub customer_id: CustomerId,
    /// Currency every amount was normalised into.
    pub base_currency: String,
    /// Per-source components in source order.
    pub components: Vec<AggregatedComponent>,
    /// Normalised per-item entries.
    pub assets: Vec<AssetEntry>,
    /// Sum of component amounts, 2 dp.
    pub total_asset_value: Decimal,
    /// Original-currency sums, 2 dp, first-seen order.
    pub currency_breakdown: Vec<CurrencyAmount>,
    /// COMPLETED or PARTIAL.
    pub aggregation_status: AggregationStatus,
    /// When the aggregation was computed.
    pub aggregated_at: Timestamp,
    /// Request trace id.
    pub trace_id: TraceId,
}

/// The aggregated view returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedAssetResult {
    customer_id: CustomerId,
    base_currency: String,
    total_asset_value: Decimal,
    currency_breakdown: Vec<CurrencyAmount>,
    components: Vec<AggregatedComponent>,
    aggregation_status: AggregationStatus,
    aggregated_at: Timestamp,
    trace_id: TraceId,
}

impl AggregatedAssetResult {
    /// Projects a snapshot into the response view.
    #[must_use]
    pub fn from_snapshot(snapshot: &AssetSnapshot) -> Self {
        Self {
            customer_id: snapshot.customer_id.clone(),
            base_currency: snapshot.base_currency.clone(),
            total_asset_value: snapshot.total_asset_value,
            currency_breakdown: snapshot.currency_breakdown.clone(),
            components: snapshot.components.clone(),
            aggregation_status: snapshot.aggregation_status,
            aggregated_at: snapshot.aggregated_at,
            trace_id: snapshot.trace_id.clone(),
        }
    }

    /// Returns the customer.
    #[inline]
    #[must_use]
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the base currency.
    #[inline]
    #[must_use]
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Returns the total in base currency (2 dp).
    #[inline]
    #[must_use]
    pub fn total_asset_value(&self) -> Decimal {
        self.total_asset_value
    }

    /// Returns the original-currency breakdown.
    #[inline]
    #[must_use]
    pub fn currency_breakdown(&self) -> &[CurrencyAmount] {
        &self.currency_breakdown
    }

    /// Returns the components in source order.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[AggregatedComponent] {
        &self.components
    }

    /// Returns the component for `source`.
    #[must_use]
    pub fn component(&self, source: SourceType) -> Option<&AggregatedComponent> {
        self.components.iter().find(|c| c.source() == source)
    }

    /// Returns the aggregation status.
    #[inline]
    #[must_use]
    pub fn aggregation_status(&self) -> AggregationStatus {
        self.aggregation_status
    }

    /// Returns when the aggregation was computed.
    #[inline]
    #[must_use]
    pub fn aggregated_at(&self) -> Timestamp {
        self.aggregated_at
    }

    /// Returns the request trace id.
    #[inline]
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }
}
