//! # Raw Asset Document
//!
//! The unmodified payload of one source together with the summary figures
//! the source reported, persisted before any conversion happens.

use crate::domain::value_objects::{
    CurrencyAmount, CustomerId, DocumentId, SourceType, Timestamp, TraceId,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw per-source document.
///
/// `id` is `None` until the document store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssetDocument {
    id: Option<DocumentId>,
    source: SourceType,
    customer_id: CustomerId,
    payload: Value,
    total_amount: Decimal,
    currency: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    currency_summary: Vec<CurrencyAmount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    item_count: Option<usize>,
    fetched_at: Timestamp,
    trace_id: TraceId,
}

impl RawAssetDocument {
    /// Creates an unsaved raw document.
    #[must_use]
    pub fn new(
        source: SourceType,
        customer_id: CustomerId,
        payload: Value,
        total_amount: Decimal,
        currency: impl Into<String>,
        fetched_at: Timestamp,
        trace_id: TraceId,
    ) -> Self {
        Self {
            id: None,
            source,
            customer_id,
            payload,
            total_amount,
            currency: currency.into(),
            currency_summary: Vec::new(),
            item_count: None,
            fetched_at,
            trace_id,
        }
    }

    /// Sets the per-currency sub-totals.
    #[must_use]
    pub fn with_currency_summary(mut self, summary: Vec<CurrencyAmount>) -> Self {
        self.currency_summary = summary;
        self
    }

    /// Sets the number of itemised holdings or policies.
    #[must_use]
    pub fn with_item_count(mut self, count: usize) -> Self {
        self.item_count = Some(count);
        self
    }

    /// Returns a copy carrying the store-assigned id.
    #[must_use]
    pub fn with_id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns the store-assigned id, if saved.
    #[must_use]
    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    /// Returns the source.
    #[inline]
    #[must_use]
    pub fn source(&self) -> SourceType {
        self.source
    }

    /// Returns the customer.
    #[inline]
    #[must_use]
    pub fn customer_id(&self) -> &CustomerId {
        &self.customer_id
    }

    /// Returns the raw payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the reported total.
    #[inline]
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    /// Returns the reported currency.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns the per-currency sub-totals.
    #[inline]
    #[must_use]
    pub fn currency_summary(&self) -> &[CurrencyAmount] {
        &self.currency_summary
    }

    /// Returns the item count, when recorded.
    #[inline]
    #[must_use]
    pub fn item_count(&self) -> Option<usize> {
        self.item_count
    }

    /// Returns the fetch time.
    #[inline]
    #[must_use]
    pub fn fetched_at(&self) -> Timestamp {
        self.fetched_at
    }

    /// Returns the source trace id.
    #[inline]
    #[must_use]
    pub fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn builder_sets_optional_parts() {
        let doc = RawAssetDocument::new(
            SourceType::Bank,
            CustomerId::new("C001").unwrap(),
            json!({"bankAssets": []}),
            dec!(100),
            "TWD",
            Timestamp::now(),
            TraceId::new("t-1").unwrap(),
        )
        .with_currency_summary(vec![CurrencyAmount::new("TWD", dec!(100))]);

        assert!(doc.id().is_none());
        assert_eq!(doc.currency_summary().len(), 1);
        assert_eq!(doc.item_count(), None);

        let saved = doc.with_id(DocumentId::new("abc").unwrap());
        assert_eq!(saved.id().unwrap().as_str(), "abc");
    }

    #[test]
    fn serialises_camel_case_without_empty_parts() {
        let doc = RawAssetDocument::new(
            SourceType::Insurance,
            CustomerId::new("C001").unwrap(),
            json!({}),
            dec!(5),
            "TWD",
            Timestamp::from_millis(0).unwrap(),
            TraceId::new("t-1").unwrap(),
        )
        .with_item_count(2);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["itemCount"], json!(2));
        assert_eq!(value["customerId"], json!("C001"));
        assert!(value.get("currencySummary").is_none());
    }
}
