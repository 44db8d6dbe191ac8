//! # Raw Asset Writer
//!
//! Persists one source's fetch result as a [`RawAssetDocument`] through the
//! durable-write retrier.

use crate::application::cancellation::CancellationSignal;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::retry::DurableWriteRetrier;
use crate::domain::entities::RawAssetDocument;
use crate::domain::value_objects::money::normalize_currency;
use crate::domain::value_objects::{SourceType, TraceId};
use crate::infrastructure::persistence::RawDocumentStore;
use crate::infrastructure::sources::FetchResult;
use std::sync::Arc;
use tracing::debug;

/// Writes raw documents for a single source.
#[derive(Debug, Clone)]
pub struct RawAssetWriter {
    source: SourceType,
    store: Arc<dyn RawDocumentStore>,
    retrier: DurableWriteRetrier,
}

impl RawAssetWriter {
    /// Creates a writer for `source`.
    #[must_use]
    pub fn new(
        source: SourceType,
        store: Arc<dyn RawDocumentStore>,
        retrier: DurableWriteRetrier,
    ) -> Self {
        Self {
            source,
            store,
            retrier,
        }
    }

    /// Returns the source this writer persists.
    #[must_use]
    pub fn source(&self) -> SourceType {
        self.source
    }

    /// Builds the raw document for a fetch result.
    ///
    /// Bank documents carry the per-currency summary; securities and
    /// insurance documents carry the number of itemised entries.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` if the result has no currency.
    pub fn document_for(
        &self,
        fetched: &FetchResult,
        trace_id: TraceId,
        item_count: usize,
    ) -> ApplicationResult<RawAssetDocument> {
        let currency = normalize_currency(&fetched.currency).ok_or_else(|| {
            ApplicationError::validation(format!("{} result has no currency", self.source))
        })?;
        let document = RawAssetDocument::new(
            self.source,
            fetched.customer_id.clone(),
            fetched.payload.clone(),
            fetched.amount,
            currency,
            fetched.fetched_at,
            trace_id,
        );
        Ok(match self.source {
            SourceType::Bank => document.with_currency_summary(fetched.currency_summary.clone()),
            SourceType::Securities | SourceType::Insurance => document.with_item_count(item_count),
        })
    }

    /// Persists `document`, retrying transient store failures.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::DurableWrite` when retries run out or the
    /// signal fires during backoff.
    pub async fn write(
        &self,
        document: RawAssetDocument,
        signal: &CancellationSignal,
    ) -> ApplicationResult<RawAssetDocument> {
        let context = format!(
            "Failed to persist {} assets for customer {}",
            self.source.path_segment(),
            document.customer_id()
        );
        let saved = self
            .retrier
            .execute_cancellable(&context, signal, || self.store.save(document.clone()))
            .await?;
        debug!(source = %self.source, id = ?saved.id(), "raw document persisted");
        Ok(saved)
    }
}
