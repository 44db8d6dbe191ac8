//! # Aggregation Coordinator
//!
//! Fans out to every source concurrently, bounds each fetch by a shared
//! timeout, persists successful payloads and joins the classified outcomes
//! into an [`ExecutionSummary`].
//!
//! A single source's failure never fails coordination: it is captured as a
//! FAILED, TIMEOUT or MISSING outcome. Each source runs in its own task, so a
//! slow source cannot hold up the others beyond the timeout.

use crate::application::cancellation::CancellationSignal;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::raw_writer::RawAssetWriter;
use crate::application::services::retry::DurableWriteRetrier;
use crate::domain::entities::{ExecutionSummary, OutcomeCause, SourceOutcome, SuccessDetails};
use crate::domain::value_objects::payload::extract_items;
use crate::domain::value_objects::{CustomerId, SourceType, TraceId};
use crate::infrastructure::metrics::AggregationMetrics;
use crate::infrastructure::persistence::{RawDocumentStore, RepositoryError};
use crate::infrastructure::sources::{FetchResult, SourceClient, SourceError, SourceFetch};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// A source client paired with the writer for its raw documents.
#[derive(Debug, Clone)]
struct SourceBinding {
    client: Arc<dyn SourceClient>,
    writer: RawAssetWriter,
}

/// Concurrent fetch-and-persist pipeline over all sources.
#[derive(Debug, Clone)]
pub struct AggregationCoordinator {
    bindings: Vec<SourceBinding>,
    metrics: AggregationMetrics,
}

impl AggregationCoordinator {
    /// Creates a coordinator from one client per source.
    ///
    /// All raw documents go to `store` through writers sharing `retrier`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if a source has no client or
    /// more than one.
    pub fn new(
        clients: impl IntoIterator<Item = Arc<dyn SourceClient>>,
        store: Arc<dyn RawDocumentStore>,
        retrier: DurableWriteRetrier,
        metrics: AggregationMetrics,
    ) -> ApplicationResult<Self> {
        let mut by_source: BTreeMap<SourceType, Arc<dyn SourceClient>> = BTreeMap::new();
        for client in clients {
            let source = client.source();
            if by_source.insert(source, client).is_some() {
                return Err(ApplicationError::configuration(format!(
                    "more than one client configured for {source}"
                )));
            }
        }

        let mut bindings = Vec::with_capacity(SourceType::ALL.len());
        for source in SourceType::ALL {
            let client = by_source.remove(&source).ok_or_else(|| {
                ApplicationError::configuration(format!("no client configured for {source}"))
            })?;
            bindings.push(SourceBinding {
                client,
                writer: RawAssetWriter::new(source, Arc::clone(&store), retrier.clone()),
            });
        }

        Ok(Self { bindings, metrics })
    }

    /// Returns the metrics registry outcomes are recorded into.
    #[must_use]
    pub fn metrics(&self) -> &AggregationMetrics {
        &self.metrics
    }

    /// Fetches and persists every source and joins the outcomes.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for a zero timeout. Source
    /// failures are reported as outcomes, not errors.
    pub async fn coordinate(
        &self,
        customer_id: &CustomerId,
        trace_id: &TraceId,
        fetch_timeout: Duration,
    ) -> ApplicationResult<ExecutionSummary> {
        self.coordinate_cancellable(
            customer_id,
            trace_id,
            fetch_timeout,
            &CancellationSignal::new(),
        )
        .await
    }

    /// Like [`coordinate`](Self::coordinate), but sources still fetching when
    /// `signal` fires are abandoned and classified FAILED, and pending write
    /// retries stop at their next backoff.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Validation` for a zero timeout.
    pub async fn coordinate_cancellable(
        &self,
        customer_id: &CustomerId,
        trace_id: &TraceId,
        fetch_timeout: Duration,
        signal: &CancellationSignal,
    ) -> ApplicationResult<ExecutionSummary> {
        if fetch_timeout.is_zero() {
            return Err(ApplicationError::validation("timeout must be positive"));
        }

        let mut handles = Vec::with_capacity(self.bindings.len());
        for binding in &self.bindings {
            let source = binding.client.source();
            let task = SourceTask {
                binding: binding.clone(),
                customer_id: customer_id.clone(),
                trace_id: trace_id.clone(),
                fetch_timeout,
                signal: signal.clone(),
            };
            handles.push((source, tokio::spawn(task.run())));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => SourceOutcome::failed(
                    source,
                    trace_id.clone(),
                    Arc::new(SourceError::internal(format!("{source} task failed: {e}"))),
                ),
            };
            self.record(trace_id, &outcome);
            outcomes.push(outcome);
        }

        Ok(ExecutionSummary::new(outcomes)?)
    }

    fn record(&self, trace_id: &TraceId, outcome: &SourceOutcome) {
        self.metrics.record_raw_write(outcome.source(), outcome.status());
        match outcome.error() {
            Some(cause) => warn!(
                trace_id = %trace_id,
                source = %outcome.source(),
                status = %outcome.status(),
                error = %cause,
                "source outcome"
            ),
            None => info!(
                trace_id = %trace_id,
                source = %outcome.source(),
                status = %outcome.status(),
                amount = %outcome.amount(),
                currency = outcome.currency().unwrap_or_default(),
                reference_id = ?outcome.reference_id(),
                "source outcome"
            ),
        }
    }
}

/// Everything one spawned source task owns.
struct SourceTask {
    binding: SourceBinding,
    customer_id: CustomerId,
    trace_id: TraceId,
    fetch_timeout: Duration,
    signal: CancellationSignal,
}

impl SourceTask {
    async fn run(self) -> SourceOutcome {
        let source = self.binding.client.source();
        let fetch = self.binding.client.fetch(&self.customer_id, &self.trace_id);

        let fetched = tokio::select! {
            biased;
            () = self.signal.cancelled() => {
                let cause = Arc::new(SourceError::Cancelled);
                return SourceOutcome::failed(source, self.trace_id, cause);
            }
            fetched = timeout(self.fetch_timeout, fetch) => fetched,
        };

        match fetched {
            Err(_) => {
                let millis = u64::try_from(self.fetch_timeout.as_millis()).unwrap_or(u64::MAX);
                let cause = SourceError::timeout_with_duration(
                    format!("{source} did not respond within {millis}ms"),
                    millis,
                );
                SourceOutcome::timeout(source, self.trace_id, Arc::new(cause))
            }
            Ok(Err(e)) => SourceOutcome::failed(source, self.trace_id, Arc::new(e)),
            Ok(Ok(SourceFetch::Missing)) => SourceOutcome::missing(source, self.trace_id),
            Ok(Ok(SourceFetch::Found(result))) => {
                persist(&self.binding.writer, result, &self.trace_id, &self.signal).await
            }
        }
    }
}

async fn persist(
    writer: &RawAssetWriter,
    result: FetchResult,
    trace_id: &TraceId,
    signal: &CancellationSignal,
) -> SourceOutcome {
    let source = writer.source();
    let failed = |cause: OutcomeCause| SourceOutcome::failed(source, trace_id.clone(), cause);

    let asset_details = extract_items(&result.payload, source.detail_keys());
    let raw_trace_id = TraceId::or_fallback(result.trace_id.as_deref(), trace_id);

    let document = match writer.document_for(&result, raw_trace_id.clone(), asset_details.len()) {
        Ok(document) => document,
        Err(e) => return failed(Arc::new(e)),
    };
    let currency = document.currency().to_string();

    let saved = match writer.write(document, signal).await {
        Ok(saved) => saved,
        Err(e) => return failed(Arc::new(e)),
    };
    let Some(reference_id) = saved.id().cloned() else {
        return failed(Arc::new(RepositoryError::internal(
            "persisted document has no id",
        )));
    };

    let currency_summary = match source {
        SourceType::Bank => result.currency_summary,
        SourceType::Securities | SourceType::Insurance => Vec::new(),
    };

    SourceOutcome::success(
        source,
        SuccessDetails {
            amount: result.amount,
            currency,
            fetched_at: result.fetched_at,
            raw_trace_id,
            reference_id,
            payload: result.payload,
            currency_summary,
            asset_details,
        },
    )
}
