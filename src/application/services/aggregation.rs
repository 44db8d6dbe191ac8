//! # Aggregation Service
//!
//! Entry point for one aggregation request.
//!
//! A request moves through validation, coordination, computation and the
//! snapshot upsert. If any source FAILED or timed out the request stops after
//! coordination with [`ApplicationError::AggregationFailed`]; raw documents
//! already written for other sources are kept.
//!
//! # Examples
//!
//! ```ignore
//! let service = AggregationService::new(coordinator, computation, snapshots)
//!     .with_timeout(Duration::from_secs(3));
//! let result = service.aggregate("C001").await?;
//! println!("{} {}", result.total_asset_value(), result.base_currency());
//! ```

use crate::application::cancellation::CancellationSignal;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::computation::AggregationComputation;
use crate::application::services::coordinator::AggregationCoordinator;
use crate::domain::entities::AggregatedAssetResult;
use crate::domain::value_objects::{CustomerId, TraceId};
use crate::infrastructure::metrics::{
    AGGREGATION_LATENCY, AggregationMetrics, STAGING_WRITE_LATENCY,
};
use crate::infrastructure::persistence::SnapshotStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span, warn};

/// Default shared per-source fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(3000);

/// Aggregates a customer's assets across all sources.
#[derive(Debug, Clone)]
pub struct AggregationService {
    coordinator: AggregationCoordinator,
    computation: AggregationComputation,
    snapshots: Arc<dyn SnapshotStore>,
    metrics: AggregationMetrics,
    fetch_timeout: Duration,
}

impl AggregationService {
    /// Creates a service using the coordinator's metrics registry and the
    /// default timeout.
    #[must_use]
    pub fn new(
        coordinator: AggregationCoordinator,
        computation: AggregationComputation,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        let metrics = coordinator.metrics().clone();
        Self {
            coordinator,
            computation,
            snapshots,
            metrics,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Sets the shared per-source fetch timeout.
    #[must_use]
    pub fn with_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Returns the fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    /// Returns the metrics registry.
    #[must_use]
    pub fn metrics(&self) -> &AggregationMetrics {
        &self.metrics
    }

    /// Aggregates `customer_id` under a freshly generated trace id.
    ///
    /// # Errors
    ///
    /// See [`aggregate_cancellable`](Self::aggregate_cancellable).
    pub async fn aggregate(&self, customer_id: &str) -> ApplicationResult<AggregatedAssetResult> {
        self.aggregate_traced(customer_id, None).await
    }

    /// Aggregates `customer_id`, reusing `trace_id` when it is non-blank.
    ///
    /// # Errors
    ///
    /// See [`aggregate_cancellable`](Self::aggregate_cancellable).
    pub async fn aggregate_traced(
        &self,
        customer_id: &str,
        trace_id: Option<&str>,
    ) -> ApplicationResult<AggregatedAssetResult> {
        self.aggregate_cancellable(customer_id, trace_id, &CancellationSignal::new())
            .await
    }

    /// Aggregates `customer_id`; `signal` abandons in-flight fetches and
    /// pending write retries.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank customer id or zero timeout
    /// - `AggregationFailed` if any source FAILED or timed out
    /// - `MissingRate` if a SUCCESS amount cannot be converted
    /// - `Repository` if the snapshot upsert fails
    pub async fn aggregate_cancellable(
        &self,
        customer_id: &str,
        trace_id: Option<&str>,
        signal: &CancellationSignal,
    ) -> ApplicationResult<AggregatedAssetResult> {
        let customer_id = CustomerId::new(customer_id)
            .map_err(|_| ApplicationError::validation("customerId must not be blank"))?;
        let trace_id = TraceId::or_fallback(trace_id, &TraceId::generate());

        let span = info_span!("aggregate", trace_id = %trace_id, customer_id = %customer_id);
        async {
            let started = Instant::now();
            let result = self.run(&customer_id, &trace_id, signal).await;
            self.metrics
                .record_duration(AGGREGATION_LATENCY, started.elapsed());

            match &result {
                Ok(aggregated) => {
                    self.metrics.record_success();
                    info!(
                        status = %aggregated.aggregation_status(),
                        total = %aggregated.total_asset_value(),
                        base_currency = aggregated.base_currency(),
                        "aggregation completed"
                    );
                }
                Err(e) => {
                    self.metrics.record_failure();
                    warn!(
                        failed_sources = ?e.failed_sources(),
                        error = %e,
                        "aggregation failed"
                    );
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        customer_id: &CustomerId,
        trace_id: &TraceId,
        signal: &CancellationSignal,
    ) -> ApplicationResult<AggregatedAssetResult> {
        let summary = self
            .coordinator
            .coordinate_cancellable(customer_id, trace_id, self.fetch_timeout, signal)
            .await?;

        if summary.has_failures() {
            return Err(ApplicationError::unresolved_sources(customer_id, &summary));
        }

        let snapshot = self
            .computation
            .compute(customer_id, trace_id, &summary)?
            .into_snapshot();

        let write_started = Instant::now();
        let stored = self.snapshots.upsert(snapshot).await;
        self.metrics
            .record_duration(STAGING_WRITE_LATENCY, write_started.elapsed());

        Ok(AggregatedAssetResult::from_snapshot(&stored?))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::application::services::retry::{DurableWriteRetrier, RetryConfig};
    use crate::domain::services::{CurrencyConverter, RateTable};
    use crate::domain::value_objects::{AggregationStatus, SourceType};
    use crate::infrastructure::metrics::{AGGREGATION_FAILURE, AGGREGATION_SUCCESS};
    use crate::infrastructure::persistence::in_memory::{
        InMemoryRawDocumentStore, InMemorySnapshotStore,
    };
    use crate::infrastructure::sources::{
        FetchResult, SourceClient, SourceError, SourceFetch, SourceResult,
    };
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct StubSource {
        source: SourceType,
        fail: bool,
        calls: AtomicU32,
    }

    impl StubSource {
        fn new(source: SourceType, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                source,
                fail,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl SourceClient for StubSource {
        fn source(&self) -> SourceType {
            self.source
        }

        async fn fetch(
            &self,
            customer_id: &CustomerId,
            _trace_id: &TraceId,
        ) -> SourceResult<SourceFetch> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SourceError::connection("connection refused"));
            }
            match self.source {
                SourceType::Bank => Ok(SourceFetch::Found(FetchResult::new(
                    customer_id.clone(),
                    json!({"bankAssets": [{"accountId": "A1", "balance": 500000}]}),
                    dec!(500000),
                    "TWD",
                ))),
                _ => Ok(SourceFetch::Missing),
            }
        }
    }

    struct Fixture {
        service: AggregationService,
        snapshots: Arc<InMemorySnapshotStore>,
        bank: Arc<StubSource>,
    }

    fn fixture(fail_securities: bool) -> Fixture {
        let bank = StubSource::new(SourceType::Bank, false);
        let clients: Vec<Arc<dyn SourceClient>> = vec![
            bank.clone(),
            StubSource::new(SourceType::Securities, fail_securities),
            StubSource::new(SourceType::Insurance, false),
        ];
        let coordinator = AggregationCoordinator::new(
            clients,
            Arc::new(InMemoryRawDocumentStore::new()),
            DurableWriteRetrier::new(RetryConfig::new(1, Duration::ZERO).unwrap()),
            AggregationMetrics::new(),
        )
        .unwrap();
        let computation = AggregationComputation::new(
            CurrencyConverter::new(RateTable::default()),
            "TWD",
        )
        .unwrap();
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let service = AggregationService::new(coordinator, computation, snapshots.clone())
            .with_timeout(Duration::from_secs(1));
        Fixture {
            service,
            snapshots,
            bank,
        }
    }

    #[tokio::test]
    async fn partial_result_is_persisted_and_returned() {
        let fixture = fixture(false);

        let result = fixture
            .service
            .aggregate_traced("C001", Some("edge-trace"))
            .await
            .unwrap();

        assert_eq!(result.aggregation_status(), AggregationStatus::Partial);
        assert_eq!(result.total_asset_value(), dec!(500000.00));
        assert_eq!(result.trace_id().as_str(), "edge-trace");

        let stored = fixture
            .snapshots
            .find_by_customer_id(&CustomerId::new("C001").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_asset_value, result.total_asset_value());
        assert_eq!(stored.assets.len(), 1);

        let metrics = fixture.service.metrics();
        assert_eq!(metrics.counter(AGGREGATION_SUCCESS), 1);
        assert_eq!(metrics.timer_count(AGGREGATION_LATENCY), 1);
        assert_eq!(metrics.timer_count(STAGING_WRITE_LATENCY), 1);
    }

    #[tokio::test]
    async fn failed_source_stops_before_persisting() {
        let fixture = fixture(true);

        let err = fixture.service.aggregate("C001").await.unwrap_err();

        assert!(err.is_aggregation_failed());
        assert_eq!(err.failed_sources(), &[SourceType::Securities]);
        assert_eq!(
            err.to_string(),
            "Failed to aggregate assets for customer C001 due to source connection error: connection refused"
        );
        assert!(fixture.snapshots.is_empty());

        let metrics = fixture.service.metrics();
        assert_eq!(metrics.counter(AGGREGATION_FAILURE), 1);
        assert_eq!(metrics.timer_count(AGGREGATION_LATENCY), 1);
        assert_eq!(metrics.timer_count(STAGING_WRITE_LATENCY), 0);
    }

    #[tokio::test]
    async fn blank_customer_is_rejected_before_fetching() {
        let fixture = fixture(false);

        let err = fixture.service.aggregate("   ").await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(fixture.bank.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn blank_trace_id_is_replaced() {
        let fixture = fixture(false);

        let result = fixture
            .service
            .aggregate_traced("C001", Some("  "))
            .await
            .unwrap();

        assert!(!result.trace_id().as_str().trim().is_empty());
    }
}
