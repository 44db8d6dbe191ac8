//! # Aggregation Metrics
//!
//! In-process counters and latency timers for the aggregation pipeline.
//!
//! Metric names:
//! - `asset.aggregation.raw.write{source,status}`: one per source outcome
//! - `asset.aggregation.success` / `asset.aggregation.failure`
//! - `asset.aggregation.latency`: whole request, success or failure
//! - `asset.aggregation.staging.write.latency`: snapshot upsert
//!
//! The registry is cheap to clone and safe to share across tasks.

use crate::domain::value_objects::{ComponentStatus, SourceType};
use dashmap::DashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Per-source raw write classification counter.
pub const RAW_WRITE: &str = "asset.aggregation.raw.write";
/// Successful aggregations.
pub const AGGREGATION_SUCCESS: &str = "asset.aggregation.success";
/// Failed aggregations.
pub const AGGREGATION_FAILURE: &str = "asset.aggregation.failure";
/// End-to-end aggregation latency.
pub const AGGREGATION_LATENCY: &str = "asset.aggregation.latency";
/// Snapshot upsert latency.
pub const STAGING_WRITE_LATENCY: &str = "asset.aggregation.staging.write.latency";

#[derive(Debug, Default)]
struct TimerStats {
    count: AtomicU64,
    total_micros: AtomicU64,
    max_micros: AtomicU64,
}

#[derive(Debug, Default)]
struct MetricsInner {
    counters: DashMap<String, AtomicU64>,
    timers: DashMap<String, TimerStats>,
}

/// Thread-safe metrics registry.
#[derive(Debug, Clone, Default)]
pub struct AggregationMetrics {
    inner: Arc<MetricsInner>,
}

impl AggregationMetrics {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments a counter by one.
    pub fn increment(&self, key: &str) {
        self.inner
            .counters
            .entry(key.to_string())
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Records one source outcome.
    pub fn record_raw_write(&self, source: SourceType, status: ComponentStatus) {
        self.increment(&raw_write_key(source, status));
    }

    /// Records a successful aggregation.
    pub fn record_success(&self) {
        self.increment(AGGREGATION_SUCCESS);
    }

    /// Records a failed aggregation.
    pub fn record_failure(&self) {
        self.increment(AGGREGATION_FAILURE);
    }

    /// Records one timer sample.
    pub fn record_duration(&self, name: &str, elapsed: Duration) {
        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let stats = self.inner.timers.entry(name.to_string()).or_default();
        stats.count.fetch_add(1, Ordering::Relaxed);
        stats.total_micros.fetch_add(micros, Ordering::Relaxed);
        stats.max_micros.fetch_max(micros, Ordering::Relaxed);
    }

    /// Returns a counter value (zero if never incremented).
    #[must_use]
    pub fn counter(&self, key: &str) -> u64 {
        self.inner
            .counters
            .get(key)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Returns the raw write counter for one source and status.
    #[must_use]
    pub fn raw_write_count(&self, source: SourceType, status: ComponentStatus) -> u64 {
        self.counter(&raw_write_key(source, status))
    }

    /// Returns the number of samples recorded for a timer.
    #[must_use]
    pub fn timer_count(&self, name: &str) -> u64 {
        self.inner
            .timers
            .get(name)
            .map_or(0, |t| t.count.load(Ordering::Relaxed))
    }

    /// Returns the longest sample recorded for a timer.
    #[must_use]
    pub fn timer_max(&self, name: &str) -> Duration {
        self.inner.timers.get(name).map_or(Duration::ZERO, |t| {
            Duration::from_micros(t.max_micros.load(Ordering::Relaxed))
        })
    }

    /// Renders every metric as sorted `name value` lines.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .inner
            .counters
            .iter()
            .map(|entry| format!("{} {}", entry.key(), entry.value().load(Ordering::Relaxed)))
            .collect();
        for entry in &self.inner.timers {
            let stats = entry.value();
            let count = stats.count.load(Ordering::Relaxed);
            let total = stats.total_micros.load(Ordering::Relaxed);
            lines.push(format!("{}_count {count}", entry.key()));
            lines.push(format!("{}_sum_micros {total}", entry.key()));
            lines.push(format!(
                "{}_max_micros {}",
                entry.key(),
                stats.max_micros.load(Ordering::Relaxed)
            ));
        }
        lines.sort();
        lines.into_iter().fold(String::new(), |mut out, line| {
            let _ = writeln!(out, "{line}");
            out
        })
    }
}

fn raw_write_key(source: SourceType, status: ComponentStatus) -> String {
    format!("{RAW_WRITE}{{source={source},status={status}}}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let metrics = AggregationMetrics::new();
        assert_eq!(metrics.counter(AGGREGATION_SUCCESS), 0);
        assert_eq!(
            metrics.raw_write_count(SourceType::Bank, ComponentStatus::Success),
            0
        );
    }

    #[test]
    fn raw_write_counters_are_labelled() {
        let metrics = AggregationMetrics::new();
        metrics.record_raw_write(SourceType::Bank, ComponentStatus::Success);
        metrics.record_raw_write(SourceType::Bank, ComponentStatus::Success);
        metrics.record_raw_write(SourceType::Insurance, ComponentStatus::Missing);

        assert_eq!(
            metrics.raw_write_count(SourceType::Bank, ComponentStatus::Success),
            2
        );
        assert_eq!(
            metrics.raw_write_count(SourceType::Insurance, ComponentStatus::Missing),
            1
        );
        assert_eq!(
            metrics.raw_write_count(SourceType::Insurance, ComponentStatus::Success),
            0
        );
    }

    #[test]
    fn clones_share_state() {
        let metrics = AggregationMetrics::new();
        let clone = metrics.clone();
        clone.record_failure();
        assert_eq!(metrics.counter(AGGREGATION_FAILURE), 1);
    }

    #[test]
    fn timers_track_count_and_max() {
        let metrics = AggregationMetrics::new();
        metrics.record_duration(AGGREGATION_LATENCY, Duration::from_millis(5));
        metrics.record_duration(AGGREGATION_LATENCY, Duration::from_millis(20));

        assert_eq!(metrics.timer_count(AGGREGATION_LATENCY), 2);
        assert_eq!(metrics.timer_max(AGGREGATION_LATENCY), Duration::from_millis(20));
        assert_eq!(metrics.timer_count(STAGING_WRITE_LATENCY), 0);
    }

    #[test]
    fn render_lists_metrics() {
        let metrics = AggregationMetrics::new();
        metrics.record_success();
        metrics.record_duration(STAGING_WRITE_LATENCY, Duration::from_micros(7));
        let text = metrics.render();
        assert!(text.contains("asset.aggregation.success 1"));
        assert!(text.contains("asset.aggregation.staging.write.latency_count 1"));
    }
}
