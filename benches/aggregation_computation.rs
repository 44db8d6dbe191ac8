//! Benchmarks for the computation stage.

#![allow(clippy::unwrap_used, missing_docs)]

use asset_aggregator::application::services::AggregationComputation;
use asset_aggregator::domain::entities::{ExecutionSummary, SourceOutcome, SuccessDetails};
use asset_aggregator::domain::services::{CurrencyConverter, RateTable};
use asset_aggregator::domain::value_objects::payload::PayloadMap;
use asset_aggregator::domain::value_objects::{
    CurrencyAmount, CustomerId, DocumentId, SourceType, Timestamp, TraceId,
};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use serde_json::json;
use std::hint::black_box;

fn items(source: SourceType, count: usize) -> Vec<PayloadMap> {
    (0..count)
        .filter_map(|i| {
            let currency = if i % 3 == 0 { "USD" } else { "TWD" };
            let item = match source {
                SourceType::Bank => {
                    json!({"accountId": format!("A{i}"), "balance": 1000 + i, "currency": currency})
                }
                SourceType::Securities => json!({
                    "symbol": format!("S{i}"),
                    "marketValue": format!("{}.25", 500 + i),
                    "holdings": 10,
                    "currency": currency
                }),
                SourceType::Insurance => json!({
                    "policyNumber": format!("P{i}"),
                    "coverage": 100_000,
                    "currency": currency
                }),
            };
            item.as_object().cloned()
        })
        .collect()
}

fn summary(items_per_source: usize) -> ExecutionSummary {
    let outcomes = SourceType::ALL.into_iter().map(|source| {
        SourceOutcome::success(
            source,
            SuccessDetails {
                amount: Decimal::new(1_000_000, 0),
                currency: "TWD".to_string(),
                fetched_at: Timestamp::now(),
                raw_trace_id: TraceId::new("bench").unwrap(),
                reference_id: DocumentId::generate(),
                payload: json!({}),
                currency_summary: vec![
                    CurrencyAmount::new("TWD", Decimal::new(900_000, 0)),
                    CurrencyAmount::new("USD", Decimal::new(3_125, 0)),
                ],
                asset_details: items(source, items_per_source),
            },
        )
    });
    ExecutionSummary::new(outcomes).unwrap()
}

fn bench_compute(c: &mut Criterion) {
    let rates = RateTable::from_pairs([("USD:TWD", Decimal::new(3200, 2))]).unwrap();
    let computation = AggregationComputation::new(CurrencyConverter::new(rates), "TWD").unwrap();
    let customer = CustomerId::new("C001").unwrap();
    let trace = TraceId::new("bench").unwrap();

    let mut group = c.benchmark_group("compute");
    for size in [1_usize, 10, 100] {
        let summary = summary(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &summary, |b, summary| {
            b.iter(|| {
                computation
                    .compute(black_box(&customer), black_box(&trace), black_box(summary))
                    .unwrap()
            });
        });
    }
    group.finish();
}

fn bench_convert(c: &mut Criterion) {
    let rates = RateTable::from_pairs([("TWD:USD", Decimal::new(3125, 5))]).unwrap();
    let converter = CurrencyConverter::new(rates);
    let amount = Decimal::new(123_456_789, 2);

    c.bench_function("convert_inverse", |b| {
        b.iter(|| converter.convert(black_box(amount), "USD", "TWD").unwrap());
    });
}

criterion_group!(benches, bench_compute, bench_convert);
criterion_main!(benches);
