//! HTTP source clients against a mock server.

#![allow(clippy::unwrap_used)]

use asset_aggregator::domain::value_objects::{CurrencyAmount, CustomerId, SourceType, TraceId};
use asset_aggregator::infrastructure::sources::{
    HttpClient, HttpSourceClient, SourceClient, SourceError, SourceFetch,
};
use rust_decimal_macros::dec;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, source: SourceType, timeout_ms: u64) -> HttpSourceClient {
    HttpSourceClient::new(source, server.uri(), HttpClient::new(timeout_ms).unwrap())
}

fn customer() -> CustomerId {
    CustomerId::new("C001").unwrap()
}

fn trace() -> TraceId {
    TraceId::new("trace-123").unwrap()
}

#[tokio::test]
async fn bank_assets_are_found_with_trace_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bank/customers/C001/assets"))
        .and(header("X-Trace-Id", "trace-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customerId": "C001",
            "bankAssets": [
                {"accountId": "A1", "balance": 400000, "currency": "TWD"},
                {"accountId": "A2", "balance": "3000", "currency": "USD"}
            ],
            "totalBalance": 496000,
            "currency": "twd",
            "traceId": "bank-side-trace"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client(&server, SourceType::Bank, 1000)
        .fetch(&customer(), &trace())
        .await
        .unwrap();

    let SourceFetch::Found(result) = fetched else {
        unreachable!("bank data should be found");
    };
    assert_eq!(result.amount, dec!(496000));
    assert_eq!(result.currency, "TWD");
    assert_eq!(result.trace_id.as_deref(), Some("bank-side-trace"));
    assert_eq!(
        result.currency_summary,
        vec![
            CurrencyAmount::new("TWD", dec!(400000)),
            CurrencyAmount::new("USD", dec!(3000)),
        ]
    );
}

#[tokio::test]
async fn not_found_is_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/insurance/customers/C001/assets"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetched = client(&server, SourceType::Insurance, 1000)
        .fetch(&customer(), &trace())
        .await
        .unwrap();

    assert!(matches!(fetched, SourceFetch::Missing));
}

#[tokio::test]
async fn server_error_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/securities/customers/C001/assets"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    let err = client(&server, SourceType::Securities, 1000)
        .fetch(&customer(), &trace())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::HttpStatus { status: 500, .. }));
    assert!(err.to_string().contains("database offline"));
}

#[tokio::test]
async fn body_without_total_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/securities/customers/C001/assets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customerId": "C001",
            "currency": "USD"
        })))
        .mount(&server)
        .await;

    let err = client(&server, SourceType::Securities, 1000)
        .fetch(&customer(), &trace())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::InvalidResponse { .. }));
}

#[tokio::test]
async fn slow_server_hits_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"totalCoverage": 1, "currency": "TWD"}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client(&server, SourceType::Insurance, 50)
        .fetch(&customer(), &trace())
        .await
        .unwrap_err();

    assert!(matches!(err, SourceError::Timeout { .. }));
}
