//! # HTTP Source Client
//!
//! [`SourceClient`] implementation for the bank, securities and insurance
//! services.
//!
//! Each service answers `GET {base}/{segment}/customers/{id}/assets` with a
//! JSON document holding an item list, a total, a currency and an optional
//! trace id:
//!
//! | source | items | total |
//! |---|---|---|
//! | BANK | `bankAssets` | `totalBalance` |
//! | SECURITIES | `securitiesAssets` | `totalMarketValue` |
//! | INSURANCE | `insuranceAssets` | `totalCoverage` |
//!
//! A 404 means the service holds no data for the customer.

use crate::domain::value_objects::money::{checked_sum, normalize_currency};
use crate::domain::value_objects::payload::{self, PayloadMap};
use crate::domain::value_objects::{CurrencyAmount, CustomerId, SourceType, Timestamp, TraceId};
use crate::infrastructure::sources::error::{SourceError, SourceResult};
use crate::infrastructure::sources::http_client::HttpClient;
use crate::infrastructure::sources::traits::{FetchResult, SourceClient, SourceFetch};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, instrument};

/// Field holding the source-reported total.
#[must_use]
pub const fn total_field(source: SourceType) -> &'static str {
    match source {
        SourceType::Bank => "totalBalance",
        SourceType::Securities => "totalMarketValue",
        SourceType::Insurance => "totalCoverage",
    }
}

/// HTTP client for one asset source.
#[derive(Debug, Clone)]
pub struct HttpSourceClient {
    source: SourceType,
    base_url: String,
    http: HttpClient,
}

impl HttpSourceClient {
    /// Creates a client for `source` rooted at `base_url`.
    #[must_use]
    pub fn new(source: SourceType, base_url: impl Into<String>, http: HttpClient) -> Self {
        Self {
            source,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Returns the endpoint for `customer_id`.
    #[must_use]
    pub fn endpoint(&self, customer_id: &CustomerId) -> String {
        format!(
            "{}/{}/customers/{}/assets",
            self.base_url,
            self.source.path_segment(),
            customer_id
        )
    }

    fn parse_body(&self, customer_id: &CustomerId, body: Value) -> SourceResult<FetchResult> {
        let Value::Object(root) = &body else {
            return Err(SourceError::invalid_response("response body is not an object"));
        };

        let field = total_field(self.source);
        let amount = payload::decimal_field(root, field)
            .map_err(|e| SourceError::invalid_response(e.to_string()))?
            .ok_or_else(|| SourceError::invalid_response(format!("missing {field}")))?;
        let currency = payload::string_field(root, "currency")
            .and_then(|c| normalize_currency(&c))
            .ok_or_else(|| SourceError::invalid_response("missing currency"))?;
        let owner = payload::string_field(root, "customerId")
            .and_then(|id| CustomerId::new(id).ok())
            .unwrap_or_else(|| customer_id.clone());

        let summary = if self.source == SourceType::Bank {
            let accounts = payload::extract_items(&body, self.source.detail_keys());
            summarize_by_currency(&accounts, &currency)?
        } else {
            Vec::new()
        };

        let mut result = FetchResult::new(owner, body.clone(), amount, currency)
            .with_currency_summary(summary)
            .with_fetched_at(Timestamp::now());
        if let Some(trace) = payload::string_field(root, "traceId") {
            result = result.with_trace_id(trace);
        }
        Ok(result)
    }
}

/// Sums balances per currency in first-seen order.
fn summarize_by_currency(
    accounts: &[PayloadMap],
    default_currency: &str,
) -> SourceResult<Vec<CurrencyAmount>> {
    let mut totals: Vec<(String, Decimal)> = Vec::new();
    for account in accounts {
        let Some(balance) = payload::decimal_field(account, "balance")
            .map_err(|e| SourceError::invalid_response(e.to_string()))?
        else {
            continue;
        };
        let currency = payload::string_field(account, "currency")
            .and_then(|c| normalize_currency(&c))
            .unwrap_or_else(|| default_currency.to_string());
        match totals.iter_mut().find(|(code, _)| *code == currency) {
            Some((_, sum)) => {
                *sum = checked_sum(*sum, balance, &currency)
                    .map_err(|e| SourceError::invalid_response(e.to_string()))?;
            }
            None => totals.push((currency, balance)),
        }
    }
    Ok(totals
        .into_iter()
        .map(|(currency, amount)| CurrencyAmount::new(currency, amount))
        .collect())
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    fn source(&self) -> SourceType {
        self.source
    }

    #[instrument(skip(self), fields(source = %self.source))]
    async fn fetch(
        &self,
        customer_id: &CustomerId,
        trace_id: &TraceId,
    ) -> SourceResult<SourceFetch> {
        let url = self.endpoint(customer_id);
        let Some(body) = self.http.get_optional::<Value>(&url, trace_id).await? else {
            debug!(%url, "source returned 404");
            return Ok(SourceFetch::Missing);
        };
        self.parse_body(customer_id, body).map(SourceFetch::Found)
    }
}
