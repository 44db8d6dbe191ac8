//! # Aggregation Computation
//!
//! Turns an [`ExecutionSummary`] into components, a currency breakdown and
//! the persistable [`AssetSnapshot`].
//!
//! Sources are processed in BANK, SECURITIES, INSURANCE order. Only SUCCESS
//! outcomes contribute to the total and the breakdown; every source still
//! gets a component. Intermediate sums keep full precision and are rounded
//! to two decimals when surfaced.
//!
//! A summary holding a FAILED or TIMEOUT outcome is rejected before any
//! snapshot is built. A malformed asset item is skipped with a warning. An
//! unconvertible component amount fails the whole computation.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::{
    AggregatedComponent, AssetEntry, AssetSnapshot, ComponentParts, ExecutionSummary,
    SourceOutcome,
};
use crate::domain::services::{ConversionError, CurrencyConverter};
use crate::domain::errors::DomainResult;
use crate::domain::value_objects::money::{
    DETAIL_RATE_SCALE, HOLDINGS_SCALE, checked_sum, normalize_currency, round_amount,
    round_half_up,
};
use crate::domain::value_objects::payload::{
    PayloadError, PayloadMap, decimal_field, string_field, string_field_any,
};
use crate::domain::value_objects::{
    AggregationStatus, CurrencyAmount, CustomerId, SourceType, Timestamp, TraceId,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single asset item could not be mapped.
#[derive(Debug, Error)]
enum ItemError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

/// Result of one computation.
///
/// Every view is read from the snapshot, so the response and the stored
/// document cannot disagree.
#[derive(Debug, Clone)]
pub struct ComputationOutput {
    snapshot: AssetSnapshot,
}

impl ComputationOutput {
    /// Components in source order.
    #[must_use]
    pub fn components(&self) -> &[AggregatedComponent] {
        &self.snapshot.components
    }

    /// Original-currency sums, 2 dp, first-seen order.
    #[must_use]
    pub fn currency_breakdown(&self) -> &[CurrencyAmount] {
        &self.snapshot.currency_breakdown
    }

    /// Derived status.
    #[must_use]
    pub fn aggregation_status(&self) -> AggregationStatus {
        self.snapshot.aggregation_status
    }

    /// Total in base currency, 2 dp.
    #[must_use]
    pub fn total_asset_value(&self) -> Decimal {
        self.snapshot.total_asset_value
    }

    /// The persistable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &AssetSnapshot {
        &self.snapshot
    }

    /// Consumes the output, returning the snapshot.
    #[must_use]
    pub fn into_snapshot(self) -> AssetSnapshot {
        self.snapshot
    }
}

/// Request-level fields copied onto every asset entry.
struct EntryStamp<'a> {
    customer_id: &'a CustomerId,
    trace_id: &'a TraceId,
    total_asset_value: Decimal,
    aggregation_status: AggregationStatus,
    aggregated_at: Timestamp,
}

/// Insertion-ordered running sums per currency.
#[derive(Debug, Default)]
struct Breakdown {
    sums: Vec<(String, Decimal)>,
}

impl Breakdown {
    fn add(&mut self, currency: &str, amount: Decimal) -> DomainResult<()> {
        let code = normalize_currency(currency).unwrap_or_else(|| currency.to_string());
        match self.sums.iter_mut().find(|(existing, _)| *existing == code) {
            Some((_, sum)) => *sum = checked_sum(*sum, amount, &code)?,
            None => self.sums.push((code, amount)),
        }
        Ok(())
    }

    fn finish(self) -> Vec<CurrencyAmount> {
        self.sums
            .into_iter()
            .map(|(currency, sum)| CurrencyAmount::new(currency, round_amount(sum)))
            .collect()
    }
}

/// Converts outcomes into the aggregated view.
#[derive(Debug, Clone)]
pub struct AggregationComputation {
    converter: CurrencyConverter,
    base_currency: String,
}

impl AggregationComputation {
    /// Creates a computation targeting `base_currency`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` for a blank base currency.
    pub fn new(converter: CurrencyConverter, base_currency: &str) -> ApplicationResult<Self> {
        let base_currency = normalize_currency(base_currency)
            .ok_or_else(|| ApplicationError::configuration("base currency must not be blank"))?;
        Ok(Self {
            converter,
            base_currency,
        })
    }

    /// Returns the base currency.
    #[must_use]
    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Computes components, breakdown, status and the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::AggregationFailed` if any outcome FAILED or
    /// timed out, `ApplicationError::MissingRate` when a SUCCESS component's
    /// currency cannot be converted into base currency, and
    /// `ApplicationError::Domain` if a component violates its invariants or
    /// a sum overflows.
    pub fn compute(
        &self,
        customer_id: &CustomerId,
        trace_id: &TraceId,
        summary: &ExecutionSummary,
    ) -> ApplicationResult<ComputationOutput> {
        if summary.has_failures() {
            return Err(ApplicationError::unresolved_sources(customer_id, summary));
        }
        let aggregated_at = Timestamp::now();
        let aggregation_status = summary.aggregation_status();

        let mut total = Decimal::ZERO;
        let mut breakdown = Breakdown::default();
        let mut components = Vec::with_capacity(SourceType::ALL.len());

        for source in SourceType::ALL {
            let Some(outcome) = summary.outcome(source) else {
                continue;
            };
            let currency = outcome
                .currency()
                .unwrap_or(self.base_currency.as_str())
                .to_string();

            let (amount_in_base, exchange_rate) = if outcome.status().is_success() {
                let conversion =
                    self.converter
                        .convert(outcome.amount(), &currency, &self.base_currency)?;
                total = checked_sum(total, conversion.converted_amount, &self.base_currency)?;
                match (source, outcome.currency_summary()) {
                    (SourceType::Bank, sub_totals) if !sub_totals.is_empty() => {
                        for sub_total in sub_totals {
                            breakdown.add(sub_total.currency(), sub_total.amount())?;
                        }
                    }
                    _ => breakdown.add(&currency, outcome.amount())?,
                }
                (conversion.converted_amount, conversion.exchange_rate)
            } else {
                (Decimal::ZERO, Decimal::ONE)
            };

            let component = AggregatedComponent::new(ComponentParts {
                source,
                status: outcome.status(),
                amount_in_base,
                source_currency: currency,
                exchange_rate,
                raw_trace_id: outcome.raw_trace_id().clone(),
                fetched_at: outcome.fetched_at(),
                asset_details: outcome.asset_details().to_vec(),
                reference_id: outcome.reference_id().cloned(),
            })?;
            debug!(
                trace_id = %trace_id,
                source = %source,
                status = %component.status(),
                amount_in_base = %component.amount_in_base(),
                exchange_rate = %component.exchange_rate(),
                "component computed"
            );
            components.push(component);
        }

        let total_asset_value = round_amount(total);
        let stamp = EntryStamp {
            customer_id,
            trace_id,
            total_asset_value,
            aggregation_status,
            aggregated_at,
        };
        let mut assets = Vec::new();
        for outcome in summary.outcomes().filter(|o| o.status().is_success()) {
            for item in outcome.asset_details() {
                match self.entry(&stamp, outcome, item) {
                    Ok(entry) => assets.push(entry),
                    Err(e) => warn!(
                        trace_id = %trace_id,
                        source = %outcome.source(),
                        error = %e,
                        "skipping malformed asset item"
                    ),
                }
            }
        }

        Ok(ComputationOutput {
            snapshot: AssetSnapshot {
                id: None,
                customer_id: customer_id.clone(),
                base_currency: self.base_currency.clone(),
                components,
                assets,
                total_asset_value,
                currency_breakdown: breakdown.finish(),
                aggregation_status,
                aggregated_at,
                trace_id: trace_id.clone(),
            },
        })
    }

    fn entry(
        &self,
        stamp: &EntryStamp<'_>,
        outcome: &SourceOutcome,
        item: &PayloadMap,
    ) -> Result<AssetEntry, ItemError> {
        let source = outcome.source();
        let currency = string_field(item, "currency")
            .and_then(|code| normalize_currency(&code))
            .unwrap_or_else(|| self.base_currency.clone());
        let amount_field = match source {
            SourceType::Bank => "balance",
            SourceType::Securities => "marketValue",
            SourceType::Insurance => "coverage",
        };
        let amount = decimal_field(item, amount_field)?.map(round_amount);
        let conversion = self.converter.convert(
            amount.unwrap_or(Decimal::ZERO),
            &currency,
            &self.base_currency,
        )?;

        let mut entry = AssetEntry {
            customer_id: stamp.customer_id.clone(),
            source,
            status: outcome.status(),
            asset_name: None,
            asset_type: None,
            currency,
            exchange_rate: round_half_up(conversion.exchange_rate, DETAIL_RATE_SCALE),
            base_currency: self.base_currency.clone(),
            amount_in_base: round_amount(conversion.converted_amount),
            balance: None,
            market_value: None,
            coverage: None,
            policy_number: None,
            policy_type: None,
            premium_status: None,
            risk_level: None,
            symbol: None,
            holdings: None,
            account_id: None,
            fetched_at: outcome.fetched_at(),
            aggregated_at: stamp.aggregated_at,
            trace_id: stamp.trace_id.clone(),
            reference_id: outcome.reference_id().cloned(),
            total_asset_value: stamp.total_asset_value,
            aggregation_status: stamp.aggregation_status,
        };

        match source {
            SourceType::Bank => {
                let account_id = string_field(item, "accountId");
                entry.asset_name.clone_from(&account_id);
                entry.asset_type =
                    Some(string_field(item, "assetType").unwrap_or_else(|| "account".to_string()));
                entry.balance = amount;
                entry.account_id = account_id;
            }
            SourceType::Securities => {
                let symbol = string_field(item, "symbol");
                let security_type = string_field_any(item, &["securityType", "assetType"]);
                entry.asset_name = symbol.clone().or_else(|| security_type.clone());
                entry.asset_type = security_type;
                entry.market_value = amount;
                entry.holdings = decimal_field(item, "holdings")?
                    .map(|holdings| round_half_up(holdings, HOLDINGS_SCALE));
                entry.symbol = symbol;
                entry.risk_level = string_field(item, "riskLevel");
                entry.premium_status = string_field(item, "premiumStatus");
            }
            SourceType::Insurance => {
                let policy_number = string_field_any(item, &["policyNumber", "assetName"]);
                let policy_type = string_field_any(item, &["policyType", "assetType"]);
                entry.asset_name.clone_from(&policy_number);
                entry.asset_type.clone_from(&policy_type);
                entry.coverage = amount;
                entry.policy_number = policy_number;
                entry.policy_type = policy_type;
                entry.premium_status = string_field(item, "premiumStatus");
            }
        }
        Ok(entry)
    }
}
