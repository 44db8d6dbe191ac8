//! # Money Helpers
//!
//! Decimal scales and half-up rounding used throughout aggregation, plus
//! currency code normalisation.
//!
//! | quantity | scale |
//! |---|---|
//! | amounts, breakdown values, totals | 2 |
//! | component exchange rates, holdings | 4 |
//! | asset entry exchange rates | 6 |
//! | inverted rates before use | 8 |
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::domain::value_objects::money::round_amount;
//! use rust_decimal::Decimal;
//!
//! assert_eq!(round_amount(Decimal::new(12345, 3)), Decimal::new(1235, 2));
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Scale of monetary amounts.
pub const AMOUNT_SCALE: u32 = 2;

/// Scale of exchange rates reported on components.
pub const RATE_SCALE: u32 = 4;

/// Scale of exchange rates reported on asset entries.
pub const DETAIL_RATE_SCALE: u32 = 6;

/// Scale of security holdings.
pub const HOLDINGS_SCALE: u32 = 4;

/// Precision used when inverting a configured rate.
pub const INVERSE_RATE_SCALE: u32 = 8;

/// Rounds half away from zero and pins the scale, so `1` becomes `1.00`.
#[inline]
#[must_use]
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);
    rounded
}

/// Rounds a monetary amount to two decimals.
#[inline]
#[must_use]
pub fn round_amount(value: Decimal) -> Decimal {
    round_half_up(value, AMOUNT_SCALE)
}

/// Rounds an exchange rate to four decimals.
#[inline]
#[must_use]
pub fn round_rate(value: Decimal) -> Decimal {
    round_half_up(value, RATE_SCALE)
}

/// Zero at amount scale (`0.00`).
#[must_use]
pub fn zero_amount() -> Decimal {
    round_amount(Decimal::ZERO)
}

/// Identity rate at rate scale (`1.0000`).
#[must_use]
pub fn unit_rate() -> Decimal {
    round_rate(Decimal::ONE)
}

/// Adds `amount` to a running sum of `what`.
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if the sum does not fit a decimal.
pub fn checked_sum(sum: Decimal, amount: Decimal, what: &str) -> DomainResult<Decimal> {
    sum.checked_add(amount)
        .ok_or_else(|| DomainError::amount_overflow(what))
}

/// Trims and upper-cases a currency code; `None` when blank.
#[must_use]
pub fn normalize_currency(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_ascii_uppercase())
    }
}

/// An amount tagged with its currency.
///
/// Used both for per-currency sub-totals reported by a source and for the
/// currency breakdown of an aggregated result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyAmount {
    currency: String,
    amount: Decimal,
}

impl CurrencyAmount {
    /// Creates a currency amount; the code is trimmed and upper-cased.
    #[must_use]
    pub fn new(currency: impl AsRef<str>, amount: Decimal) -> Self {
        let currency = currency.as_ref();
        Self {
            currency: normalize_currency(currency).unwrap_or_else(|| currency.to_string()),
            amount,
        }
    }

    /// Returns the currency code.
    #[inline]
    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Returns the amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.amount
    }
}
