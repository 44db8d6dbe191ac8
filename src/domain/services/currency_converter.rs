//! # Currency Converter
//!
//! Converts amounts between currencies using a static rate table loaded once
//! at startup.
//!
//! Lookup order for `from -> to`:
//!
//! 1. identical codes (case-insensitive): rate `1.0000`
//! 2. a direct `from:to` rate
//! 3. the inverse of a non-zero `to:from` rate, computed at 8 decimals
//!
//! Anything else is a [`ConversionError::MissingRate`], which is a
//! configuration defect and never retried.
//!
//! # Examples
//!
//! ```
//! use asset_aggregator::domain::services::currency_converter::{CurrencyConverter, RateTable};
//! use rust_decimal::Decimal;
//!
//! let table = RateTable::from_pairs([("USD:TWD", Decimal::new(32, 0))]).unwrap();
//! let converter = CurrencyConverter::new(table);
//!
//! let result = converter.convert(Decimal::new(100, 0), "usd", "TWD").unwrap();
//! assert_eq!(result.converted_amount, Decimal::new(320000, 2));
//! ```

use crate::domain::value_objects::money::{
    INVERSE_RATE_SCALE, normalize_currency, round_amount, round_half_up, round_rate, unit_rate,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by rate-table loading and conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// Neither a direct nor an invertible inverse rate is configured.
    #[error("Missing conversion rate for {from} -> {to}")]
    MissingRate {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },

    /// The converted amount does not fit a decimal.
    #[error("conversion overflow for {from} -> {to}")]
    Overflow {
        /// Source currency.
        from: String,
        /// Target currency.
        to: String,
    },

    /// A rate key is neither `FROM:TO` nor a six-letter pair.
    #[error("unparseable rate key: '{0}'")]
    InvalidRateKey(String),

    /// A configured rate is zero or negative.
    #[error("rate for {pair} must be positive, got {rate}")]
    NonPositiveRate {
        /// Normalised pair key.
        pair: String,
        /// Offending rate.
        rate: Decimal,
    },
}

impl ConversionError {
    /// Creates a missing rate error.
    #[must_use]
    pub fn missing_rate(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::MissingRate {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Returns true for a missing rate.
    #[must_use]
    pub fn is_missing_rate(&self) -> bool {
        matches!(self, Self::MissingRate { .. })
    }
}

/// Outcome of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionResult {
    /// Converted amount, 2 dp half-up.
    pub converted_amount: Decimal,
    /// Applied rate, 4 dp half-up.
    pub exchange_rate: Decimal,
}

/// Read-only mapping of ordered currency pairs to rates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateTable {
    rates: HashMap<(String, String), Decimal>,
}

impl RateTable {
    /// Builds a table from raw `(key, rate)` pairs.
    ///
    /// Keys are tolerant of case and surrounding whitespace: `"usd : twd"`,
    /// `"USD:TWD"`, `"USD_TWD"` and `"usdtwd"` all name the same pair.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRateKey` for an unparseable key and
    /// `NonPositiveRate` for a rate that is not strictly positive.
    pub fn from_pairs<K, I>(pairs: I) -> Result<Self, ConversionError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, Decimal)>,
    {
        let mut rates = HashMap::new();
        for (key, rate) in pairs {
            let key = key.as_ref();
            let pair =
                parse_pair(key).ok_or_else(|| ConversionError::InvalidRateKey(key.to_string()))?;
            if rate <= Decimal::ZERO {
                return Err(ConversionError::NonPositiveRate {
                    pair: format!("{}:{}", pair.0, pair.1),
                    rate,
                });
            }
            rates.insert(pair, rate);
        }
        Ok(Self { rates })
    }

    /// Returns the direct rate for `from -> to`.
    #[must_use]
    pub fn rate(&self, from: &str, to: &str) -> Option<Decimal> {
        self.rates
            .get(&(from.to_string(), to.to_string()))
            .copied()
    }

    /// Number of configured pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if no rates are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn parse_pair(raw: &str) -> Option<(String, String)> {
    let upper = raw.trim().to_ascii_uppercase();
    if let Some((from, to)) = upper.split_once(':') {
        let from = normalize_currency(from)?;
        let to = normalize_currency(to)?;
        return Some((from, to));
    }
    let sanitized: String = upper.chars().filter(char::is_ascii_alphanumeric).collect();
    if sanitized.len() == 6 {
        let (from, to) = sanitized.split_at(3);
        return Some((from.to_string(), to.to_string()));
    }
    None
}

/// Stateless converter over a [`RateTable`].
#[derive(Debug, Clone, Default)]
pub struct CurrencyConverter {
    table: RateTable,
}

impl CurrencyConverter {
    /// Creates a converter.
    #[must_use]
    pub fn new(table: RateTable) -> Self {
        Self { table }
    }

    /// Returns the rate table.
    #[must_use]
    pub fn table(&self) -> &RateTable {
        &self.table
    }

    /// Converts `amount` from `from` into `to`.
    ///
    /// The amount is multiplied by the unrounded rate; only the outputs are
    /// rounded.
    ///
    /// # Errors
    ///
    /// Returns `MissingRate` when no usable rate exists and `Overflow` when
    /// the product does not fit.
    pub fn convert(
        &self,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Result<ConversionResult, ConversionError> {
        let from = normalize_currency(from).unwrap_or_default();
        let to = normalize_currency(to).unwrap_or_default();

        if from == to {
            return Ok(ConversionResult {
                converted_amount: round_amount(amount),
                exchange_rate: unit_rate(),
            });
        }

        let rate = self.resolve_rate(&from, &to).ok_or_else(|| {
            tracing::warn!(
                from = %from,
                to = %to,
                known_pairs = self.table.len(),
                "missing conversion rate"
            );
            ConversionError::missing_rate(&from, &to)
        })?;

        let converted = amount
            .checked_mul(rate)
            .ok_or_else(|| ConversionError::Overflow {
                from: from.clone(),
                to: to.clone(),
            })?;

        Ok(ConversionResult {
            converted_amount: round_amount(converted),
            exchange_rate: round_rate(rate),
        })
    }

    fn resolve_rate(&self, from: &str, to: &str) -> Option<Decimal> {
        if let Some(direct) = self.table.rate(from, to) {
            return Some(direct);
        }
        let inverse = self.table.rate(to, from)?;
        if inverse.is_zero() {
            return None;
        }
        Decimal::ONE
            .checked_div(inverse)
            .map(|rate| round_half_up(rate, INVERSE_RATE_SCALE))
    }
}
