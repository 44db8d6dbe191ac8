//! # Configuration
//!
//! Layered settings loaded with the `config` crate, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed `ASSETS`, nested with `__`
//!    (e.g. `ASSETS__AGGREGATION__TIMEOUT_MS=5000`)
//!
//! Rates are keyed `"FROM:TO"`; quote them in TOML and prefer string values
//! to keep decimals exact:
//!
//! ```toml
//! [currency.rates]
//! "USD:TWD" = "32.00"
//! ```

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::retry::RetryConfig;
use crate::domain::services::RateTable;
use crate::domain::value_objects::money::normalize_currency;
use config::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ASSETS";

/// Aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Currency every amount is normalised into.
    pub base_currency: String,
    /// Shared per-source fetch timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            base_currency: "TWD".to_string(),
            timeout_ms: 3000,
        }
    }
}

/// Raw write retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteRetrySettings {
    /// Total attempts, at least one.
    pub max_attempts: u32,
    /// Fixed pause between attempts in milliseconds.
    pub backoff_ms: u64,
}

impl Default for WriteRetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 100,
        }
    }
}

/// Conversion rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencySettings {
    /// `"FROM:TO"` to rate.
    pub rates: HashMap<String, Decimal>,
}

/// Downstream source endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Bank service base URL.
    pub bank_base_url: String,
    /// Securities service base URL.
    pub securities_base_url: String,
    /// Insurance service base URL.
    pub insurance_base_url: String,
    /// HTTP client timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            bank_base_url: "http://localhost:8081".to_string(),
            securities_base_url: "http://localhost:8082".to_string(),
            insurance_base_url: "http://localhost:8083".to_string(),
            request_timeout_ms: 2000,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of text.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Aggregation settings.
    pub aggregation: AggregationSettings,
    /// Raw write retry policy.
    pub write_retry: WriteRetrySettings,
    /// Conversion rates.
    pub currency: CurrencySettings,
    /// Source endpoints.
    pub sources: SourceSettings,
    /// Logging.
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads and validates configuration.
    ///
    /// A `path` that does not exist is an error; pass `None` to skip the
    /// file layer.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if a source cannot be read
    /// or the merged settings are invalid.
    pub fn load(path: Option<&Path>) -> ApplicationResult<Self> {
        let defaults = Config::try_from(&Self::default()).map_err(config_error)?;
        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the rest of the crate relies on.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` describing the first
    /// violation.
    pub fn validate(&self) -> ApplicationResult<()> {
        if normalize_currency(&self.aggregation.base_currency).is_none() {
            return Err(ApplicationError::configuration(
                "aggregation.base_currency must not be blank",
            ));
        }
        if self.aggregation.timeout_ms == 0 {
            return Err(ApplicationError::configuration(
                "aggregation.timeout_ms must be positive",
            ));
        }
        if self.sources.request_timeout_ms == 0 {
            return Err(ApplicationError::configuration(
                "sources.request_timeout_ms must be positive",
            ));
        }
        self.retry_config()?;
        self.rate_table()?;
        Ok(())
    }

    /// Normalised base currency.
    #[must_use]
    pub fn base_currency(&self) -> String {
        normalize_currency(&self.aggregation.base_currency).unwrap_or_default()
    }

    /// Shared per-source fetch timeout.
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.aggregation.timeout_ms)
    }

    /// Retry policy for raw writes.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` when `max_attempts` is zero.
    pub fn retry_config(&self) -> ApplicationResult<RetryConfig> {
        RetryConfig::new(
            self.write_retry.max_attempts,
            Duration::from_millis(self.write_retry.backoff_ms),
        )
        .map_err(|e| ApplicationError::configuration(format!("write_retry: {e}")))
    }

    /// Parses the configured rates.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` for an unparseable key or a
    /// non-positive rate.
    pub fn rate_table(&self) -> ApplicationResult<RateTable> {
        RateTable::from_pairs(
            self.currency
                .rates
                .iter()
                .map(|(key, rate)| (key.as_str(), *rate)),
        )
        .map_err(ApplicationError::from)
    }
}

fn config_error(error: config::ConfigError) -> ApplicationError {
    ApplicationError::configuration(error.to_string())
}
