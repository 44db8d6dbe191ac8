//! # Domain Services
//!
//! - [`currency_converter::CurrencyConverter`]: rate lookup over a static table

pub mod currency_converter;

pub use currency_converter::{ConversionError, ConversionResult, CurrencyConverter, RateTable};
