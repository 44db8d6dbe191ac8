//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`CustomerId`], [`TraceId`], [`DocumentId`]: non-blank string identifiers
//!
//! ## Numeric Helpers
//!
//! - [`money`]: half-up rounding at the scales used by aggregation
//!
//! ## Domain Enums
//!
//! - [`SourceType`]: BANK, SECURITIES, INSURANCE
//! - [`ComponentStatus`]: per-source outcome
//! - [`AggregationStatus`]: overall outcome
//!
//! ## Payloads
//!
//! - [`payload`]: lookups over raw JSON source payloads

pub mod enums;
pub mod ids;
pub mod money;
pub mod payload;
pub mod timestamp;

pub use enums::{AggregationStatus, ComponentStatus, SourceType};
pub use ids::{CustomerId, DocumentId, TraceId};
pub use money::CurrencyAmount;
pub use timestamp::Timestamp;
