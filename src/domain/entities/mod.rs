//! # Domain Entities
//!
//! Records produced while aggregating one customer's assets.
//!
//! ## Per Request
//!
//! - [`SourceOutcome`]: classified result of one source
//! - [`ExecutionSummary`]: one outcome per source after coordination
//!
//! ## Persisted
//!
//! - [`RawAssetDocument`]: unmodified source payload
//! - [`AssetSnapshot`]: latest aggregation per customer
//!
//! ## Returned
//!
//! - [`AggregatedAssetResult`]: response view built from the snapshot

pub mod aggregated_result;
pub mod raw_document;
pub mod source_outcome;

pub use aggregated_result::{
    AggregatedAssetResult, AggregatedComponent, AssetEntry, AssetSnapshot, ComponentParts,
};
pub use raw_document::RawAssetDocument;
pub use source_outcome::{ExecutionSummary, OutcomeCause, SourceOutcome, SuccessDetails};
