//! # Application Services
//!
//! The aggregation pipeline, bottom-up:
//!
//! - [`DurableWriteRetrier`]: bounded retries for persistence calls
//! - [`RawAssetWriter`]: persists one source's raw payload
//! - [`AggregationCoordinator`]: concurrent fetch-and-persist over all sources
//! - [`AggregationComputation`]: conversion, breakdown and snapshot
//! - [`AggregationService`]: request entry point and failure gate

pub mod aggregation;
pub mod computation;
pub mod coordinator;
pub mod raw_writer;
pub mod retry;

pub use aggregation::{AggregationService, DEFAULT_FETCH_TIMEOUT};
pub use computation::{AggregationComputation, ComputationOutput};
pub use coordinator::AggregationCoordinator;
pub use raw_writer::RawAssetWriter;
pub use retry::{DurableWriteError, DurableWriteRetrier, RetryConfig};
