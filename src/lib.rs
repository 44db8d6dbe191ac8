//! # Asset Aggregator
//!
//! Consolidated view of a customer's assets across bank, securities and
//! insurance sources.
//!
//! Each request fetches the three sources concurrently under a shared
//! timeout, persists every raw payload through a retrying writer, converts
//! successful amounts into one base currency and stores the resulting
//! snapshot. A source with no data makes the result PARTIAL; a source that
//! fails or times out fails the whole request.
//!
//! ## Layers
//!
//! - [`domain`]: value objects, entities and the currency converter
//! - [`application`]: retrier, raw writer, coordinator, computation and the
//!   aggregation service
//! - [`infrastructure`]: HTTP source clients, stores, configuration,
//!   logging and metrics
//!
//! ## Example
//!
//! ```ignore
//! let config = AppConfig::load(None)?;
//! let service = AggregationService::new(coordinator, computation, snapshots)
//!     .with_timeout(config.fetch_timeout());
//! let result = service.aggregate("C001").await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod application;
pub mod domain;
pub mod infrastructure;
