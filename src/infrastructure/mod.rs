//! # Infrastructure Layer
//!
//! Adapters for the asset sources and stores, plus configuration, logging
//! and metrics.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod persistence;
pub mod sources;
