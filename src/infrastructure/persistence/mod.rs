//! # Persistence Layer
//!
//! Store ports and their in-memory implementations.
//!
//! ## Ports
//!
//! - [`RawDocumentStore`]: raw source payloads
//! - [`SnapshotStore`]: latest aggregated snapshot per customer
//!
//! ## Implementations
//!
//! - `in_memory`: `Arc<RwLock<HashMap>>`-backed stores

pub mod in_memory;
pub mod traits;

pub use traits::{RawDocumentStore, RepositoryError, RepositoryResult, SnapshotStore};
