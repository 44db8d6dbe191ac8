//! # In-Memory Stores
//!
//! In-memory implementations for tests and local runs.
//!
//! - [`InMemoryRawDocumentStore`]: raw documents keyed by generated id
//! - [`InMemorySnapshotStore`]: snapshots keyed by customer
//!
//! Both use `Arc<RwLock<HashMap>>` for thread-safe access.

pub mod raw_document_store;
pub mod snapshot_store;

pub use raw_document_store::InMemoryRawDocumentStore;
pub use snapshot_store::InMemorySnapshotStore;
