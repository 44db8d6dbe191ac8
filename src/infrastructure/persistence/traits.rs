//! # Repository Traits
//!
//! Port definitions for persistence abstraction.
//!
//! # Available Stores
//!
//! - [`RawDocumentStore`]: append-only store for raw source payloads
//! - [`SnapshotStore`]: one aggregated snapshot per customer
//!
//! Every [`RepositoryError`] is treated as a transient persistence failure
//! by the durable-write retrier.
//!
//! # Examples
//!
//! ```ignore
//! use asset_aggregator::infrastructure::persistence::traits::SnapshotStore;
//!
//! async fn latest_total(store: &impl SnapshotStore, customer: &CustomerId) {
//!     if let Some(snapshot) = store.find_by_customer_id(customer).await.unwrap() {
//!         println!("total = {}", snapshot.total_asset_value);
//!     }
//! }
//! ```

use crate::domain::entities::{AssetSnapshot, RawAssetDocument};
use crate::domain::value_objects::{CustomerId, DocumentId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    /// Duplicate entity.
    #[error("Duplicate entity: {entity_type} with id {id} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query or write error.
    #[error("Query error: {0}")]
    Query(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RepositoryError {
    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error.
    #[must_use]
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Store for raw per-source documents.
#[async_trait]
pub trait RawDocumentStore: Send + Sync + fmt::Debug {
    /// Persists a document and returns it with its generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn save(&self, document: RawAssetDocument) -> RepositoryResult<RawAssetDocument>;

    /// Gets a document by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn get(&self, id: &DocumentId) -> RepositoryResult<Option<RawAssetDocument>>;

    /// Lists the documents stored for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> RepositoryResult<Vec<RawAssetDocument>>;

    /// Counts all stored documents.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn count(&self) -> RepositoryResult<u64>;
}

/// Store holding the latest aggregated snapshot per customer.
#[async_trait]
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Finds the snapshot for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the read fails.
    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> RepositoryResult<Option<AssetSnapshot>>;

    /// Inserts or replaces the customer's snapshot.
    ///
    /// An existing snapshot keeps its id; a new one is assigned one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the write fails.
    async fn upsert(&self, snapshot: AssetSnapshot) -> RepositoryResult<AssetSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_predicate() {
        assert!(RepositoryError::duplicate("raw document", "x").is_duplicate());
        assert!(!RepositoryError::connection("refused").is_duplicate());
    }

    #[test]
    fn display_format() {
        let err = RepositoryError::connection("socket closed");
        assert_eq!(err.to_string(), "Connection error: socket closed");
    }
}
