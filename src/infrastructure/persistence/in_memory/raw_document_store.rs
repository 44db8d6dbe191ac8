//! # In-Memory Raw Document Store
//!
//! In-memory implementation of [`RawDocumentStore`] for tests and the CLI.

use crate::domain::entities::RawAssetDocument;
use crate::domain::value_objects::{CustomerId, DocumentId};
use crate::infrastructure::persistence::traits::{
    RawDocumentStore, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`RawDocumentStore`].
///
/// Documents are keyed by a generated id.
#[derive(Debug, Clone)]
pub struct InMemoryRawDocumentStore {
    storage: Arc<RwLock<HashMap<DocumentId, RawAssetDocument>>>,
}

impl InMemoryRawDocumentStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of stored documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all documents.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }
}

impl Default for InMemoryRawDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RawDocumentStore for InMemoryRawDocumentStore {
    async fn save(&self, document: RawAssetDocument) -> RepositoryResult<RawAssetDocument> {
        let mut storage = self.storage.write().await;
        let id = match document.id() {
            Some(id) if storage.contains_key(id) => {
                return Err(RepositoryError::duplicate("raw document", id.as_str()));
            }
            Some(id) => id.clone(),
            None => DocumentId::generate(),
        };
        let saved = document.with_id(id.clone());
        storage.insert(id, saved.clone());
        Ok(saved)
    }

    async fn get(&self, id: &DocumentId) -> RepositoryResult<Option<RawAssetDocument>> {
        let storage = self.storage.read().await;
        Ok(storage.get(id).cloned())
    }

    async fn find_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> RepositoryResult<Vec<RawAssetDocument>> {
        let storage = self.storage.read().await;
        let mut found: Vec<RawAssetDocument> = storage
            .values()
            .filter(|doc| doc.customer_id() == customer_id)
            .cloned()
            .collect();
        found.sort_by_key(|doc| (doc.source(), doc.fetched_at()));
        Ok(found)
    }

    async fn count(&self) -> RepositoryResult<u64> {
        let storage = self.storage.read().await;
        Ok(storage.len() as u64)
    }
}
