//! # In-Memory Snapshot Store
//!
//! In-memory implementation of [`SnapshotStore`], keyed by customer.

use crate::domain::entities::AssetSnapshot;
use crate::domain::value_objects::{CustomerId, DocumentId};
use crate::infrastructure::persistence::traits::{RepositoryResult, SnapshotStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct InMemorySnapshotStore {
    storage: Arc<RwLock<HashMap<CustomerId, AssetSnapshot>>>,
}

impl InMemorySnapshotStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the number of customers with a snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.storage
            .try_read()
            .map(|guard| guard.len())
            .unwrap_or(0)
    }

    /// Returns true if no snapshot is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn find_by_customer_id(
        &self,
        customer_id: &CustomerId,
    ) -> RepositoryResult<Option<AssetSnapshot>> {
        let storage = self.storage.read().await;
        Ok(storage.get(customer_id).cloned())
    }

    async fn upsert(&self, mut snapshot: AssetSnapshot) -> RepositoryResult<AssetSnapshot> {
        let mut storage = self.storage.write().await;
        snapshot.id = storage
            .get(&snapshot.customer_id)
            .and_then(|existing| existing.id.clone())
            .or(snapshot.id)
            .or_else(|| Some(DocumentId::generate()));
        storage.insert(snapshot.customer_id.clone(), snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{AggregationStatus, Timestamp, TraceId};
    use rust_decimal_macros::dec;

    fn snapshot(customer: &str, total: rust_decimal::Decimal) -> AssetSnapshot {
        AssetSnapshot {
            id: None,
            customer_id: CustomerId::new(customer).unwrap(),
            base_currency: "TWD".to_string(),
            components: vec![],
            assets: vec![],
            total_asset_value: total,
            currency_breakdown: vec![],
            aggregation_status: AggregationStatus::Completed,
            aggregated_at: Timestamp::now(),
            trace_id: TraceId::new("t").unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id() {
        let store = InMemorySnapshotStore::new();
        let saved = store.upsert(snapshot("C001", dec!(1))).await.unwrap();
        assert!(saved.id.is_some());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_preserves_id_and_overwrites_fields() {
        let store = InMemorySnapshotStore::new();
        let first = store.upsert(snapshot("C001", dec!(1))).await.unwrap();
        let second = store.upsert(snapshot("C001", dec!(2))).await.unwrap();

        assert_eq!(first.id, second.id);
        let stored = store
            .find_by_customer_id(&CustomerId::new("C001").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.total_asset_value, dec!(2));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn customers_are_independent() {
        let store = InMemorySnapshotStore::new();
        let a = store.upsert(snapshot("C001", dec!(1))).await.unwrap();
        let b = store.upsert(snapshot("C002", dec!(1))).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(
            store
                .find_by_customer_id(&CustomerId::new("C003").unwrap())
                .await
                .unwrap()
                .is_none()
        );
    }
}
