//! In-process local cache

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::models::{RecordId, RecordKind, SyncRecord};

use super::LocalStore;

type Collections = HashMap<RecordKind, HashMap<RecordId, Value>>;

/// Local cache held entirely in memory. Cloning shares the same storage.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of cached records of one kind
    pub async fn count(&self, kind: RecordKind) -> usize {
        self.collections
            .read()
            .await
            .get(&kind)
            .map_or(0, HashMap::len)
    }
}

impl LocalStore for MemoryStore {
    async fn all<T: SyncRecord>(&self) -> Result<Vec<T>> {
        let collections = self.collections.read().await;
        let Some(records) = collections.get(&T::KIND) else {
            return Ok(Vec::new());
        };
        records
            .values()
            .map(|value| serde_json::from_value::<T>(value.clone()).map_err(Error::from))
            .collect()
    }

    async fn get<T: SyncRecord>(&self, id: &RecordId) -> Result<Option<T>> {
        let collections = self.collections.read().await;
        collections
            .get(&T::KIND)
            .and_then(|records| records.get(id))
            .map(|value| serde_json::from_value::<T>(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    async fn clear(&self, kind: RecordKind) -> Result<()> {
        self.collections.write().await.remove(&kind);
        Ok(())
    }

    async fn bulk_insert<T: SyncRecord>(&self, records: &[T]) -> Result<usize> {
        let encoded = encode_all(records)?;
        let mut collections = self.collections.write().await;
        collections.entry(T::KIND).or_default().extend(encoded);
        Ok(records.len())
    }

    async fn put<T: SyncRecord>(&self, record: &T) -> Result<()> {
        let value = serde_json::to_value(record)?;
        self.collections
            .write()
            .await
            .entry(T::KIND)
            .or_default()
            .insert(record.id().clone(), value);
        Ok(())
    }

    async fn delete(&self, kind: RecordKind, id: &RecordId) -> Result<bool> {
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(&kind)
            .is_some_and(|records| records.remove(id).is_some()))
    }

    async fn replace_all<T: SyncRecord>(&self, records: &[T]) -> Result<usize> {
        // Encode before taking the lock so a bad record leaves the old set intact
        let encoded: HashMap<RecordId, Value> = encode_all(records)?.into_iter().collect();
        let written = encoded.len();
        self.collections.write().await.insert(T::KIND, encoded);
        Ok(written)
    }
}

fn encode_all<T: SyncRecord>(records: &[T]) -> Result<Vec<(RecordId, Value)>> {
    records
        .iter()
        .map(|record| -> Result<(RecordId, Value)> {
            Ok((record.id().clone(), serde_json::to_value(record)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Goal;

    #[tokio::test]
    async fn replace_all_swaps_whole_collection() {
        let store = MemoryStore::new();
        store.put(&Goal::new("old")).await.unwrap();

        let fresh = vec![Goal::new("a"), Goal::new("b")];
        assert_eq!(store.replace_all(&fresh).await.unwrap(), 2);

        let mut titles: Vec<String> = store
            .all::<Goal>()
            .await
            .unwrap()
            .into_iter()
            .map(|goal| goal.title)
            .collect();
        titles.sort();
        assert_eq!(titles, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn replace_all_counts_repeated_ids_once() {
        let store = MemoryStore::new();
        let goal = Goal::new("Draft");

        let written = store.replace_all(&[goal.clone(), goal]).await.unwrap();

        assert_eq!(written, 1);
        assert_eq!(store.count(RecordKind::Goals).await, 1);
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let goal = Goal::new("shared");
        clone.put(&goal).await.unwrap();

        assert_eq!(store.count(RecordKind::Goals).await, 1);
        assert!(store.delete(RecordKind::Goals, &goal.id).await.unwrap());
        assert_eq!(clone.count(RecordKind::Goals).await, 0);
    }
}
