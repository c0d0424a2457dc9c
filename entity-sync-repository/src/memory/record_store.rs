use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId, ListFilter};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::RecordStoreError;
use crate::interfaces::RecordStore;

struct State<E> {
    records: BTreeMap<EntityId, E>,
    next_id: EntityId,
}

/// Record store backed by an ordered map.
///
/// Ids are assigned sequentially starting at 1 and are never reused.
pub struct InMemoryRecordStore<E: Entity> {
    state: Mutex<State<E>>,
    available: AtomicBool,
}

impl<E: Entity> InMemoryRecordStore<E> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                records: BTreeMap::new(),
                next_id: 1,
            }),
            available: AtomicBool::new(true),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Make every subsequent operation fail with `Unavailable` (or recover).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RecordStoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RecordStoreError::unavailable(format!(
                "in-memory {} store is switched off",
                E::COLLECTION
            )))
        }
    }
}

impl<E: Entity> Default for InMemoryRecordStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for InMemoryRecordStore<E> {
    async fn save(&self, mut record: E) -> Result<E, RecordStoreError> {
        self.check_available()?;
        let mut state = self.state.lock().await;

        let id = match record.id() {
            Some(id) if state.records.contains_key(&id) => id,
            Some(id) => return Err(RecordStoreError::RecordNotFound(id)),
            None => {
                let id = state.next_id;
                state.next_id += 1;
                record.set_id(id);
                id
            }
        };

        state.records.insert(id, record.clone());
        debug!(entity = E::ENTITY_NAME, id, "Record saved in memory");
        Ok(record)
    }

    async fn find(&self, id: EntityId) -> Result<Option<E>, RecordStoreError> {
        self.check_available()?;
        Ok(self.state.lock().await.records.get(&id).cloned())
    }

    async fn find_all(&self, filter: ListFilter) -> Result<Vec<E>, RecordStoreError> {
        self.check_available()?;
        Ok(self
            .state
            .lock()
            .await
            .records
            .values()
            .filter(|record| filter.accepts(*record))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: EntityId) -> Result<(), RecordStoreError> {
        self.check_available()?;
        self.state.lock().await.records.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_sync_shared::{PaymentMethod, Sample};

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryRecordStore::<Sample>::new();

        let first = store.save(Sample::named("A")).await.unwrap();
        let second = store.save(Sample::named("B")).await.unwrap();

        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_save_with_id_replaces_record() {
        let store = InMemoryRecordStore::<Sample>::new();
        let mut saved = store.save(Sample::named("A")).await.unwrap();

        saved.name = Some("B".to_string());
        store.save(saved.clone()).await.unwrap();

        assert_eq!(store.find(1).await.unwrap(), Some(saved));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_is_rejected() {
        let store = InMemoryRecordStore::<Sample>::new();
        let mut record = Sample::named("A");
        record.set_id(99);

        let result = store.save(record).await;

        assert!(matches!(result, Err(RecordStoreError::RecordNotFound(99))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = InMemoryRecordStore::<Sample>::new();
        store.save(Sample::named("A")).await.unwrap();
        store.delete(1).await.unwrap();

        let next = store.save(Sample::named("B")).await.unwrap();

        assert_eq!(next.id(), Some(2));
    }

    #[tokio::test]
    async fn test_delete_absent_id_succeeds() {
        let store = InMemoryRecordStore::<Sample>::new();
        assert!(store.delete(5).await.is_ok());
    }

    #[tokio::test]
    async fn test_find_all_without_parent() {
        let store = InMemoryRecordStore::<PaymentMethod>::new();
        store.save(PaymentMethod::new("Card", None)).await.unwrap();
        store.save(PaymentMethod::new("Cash", Some(4))).await.unwrap();

        let all = store.find_all(ListFilter::All).await.unwrap();
        let orphans = store.find_all(ListFilter::WithoutParent).await.unwrap();

        assert_eq!(all.len(), 2);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].name.as_deref(), Some("Card"));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = InMemoryRecordStore::<Sample>::new();
        store.set_available(false);

        assert!(matches!(
            store.save(Sample::named("A")).await,
            Err(RecordStoreError::Unavailable(_))
        ));
        assert!(store.find(1).await.is_err());

        store.set_available(true);
        assert!(store.save(Sample::named("A")).await.is_ok());
    }
}
