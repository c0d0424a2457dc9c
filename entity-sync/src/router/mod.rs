//! Read-side routing between the record store and the search index.
//!
//! `get` and `list` are answered by the record store, `search` by the search
//! index. Results from the two sources are never merged.

use entity_sync_repository::{RecordStore, SearchIndexProvider};
use entity_sync_shared::{Entity, EntityId, ListFilter};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::errors::SyncError;

/// Routes read operations for entity type `E` to the right backend.
pub struct QueryRouter<E: Entity> {
    store: Arc<dyn RecordStore<E>>,
    index: Arc<dyn SearchIndexProvider<E>>,
}

impl<E: Entity> Clone for QueryRouter<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            index: Arc::clone(&self.index),
        }
    }
}

impl<E: Entity> QueryRouter<E> {
    pub fn new(store: Arc<dyn RecordStore<E>>, index: Arc<dyn SearchIndexProvider<E>>) -> Self {
        Self { store, index }
    }

    /// Fetch one record from the record store.
    ///
    /// # Returns
    ///
    /// * `Ok(E)` - The stored record
    /// * `Err(SyncError::NotFound)` - If no record has this id
    /// * `Err(SyncError::Store)` - If the record store fails
    #[instrument(skip(self), fields(entity = E::ENTITY_NAME))]
    pub async fn get(&self, id: EntityId) -> Result<E, SyncError> {
        debug!("Request to get record");

        match self.store.find(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(SyncError::NotFound {
                entity: E::ENTITY_NAME,
                id,
            }),
            Err(e) => {
                warn!(error = %e, "Record store lookup failed");
                Err(e.into())
            }
        }
    }

    /// List records from the record store, ordered by id.
    #[instrument(skip(self), fields(entity = E::ENTITY_NAME))]
    pub async fn list(&self, filter: ListFilter) -> Result<Vec<E>, SyncError> {
        debug!("Request to list records");

        self.store.find_all(filter).await.map_err(|e| {
            warn!(error = %e, "Record store listing failed");
            SyncError::from(e)
        })
    }

    /// Run a free-text query against the search index only.
    #[instrument(skip(self), fields(entity = E::ENTITY_NAME))]
    pub async fn search(&self, query: &str) -> Result<Vec<E>, SyncError> {
        debug!("Request to search records");

        self.index
            .search(query)
            .await
            .map_err(|source| {
                warn!(error = %source, "Search index query failed");
                SyncError::Search {
                    entity: E::ENTITY_NAME,
                    source,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_sync_repository::{InMemoryRecordStore, InMemorySearchIndex};
    use entity_sync_shared::{PaymentMethod, Sample};

    fn router<E: Entity>() -> (
        QueryRouter<E>,
        Arc<InMemoryRecordStore<E>>,
        Arc<InMemorySearchIndex<E>>,
    ) {
        let store = Arc::new(InMemoryRecordStore::new());
        let index = Arc::new(InMemorySearchIndex::new());
        (
            QueryRouter::new(store.clone(), index.clone()),
            store,
            index,
        )
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (router, _, _) = router::<Sample>();

        let result = router.get(1).await;

        assert!(matches!(
            result,
            Err(SyncError::NotFound {
                entity: "sample",
                id: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_get_and_list_read_the_store() {
        let (router, store, _) = router::<PaymentMethod>();
        store.save(PaymentMethod::new("Card", None)).await.unwrap();
        store.save(PaymentMethod::new("Cash", Some(2))).await.unwrap();

        assert_eq!(router.get(2).await.unwrap().name.as_deref(), Some("Cash"));
        assert_eq!(router.list(ListFilter::All).await.unwrap().len(), 2);
        assert_eq!(
            router.list(ListFilter::WithoutParent).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_search_reads_the_index_only() {
        let (router, store, index) = router::<Sample>();
        store.save(Sample::named("only in store")).await.unwrap();
        let mut indexed = Sample::named("only in index");
        indexed.set_id(9);
        index.index_document(&indexed).await.unwrap();

        let results = router.search("only").await.unwrap();

        assert_eq!(results, vec![indexed]);
    }

    #[tokio::test]
    async fn test_search_failure_is_reported() {
        let (router, _, index) = router::<Sample>();
        index.set_available(false);

        let result = router.search("x").await;

        assert!(matches!(result, Err(SyncError::Search { .. })));
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let (router, store, _) = router::<Sample>();
        store.set_available(false);

        assert!(matches!(router.get(1).await, Err(SyncError::Store(_))));
        assert!(matches!(
            router.list(ListFilter::All).await,
            Err(SyncError::Store(_))
        ));
    }
}
