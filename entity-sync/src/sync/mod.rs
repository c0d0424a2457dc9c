//! The entity sync core.
//!
//! Every mutation goes to the record store first and is then mirrored into
//! the search index, one awaited call after the other. A record store
//! failure aborts before the index is touched. An index failure after a
//! successful store write is reported as [`SyncError::Index`] and the store
//! write is kept.

use entity_sync_repository::{RecordStore, RecordStoreError, SearchIndexProvider};
use entity_sync_shared::{Entity, EntityId, ListFilter};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::SyncError;
use crate::router::QueryRouter;

/// Keeps the record store and search index for entity type `E` in step.
pub struct EntitySyncService<E: Entity> {
    store: Arc<dyn RecordStore<E>>,
    index: Arc<dyn SearchIndexProvider<E>>,
    router: QueryRouter<E>,
}

impl<E: Entity> EntitySyncService<E> {
    /// Build a service over the given adapters.
    pub fn new(store: Arc<dyn RecordStore<E>>, index: Arc<dyn SearchIndexProvider<E>>) -> Self {
        let router = QueryRouter::new(Arc::clone(&store), Arc::clone(&index));
        Self {
            store,
            index,
            router,
        }
    }

    /// Persist a new record and index it.
    ///
    /// # Returns
    ///
    /// * `Ok(E)` - The stored record with its assigned id
    /// * `Err(SyncError::Validation)` - If the record already has an id
    /// * `Err(SyncError::Store)` - If the record store write fails
    /// * `Err(SyncError::Index)` - If the record was stored but not indexed
    #[instrument(skip_all, fields(entity = E::ENTITY_NAME))]
    pub async fn create(&self, record: E) -> Result<E, SyncError> {
        debug!(record = ?record, "Request to create record");

        if record.id().is_some() {
            return Err(SyncError::validation(
                E::ENTITY_NAME,
                format!("A new {} cannot already have an ID", E::ENTITY_NAME),
            ));
        }

        self.save_and_index(record).await
    }

    /// Persist changes to an existing record and re-index it.
    ///
    /// A record without an id is created instead.
    ///
    /// # Returns
    ///
    /// * `Ok(E)` - The stored record
    /// * `Err(SyncError::NotFound)` - If the id is unknown to the record store
    /// * `Err(SyncError::Store)` - If the record store write fails
    /// * `Err(SyncError::Index)` - If the record was stored but not re-indexed
    #[instrument(skip_all, fields(entity = E::ENTITY_NAME))]
    pub async fn update(&self, record: E) -> Result<E, SyncError> {
        debug!(record = ?record, "Request to update record");

        if record.id().is_none() {
            return self.create(record).await;
        }

        self.save_and_index(record).await
    }

    /// Remove a record from the record store, then its index document.
    ///
    /// Deleting an id that does not exist succeeds.
    #[instrument(skip(self), fields(entity = E::ENTITY_NAME))]
    pub async fn delete(&self, id: EntityId) -> Result<(), SyncError> {
        debug!("Request to delete record");

        self.store.delete(id).await.map_err(|e| {
            warn!(error = %e, "Record store delete failed, index left untouched");
            SyncError::from(e)
        })?;

        self.index.delete_document(id).await.map_err(|source| {
            error!(error = %source, "Record deleted but index document was not removed");
            SyncError::Index {
                entity: E::ENTITY_NAME,
                id,
                source,
            }
        })?;

        info!("Record deleted");
        Ok(())
    }

    pub async fn get(&self, id: EntityId) -> Result<E, SyncError> {
        self.router.get(id).await
    }

    pub async fn list(&self, filter: ListFilter) -> Result<Vec<E>, SyncError> {
        self.router.list(filter).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<E>, SyncError> {
        self.router.search(query).await
    }

    /// Remove every document from the search index. The record store is not
    /// touched.
    #[instrument(skip(self), fields(entity = E::ENTITY_NAME))]
    pub async fn clear_index(&self) -> Result<(), SyncError> {
        self.index.clear().await.map_err(|source| {
            warn!(error = %source, "Clearing the search index failed");
            SyncError::Search {
                entity: E::ENTITY_NAME,
                source,
            }
        })
    }

    async fn save_and_index(&self, record: E) -> Result<E, SyncError> {
        let saved = self.store.save(record).await.map_err(|e| {
            warn!(error = %e, "Record store write failed, index left untouched");
            match e {
                RecordStoreError::RecordNotFound(id) => SyncError::NotFound {
                    entity: E::ENTITY_NAME,
                    id,
                },
                other => SyncError::Store(other),
            }
        })?;

        if let Err(source) = self.index.index_document(&saved).await {
            let id = saved.id().unwrap_or_default();
            error!(id, error = %source, "Record stored but indexing failed");
            return Err(SyncError::Index {
                entity: E::ENTITY_NAME,
                id,
                source,
            });
        }

        info!(id = saved.id(), "Record saved and indexed");
        Ok(saved)
    }
}
