//! Record store trait definition.

use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId, ListFilter};

use crate::errors::RecordStoreError;

/// The authoritative store for records of entity type `E`.
///
/// Implementations own identifier assignment: `save` on a record without an
/// id allocates one, and no other operation ever changes an id.
#[async_trait]
pub trait RecordStore<E: Entity>: Send + Sync {
    /// Persist a record and return it as stored.
    ///
    /// # Returns
    ///
    /// * `Ok(E)` - The stored record, with its id assigned if it had none
    /// * `Err(RecordStoreError::RecordNotFound)` - If the record carries an id
    ///   the store does not hold
    /// * `Err(RecordStoreError)` - If the backend fails
    async fn save(&self, record: E) -> Result<E, RecordStoreError>;

    /// Look up a record by id. Absence is `Ok(None)`, not an error.
    async fn find(&self, id: EntityId) -> Result<Option<E>, RecordStoreError>;

    /// Return every record passing `filter`, ordered by ascending id.
    async fn find_all(&self, filter: ListFilter) -> Result<Vec<E>, RecordStoreError>;

    /// Remove a record. Removing an absent id succeeds.
    async fn delete(&self, id: EntityId) -> Result<(), RecordStoreError>;
}
