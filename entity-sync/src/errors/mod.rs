//! Error types for the sync core.

use entity_sync_repository::{RecordStoreError, SearchIndexError};
use entity_sync_shared::EntityId;
use thiserror::Error;

/// Errors reported by `EntitySyncService` and `QueryRouter`.
///
/// `Store` is fatal and always raised before the search index is touched.
/// `Index` is a partial success: the record store change stands and only
/// the index is behind.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The request is invalid for the operation (e.g. an id on create).
    #[error("Invalid {entity}: {message}")]
    Validation {
        entity: &'static str,
        message: String,
    },

    /// No record with this id exists in the record store.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    /// The record store rejected the operation. Nothing was changed.
    #[error("Record store error: {0}")]
    Store(#[from] RecordStoreError),

    /// The record store write for `id` succeeded but the index write did not.
    #[error("{entity} {id} was saved but the search index is stale: {source}")]
    Index {
        entity: &'static str,
        id: EntityId,
        #[source]
        source: SearchIndexError,
    },

    /// A read-side or maintenance call on the search index failed.
    #[error("Search on {entity} failed: {source}")]
    Search {
        entity: &'static str,
        #[source]
        source: SearchIndexError,
    },
}

impl SyncError {
    /// Create a validation error.
    pub fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            message: message.into(),
        }
    }

    /// Whether the record store mutation succeeded despite this error.
    pub fn is_partial_success(&self) -> bool {
        matches!(self, Self::Index { .. })
    }
}
