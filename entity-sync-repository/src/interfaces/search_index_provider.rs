//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, in-memory).

use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId};

use crate::errors::SearchIndexError;

/// Abstracts the search index backend holding documents of entity type `E`.
///
/// The index is a mirror of the record store, never a source of truth. A
/// document is the full serialized record, keyed by the record's id.
///
/// # Index Initialization
///
/// Call `ensure_index_exists` during application startup, before any
/// document operation.
#[async_trait]
pub trait SearchIndexProvider<E: Entity>: Send + Sync {
    /// Ensure the search index and any required aliases exist, creating them
    /// if necessary.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Write the document for a stored record, replacing any previous one.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError::IndexError)` - If the record has no id or the
    ///   backend rejects the write
    async fn index_document(&self, record: &E) -> Result<(), SearchIndexError>;

    /// Remove the document for `id`.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_document(&self, id: EntityId) -> Result<(), SearchIndexError>;

    /// Return every document matching a free-text query.
    async fn search(&self, query: &str) -> Result<Vec<E>, SearchIndexError>;

    /// Remove every document from the index.
    async fn clear(&self) -> Result<(), SearchIndexError>;
}
