//! Record store error types.

use entity_sync_shared::EntityId;
use thiserror::Error;

/// Errors from record store operations.
///
/// Any of these aborts a sync operation before the search index is touched.
#[derive(Debug, Error)]
pub enum RecordStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// The record payload could not be converted to or from its stored form.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// An update targeted an id the store has never assigned.
    #[error("Record not found: {0}")]
    RecordNotFound(EntityId),

    /// The backend refused the operation (e.g. a test double switched off).
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

impl RecordStoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
