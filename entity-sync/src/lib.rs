//! # Entity Sync
//!
//! CRUD service that keeps a record store and a search index in sync.
//!
//! ## Architecture
//!
//! Every mutation follows the same two-step flow:
//!
//! 1. **Record store**: the authoritative write (PostgreSQL or in-memory)
//! 2. **Search index**: the mirrored document (OpenSearch or in-memory)
//!
//! The store write always completes before the index is touched. A failed
//! store write leaves the index alone; a failed index write is reported but
//! the store write stands.
//!
//! ## Modules
//!
//! - [`sync`]: The sync core, one `EntitySyncService` per entity type
//! - [`router`]: Routes reads to the record store or the search index
//! - [`server`]: Axum routes, handlers and error responses
//! - [`config`]: Configuration and dependency initialization
//! - [`errors`]: Error types for the sync core

pub mod config;
pub mod errors;
pub mod router;
pub mod server;
pub mod sync;

pub use config::{AppConfig, Dependencies};
pub use errors::SyncError;
pub use router::QueryRouter;
pub use sync::EntitySyncService;

use entity_sync_repository::{RecordStoreError, SearchIndexError};
use thiserror::Error;

/// Errors that can occur during service initialization or execution.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Record store setup error.
    #[error("Record store error: {0}")]
    RecordStore(#[from] RecordStoreError),

    /// Search index setup error.
    #[error("Search index error: {0}")]
    SearchIndex(#[from] SearchIndexError),

    /// Server I/O error.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
