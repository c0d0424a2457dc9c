//! Error types for the entity sync repository.
//!
//! One error type per adapter, so callers can tell a failed record store
//! write from a failed index write.

mod record_store_error;
mod search_index_error;

pub use record_store_error::RecordStoreError;
pub use search_index_error::SearchIndexError;
