//! Interface definitions for the record store and the search index.
//!
//! Both traits are generic over the entity type and object safe, so the sync
//! core holds them as `Arc<dyn ...>` and tests swap in in-memory fakes.

mod record_store;
mod search_index_provider;

pub use record_store::RecordStore;
pub use search_index_provider::SearchIndexProvider;
