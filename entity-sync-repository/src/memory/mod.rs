//! In-memory implementations of the record store and search index.
//!
//! Used by the test suites and by local runs without PostgreSQL or
//! OpenSearch. Each fake can be switched off to simulate an unavailable
//! backend.

mod record_store;
mod search_index;

pub use record_store::InMemoryRecordStore;
pub use search_index::InMemorySearchIndex;
