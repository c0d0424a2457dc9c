//! # Entity Sync Repository
//!
//! This crate provides the two storage interfaces the sync core depends on:
//! the authoritative `RecordStore` and the secondary `SearchIndexProvider`.
//! It includes error definitions, a PostgreSQL record store, an OpenSearch
//! index provider, and in-memory implementations of both for tests and
//! local runs.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod opensearch;
pub mod postgres;

pub use config::SearchIndexConfig;
pub use errors::{RecordStoreError, SearchIndexError};
pub use interfaces::{RecordStore, SearchIndexProvider};
pub use memory::{InMemoryRecordStore, InMemorySearchIndex};
pub use opensearch::OpenSearchProvider;
pub use postgres::{PgPool, PostgresRecordStore};
