//! OpenSearch index configuration and mappings.
//!
//! Each entity type gets its own versioned index (`samples_v0`) reached
//! through an alias named after the entity's collection (`samples`).

use entity_sync_shared::Entity;
use serde_json::{json, Value};

/// Configuration for one entity's search index.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// The alias name for the search index (used for all operations).
    pub alias: String,
    /// The version number for the index (e.g., 0 for "samples_v0").
    pub version: u32,
}

impl IndexConfig {
    /// Create a new index configuration.
    ///
    /// # Arguments
    ///
    /// * `alias` - The index alias name
    /// * `version` - The version number
    pub fn new(alias: impl Into<String>, version: u32) -> Self {
        Self {
            alias: alias.into(),
            version,
        }
    }

    /// Index configuration for entity `E`, aliased by its collection name.
    pub fn for_entity<E: Entity>(version: u32) -> Self {
        Self::new(E::COLLECTION, version)
    }

    /// The concrete index behind the alias (e.g. "samples_v0").
    pub fn versioned_index_name(&self) -> String {
        format!("{}_v{}", self.alias, self.version)
    }
}

/// Get the index settings and mappings for an entity index.
///
/// Only `id` is mapped explicitly, as a `long` so `id:<n>` queries and
/// sorting behave numerically. All other fields use dynamic mapping: strings
/// become analysed `text` with a `keyword` sub-field, RFC 3339 strings become
/// `date`.
///
/// The alias is attached at creation time so the index is never reachable
/// without it.
pub fn get_index_settings(alias: &str) -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1
        },
        "mappings": {
            "dynamic": true,
            "properties": {
                "id": {
                    "type": "long"
                }
            }
        },
        "aliases": {
            alias: {}
        }
    })
}
