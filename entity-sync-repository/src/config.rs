//! Configuration types for the search index providers.

/// Largest page OpenSearch returns without scrolling (`index.max_result_window`).
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Configuration shared by the search index providers.
///
/// Controls how many documents a single `search` call may return. Both the
/// OpenSearch and the in-memory provider apply the same limit so the two
/// backends answer the same query the same way.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Maximum number of documents returned by one search.
    ///
    /// Set to `None` to return up to `MAX_RESULT_WINDOW` documents.
    /// Defaults to 100 if not specified.
    pub result_limit: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self {
            result_limit: Some(100),
        }
    }
}

impl SearchIndexConfig {
    /// Create a config with no result limit beyond the backend window.
    pub fn unlimited() -> Self {
        Self { result_limit: None }
    }

    /// Create a config with a custom result limit.
    ///
    /// # Arguments
    ///
    /// * `result_limit` - Maximum number of documents returned by one search
    pub fn with_result_limit(result_limit: usize) -> Self {
        Self {
            result_limit: Some(result_limit),
        }
    }

    /// The number of documents to request from the backend.
    pub fn effective_limit(&self) -> usize {
        self.result_limit
            .map_or(MAX_RESULT_WINDOW, |limit| limit.min(MAX_RESULT_WINDOW))
    }
}
