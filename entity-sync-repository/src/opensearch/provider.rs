//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId};
use opensearch::{
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesExistsParts, IndicesPutAliasParts},
    params::Refresh,
    DeleteByQueryParts, DeleteParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Map, Value};
use std::marker::PhantomData;
use tracing::{debug, error, info};
use url::Url;

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::index_config::{get_index_settings, IndexConfig};

/// OpenSearch provider implementation for entity type `E`.
///
/// Writes use `refresh=wait_for`, so a document is searchable as soon as
/// `index_document` returns.
///
/// # Example
///
/// ```ignore
/// use entity_sync_repository::opensearch::IndexConfig;
/// use entity_sync_shared::Sample;
///
/// let provider = OpenSearchProvider::<Sample>::new(
///     "http://localhost:9200",
///     IndexConfig::for_entity::<Sample>(0),
///     SearchIndexConfig::default(),
/// )?;
/// provider.ensure_index_exists().await?;
/// ```
pub struct OpenSearchProvider<E: Entity> {
    client: OpenSearch,
    index_config: IndexConfig,
    config: SearchIndexConfig,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> OpenSearchProvider<E> {
    /// Create a new OpenSearch provider connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    /// * `index_config` - The index configuration containing alias and version
    /// * `config` - Search behaviour shared with the other providers
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub fn new(
        url: &str,
        index_config: IndexConfig,
        config: SearchIndexConfig,
    ) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
            config,
            _entity: PhantomData,
        })
    }

    /// The OpenSearch document id for an entity id.
    fn document_id(id: EntityId) -> String {
        id.to_string()
    }

    /// Build the search request body for a free-text query.
    ///
    /// Blank queries match everything; anything else goes through
    /// `query_string`, so field syntax such as `id:1` or `name:foo` works.
    fn search_body(query: &str, size: usize) -> Value {
        let query = query.trim();
        let clause = if query.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "query_string": { "query": query } })
        };

        json!({
            "query": clause,
            "size": size,
            "sort": [{ "id": { "order": "asc" } }]
        })
    }

    /// Decode the `hits.hits` array of a search response into records.
    fn parse_hits(body: &Value) -> Result<Vec<E>, SearchIndexError> {
        let hits = body["hits"]["hits"]
            .as_array()
            .ok_or_else(|| SearchIndexError::parse("response has no hits array"))?;

        hits.iter()
            .map(|hit| {
                let id = hit["_id"]
                    .as_str()
                    .and_then(|raw| raw.parse::<EntityId>().ok())
                    .ok_or_else(|| {
                        SearchIndexError::parse(format!("hit has invalid _id: {}", hit["_id"]))
                    })?;
                let source: Map<String, Value> = match &hit["_source"] {
                    Value::Object(map) => map.clone(),
                    other => {
                        return Err(SearchIndexError::parse(format!(
                            "hit {} has no _source object: {}",
                            id, other
                        )))
                    }
                };
                E::from_fields(source, id).map_err(|e| SearchIndexError::parse(e.to_string()))
            })
            .collect()
    }

    async fn create_index(&self, index_name: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index_name))
            .body(get_index_settings(&self.index_config.alias))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Index creation failed with status {}: {}",
                status, error_body
            )));
        }

        info!(index = %index_name, alias = %self.index_config.alias, "Created search index");
        Ok(())
    }

    async fn put_alias(&self, index_name: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .put_alias(IndicesPutAliasParts::IndexName(
                &[index_name],
                &self.index_config.alias,
            ))
            .send()
            .await
            .map_err(|e| SearchIndexError::index_creation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Alias creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Alias creation failed with status {}: {}",
                status, error_body
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl<E: Entity> SearchIndexProvider<E> for OpenSearchProvider<E> {
    /// Create the versioned index with its alias, or re-point the alias if
    /// the index already exists.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let index_name = self.index_config.versioned_index_name();

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index_name.as_str()]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => self.put_alias(&index_name).await,
            404 => self.create_index(&index_name).await,
            status => Err(SearchIndexError::index_creation(format!(
                "Unexpected status {} checking index {}",
                status, index_name
            ))),
        }
    }

    async fn index_document(&self, record: &E) -> Result<(), SearchIndexError> {
        let id = record.id().ok_or_else(|| {
            SearchIndexError::index(format!("cannot index an unsaved {}", E::ENTITY_NAME))
        })?;
        let doc_id = Self::document_id(id);
        let doc = Value::Object(record.to_fields()?);

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &doc_id))
            .refresh(Refresh::WaitFor)
            .body(doc)
            .send()
            .await
            .map_err(|e| SearchIndexError::index(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::index(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, entity = E::ENTITY_NAME, "Document indexed");
        Ok(())
    }

    /// Delete a document from the search index.
    ///
    /// If the document doesn't exist, the operation is considered successful.
    async fn delete_document(&self, id: EntityId) -> Result<(), SearchIndexError> {
        let doc_id = Self::document_id(id);

        let response = self
            .client
            .delete(DeleteParts::IndexId(&self.index_config.alias, &doc_id))
            .refresh(Refresh::WaitFor)
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - document may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete request failed");
            return Err(SearchIndexError::delete(format!(
                "Delete failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, entity = E::ENTITY_NAME, "Document deleted");
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<Vec<E>, SearchIndexError> {
        let body = Self::search_body(query, self.config.effective_limit());

        let response = self
            .client
            .search(SearchParts::Index(&[self.index_config.alias.as_str()]))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::query(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::query(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Self::parse_hits(&body)
    }

    async fn clear(&self) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .delete_by_query(DeleteByQueryParts::Index(&[self.index_config.alias.as_str()]))
            .refresh(true)
            .body(json!({ "query": { "match_all": {} } }))
            .send()
            .await
            .map_err(|e| SearchIndexError::delete(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Clear request failed");
            return Err(SearchIndexError::delete(format!(
                "Clear failed with status {}: {}",
                status, error_body
            )));
        }

        info!(alias = %self.index_config.alias, "Search index cleared");
        Ok(())
    }
}
