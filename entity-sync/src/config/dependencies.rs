//! Dependency initialization and wiring.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use entity_sync_repository::opensearch::IndexConfig;
use entity_sync_repository::postgres;
use entity_sync_repository::{
    InMemoryRecordStore, InMemorySearchIndex, OpenSearchProvider, PgPool, PostgresRecordStore,
    RecordStore, SearchIndexConfig, SearchIndexProvider,
};
use entity_sync_shared::{Entity, PaymentMethod, Sample};

use super::{AppConfig, ConnectionMode, IndexBackend, StoreBackend};
use crate::sync::EntitySyncService;
use crate::AppError;

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub samples: Arc<EntitySyncService<Sample>>,
    pub payment_methods: Arc<EntitySyncService<PaymentMethod>>,
}

impl Dependencies {
    /// Connect the configured backends and build one sync service per entity.
    ///
    /// PostgreSQL migrations run before any service is built. OpenSearch
    /// indices are created (or their aliases re-pointed) per entity, retrying
    /// according to the connection mode.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(AppError)` - If a backend cannot be reached (only in fail-fast mode
    ///   for OpenSearch)
    pub async fn new(config: &AppConfig) -> Result<Self, AppError> {
        info!(
            store_backend = ?config.store_backend,
            index_backend = ?config.index_backend,
            connection_mode = ?config.connection_mode,
            retry_interval_secs = config.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let pool = match &config.store_backend {
            StoreBackend::Memory => None,
            StoreBackend::Postgres {
                database_url,
                max_connections,
            } => {
                let pool = postgres::connect(database_url, *max_connections).await?;
                postgres::run_migrations(&pool).await?;
                info!("PostgreSQL connection established and migrations applied");
                Some(pool)
            }
        };

        Ok(Self {
            samples: Arc::new(Self::build_service::<Sample>(config, pool.as_ref()).await?),
            payment_methods: Arc::new(
                Self::build_service::<PaymentMethod>(config, pool.as_ref()).await?,
            ),
        })
    }

    /// Dependencies backed entirely by in-memory adapters.
    pub fn in_memory() -> Self {
        Self {
            samples: Arc::new(EntitySyncService::new(
                Arc::new(InMemoryRecordStore::new()),
                Arc::new(InMemorySearchIndex::new()),
            )),
            payment_methods: Arc::new(EntitySyncService::new(
                Arc::new(InMemoryRecordStore::new()),
                Arc::new(InMemorySearchIndex::new()),
            )),
        }
    }

    async fn build_service<E: Entity>(
        config: &AppConfig,
        pool: Option<&PgPool>,
    ) -> Result<EntitySyncService<E>, AppError> {
        let store: Arc<dyn RecordStore<E>> = match pool {
            Some(pool) => Arc::new(PostgresRecordStore::<E>::new(pool.clone())),
            None => Arc::new(InMemoryRecordStore::<E>::new()),
        };

        let search_config = match config.search_result_limit {
            0 => SearchIndexConfig::unlimited(),
            limit => SearchIndexConfig::with_result_limit(limit),
        };
        let index: Arc<dyn SearchIndexProvider<E>> = match &config.index_backend {
            IndexBackend::Memory => Arc::new(InMemorySearchIndex::<E>::with_config(search_config)),
            IndexBackend::OpenSearch { url } => Arc::new(
                Self::connect_to_opensearch::<E>(
                    url,
                    IndexConfig::for_entity::<E>(config.index_version),
                    search_config,
                    config.connection_mode,
                    config.retry_interval,
                )
                .await?,
            ),
        };

        info!(entity = E::ENTITY_NAME, "Sync service ready");
        Ok(EntitySyncService::new(store, index))
    }

    /// Connect to OpenSearch and ensure the entity's index exists, with retry
    /// logic based on connection mode.
    async fn connect_to_opensearch<E: Entity>(
        url: &str,
        index_config: IndexConfig,
        search_config: SearchIndexConfig,
        mode: ConnectionMode,
        retry_interval: Duration,
    ) -> Result<OpenSearchProvider<E>, AppError> {
        let provider = OpenSearchProvider::<E>::new(url, index_config, search_config)?;

        loop {
            match provider.ensure_index_exists().await {
                Ok(()) => {
                    info!(entity = E::ENTITY_NAME, "OpenSearch index ready");
                    return Ok(provider);
                }
                Err(e) => match mode {
                    ConnectionMode::FailFast => {
                        return Err(AppError::config(format!(
                            "Failed to ensure {} index exists: {}",
                            E::COLLECTION,
                            e
                        )));
                    }
                    ConnectionMode::Retry => {
                        warn!(
                            opensearch_url = %url,
                            entity = E::ENTITY_NAME,
                            error = %e,
                            retry_interval_secs = retry_interval.as_secs(),
                            "Failed to reach OpenSearch, retrying..."
                        );
                        sleep(retry_interval).await;
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity_sync_shared::ListFilter;

    fn memory_config() -> AppConfig {
        AppConfig::from_lookup(|_| None).unwrap()
    }

    #[tokio::test]
    async fn test_memory_backends() {
        let deps = Dependencies::new(&memory_config()).await.unwrap();

        let created = deps.samples.create(Sample::named("A")).await.unwrap();

        assert_eq!(created.id(), Some(1));
        assert_eq!(deps.samples.search("a").await.unwrap(), vec![created]);
        assert!(deps
            .payment_methods
            .list(ListFilter::All)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_fail_fast_on_unreachable_opensearch() {
        let mut config = memory_config();
        config.index_backend = IndexBackend::OpenSearch {
            url: "http://127.0.0.1:1".to_string(),
        };
        config.connection_mode = ConnectionMode::FailFast;

        let result = Dependencies::new(&config).await;

        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
