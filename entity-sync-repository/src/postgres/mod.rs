//! PostgreSQL implementation of the record store.
//!
//! All entity types share the `entity_records` table. Each row carries the
//! entity's `COLLECTION` as `entity_type`, the parent reference as a real
//! column so list filters run in SQL, and the remaining fields as `JSONB`.

mod record_store;

pub use record_store::PostgresRecordStore;
pub use sqlx::PgPool;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::errors::RecordStoreError;

/// Open a connection pool to `database_url`.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
) -> Result<sqlx::PgPool, RecordStoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!(max_connections, "Connected to PostgreSQL");
    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), RecordStoreError> {
    sqlx::migrate!("src/postgres/migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
