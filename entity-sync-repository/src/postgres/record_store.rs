use async_trait::async_trait;
use entity_sync_shared::{Entity, EntityId, ListFilter};
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use crate::errors::RecordStoreError;
use crate::interfaces::RecordStore;

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    data: Value,
}

impl RecordRow {
    fn into_record<E: Entity>(self) -> Result<E, RecordStoreError> {
        let mut record: E = serde_json::from_value(self.data)?;
        record.set_id(self.id);
        Ok(record)
    }
}

/// PostgreSQL-backed record store for entity type `E`.
///
/// Ids come from the table's `BIGSERIAL` sequence, which is shared by all
/// entity types, so an id is unique across the whole table.
pub struct PostgresRecordStore<E: Entity> {
    pool: sqlx::PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> PostgresRecordStore<E> {
    /// Creates a new PostgreSQL record store.
    ///
    /// # Arguments
    ///
    /// * `pool` - Connection pool on a database with the `entity_records` migration applied
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    /// The JSONB payload stored for a record. The id lives in its own column.
    fn payload(record: &E) -> Result<Value, RecordStoreError> {
        let mut fields = record.to_fields()?;
        fields.remove("id");
        Ok(Value::Object(fields))
    }

    async fn insert(&self, mut record: E) -> Result<E, RecordStoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO entity_records (entity_type, parent_id, data)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(E::COLLECTION)
        .bind(record.parent_id())
        .bind(Self::payload(&record)?)
        .fetch_one(&self.pool)
        .await?;

        record.set_id(id);
        debug!(entity = E::ENTITY_NAME, id, "Record inserted");
        Ok(record)
    }

    async fn replace(&self, id: EntityId, record: E) -> Result<E, RecordStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE entity_records
            SET parent_id = $1, data = $2, updated_at = now()
            WHERE entity_type = $3 AND id = $4
            "#,
        )
        .bind(record.parent_id())
        .bind(Self::payload(&record)?)
        .bind(E::COLLECTION)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RecordStoreError::RecordNotFound(id));
        }

        debug!(entity = E::ENTITY_NAME, id, "Record updated");
        Ok(record)
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for PostgresRecordStore<E> {
    async fn save(&self, record: E) -> Result<E, RecordStoreError> {
        match record.id() {
            Some(id) => self.replace(id, record).await,
            None => self.insert(record).await,
        }
    }

    async fn find(&self, id: EntityId) -> Result<Option<E>, RecordStoreError> {
        sqlx::query_as::<_, RecordRow>(
            "SELECT id, data FROM entity_records WHERE entity_type = $1 AND id = $2",
        )
        .bind(E::COLLECTION)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(RecordRow::into_record)
        .transpose()
    }

    async fn find_all(&self, filter: ListFilter) -> Result<Vec<E>, RecordStoreError> {
        let sql = match filter {
            ListFilter::All => {
                "SELECT id, data FROM entity_records WHERE entity_type = $1 ORDER BY id"
            }
            ListFilter::WithoutParent => {
                "SELECT id, data FROM entity_records WHERE entity_type = $1 AND parent_id IS NULL ORDER BY id"
            }
        };

        sqlx::query_as::<_, RecordRow>(sql)
            .bind(E::COLLECTION)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(RecordRow::into_record)
            .collect()
    }

    async fn delete(&self, id: EntityId) -> Result<(), RecordStoreError> {
        sqlx::query("DELETE FROM entity_records WHERE entity_type = $1 AND id = $2")
            .bind(E::COLLECTION)
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(entity = E::ENTITY_NAME, id, "Record deleted");
        Ok(())
    }
}
