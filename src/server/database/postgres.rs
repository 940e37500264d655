//! Document store on a single JSONB table.

use std::future::Future;
use std::time::Duration;

use log::{info, warn};
use serde_json::Value;
use tokio::time;

use crate::server::database::pool::Pool;
use crate::server::database::pool_config::PoolConfig;
use crate::server::database::{DocumentStore, StoreError, StoredObject};

const LIST_DOCUMENTS: &str = "SELECT body FROM document WHERE collection = $1 ORDER BY id";
const GET_DOCUMENT: &str = "SELECT body FROM document WHERE collection = $1 AND id = $2";
const INSERT_DOCUMENT: &str = r#"
    INSERT INTO document (collection, id, body)
    VALUES ($1, $2, $3)
    ON CONFLICT (collection, id) DO NOTHING
"#;
const REPLACE_DOCUMENT: &str = r#"
    UPDATE document
    SET body = $3, updated_at = CURRENT_TIMESTAMP
    WHERE collection = $1 AND id = $2
"#;
const DELETE_DOCUMENT: &str = "DELETE FROM document WHERE collection = $1 AND id = $2";
const PUT_OBJECT: &str = r#"
    INSERT INTO object (path, content_type, bytes)
    VALUES ($1, $2, $3)
    ON CONFLICT (path) DO UPDATE
    SET content_type = EXCLUDED.content_type, bytes = EXCLUDED.bytes
"#;
const GET_OBJECT: &str = "SELECT content_type, bytes FROM object WHERE path = $1";
const DELETE_OBJECT: &str = "DELETE FROM object WHERE path = $1";

#[derive(Clone)]
pub(crate) struct PgStore {
    read_pool: Pool,
    write_pool: Pool,
    timeout: Duration,
}

impl PgStore {
    pub async fn connect(
        read: &PoolConfig,
        write: &PoolConfig,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let (read_pool, write_pool) = (Pool::new(read.name.clone()), Pool::new(write.name.clone()));
        read_pool.init(read).await?;
        write_pool.init(write).await?;
        info!(
            "postgres document store ready (read={}, write={})",
            read_pool.idle(),
            write_pool.idle()
        );
        Ok(Self {
            read_pool,
            write_pool,
            timeout,
        })
    }

    /// Bound a query by the store timeout.
    async fn bounded<T>(
        &self,
        query: impl Future<Output = Result<T, tokio_postgres::Error>>,
    ) -> Result<T, StoreError> {
        match time::timeout(self.timeout, query).await {
            Ok(res) => res.map_err(StoreError::backend),
            Err(_) => {
                warn!("query exceeded {} ms", self.timeout.as_millis());
                Err(StoreError::Timeout)
            }
        }
    }
}

impl DocumentStore for PgStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let conn = self.read_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let rows = self.bounded(conn.query(LIST_DOCUMENTS, &[&collection])).await?;
        Ok(rows.iter().map(|row| row.get::<_, Value>("body")).collect())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let conn = self.read_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let row = self
            .bounded(conn.query_opt(GET_DOCUMENT, &[&collection, &id]))
            .await?;
        Ok(row.map(|row| row.get::<_, Value>("body")))
    }

    async fn insert(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let conn = self.write_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let inserted = self
            .bounded(conn.execute(INSERT_DOCUMENT, &[&collection, &id, &doc]))
            .await?;
        if inserted == 0 {
            return Err(StoreError::Duplicate {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn replace(&self, collection: &str, id: &str, doc: Value) -> Result<bool, StoreError> {
        let conn = self.write_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let updated = self
            .bounded(conn.execute(REPLACE_DOCUMENT, &[&collection, &id, &doc]))
            .await?;
        Ok(updated > 0)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let conn = self.write_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let deleted = self
            .bounded(conn.execute(DELETE_DOCUMENT, &[&collection, &id]))
            .await?;
        Ok(deleted > 0)
    }

    async fn put_object(&self, path: &str, object: StoredObject) -> Result<(), StoreError> {
        let conn = self.write_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        self.bounded(conn.execute(PUT_OBJECT, &[&path, &object.content_type, &object.bytes]))
            .await?;
        Ok(())
    }

    async fn get_object(&self, path: &str) -> Result<Option<StoredObject>, StoreError> {
        let conn = self.read_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let row = self.bounded(conn.query_opt(GET_OBJECT, &[&path])).await?;
        Ok(row.map(|row| StoredObject {
            content_type: row.get("content_type"),
            bytes: row.get("bytes"),
        }))
    }

    async fn delete_object(&self, path: &str) -> Result<bool, StoreError> {
        let conn = self.write_pool.acquire(self.timeout).await.ok_or(StoreError::Busy)?;
        let deleted = self.bounded(conn.execute(DELETE_OBJECT, &[&path])).await?;
        Ok(deleted > 0)
    }
}
