//! SQLite implementation of the DownloadClientRepository.
//!
//! Single-record lookups go through an owned [`ClientCache`]. Writes hit the
//! database first and then bring the cache in line with what was written.
//!
//! Known gaps:
//! - `delete` pops the cache entry before the transaction commits, so a
//!   rolled-back delete leaves a cache miss behind. The next `find_by_id`
//!   reads the row from storage again.
//! - Concurrent writers to the same id may leave the cache holding the write
//!   that finished last at the cache step rather than the last one in storage.
//! - With `operation_timeout_ms` set, `store` and `update` can time out after
//!   their single autocommit statement has landed but before the cache step
//!   runs. The caller sees `Timeout` while the row is written and the cache is
//!   untouched, so a timed-out `update` can leave the previous record cached.
//!   `delete` has no such window since a dropped transaction rolls back.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::{decode_settings, encode_settings};
use crate::adapters::cache::ClientCache;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DownloadClient, DownloadClientType, RepositoryConfig};
use crate::domain::ports::DownloadClientRepository;

const SELECT_CLIENTS: &str = "SELECT id, name, type AS client_type, enabled, host, port, tls, \
     tls_skip_verify, username, password, settings FROM client";

const SELECT_CLIENT_BY_ID: &str = "SELECT id, name, type AS client_type, enabled, host, port, tls, \
     tls_skip_verify, username, password, settings FROM client WHERE id = ?";

pub struct SqliteDownloadClientRepository {
    pool: SqlitePool,
    cache: ClientCache,
    config: RepositoryConfig,
}

impl SqliteDownloadClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_config(pool, RepositoryConfig::default())
    }

    pub fn with_config(pool: SqlitePool, config: RepositoryConfig) -> Self {
        Self {
            pool,
            cache: ClientCache::new(),
            config,
        }
    }

    /// The repository's cache, exposed for diagnostics.
    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    async fn with_timeout<T, F>(
        &self,
        operation: &'static str,
        id: Option<i32>,
        fut: F,
    ) -> DomainResult<T>
    where
        F: Future<Output = DomainResult<T>> + Send,
    {
        match self.config.operation_timeout_ms {
            Some(timeout_ms) => tokio::time::timeout(Duration::from_millis(timeout_ms), fut)
                .await
                .map_err(|_| DomainError::Timeout {
                    operation,
                    id,
                    timeout_ms,
                })?,
            None => fut.await,
        }
    }

    async fn list_clients(&self) -> DomainResult<Vec<DownloadClient>> {
        let rows: Vec<DownloadClientRow> = sqlx::query_as(SELECT_CLIENTS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("download_client.list: error executing query", e))?;

        rows.into_iter().map(DownloadClient::try_from).collect()
    }

    async fn find_client(&self, id: i32) -> DomainResult<Arc<DownloadClient>> {
        if let Some(client) = self.cache.get(id).await {
            return Ok(client);
        }

        let row: Option<DownloadClientRow> = sqlx::query_as(SELECT_CLIENT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(
                    format!("download_client.find_by_id {id}: error executing query"),
                    e,
                )
            })?;

        let row = row.ok_or(DomainError::DownloadClientNotFound(id))?;
        let client = Arc::new(DownloadClient::try_from(row)?);

        if self.config.cache_on_read {
            self.cache.set(id, Arc::clone(&client)).await;
        }

        Ok(client)
    }

    async fn insert_client(&self, mut client: DownloadClient) -> DomainResult<Arc<DownloadClient>> {
        let settings = encode_settings(&client.settings)?;

        let id: i32 = sqlx::query_scalar(
            r#"INSERT INTO client
                   (name, type, enabled, host, port, tls, tls_skip_verify,
                    username, password, settings)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING id"#,
        )
        .bind(&client.name)
        .bind(client.client_type.as_str())
        .bind(client.enabled)
        .bind(&client.host)
        .bind(client.port)
        .bind(client.tls)
        .bind(client.tls_skip_verify)
        .bind(&client.username)
        .bind(&client.password)
        .bind(settings)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("download_client.store: error executing query", e))?;

        client.id = id;
        debug!(
            client_id = id,
            name = %client.name,
            client_type = %client.client_type,
            "download_client.store"
        );

        let client = Arc::new(client);
        self.cache.set(id, Arc::clone(&client)).await;

        Ok(client)
    }

    async fn update_client(&self, client: DownloadClient) -> DomainResult<Arc<DownloadClient>> {
        let settings = encode_settings(&client.settings)?;

        let result = sqlx::query(
            r#"UPDATE client SET name = ?, type = ?, enabled = ?, host = ?, port = ?, tls = ?,
                   tls_skip_verify = ?, username = ?, password = ?, settings = ?
               WHERE id = ?"#,
        )
        .bind(&client.name)
        .bind(client.client_type.as_str())
        .bind(client.enabled)
        .bind(&client.host)
        .bind(client.port)
        .bind(client.tls)
        .bind(client.tls_skip_verify)
        .bind(&client.username)
        .bind(&client.password)
        .bind(settings)
        .bind(client.id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::database(
                format!("download_client.update {}: error executing query", client.id),
                e,
            )
        })?;

        if result.rows_affected() == 0 {
            if self.config.strict_update {
                return Err(DomainError::NoRowsAffected {
                    operation: "update download client",
                    id: client.id,
                });
            }
            warn!(client_id = client.id, "download_client.update matched no rows");
        }

        debug!(client_id = client.id, "download_client.update");

        let client = Arc::new(client);
        self.cache.set(client.id, Arc::clone(&client)).await;

        Ok(client)
    }

    async fn delete_client(&self, id: i32) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database(format!("error deleting download client {id}"), e))?;

        if let Err(err) = self.delete_and_detach(&mut tx, id).await {
            warn!(client_id = id, error = %err, "rolling back download client delete");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(client_id = id, error = %rollback_err, "rollback failed");
            }
            return Err(err);
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::database(format!("error deleting download client {id}"), e))?;

        info!(client_id = id, "deleted download client");
        Ok(())
    }

    /// Runs inside the delete transaction. SQLite takes the write lock at the
    /// first DELETE and holds it until commit or rollback, so no other writer
    /// sees the row gone while its actions still point at it.
    async fn delete_and_detach(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i32,
    ) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM client WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::database(format!("error deleting download client {id}"), e))?;

        // Not gated on commit.
        self.cache.pop(id).await;

        if result.rows_affected() == 0 {
            return Err(DomainError::NoRowsAffected {
                operation: "delete download client",
                id,
            });
        }

        debug!(client_id = id, "delete download client");

        let filter_ids: Vec<i64> = sqlx::query_scalar(
            "UPDATE action SET enabled = 0, client_id = 0 WHERE client_id = ? RETURNING filter_id",
        )
        .bind(id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| {
            DomainError::database(format!("error detaching download client {id} from actions"), e)
        })?;

        for filter_id in &filter_ids {
            debug!(client_id = id, filter_id, "detached download client from action");
        }

        Ok(())
    }
}

#[async_trait]
impl DownloadClientRepository for SqliteDownloadClientRepository {
    async fn list(&self) -> DomainResult<Vec<DownloadClient>> {
        self.with_timeout("download_client.list", None, self.list_clients()).await
    }

    async fn find_by_id(&self, id: i32) -> DomainResult<Arc<DownloadClient>> {
        self.with_timeout("download_client.find_by_id", Some(id), self.find_client(id)).await
    }

    async fn store(&self, client: DownloadClient) -> DomainResult<Arc<DownloadClient>> {
        self.with_timeout("download_client.store", None, self.insert_client(client)).await
    }

    async fn update(&self, client: DownloadClient) -> DomainResult<Arc<DownloadClient>> {
        let id = client.id;
        self.with_timeout("download_client.update", Some(id), self.update_client(client)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i32) -> DomainResult<()> {
        self.with_timeout("download_client.delete", Some(id), self.delete_client(id)).await
    }
}

#[derive(sqlx::FromRow)]
struct DownloadClientRow {
    id: i32,
    name: String,
    client_type: String,
    enabled: bool,
    host: String,
    port: i32,
    tls: bool,
    tls_skip_verify: bool,
    username: String,
    password: String,
    settings: Option<String>,
}

impl TryFrom<DownloadClientRow> for DownloadClient {
    type Error = DomainError;

    fn try_from(row: DownloadClientRow) -> Result<Self, Self::Error> {
        let client_type = DownloadClientType::from_str(&row.client_type).ok_or_else(|| {
            DomainError::SerializationError(format!(
                "download client {}: unknown type {:?}",
                row.id, row.client_type
            ))
        })?;

        let settings = decode_settings(row.settings.as_deref()).map_err(|e| match e {
            DomainError::SerializationError(msg) => {
                DomainError::SerializationError(format!("download client {}: {msg}", row.id))
            }
            other => other,
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            client_type,
            enabled: row.enabled,
            host: row.host,
            port: row.port,
            tls: row.tls,
            tls_skip_verify: row.tls_skip_verify,
            username: row.username,
            password: row.password,
            settings,
        })
    }
}
