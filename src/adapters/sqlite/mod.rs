//! SQLite database adapters for the download client store.

pub mod connection;
pub mod download_client_repository;
pub mod migrations;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use download_client_repository::SqliteDownloadClientRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};

use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DownloadClientSettings;

/// Encode client settings into the JSON text stored in `client.settings`.
pub fn encode_settings(settings: &DownloadClientSettings) -> DomainResult<String> {
    serde_json::to_string(settings)
        .map_err(|e| DomainError::serialization("could not marshal download client settings", e))
}

/// Decode a `client.settings` blob. NULL and the empty string mean "no settings".
pub fn decode_settings(blob: Option<&str>) -> DomainResult<DownloadClientSettings> {
    match blob {
        None | Some("") => Ok(DownloadClientSettings::default()),
        Some(s) => serde_json::from_str(s).map_err(|e| {
            DomainError::serialization("could not unmarshal download client settings", e)
        }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

pub async fn initialize_database(
    database_url: &str,
    config: Option<PoolConfig>,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(database_url, config).await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory test pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}
