//! dlclient - download client configuration store
//!
//! Persists the configuration of external download engines (torrent clients,
//! usenet downloaders, *arr applications) and keeps the actions that
//! reference them consistent.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the repository port
//! - **Adapters** (`adapters`): SQLite repository and its in-memory cache
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use dlclient::adapters::sqlite::{initialize_database, SqliteDownloadClientRepository};
//! use dlclient::{DownloadClient, DownloadClientRepository, DownloadClientType};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = initialize_database("sqlite:.dlclient/dlclient.db", None).await?;
//!     let repo = SqliteDownloadClientRepository::new(pool);
//!     let client = repo
//!         .store(DownloadClient::new("qbit1", DownloadClientType::Qbittorrent, "127.0.0.1", 8080))
//!         .await?;
//!     repo.delete(client.id).await?;
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::cache::ClientCache;
pub use adapters::sqlite::SqliteDownloadClientRepository;
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    BasicAuth, Config, DownloadClient, DownloadClientRules, DownloadClientSettings,
    DownloadClientType, RepositoryConfig,
};
pub use domain::ports::DownloadClientRepository;
pub use infrastructure::config::{ConfigError, ConfigLoader};
