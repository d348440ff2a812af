pub mod config;
pub mod download_client;

pub use config::{Config, DatabaseConfig, LoggingConfig, RepositoryConfig};
pub use download_client::{
    BasicAuth, DownloadClient, DownloadClientRules, DownloadClientSettings, DownloadClientType,
    SlowTorrentCondition,
};
