//! Port trait definitions (Hexagonal Architecture)
//!
//! - DownloadClientRepository: persistence of download client configuration
//!
//! Callers above the adapters depend on these traits only.

pub mod download_client_repository;

pub use download_client_repository::DownloadClientRepository;
