//! Download client repository port.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::DomainResult;
use crate::domain::models::DownloadClient;

/// Repository interface for download client persistence.
///
/// Records handed out behind an `Arc` may be shared with the repository's
/// cache; clone before mutating.
#[async_trait]
pub trait DownloadClientRepository: Send + Sync {
    /// List every configured client in storage order.
    async fn list(&self) -> DomainResult<Vec<DownloadClient>>;

    /// Get a client by ID, failing with `DownloadClientNotFound` when absent.
    async fn find_by_id(&self, id: i32) -> DomainResult<Arc<DownloadClient>>;

    /// Insert a new client and return it with its assigned ID.
    async fn store(&self, client: DownloadClient) -> DomainResult<Arc<DownloadClient>>;

    /// Overwrite every mutable column of the client with `client.id`.
    async fn update(&self, client: DownloadClient) -> DomainResult<Arc<DownloadClient>>;

    /// Delete a client and detach and disable every action that referenced it.
    async fn delete(&self, id: i32) -> DomainResult<()>;
}
