//! In-memory cache of download client records keyed by ID.
//!
//! Entries live until replaced or popped; there is no TTL and no eviction.
//! Lookups share a read lock, `set` and `pop` take the write lock.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::models::DownloadClient;

#[derive(Debug, Default)]
pub struct ClientCache {
    clients: RwLock<HashMap<i32, Arc<DownloadClient>>>,
}

impl ClientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is cached for `id`.
    pub async fn set(&self, id: i32, client: Arc<DownloadClient>) {
        self.clients.write().await.insert(id, client);
    }

    /// Cached record for `id`, or `None` on a miss.
    pub async fn get(&self, id: i32) -> Option<Arc<DownloadClient>> {
        self.clients.read().await.get(&id).cloned()
    }

    /// Drop the entry for `id` if there is one.
    pub async fn pop(&self, id: i32) {
        self.clients.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
