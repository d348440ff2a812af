//! Common test utilities for integration tests
//!
//! Shared fixtures for the repository and CLI tests.

#![allow(dead_code)]

use dlclient::adapters::sqlite::create_migrated_test_pool;
use dlclient::{
    DownloadClient, DownloadClientType, RepositoryConfig, SqliteDownloadClientRepository,
};
use sqlx::SqlitePool;

/// A fresh in-memory database and a repository over it.
pub async fn setup_repo(config: RepositoryConfig) -> (SqlitePool, SqliteDownloadClientRepository) {
    let pool = create_migrated_test_pool()
        .await
        .expect("failed to create test database");
    let repo = SqliteDownloadClientRepository::with_config(pool.clone(), config);
    (pool, repo)
}

pub fn qbit_client() -> DownloadClient {
    DownloadClient::new("qbit1", DownloadClientType::Qbittorrent, "127.0.0.1", 8080)
}

/// Insert an action row for `filter_id` pointing at `client_id`.
pub async fn insert_action(pool: &SqlitePool, filter_id: i64, client_id: i32, enabled: bool) {
    sqlx::query(
        "INSERT INTO action (name, type, enabled, filter_id, client_id) \
         VALUES (?, 'QBITTORRENT', ?, ?, ?)",
    )
    .bind(format!("action-{filter_id}"))
    .bind(enabled)
    .bind(filter_id)
    .bind(client_id)
    .execute(pool)
    .await
    .expect("failed to insert action");
}

/// `(filter_id, client_id, enabled)` for every action, ordered by filter.
pub async fn actions(pool: &SqlitePool) -> Vec<(i64, i32, bool)> {
    sqlx::query_as("SELECT filter_id, client_id, enabled FROM action ORDER BY filter_id")
        .fetch_all(pool)
        .await
        .expect("failed to query actions")
}

pub async fn client_row_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM client")
        .fetch_one(pool)
        .await
        .expect("failed to count clients")
}
