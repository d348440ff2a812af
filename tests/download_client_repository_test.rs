mod common;

use std::sync::Arc;

use dlclient::domain::models::{
    BasicAuth, DownloadClientRules, DownloadClientSettings, SlowTorrentCondition,
};
use dlclient::{DomainError, DownloadClientRepository, DownloadClientType, RepositoryConfig};

use common::{actions, client_row_count, insert_action, qbit_client, setup_repo};

#[tokio::test]
async fn test_store_then_find_is_served_from_cache() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;

    let stored = repo.store(qbit_client()).await.expect("failed to store client");
    assert_eq!(stored.id, 1);

    // Change the row behind the repository's back; a cache hit must not see it.
    sqlx::query("UPDATE client SET host = 'changed' WHERE id = ?")
        .bind(stored.id)
        .execute(&pool)
        .await
        .unwrap();

    let found = repo.find_by_id(stored.id).await.expect("failed to find client");
    assert_eq!(*found, *stored);
    assert_eq!(found.host, "127.0.0.1");
}

#[tokio::test]
async fn test_stored_record_round_trips_through_storage() {
    let (_pool, repo) = setup_repo(RepositoryConfig::default()).await;

    let mut client = qbit_client();
    client.tls = true;
    client.tls_skip_verify = true;
    client.username = "admin".to_string();
    client.password = "adminadmin".to_string();
    client.settings = DownloadClientSettings {
        api_key: Some("key".to_string()),
        basic: Some(BasicAuth {
            auth: true,
            username: "basic".to_string(),
            password: "pass".to_string(),
        }),
        rules: DownloadClientRules {
            enabled: true,
            max_active_downloads: 2,
            ignore_slow_torrents: true,
            ignore_slow_torrents_condition: SlowTorrentCondition::MaxDownloadsReached,
            download_speed_threshold: 1024,
            upload_speed_threshold: 256,
            extra: [("custom_limit".to_string(), serde_json::json!(5))].into_iter().collect(),
        },
    };

    let stored = repo.store(client).await.unwrap();
    repo.cache().pop(stored.id).await;

    let loaded = repo.find_by_id(stored.id).await.unwrap();
    assert_eq!(*loaded, *stored);
}

#[tokio::test]
async fn test_find_missing_id_is_not_found() {
    let (_pool, repo) = setup_repo(RepositoryConfig::default()).await;

    let err = repo.find_by_id(42).await.unwrap_err();
    assert!(matches!(err, DomainError::DownloadClientNotFound(42)));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_storage_hit_is_not_cached_by_default() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let stored = repo.store(qbit_client()).await.unwrap();
    repo.cache().pop(stored.id).await;

    repo.find_by_id(stored.id).await.unwrap();
    assert!(repo.cache().get(stored.id).await.is_none());

    // Every miss goes back to storage.
    sqlx::query("UPDATE client SET host = 'changed' WHERE id = ?")
        .bind(stored.id)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(repo.find_by_id(stored.id).await.unwrap().host, "changed");
}

#[tokio::test]
async fn test_cache_on_read_populates_cache() {
    let config = RepositoryConfig {
        cache_on_read: true,
        ..RepositoryConfig::default()
    };
    let (_pool, repo) = setup_repo(config).await;
    let stored = repo.store(qbit_client()).await.unwrap();
    repo.cache().pop(stored.id).await;

    let found = repo.find_by_id(stored.id).await.unwrap();
    let cached = repo.cache().get(stored.id).await.expect("storage hit should be cached");
    assert!(Arc::ptr_eq(&found, &cached));
}

#[tokio::test]
async fn test_list_returns_all_and_leaves_cache_alone() {
    let (_pool, repo) = setup_repo(RepositoryConfig::default()).await;
    for (name, port) in [("a", 8080), ("b", 8081), ("c", 8082)] {
        let mut client = qbit_client();
        client.name = name.to_string();
        client.port = port;
        let stored = repo.store(client).await.unwrap();
        repo.cache().pop(stored.id).await;
    }

    let mut clients = repo.list().await.unwrap();
    clients.sort_by_key(|c| c.id);

    assert_eq!(clients.len(), 3);
    assert_eq!(clients.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(), ["a", "b", "c"]);
    assert!(repo.cache().is_empty().await);
}

#[tokio::test]
async fn test_empty_settings_column_decodes_to_default() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    sqlx::query(
        "INSERT INTO client (name, type, host, port, settings) \
         VALUES ('plain', 'transmission', 'localhost', 9091, '')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let client = repo.find_by_id(1).await.unwrap();
    assert_eq!(client.client_type, DownloadClientType::Transmission);
    assert_eq!(client.settings, DownloadClientSettings::default());
}

#[tokio::test]
async fn test_malformed_settings_is_decode_error() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    sqlx::query(
        "INSERT INTO client (name, type, host, port, settings) \
         VALUES ('broken', 'qbittorrent', 'localhost', 8080, '{oops')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let err = repo.find_by_id(1).await.unwrap_err();
    assert!(matches!(err, DomainError::SerializationError(_)), "got {err:?}");
    assert!(!err.is_not_found());

    let err = repo.list().await.unwrap_err();
    assert!(matches!(err, DomainError::SerializationError(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unknown_rule_keys_survive_update() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    sqlx::query(
        "INSERT INTO client (name, type, host, port, settings) \
         VALUES ('qbit', 'qbittorrent', 'localhost', 8080, ?)",
    )
    .bind(
        r#"{"apikey":"k","rules":{"enabled":true,"custom_limit":5,
            "ignore_slow_torrents_condition":"MAX_DOWNLOADS_REACHED"}}"#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let loaded = repo.find_by_id(1).await.unwrap();
    assert_eq!(
        loaded.settings.rules.ignore_slow_torrents_condition,
        SlowTorrentCondition::MaxDownloadsReached
    );

    let mut renamed = loaded.as_ref().clone();
    renamed.name = "qbit-renamed".to_string();
    repo.update(renamed).await.unwrap();

    let blob: String = sqlx::query_scalar("SELECT settings FROM client WHERE id = 1")
        .fetch_one(&pool)
        .await
        .unwrap();
    let stored: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(stored["apikey"], "k");
    assert_eq!(stored["rules"]["custom_limit"], 5);
    assert_eq!(stored["rules"]["ignore_slow_torrents_condition"], "MAX_DOWNLOADS_REACHED");
}

#[tokio::test]
async fn test_update_overwrites_row_and_cache() {
    let (_pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let stored = repo.store(qbit_client()).await.unwrap();

    let mut changed = stored.as_ref().clone();
    changed.host = "10.0.0.5".to_string();
    changed.enabled = false;
    changed.settings.api_key = Some("new-key".to_string());

    let updated = repo.update(changed.clone()).await.unwrap();
    assert_eq!(*updated, changed);
    assert_eq!(repo.find_by_id(stored.id).await.unwrap().host, "10.0.0.5");

    repo.cache().pop(stored.id).await;
    let reloaded = repo.find_by_id(stored.id).await.unwrap();
    assert_eq!(*reloaded, changed);
}

#[tokio::test]
async fn test_update_missing_id_succeeds_by_default() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;

    let mut phantom = qbit_client();
    phantom.id = 99;
    repo.update(phantom).await.expect("lenient update should not fail");

    assert_eq!(client_row_count(&pool).await, 0);
    // The phantom record is served from the cache.
    assert_eq!(repo.find_by_id(99).await.unwrap().id, 99);
}

#[tokio::test]
async fn test_strict_update_rejects_missing_id() {
    let config = RepositoryConfig {
        strict_update: true,
        ..RepositoryConfig::default()
    };
    let (_pool, repo) = setup_repo(config).await;

    let mut phantom = qbit_client();
    phantom.id = 99;
    let err = repo.update(phantom).await.unwrap_err();

    assert!(matches!(err, DomainError::NoRowsAffected { id: 99, .. }));
    assert!(repo.cache().get(99).await.is_none());
}

#[tokio::test]
async fn test_delete_missing_id_leaves_actions_unchanged() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    insert_action(&pool, 10, 5, true).await;
    let before = actions(&pool).await;

    let err = repo.delete(5).await.unwrap_err();
    assert!(matches!(err, DomainError::NoRowsAffected { id: 5, .. }), "got {err:?}");
    assert_eq!(err.to_string(), "delete download client 5: no rows affected");

    assert_eq!(actions(&pool).await, before);
}

#[tokio::test]
async fn test_delete_detaches_and_disables_actions() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let doomed = repo.store(qbit_client()).await.unwrap();
    let mut other = qbit_client();
    other.name = "other".to_string();
    let other = repo.store(other).await.unwrap();

    insert_action(&pool, 1, doomed.id, true).await;
    insert_action(&pool, 2, doomed.id, false).await;
    insert_action(&pool, 3, other.id, true).await;

    repo.delete(doomed.id).await.expect("failed to delete client");

    assert_eq!(client_row_count(&pool).await, 1);
    assert_eq!(
        actions(&pool).await,
        vec![(1, 0, false), (2, 0, false), (3, other.id, true)]
    );
    assert!(repo.cache().get(doomed.id).await.is_none());
    assert!(matches!(
        repo.find_by_id(doomed.id).await,
        Err(DomainError::DownloadClientNotFound(_))
    ));
    assert_eq!(repo.find_by_id(other.id).await.unwrap().name, "other");
}

#[tokio::test]
async fn test_delete_without_actions_succeeds() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let stored = repo.store(qbit_client()).await.unwrap();

    repo.delete(stored.id).await.unwrap();
    assert_eq!(client_row_count(&pool).await, 0);
}

#[tokio::test]
async fn test_failed_delete_rolls_back_but_cache_entry_stays_popped() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let stored = repo.store(qbit_client()).await.unwrap();

    // Make the cascading action update fail inside the transaction.
    sqlx::query("DROP TABLE action").execute(&pool).await.unwrap();

    let err = repo.delete(stored.id).await.unwrap_err();
    assert!(matches!(err, DomainError::DatabaseError(_)), "got {err:?}");

    // Storage is unchanged; the cache entry is gone until the next write.
    assert_eq!(client_row_count(&pool).await, 1);
    assert!(repo.cache().get(stored.id).await.is_none());

    // The next lookup reads through to storage and finds the row again.
    let found = repo.find_by_id(stored.id).await.unwrap();
    assert_eq!(*found, *stored);
}

#[tokio::test]
async fn test_operation_times_out_when_storage_is_unavailable() {
    let config = RepositoryConfig {
        operation_timeout_ms: Some(50),
        ..RepositoryConfig::default()
    };
    let (pool, repo) = setup_repo(config).await;

    // The test pool has a single connection; holding it stalls every query.
    let conn = pool.acquire().await.unwrap();

    let err = repo.find_by_id(1).await.unwrap_err();
    assert!(
        matches!(err, DomainError::Timeout { id: Some(1), timeout_ms: 50, .. }),
        "got {err:?}"
    );
    assert_eq!(err.to_string(), "download_client.find_by_id 1 timed out after 50ms");

    drop(conn);
    assert!(repo.find_by_id(1).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_timed_out_delete_is_not_applied() {
    let config = RepositoryConfig {
        operation_timeout_ms: Some(50),
        ..RepositoryConfig::default()
    };
    let (pool, repo) = setup_repo(config).await;
    let stored = repo.store(qbit_client()).await.unwrap();

    let conn = pool.acquire().await.unwrap();
    let err = repo.delete(stored.id).await.unwrap_err();
    assert!(
        matches!(err, DomainError::Timeout { id: Some(id), .. } if id == stored.id),
        "got {err:?}"
    );
    drop(conn);

    assert_eq!(client_row_count(&pool).await, 1);
}

#[tokio::test]
async fn test_concurrent_stores_get_distinct_ids() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;
    let repo = Arc::new(repo);

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                let mut client = qbit_client();
                client.name = format!("client-{i}");
                repo.store(client).await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for result in futures::future::join_all(handles).await {
        ids.push(result.unwrap().unwrap().id);
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 10);
    assert_eq!(client_row_count(&pool).await, 10);
    assert_eq!(repo.cache().len().await, 10);
}

/// Store, read, update, delete a qBittorrent client with one dependent action.
#[tokio::test]
async fn test_client_lifecycle_scenario() {
    let (pool, repo) = setup_repo(RepositoryConfig::default()).await;

    let stored = repo.store(qbit_client()).await.unwrap();
    assert_eq!(stored.id, 1);
    assert!(stored.enabled);

    let found = repo.find_by_id(1).await.unwrap();
    assert!(Arc::ptr_eq(&found, &stored));

    let mut moved = found.as_ref().clone();
    moved.host = "10.0.0.5".to_string();
    repo.update(moved).await.unwrap();
    assert_eq!(repo.find_by_id(1).await.unwrap().host, "10.0.0.5");

    insert_action(&pool, 7, 1, true).await;
    repo.delete(1).await.unwrap();

    assert!(matches!(repo.find_by_id(1).await, Err(DomainError::DownloadClientNotFound(1))));
    assert_eq!(actions(&pool).await, vec![(7, 0, false)]);
}
