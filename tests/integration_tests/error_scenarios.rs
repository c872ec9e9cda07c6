//! Error scenario integration tests
//!
//! Tests failure modes of a sweep:
//! 1. Catalog unavailable (bad status, timeout)
//! 2. Store preservation when a cycle is aborted
//! 3. Unusable catalog entries
//! 4. Scheduler loop surviving failed cycles

use std::sync::Arc;
use std::time::Duration;

use iptv_sweep::catalog::{HttpCatalogFetcher, StaticCatalog};
use iptv_sweep::error::CatalogError;
use iptv_sweep::models::Channel;
use iptv_sweep::pool::WorkerPool;
use iptv_sweep::scheduler::{SweepError, SweepEvent, SweepScheduler, SweepState};
use iptv_sweep::storage::{JsonFileStore, MemoryStore, ResultStore, SNAPSHOT_FILE};
use iptv_sweep::validator::StreamValidator;
use tempfile::TempDir;
use tokio::sync::watch;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{catalog_body, mount_catalog, scheduler_for};

// ============================================================================
// Catalog Failures
// ============================================================================

#[tokio::test]
async fn test_catalog_failure_leaves_store_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.m3u"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
    store
        .write_cycle(
            vec![Channel::new("Kept", "http://example.com/kept")],
            vec![Channel::new("Old", "http://example.com/old")],
        )
        .await
        .unwrap();
    let before = std::fs::read(dir.path().join(SNAPSHOT_FILE)).unwrap();

    let scheduler = scheduler_for(&mock_server, store.clone(), false);
    let mut events = scheduler.subscribe();

    let result = scheduler.run_cycle().await;
    assert!(matches!(
        result,
        Err(SweepError::Catalog(CatalogError::Status(500)))
    ));

    let after = std::fs::read(dir.path().join(SNAPSHOT_FILE)).unwrap();
    assert_eq!(before, after);
    assert_eq!(store.read_valid().await[0].name, "Kept");
    assert_eq!(store.read_dead().await[0].name, "Old");

    assert!(matches!(events.recv().await, Ok(SweepEvent::Started { .. })));
    assert!(matches!(events.recv().await, Ok(SweepEvent::Aborted { .. })));

    let status = scheduler.status().await;
    assert_eq!(status.sweeps_aborted, 1);
    assert_eq!(status.sweeps_completed, 0);
    assert!(status.last_error.is_some());
    assert!(status.last_report.is_none());
}

#[tokio::test]
async fn test_catalog_timeout_aborts_cycle() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.m3u"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("#EXTM3U\n")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let catalog = HttpCatalogFetcher::new(
        format!("{}/index.m3u", mock_server.uri()),
        Duration::from_millis(300),
    )
    .unwrap();
    let store = Arc::new(MemoryStore::new());
    let scheduler = SweepScheduler::new(
        Arc::new(catalog),
        WorkerPool::new(Arc::new(StreamValidator::new().unwrap()), 2),
        store.clone(),
        Duration::from_secs(60),
    );

    let err = scheduler.run_cycle().await.unwrap_err();
    assert_eq!(err.kind(), "catalog");
    assert!(store.last_updated().await.is_none());
}

// ============================================================================
// Catalog Content
// ============================================================================

#[tokio::test]
async fn test_unusable_entries_are_dead() {
    let channels = vec![
        Channel::new("No Scheme", "not a url"),
        Channel::new("Rtmp", "rtmp://streams.example.com/live"),
        Channel::new("Blank", ""),
    ];
    let store = Arc::new(MemoryStore::new());
    let scheduler = SweepScheduler::new(
        Arc::new(StaticCatalog::new(channels)),
        WorkerPool::new(Arc::new(StreamValidator::new().unwrap()), 2),
        store.clone(),
        Duration::from_secs(60),
    );

    let report = scheduler.run_cycle().await.unwrap();
    assert_eq!((report.valid, report.dead), (0, 3));
    assert_eq!(store.read_dead().await.len(), 3);
}

#[tokio::test]
async fn test_empty_catalog_completes() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, catalog_body(&mock_server.uri(), &[])).await;

    let store = Arc::new(MemoryStore::new());
    store
        .write_cycle(vec![Channel::new("Stale", "http://example.com/stale")], Vec::new())
        .await
        .unwrap();

    let report = scheduler_for(&mock_server, store.clone(), false)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.total, 0);
    assert!(store.read_valid().await.is_empty());
    assert!(store.read_dead().await.is_empty());
}

// ============================================================================
// Scheduler Loop
// ============================================================================

#[tokio::test]
async fn test_loop_survives_failed_cycles() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/index.m3u"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let catalog = HttpCatalogFetcher::new(
        format!("{}/index.m3u", mock_server.uri()),
        Duration::from_secs(2),
    )
    .unwrap();
    let scheduler = Arc::new(SweepScheduler::new(
        Arc::new(catalog),
        WorkerPool::new(Arc::new(StreamValidator::new().unwrap()), 1),
        Arc::new(MemoryStore::new()),
        Duration::from_millis(25),
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run(shutdown_rx).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown_tx.send(true).unwrap();
    tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .unwrap()
        .unwrap();

    let status = scheduler.status().await;
    assert!(status.sweeps_aborted >= 2, "aborted {}", status.sweeps_aborted);
    assert_eq!(status.sweeps_completed, 0);
    assert!(matches!(status.state, SweepState::Idle { .. }));
}
