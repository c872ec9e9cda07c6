//! Full sweep cycle tests
//!
//! Catalog, streams and landing pages are all served by one mock server.

use std::sync::Arc;
use std::time::Duration;

use iptv_sweep::models::NOT_AVAILABLE;
use iptv_sweep::scheduler::SweepEvent;
use iptv_sweep::storage::{JsonFileStore, MemoryStore, ResultStore};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{
    catalog_body, mount_catalog, mount_live_stream, scheduler_for, LANDING_PAGE_HTML,
};

fn sorted_names(channels: &[iptv_sweep::Channel]) -> Vec<String> {
    let mut names: Vec<_> = channels.iter().map(|c| c.name.clone()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_full_sweep_cycle() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_catalog(
        &mock_server,
        catalog_body(
            &base,
            &[
                ("Live One", "/one/index.m3u8"),
                ("Landing", "/landing"),
                ("Frozen", "/frozen"),
                ("Missing", "/missing"),
            ],
        ),
    )
    .await;
    mount_live_stream(&mock_server, "/one").await;

    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LANDING_PAGE_HTML, "text/html"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/frozen"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let store = Arc::new(JsonFileStore::open(dir.path()).await.unwrap());
    let scheduler = scheduler_for(&mock_server, store.clone(), true);

    let report = scheduler.run_cycle().await.unwrap();
    assert_eq!(report.total, 4);
    assert_eq!(report.valid, 2);
    assert_eq!(report.dead, 2);
    assert!(report.finished_at >= report.started_at);

    let valid = store.read_valid().await;
    let dead = store.read_dead().await;
    assert_eq!(sorted_names(&valid), vec!["Landing", "Live One"]);
    assert_eq!(sorted_names(&dead), vec!["Frozen", "Missing"]);

    // Every catalog entry lands in exactly one list
    assert_eq!(valid.len() + dead.len(), report.total);

    let landing = valid.iter().find(|c| c.name == "Landing").unwrap();
    assert_eq!(landing.playing_now, "Live: Evening Headlines");
    let live = valid.iter().find(|c| c.name == "Live One").unwrap();
    assert_eq!(live.playing_now, NOT_AVAILABLE);
    assert!(dead.iter().all(|c| c.playing_now == NOT_AVAILABLE));

    // Snapshot survives a restart
    drop(scheduler);
    let reopened = JsonFileStore::open(dir.path()).await.unwrap();
    assert_eq!(sorted_names(&reopened.read_valid().await), vec!["Landing", "Live One"]);
    assert_eq!(reopened.read_dead().await.len(), 2);
}

#[tokio::test]
async fn test_two_reachable_one_timeout() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_catalog(
        &mock_server,
        catalog_body(&base, &[("First", "/first"), ("Second", "/second"), ("Hung", "/hung")]),
    )
    .await;

    for route in ["/first", "/second"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/hung"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let report = scheduler_for(&mock_server, store.clone(), false)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!((report.valid, report.dead, report.total), (2, 1, 3));
    assert_eq!(sorted_names(&store.read_valid().await), vec!["First", "Second"]);
    assert_eq!(store.read_dead().await[0].name, "Hung");
}

#[tokio::test]
async fn test_second_sweep_replaces_results() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_catalog(
        &mock_server,
        catalog_body(&base, &[("Alpha", "/alpha/index.m3u8"), ("Beta", "/beta/index.m3u8")]),
    )
    .await;
    mount_live_stream(&mock_server, "/alpha").await;
    mount_live_stream(&mock_server, "/beta").await;

    let store = Arc::new(MemoryStore::new());
    let scheduler = scheduler_for(&mock_server, store.clone(), false);

    scheduler.run_cycle().await.unwrap();
    assert_eq!(store.read_valid().await.len(), 2);

    // The streams go away and the catalog shrinks
    mock_server.reset().await;
    mount_catalog(&mock_server, catalog_body(&base, &[("Alpha", "/alpha/index.m3u8")])).await;

    let report = scheduler.run_cycle().await.unwrap();
    assert_eq!((report.valid, report.dead), (0, 1));
    assert!(store.read_valid().await.is_empty());
    assert_eq!(store.read_dead().await[0].name, "Alpha");

    let status = scheduler.status().await;
    assert_eq!(status.sweeps_completed, 2);
    assert_eq!(status.last_report.unwrap().sweep_id, report.sweep_id);
}

#[tokio::test]
async fn test_duplicate_entries_kept() {
    let mock_server = MockServer::start().await;
    let base = mock_server.uri();

    mount_catalog(
        &mock_server,
        catalog_body(&base, &[("Same", "/dup/index.m3u8"), ("Same", "/dup/index.m3u8")]),
    )
    .await;
    mount_live_stream(&mock_server, "/dup").await;

    let store = Arc::new(MemoryStore::new());
    let report = scheduler_for(&mock_server, store.clone(), false)
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.valid, 2);
    assert_eq!(store.read_valid().await.len(), 2);
}

#[tokio::test]
async fn test_sweep_events() {
    let mock_server = MockServer::start().await;
    mount_catalog(&mock_server, catalog_body(&mock_server.uri(), &[("Gone", "/gone")])).await;

    let scheduler = scheduler_for(&mock_server, Arc::new(MemoryStore::new()), false);
    let mut events = scheduler.subscribe();

    let report = scheduler.run_cycle().await.unwrap();

    let started_id = match events.recv().await.unwrap() {
        SweepEvent::Started { sweep_id, .. } => sweep_id,
        other => panic!("unexpected event: {other:?}"),
    };
    match events.recv().await.unwrap() {
        SweepEvent::Completed(completed) => {
            assert_eq!(completed.sweep_id, started_id);
            assert_eq!(completed.sweep_id, report.sweep_id);
            assert_eq!(completed.dead, 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
