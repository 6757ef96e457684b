mod common;

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use common::{eventually, CountingEngine};
use sift_engine::SearchEngine;
use sift_ingest::{IngestConfig, IngestService};
use tempfile::tempdir;
use tokio::time::sleep;

fn watching_config(root: &std::path::Path) -> IngestConfig {
    IngestConfig {
        root: root.to_path_buf(),
        watch: true,
        quiet_period_secs: 1,
        ..IngestConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn burst_of_writes_coalesces_into_one_index_call() {
    let site = tempdir().unwrap();
    let engine = Arc::new(CountingEngine::new());
    let service = IngestService::start(&watching_config(site.path()), engine.clone()).unwrap();

    // Let the startup scan of the empty tree settle.
    sleep(Duration::from_millis(200)).await;

    let live = site.path().join("live.txt");
    for i in 0..5 {
        fs::write(&live, format!("draft {i}")).unwrap();
        sleep(Duration::from_millis(30)).await;
    }

    let engine_ref = engine.clone();
    assert!(
        eventually(Duration::from_secs(10), move || {
            let engine = engine_ref.clone();
            async move { engine.len().await == 1 }
        })
        .await,
        "debounced write never indexed"
    );
    assert_eq!(engine.index_calls(), 1, "burst was not coalesced");

    // Quiescent since the flush: no further hand-offs.
    sleep(Duration::from_millis(2500)).await;
    assert_eq!(engine.index_calls(), 1);

    let stored = engine.load("/live.txt").await.unwrap().unwrap();
    assert_eq!(stored.body, b"draft 4");

    service.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn file_deleted_while_pending_is_never_indexed() {
    let site = tempdir().unwrap();
    let engine = Arc::new(CountingEngine::new());
    let service = IngestService::start(&watching_config(site.path()), engine.clone()).unwrap();

    sleep(Duration::from_millis(200)).await;

    let doomed = site.path().join("doomed.txt");
    fs::write(&doomed, "short-lived").unwrap();
    sleep(Duration::from_millis(100)).await;
    fs::remove_file(&doomed).unwrap();

    // Well past the quiet period and a few sweeps.
    sleep(Duration::from_millis(3000)).await;
    assert_eq!(engine.index_calls(), 0);
    assert_eq!(engine.len().await, 0);

    service.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn directories_created_after_startup_are_not_watched() {
    let site = tempdir().unwrap();
    let engine = Arc::new(CountingEngine::new());
    let service = IngestService::start(&watching_config(site.path()), engine.clone()).unwrap();

    sleep(Duration::from_millis(200)).await;

    // Subscriptions were taken at startup only; this subtree is invisible
    // until the next rescan.
    let late = site.path().join("late");
    fs::create_dir(&late).unwrap();
    sleep(Duration::from_millis(100)).await;
    fs::write(late.join("unseen.txt"), "no watcher here").unwrap();

    sleep(Duration::from_millis(3000)).await;
    assert_eq!(engine.index_calls(), 0);

    service.shutdown();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn watched_write_flows_through_the_same_filter_as_the_scanner() {
    let site = tempdir().unwrap();
    let engine = Arc::new(CountingEngine::new());
    let config = IngestConfig {
        exclude: vec!["\\.log$".to_string()],
        ..watching_config(site.path())
    };
    let service = IngestService::start(&config, engine.clone()).unwrap();

    sleep(Duration::from_millis(200)).await;

    fs::write(site.path().join("kept.txt"), "kept").unwrap();
    fs::write(site.path().join("noise.log"), "dropped").unwrap();

    let engine_ref = engine.clone();
    assert!(
        eventually(Duration::from_secs(10), move || {
            let engine = engine_ref.clone();
            async move { engine.len().await == 1 }
        })
        .await,
        "watched write never indexed"
    );
    assert!(engine.load("/kept.txt").await.unwrap().is_some());
    assert!(engine.load("/noise.log").await.unwrap().is_none());

    service.shutdown();
}
