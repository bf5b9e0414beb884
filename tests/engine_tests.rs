mod common;

use common::{build_engine, drain_timestamps, settings, FakeLogApi};
use cwingest::engine::{EngineState, PassOutcome};
use cwingest::event::builder::METADATA_FIELD;
use cwingest::position::{PositionStore, StartPosition};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_resume_from_stored_cursor() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    fs::write(&sincedb, "groupA 1000\n").unwrap();

    let api = Arc::new(FakeLogApi::default());
    // The fake ignores start_time, so the engine must drop 999 itself.
    api.records_page("groupA", &[999, 1000, 1001], None);
    let (mut engine, mut rx) = build_engine(
        api.clone(),
        &sincedb,
        settings(&["groupA"], false, StartPosition::Beginning),
    );

    engine.initialize().await.unwrap();
    assert_eq!(engine.positions().get("groupA"), Some(1000));

    engine.run_pass(&CancellationToken::new()).await.unwrap();

    let fetches = api.fetches.lock().unwrap().clone();
    assert_eq!(fetches[0].start_time, 1000);
    // Start time is inclusive: a record exactly at the cursor has not been seen.
    assert_eq!(drain_timestamps(&mut rx), vec![1000, 1001]);
    assert_eq!(PositionStore::load(&sincedb).get("groupA"), Some(1002));
}

#[tokio::test]
async fn test_cursor_is_monotonic_across_passes() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.records_page("g", &[10, 30, 20], Some("next"));
    api.records_page("g", &[40], None);
    api.records_page("g", &[], None);
    let (mut engine, mut rx) =
        build_engine(api.clone(), &sincedb, settings(&["g"], false, StartPosition::Beginning));

    engine.initialize().await.unwrap();
    let shutdown = CancellationToken::new();

    let mut last = engine.positions().get("g").unwrap();
    for _ in 0..2 {
        engine.run_pass(&shutdown).await.unwrap();
        let current = engine.positions().get("g").unwrap();
        assert!(current >= last);
        last = current;
    }

    assert_eq!(last, 41);
    assert_eq!(drain_timestamps(&mut rx), vec![10, 30, 20, 40]);
    let starts: Vec<i64> = api.fetches.lock().unwrap().iter().map(|r| r.start_time).collect();
    // Continuation pages reuse the start time of the drain they belong to.
    assert_eq!(starts, vec![0, 0, 41]);
}

#[tokio::test]
async fn test_ties_at_page_boundary_survive_restart() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.records_page("g", &[100, 200], Some("t"));
    api.records_page("g", &[200, 300], None);
    let (mut engine, mut rx) =
        build_engine(api.clone(), &sincedb, settings(&["g"], false, StartPosition::Beginning));

    engine.initialize().await.unwrap();
    engine.run_pass(&CancellationToken::new()).await.unwrap();

    assert_eq!(drain_timestamps(&mut rx), vec![100, 200, 200, 300]);
    assert_eq!(PositionStore::load(&sincedb).get("g"), Some(301));
}

#[tokio::test]
async fn test_start_position_policies_for_new_sources() {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(FakeLogApi::default());

    for (name, policy) in [
        ("beginning", StartPosition::Beginning),
        ("end", StartPosition::End),
        ("sixty", StartPosition::SecondsAgo(60)),
    ] {
        let sincedb = dir.path().join(name);
        let (mut engine, _rx) = build_engine(api.clone(), &sincedb, settings(&["g"], false, policy));
        let now = chrono::Utc::now().timestamp_millis();
        engine.initialize().await.unwrap();
        let cursor = engine.positions().get("g").unwrap();

        match policy {
            StartPosition::Beginning => assert_eq!(cursor, 0),
            StartPosition::End => assert!((cursor - now).abs() < 5_000),
            StartPosition::SecondsAgo(_) => assert!((cursor - (now - 60_000)).abs() < 5_000),
        }
    }
}

#[tokio::test]
async fn test_known_sources_keep_their_cursor() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    fs::write(&sincedb, "g 777\n").unwrap();
    let api = Arc::new(FakeLogApi::default());
    let (mut engine, _rx) = build_engine(api, &sincedb, settings(&["g"], false, StartPosition::End));

    engine.initialize().await.unwrap();
    assert_eq!(engine.positions().get("g"), Some(777));
}

#[tokio::test]
async fn test_priority_visits_new_and_stale_sources_first() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.sources_page("/p/", &["/p/A", "/p/B"], None);
    api.sources_page("/p/", &["/p/A", "/p/B"], None);
    api.sources_page("/p/", &["/p/A", "/p/B", "/p/C"], None);
    let (mut engine, _rx) =
        build_engine(api.clone(), &sincedb, settings(&["/p/"], true, StartPosition::Beginning));

    engine.initialize().await.unwrap();
    let shutdown = CancellationToken::new();
    engine.run_pass(&shutdown).await.unwrap();
    engine.run_pass(&shutdown).await.unwrap();

    assert_eq!(
        api.fetched_sources(),
        vec!["/p/A", "/p/B", "/p/C", "/p/A", "/p/B"]
    );
}

#[tokio::test]
async fn test_throttling_ends_pass_but_keeps_progress() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.records_page("A", &[100, 200], None);
    api.throttle("B");
    api.records_page("B", &[300], None);
    let (mut engine, mut rx) = build_engine(
        api.clone(),
        &sincedb,
        settings(&["A", "B", "C"], false, StartPosition::Beginning),
    );

    engine.initialize().await.unwrap();
    let shutdown = CancellationToken::new();

    let outcome = engine.run_pass(&shutdown).await.unwrap();
    assert_eq!(outcome, PassOutcome::Throttled);
    assert_eq!(api.fetched_sources(), vec!["A", "B"]);
    assert_eq!(PositionStore::load(&sincedb).get("A"), Some(201));
    assert_eq!(engine.positions().get("B"), Some(0));

    // Next pass: B and C were never serviced, so they go before A.
    let outcome = engine.run_pass(&shutdown).await.unwrap();
    assert!(matches!(outcome, PassOutcome::Completed { sources: 3, events: 1 }));
    assert_eq!(api.fetched_sources(), vec!["A", "B", "B", "C", "A"]);
    assert_eq!(PositionStore::load(&sincedb).get("B"), Some(301));
    assert_eq!(drain_timestamps(&mut rx), vec![100, 200, 300]);
}

#[tokio::test]
async fn test_events_carry_normalized_tags() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.records_page("/aws/rds/db", &[5, 6], None);
    let (mut engine, mut rx) = build_engine(
        api.clone(),
        &sincedb,
        settings(&["/aws/rds/db"], false, StartPosition::Beginning),
    );

    engine.initialize().await.unwrap();
    engine.run_pass(&CancellationToken::new()).await.unwrap();

    let event = rx.try_recv().unwrap();
    let meta = &event.fields[METADATA_FIELD];
    assert_eq!(meta["tags"]["CostCenter"], "42");
    assert_eq!(meta["log_type"], "rds");
    assert_eq!(*api.tag_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_run_loop_polls_until_shutdown() {
    let dir = TempDir::new().unwrap();
    let sincedb = dir.path().join("sincedb");
    let api = Arc::new(FakeLogApi::default());
    api.records_page("g", &[1], None);
    let (mut engine, mut rx) =
        build_engine(api.clone(), &sincedb, settings(&["g"], false, StartPosition::Beginning));

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        trigger.cancel();
    });

    tokio::time::timeout(Duration::from_secs(5), engine.run(shutdown))
        .await
        .expect("engine should stop after shutdown")
        .unwrap();

    assert_eq!(engine.state(), EngineState::Stopped);
    // 20ms interval over ~150ms: several passes ran.
    assert!(api.fetches.lock().unwrap().len() >= 2);
    assert_eq!(drain_timestamps(&mut rx), vec![1]);
    assert_eq!(PositionStore::load(&sincedb).get("g"), Some(2));
}
