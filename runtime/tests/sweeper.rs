//! Integration tests for the background expiry sweeper

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reservations_core::{EventId, UserName};
use reservations_runtime::{
    Component, EngineConfig, ExpirySweeper, HealthStatus, ReservationEngine, SweeperMonitor,
};
use reservations_testing::{ManualClock, RecordingSink};
use std::sync::Arc;
use std::time::Duration;

fn engine(interval: Duration) -> (ReservationEngine, Arc<ManualClock>, Arc<RecordingSink>) {
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let sink = Arc::new(RecordingSink::new());
    let engine = ReservationEngine::new(
        EngineConfig::default()
            .with_seed_events(Vec::new())
            .with_sweep_interval(interval),
        clock.clone(),
        sink.clone(),
    );
    (engine, clock, sink)
}

/// Wait until the sweeper has completed more than `after` passes
async fn wait_for_pass(monitor: &SweeperMonitor, after: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while monitor.passes() <= after {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("sweeper made no progress");
}

#[tokio::test]
async fn test_sweeper_expires_and_promotes() {
    let (engine, clock, sink) = engine(Duration::from_millis(10));
    engine.create_event("Solo", 1).await.unwrap();
    engine.reserve(EventId::new(1), "ana").await.unwrap();
    engine.reserve(EventId::new(1), "ben").await.unwrap();

    let sweeper = engine.spawn_sweeper();
    let monitor = sweeper.monitor();
    wait_for_pass(&monitor, 0).await;
    // Nothing has aged yet
    assert_eq!(
        engine.find(EventId::new(1)).await.unwrap().reserved_users[0].user_name,
        UserName::from("ana")
    );
    assert!(sink.names().contains(&"time_left"));

    clock.advance(Duration::from_secs(120));
    let seen = monitor.passes();
    wait_for_pass(&monitor, seen).await;

    let event = engine.find(EventId::new(1)).await.unwrap();
    assert_eq!(event.reserved_users[0].user_name, UserName::from("ben"));
    assert!(sink.names().contains(&"user_joined"));

    sweeper.shutdown(Duration::from_secs(1)).await.unwrap();
    assert!(!monitor.is_running());
}

#[tokio::test]
async fn test_sweeper_health_follows_lifecycle() {
    let (engine, _clock, _sink) = engine(Duration::from_millis(5));

    let sweeper = engine.spawn_sweeper();
    let monitor = sweeper.monitor();
    assert!(monitor.is_running());
    assert_eq!(monitor.health().status, HealthStatus::Healthy);

    sweeper.shutdown(Duration::from_secs(1)).await.unwrap();

    let check = monitor.health();
    assert_eq!(check.status, HealthStatus::Unhealthy);
    assert_eq!(check.component, Component::Sweeper);
    assert_eq!(check.reason.as_deref(), Some("Expiry sweeper is not running"));
}

#[tokio::test]
async fn test_dropping_handle_stops_sweeper() {
    let (engine, _clock, _sink) = engine(Duration::from_millis(5));

    let sweeper = ExpirySweeper::new(engine.clone(), Duration::ZERO).spawn();
    let monitor = sweeper.monitor();
    wait_for_pass(&monitor, 0).await;
    drop(sweeper);

    tokio::time::timeout(Duration::from_secs(5), async {
        while monitor.is_running() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("sweeper kept running after its handle was dropped");
}

#[tokio::test(start_paused = true)]
async fn test_first_pass_waits_one_interval() {
    let (engine, _clock, sink) = engine(Duration::from_secs(1));
    engine.create_event("Solo", 1).await.unwrap();
    sink.clear();

    let sweeper = engine.spawn_sweeper();
    let monitor = sweeper.monitor();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(monitor.passes(), 0);
    assert_eq!(sink.count(), 0);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(monitor.passes(), 1);
    assert_eq!(sink.names(), vec!["events_updated"]);

    sweeper.shutdown(Duration::from_secs(1)).await.unwrap();
}
