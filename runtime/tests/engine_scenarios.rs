//! End-to-end scenarios against the reservation engine
//!
//! Drives the engine through its public facade with a manual clock and checks
//! both the resulting state and the notification stream observers would see.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reservations_core::{
    CancelPolicy, EventId, ReservationError, ReservationOutcome, UserName,
};
use reservations_runtime::{
    BroadcastSink, Component, EngineConfig, HealthStatus, ReservationEngine, SeedEvent,
};
use reservations_testing::helpers::{
    assert_capacity_conserved, assert_one_reservation_per_user, init_tracing,
};
use reservations_testing::{ManualClock, RecordingSink};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Test Fixtures
// ============================================================================

struct Fixture {
    engine: ReservationEngine,
    clock: Arc<ManualClock>,
    sink: Arc<RecordingSink>,
}

fn fixture(config: EngineConfig) -> Fixture {
    init_tracing();
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let sink = Arc::new(RecordingSink::new());
    let engine = ReservationEngine::new(config, clock.clone(), sink.clone());
    Fixture {
        engine,
        clock,
        sink,
    }
}

fn default_fixture() -> Fixture {
    fixture(EngineConfig::default().with_seed_events(Vec::new()))
}

async fn assert_invariants(engine: &ReservationEngine) {
    let events = engine.list_all().await;
    assert_capacity_conserved(&events);
    assert_one_reservation_per_user(&events);
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_capacity_one_expiry_promotes_waiting_user() {
    let f = default_fixture();
    f.engine.create_event("Solo", 1).await.unwrap();
    let id = EventId::new(1);

    let outcome = f.engine.reserve(id, "A").await.unwrap();
    assert!(matches!(outcome, ReservationOutcome::HoldGranted { .. }));
    assert_eq!(f.engine.find(id).await.unwrap().available_spots, 0);

    let outcome = f.engine.reserve(id, "B").await.unwrap();
    assert_eq!(outcome, ReservationOutcome::Queued { position: 1 });

    f.clock.advance(Duration::from_secs(121));
    let ReservationOutcome::Swept(report) = f.engine.sweep().await.unwrap() else {
        panic!("sweep must report");
    };
    assert_eq!(report.expired.len(), 1);
    assert_eq!(report.promoted[0].user_name, UserName::from("B"));

    let event = f.engine.find(id).await.unwrap();
    assert_eq!(event.available_spots, 0);
    assert_eq!(event.reserved_users.len(), 1);
    assert_eq!(event.reserved_users[0].user_name, UserName::from("B"));
    assert!(f.engine.queue().await.is_empty());
    assert_invariants(&f.engine).await;
}

#[tokio::test]
async fn test_duplicate_event_name_rejected() {
    let f = default_fixture();
    f.engine.create_event("Opening", 5).await.unwrap();

    let err = f.engine.create_event("Opening", 3).await.unwrap_err();

    assert_eq!(
        err,
        ReservationError::DuplicateName {
            name: "Opening".to_string()
        }
    );
    assert_eq!(f.engine.list_all().await.len(), 1);
}

#[tokio::test]
async fn test_seed_creates_configured_events() {
    let f = fixture(EngineConfig::default());

    assert_eq!(f.engine.seed().await.unwrap(), 5);

    let events = f.engine.list_all().await;
    let names: Vec<&str> = events.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["Event 1", "Event 2", "Event 3", "Event 4", "Event 5"]);
    assert!(events.iter().all(|e| e.available_spots == 5));
    assert_eq!(events[4].id, EventId::new(5));
}

#[tokio::test]
async fn test_seed_stops_on_duplicate() {
    let f = fixture(EngineConfig::default().with_seed_events(vec![
        SeedEvent::new("Same", 1),
        SeedEvent::new("Same", 2),
    ]));

    assert!(matches!(
        f.engine.seed().await,
        Err(ReservationError::DuplicateName { .. })
    ));
    assert_eq!(f.engine.list_all().await.len(), 1);
}

#[tokio::test]
async fn test_full_lifecycle_notification_order() {
    let f = default_fixture();
    f.engine.create_event("Duo", 1).await.unwrap();
    let id = EventId::new(1);
    f.sink.clear();

    f.engine.reserve(id, "ana").await.unwrap();
    f.engine.reserve(id, "ben").await.unwrap();
    f.engine.confirm(id, "ana").await.unwrap();
    // ben stays queued: confirmation keeps the spot consumed
    f.clock.advance(Duration::from_secs(300));
    f.engine.sweep().await.unwrap();

    assert_eq!(
        f.sink.names(),
        vec![
            "event_reserved",
            "queue_updated",
            "reservation_confirmed",
            "events_updated",
        ]
    );
    assert_eq!(f.engine.queue().await, vec![UserName::from("ben")]);
    assert_invariants(&f.engine).await;
}

#[tokio::test]
async fn test_confirm_twice_fails() {
    let f = default_fixture();
    f.engine.create_event("Opening", 2).await.unwrap();
    let id = EventId::new(1);
    f.engine.reserve(id, "ana").await.unwrap();

    assert!(matches!(
        f.engine.confirm(id, "ana").await.unwrap(),
        ReservationOutcome::Confirmed { .. }
    ));
    assert!(matches!(
        f.engine.confirm(id, "ana").await,
        Err(ReservationError::HoldNotFound { .. })
    ));
}

#[tokio::test]
async fn test_user_cannot_hold_two_events() {
    let f = default_fixture();
    f.engine.create_event("First", 3).await.unwrap();
    f.engine.create_event("Second", 3).await.unwrap();

    f.engine.reserve(EventId::new(1), "ana").await.unwrap();
    let err = f.engine.reserve(EventId::new(2), "ana").await.unwrap_err();

    assert_eq!(
        err,
        ReservationError::DuplicateReservation {
            user_name: "ana".into(),
            event_id: EventId::new(1)
        }
    );
    assert_eq!(f.engine.find(EventId::new(2)).await.unwrap().available_spots, 3);
}

#[tokio::test]
async fn test_cancel_policies() {
    let strict = default_fixture();
    strict.engine.create_event("Opening", 2).await.unwrap();
    assert!(matches!(
        strict.engine.cancel(EventId::new(1), "ghost").await,
        Err(ReservationError::HoldNotFound { .. })
    ));
    assert_eq!(
        strict.engine.find(EventId::new(1)).await.unwrap().available_spots,
        2
    );

    let legacy = fixture(
        EngineConfig::default()
            .with_seed_events(Vec::new())
            .with_cancel_policy(CancelPolicy::AlwaysRelease),
    );
    legacy.engine.create_event("Opening", 2).await.unwrap();
    legacy.engine.cancel(EventId::new(1), "ghost").await.unwrap();
    assert_eq!(
        legacy.engine.find(EventId::new(1)).await.unwrap().available_spots,
        3
    );
}

#[tokio::test]
async fn test_queued_user_claims_cancelled_spot() {
    let f = default_fixture();
    f.engine.create_event("Solo", 1).await.unwrap();
    let id = EventId::new(1);
    f.engine.reserve(id, "ana").await.unwrap();
    f.engine.reserve(id, "ben").await.unwrap();

    f.engine.cancel(id, "ana").await.unwrap();
    // Cancel never promotes; the waiting user has to ask again
    let outcome = f.engine.reserve(id, "ben").await.unwrap();
    assert!(matches!(outcome, ReservationOutcome::HoldGranted { .. }));
    assert!(f.engine.queue().await.is_empty());
    assert_invariants(&f.engine).await;
}

#[tokio::test]
async fn test_custom_timeout_is_honoured() {
    let f = fixture(
        EngineConfig::default()
            .with_seed_events(Vec::new())
            .with_reservation_timeout(Duration::from_secs(10)),
    );
    f.engine.create_event("Quick", 1).await.unwrap();

    let outcome = f.engine.reserve(EventId::new(1), "ana").await.unwrap();
    assert_eq!(
        outcome,
        ReservationOutcome::HoldGranted {
            event_id: EventId::new(1),
            expires_in_secs: 10
        }
    );
    assert_eq!(
        outcome.message(),
        "Temporary reservation made. Confirm within 10 seconds."
    );

    f.clock.advance(Duration::from_secs(10));
    f.engine.sweep().await.unwrap();
    assert_eq!(f.engine.find(EventId::new(1)).await.unwrap().available_spots, 1);
}

#[tokio::test]
async fn test_unknown_event_lookups() {
    let f = default_fixture();
    assert!(matches!(
        f.engine.find(EventId::new(3)).await,
        Err(ReservationError::NotFound { .. })
    ));
    assert!(matches!(
        f.engine.reserve(EventId::new(3), "ana").await,
        Err(ReservationError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_broadcast_observers_see_engine_notifications() {
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let sink = Arc::new(BroadcastSink::new(16));
    let engine = ReservationEngine::new(
        EngineConfig::default().with_seed_events(Vec::new()),
        clock,
        sink.clone(),
    );
    let mut observer = sink.subscribe();

    engine.create_event("Live", 1).await.unwrap();

    assert_eq!(observer.recv().await.unwrap().name(), "event_created");
    assert_eq!(observer.recv().await.unwrap().name(), "events_updated");
}

#[tokio::test]
async fn test_health_reports_counts() {
    let f = default_fixture();
    f.engine.create_event("Solo", 1).await.unwrap();
    f.engine.reserve(EventId::new(1), "ana").await.unwrap();
    f.engine.reserve(EventId::new(1), "ben").await.unwrap();

    let check = f.engine.health().await;

    assert_eq!(check.component, Component::Engine);
    assert_eq!(check.status, HealthStatus::Healthy);
    assert_eq!(check.counts["events"], 1);
    assert_eq!(check.counts["queue_length"], 1);
    assert_eq!(check.counts["active_holds"], 1);
}

/// Current value of `reservations_waiting_queue_length` in a Prometheus render
fn queue_gauge(rendered: &str) -> f64 {
    rendered
        .lines()
        .find_map(|line| line.strip_prefix("reservations_waiting_queue_length "))
        .expect("queue gauge was never set")
        .trim()
        .parse()
        .unwrap()
}

#[test]
fn test_queue_gauge_follows_hold_granted_elsewhere() {
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    let f = default_fixture();

    metrics::with_local_recorder(&recorder, || {
        tokio_test::block_on(async {
            f.engine.create_event("Solo", 1).await.unwrap();
            f.engine.create_event("Duo", 2).await.unwrap();
            f.engine.reserve(EventId::new(1), "ana").await.unwrap();

            f.engine.reserve(EventId::new(1), "ben").await.unwrap();
            assert!((queue_gauge(&handle.render()) - 1.0).abs() < f64::EPSILON);

            let outcome = f.engine.reserve(EventId::new(2), "ben").await.unwrap();
            assert!(matches!(outcome, ReservationOutcome::HoldGranted { .. }));
            assert!(f.engine.queue().await.is_empty());
            assert!(queue_gauge(&handle.render()).abs() < f64::EPSILON);
        });
    });
}
