//! HTTP API tests against the full router

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use axum::http::StatusCode;
use axum_test::TestServer;
use reservations_runtime::{BroadcastSink, EngineConfig, ReservationEngine, SeedEvent};
use reservations_testing::ManualClock;
use reservations_web::handlers::health::LIVENESS_TEXT;
use reservations_web::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    server: TestServer,
    engine: ReservationEngine,
    clock: Arc<ManualClock>,
}

fn harness(config: EngineConfig) -> Harness {
    let clock = Arc::new(ManualClock::starting_at_test_epoch());
    let sink = Arc::new(BroadcastSink::default());
    let engine = ReservationEngine::new(config, clock.clone(), sink.clone());
    let server = TestServer::new(build_router(AppState::new(engine.clone(), sink, 3))).unwrap();
    Harness {
        server,
        engine,
        clock,
    }
}

fn empty() -> Harness {
    harness(EngineConfig::default().with_seed_events(Vec::new()))
}

fn hold(event_id: u64, user_name: &str) -> Value {
    json!({ "event_id": event_id, "user_name": user_name })
}

#[tokio::test]
async fn test_index_liveness() {
    let h = empty();
    let response = h.server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), LIVENESS_TEXT);
}

#[tokio::test]
async fn test_create_event_and_list() {
    let h = empty();

    let response = h
        .server
        .post("/create_event")
        .json(&json!({ "event_name": "Opening", "available_spots": 2 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"], "event_created");
    assert_eq!(body["event"]["id"], 1);
    assert_eq!(body["event"]["name"], "Opening");
    assert_eq!(body["message"], "Event 'Opening' created");

    let events: Value = h.server.get("/events").await.json();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["available_spots"], 2);

    let event: Value = h.server.get("/events/1").await.json();
    assert_eq!(event["name"], "Opening");
}

#[tokio::test]
async fn test_duplicate_event_is_conflict() {
    let h = empty();
    let body = json!({ "event_name": "Opening", "available_spots": 2 });
    h.server.post("/create_event").json(&body).await.assert_status_ok();

    let response = h.server.post("/create_event").json(&body).await;

    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["code"], "DUPLICATE_NAME");
    assert_eq!(error["message"], "An event named 'Opening' already exists");
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let h = empty();
    let response = h
        .server
        .post("/create_event")
        .json(&json!({ "event_name": "Opening" }))
        .await;

    assert!(response.status_code().is_client_error());
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_reserve_confirm_flow() {
    let h = empty();
    h.engine.create_event("Opening", 1).await.unwrap();

    let response = h.server.post("/reserve").json(&hold(1, "ana")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body["message"],
        "Temporary reservation made. Confirm within 2 minutes."
    );
    assert_eq!(body["outcome"], "hold_granted");
    assert_eq!(body["expires_in_secs"], 120);

    let response = h.server.post("/confirm").json(&hold(1, "ana")).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Reservation confirmed!");
    assert_eq!(body["event"]["confirmed_by"][0], "ana");

    let response = h.server.post("/confirm").json(&hold(1, "ana")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let error: Value = response.json();
    assert_eq!(error["code"], "HOLD_NOT_FOUND");
}

#[tokio::test]
async fn test_full_event_queues_then_promotes_after_expiry() {
    let h = empty();
    h.engine.create_event("Solo", 1).await.unwrap();

    h.server.post("/reserve").json(&hold(1, "ana")).await.assert_status_ok();
    let body: Value = h.server.post("/reserve").json(&hold(1, "ben")).await.json();
    assert_eq!(body["outcome"], "queued");
    assert_eq!(body["position"], 1);

    let queue: Value = h.server.get("/queue").await.json();
    assert_eq!(queue, json!(["ben"]));

    h.clock.advance(Duration::from_secs(120));
    h.engine.sweep().await.unwrap();

    let event: Value = h.server.get("/events/1").await.json();
    assert_eq!(event["reserved_users"][0]["user_name"], "ben");
    assert_eq!(event["available_spots"], 0);
    let queue: Value = h.server.get("/queue").await.json();
    assert_eq!(queue, json!([]));
}

#[tokio::test]
async fn test_second_reservation_is_conflict() {
    let h = empty();
    h.engine.create_event("First", 2).await.unwrap();
    h.engine.create_event("Second", 2).await.unwrap();
    h.server.post("/reserve").json(&hold(1, "ana")).await.assert_status_ok();

    let response = h.server.post("/reserve").json(&hold(2, "ana")).await;

    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["code"], "DUPLICATE_RESERVATION");
}

#[tokio::test]
async fn test_padded_user_name_is_same_user() {
    let h = empty();
    h.engine.create_event("First", 2).await.unwrap();
    h.engine.create_event("Second", 2).await.unwrap();
    h.server.post("/reserve").json(&hold(1, "ana")).await.assert_status_ok();

    let response = h.server.post("/reserve").json(&hold(2, "  ana ")).await;

    response.assert_status(StatusCode::CONFLICT);
    let event: Value = h.server.get("/events/2").await.json();
    assert_eq!(event["available_spots"], 2);
}

#[tokio::test]
async fn test_cancel_without_hold() {
    let h = empty();
    h.engine.create_event("Opening", 2).await.unwrap();

    let response = h.server.post("/cancel").json(&hold(1, "ghost")).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let event: Value = h.server.get("/events/1").await.json();
    assert_eq!(event["available_spots"], 2);
}

#[tokio::test]
async fn test_cancel_releases_spot() {
    let h = empty();
    h.engine.create_event("Opening", 2).await.unwrap();
    h.server.post("/reserve").json(&hold(1, "ana")).await.assert_status_ok();

    let response = h.server.post("/cancel").json(&hold(1, "ana")).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Reservation cancelled.");
    assert_eq!(body["released"], true);
    assert_eq!(body["event"]["available_spots"], 2);
}

#[tokio::test]
async fn test_unknown_event() {
    let h = empty();

    let response = h.server.get("/events/42").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error: Value = response.json();
    assert_eq!(error["code"], "NOT_FOUND");

    h.server
        .post("/reserve")
        .json(&hold(42, "ana"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_user_is_unprocessable() {
    let h = empty();
    h.engine.create_event("Opening", 2).await.unwrap();

    let response = h.server.post("/reserve").json(&hold(1, "  ")).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = response.json();
    assert_eq!(error["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn test_seeded_events_are_listed() {
    let h = harness(EngineConfig::default().with_seed_events(vec![
        SeedEvent::new("Jazz", 4),
        SeedEvent::new("Rock", 2),
    ]));
    h.engine.seed().await.unwrap();

    let events: Value = h.server.get("/events").await.json();

    assert_eq!(events[0]["name"], "Jazz");
    assert_eq!(events[1]["name"], "Rock");
    assert_eq!(events[1]["id"], 2);
}

#[tokio::test]
async fn test_health_report() {
    let h = empty();

    let response = h.server.get("/health").await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["status"], "healthy");
    assert_eq!(report["checks"][0]["component"], "engine");
    assert_eq!(report["checks"][0]["counts"]["events"], 0);
    assert_eq!(report["checks"][1]["component"], "observers");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let h = empty();
    let response = h.server.get("/nope").await;
    response.assert_status(StatusCode::NOT_FOUND);
    let error: Value = response.json();
    assert_eq!(error["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let h = empty();
    let response = h.server.get("/events").await;
    assert!(response.headers().contains_key("x-request-id"));
}
