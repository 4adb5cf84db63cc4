//! Router configuration for the reservation server.

use crate::error::AppError;
use crate::handlers::{events, health, reservations, websocket};
use crate::state::AppState;
use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Build the complete Axum router.
///
/// Configures:
/// - Liveness, health and metrics endpoints
/// - Event registry endpoints
/// - Reservation endpoints
/// - The WebSocket observer stream
///
/// Every response carries an `x-request-id` header; CORS is permissive.
pub fn build_router(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new());

    Router::new()
        // Health checks
        .route("/", get(health::index))
        .route("/health", get(health::health))
        .route("/metrics", get(health::metrics))
        // Event registry
        .route("/create_event", post(events::create_event))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/queue", get(events::waiting_queue))
        // Reservations
        .route("/reserve", post(reservations::reserve))
        .route("/confirm", post(reservations::confirm))
        .route("/cancel", post(reservations::cancel))
        // Real-time observers
        .route("/ws", get(websocket::handle))
        .fallback(not_found)
        .layer(middleware)
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn not_found(uri: Uri) -> AppError {
    AppError::not_found("Route", uri.path())
}
