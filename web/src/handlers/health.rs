//! Health check and metrics endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use reservations_runtime::{Component, HealthCheck, HealthReport};

/// Liveness text served on `/`.
pub const LIVENESS_TEXT: &str = "Reservation server running";

/// Simple liveness endpoint.
///
/// Returns 200 OK to indicate the process is serving requests. Checks
/// nothing else.
///
/// # Endpoint
///
/// ```text
/// GET /
/// ```
#[allow(clippy::unused_async)]
pub async fn index() -> (StatusCode, &'static str) {
    (StatusCode::OK, LIVENESS_TEXT)
}

/// Readiness report over the engine, the sweeper and observer admission.
///
/// # Status Codes
///
/// - 200 OK: Healthy or Degraded
/// - 503 Service Unavailable: Unhealthy (e.g. the sweeper has stopped)
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "checks": [
///     { "component": "engine", "status": "healthy", "counts": { "events": 5, ... } },
///     { "component": "sweeper", "status": "healthy", "counts": { "passes": 42, ... } }
///   ],
///   "timestamp": "2025-01-01T00:00:00Z"
/// }
/// ```
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let mut checks = vec![state.engine.health().await];
    if let Some(sweeper) = &state.sweeper {
        checks.push(sweeper.health());
    }
    checks.push(
        HealthCheck::new(Component::Observers)
            .count("online", state.observers.online() as u64)
            .count("max_online", state.observers.max_online() as u64),
    );

    let report = HealthReport::new(checks);
    let status = if report.is_unhealthy() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(report))
}

/// Prometheus text exposition.
///
/// # Errors
///
/// `503` when metrics are disabled or another recorder owns the registry.
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> Result<String, AppError> {
    state
        .metrics
        .as_ref()
        .and_then(|metrics| metrics.render())
        .ok_or_else(|| AppError::unavailable("Metrics are not enabled"))
}
