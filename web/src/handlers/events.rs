//! Event registry endpoints.

use super::OperationResponse;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use reservations_core::{Event, EventId, UserName};
use serde::Deserialize;

/// Body of `POST /create_event`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventRequest {
    /// Unique display name
    pub event_name: String,
    /// Number of spots
    pub available_spots: u32,
}

/// `POST /create_event`
///
/// # Errors
///
/// `409 DUPLICATE_NAME` if the name is taken, `422 INVALID_REQUEST` for a
/// blank name.
pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .create_event(request.event_name, request.available_spots)
        .await?;
    Ok(Json(outcome.into()))
}

/// `GET /events`
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<Event>> {
    Json(state.engine.list_all().await)
}

/// `GET /events/:id`
///
/// # Errors
///
/// `404 NOT_FOUND` for an unknown id.
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
) -> Result<Json<Event>, AppError> {
    Ok(Json(state.engine.find(EventId::new(event_id)).await?))
}

/// `GET /queue`
pub async fn waiting_queue(State(state): State<AppState>) -> Json<Vec<UserName>> {
    Json(state.engine.queue().await)
}
