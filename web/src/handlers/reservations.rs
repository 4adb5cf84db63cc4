//! Reserve, confirm and cancel endpoints.

use super::OperationResponse;
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use reservations_core::{EventId, UserName};
use serde::Deserialize;

/// Body shared by `/reserve`, `/confirm` and `/cancel`
#[derive(Debug, Clone, Deserialize)]
pub struct HoldRequest {
    /// Target event
    pub event_id: EventId,
    /// Requesting user
    pub user_name: UserName,
}

/// `POST /reserve`
///
/// Grants a hold, or queues the user when the event is full.
///
/// # Errors
///
/// `404` for an unknown event, `409` if the user already has a reservation.
pub async fn reserve(
    State(state): State<AppState>,
    payload: Result<Json<HoldRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .reserve(request.event_id, request.user_name)
        .await?;
    Ok(Json(outcome.into()))
}

/// `POST /confirm`
///
/// # Errors
///
/// `404` for an unknown event, `400 HOLD_NOT_FOUND` without an active hold.
pub async fn confirm(
    State(state): State<AppState>,
    payload: Result<Json<HoldRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .confirm(request.event_id, request.user_name)
        .await?;
    Ok(Json(outcome.into()))
}

/// `POST /cancel`
///
/// # Errors
///
/// `404` for an unknown event, `400 HOLD_NOT_FOUND` without an active hold
/// under the default cancel policy.
pub async fn cancel(
    State(state): State<AppState>,
    payload: Result<Json<HoldRequest>, JsonRejection>,
) -> Result<Json<OperationResponse>, AppError> {
    let Json(request) = payload?;
    let outcome = state
        .engine
        .cancel(request.event_id, request.user_name)
        .await?;
    Ok(Json(outcome.into()))
}
