//! HTTP request handlers.
//!
//! This module contains all HTTP handlers organized by concern.

pub mod events;
pub mod health;
pub mod reservations;
pub mod websocket;

use reservations_core::ReservationOutcome;
use serde::Serialize;

/// Success body of a state-changing request.
///
/// Serializes as `{"message": ..., "outcome": ..., <outcome fields>}`.
#[derive(Debug, Clone, Serialize)]
pub struct OperationResponse {
    /// Human-readable summary
    pub message: String,
    /// What the engine did
    #[serde(flatten)]
    pub outcome: ReservationOutcome,
}

impl From<ReservationOutcome> for OperationResponse {
    fn from(outcome: ReservationOutcome) -> Self {
        Self {
            message: outcome.message(),
            outcome,
        }
    }
}
