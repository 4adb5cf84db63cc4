//! Errors returned by rejected reservation operations.
//!
//! Every variant is local and synchronous: a rejected operation leaves the
//! state exactly as it found it and the engine stays usable.

use crate::types::{EventId, UserName};
use thiserror::Error;

/// Reasons an operation on the engine can be rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// No event with this id exists
    #[error("Event {event_id} not found")]
    NotFound {
        /// The unknown id
        event_id: EventId,
    },

    /// An event with this name already exists
    #[error("An event named '{name}' already exists")]
    DuplicateName {
        /// The colliding name
        name: String,
    },

    /// The user already holds or has confirmed a spot somewhere
    #[error("{user_name} already has a reservation for event {event_id}")]
    DuplicateReservation {
        /// The user that asked again
        user_name: UserName,
        /// Where the existing reservation lives
        event_id: EventId,
    },

    /// The user has no active hold on this event
    #[error("No active hold for {user_name} on event {event_id}")]
    HoldNotFound {
        /// Event that was targeted
        event_id: EventId,
        /// User without a hold
        user_name: UserName,
    },

    /// Malformed input, such as a blank name
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ReservationError {
    /// Stable machine-readable code, used for metrics labels and API bodies
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateName { .. } => "DUPLICATE_NAME",
            Self::DuplicateReservation { .. } => "DUPLICATE_RESERVATION",
            Self::HoldNotFound { .. } => "HOLD_NOT_FOUND",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }
}
