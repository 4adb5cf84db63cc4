//! Inputs and outputs of the reservation reducer.

use crate::types::{Event, EventId, UserName};
use serde::{Deserialize, Serialize};

/// Everything the engine can be asked to do
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationAction {
    /// Create an event with `capacity` spots
    CreateEvent {
        /// Unique display name
        name: String,
        /// Number of spots
        capacity: u32,
    },
    /// Hold a spot, or join the waiting queue when the event is full
    Reserve {
        /// Target event
        event_id: EventId,
        /// Requesting user
        user_name: UserName,
    },
    /// Turn an active hold into a confirmation
    Confirm {
        /// Event holding the spot
        event_id: EventId,
        /// Holder
        user_name: UserName,
    },
    /// Give an active hold back
    Cancel {
        /// Event holding the spot
        event_id: EventId,
        /// Holder
        user_name: UserName,
    },
    /// One expiry pass over every hold
    Sweep,
}

impl ReservationAction {
    /// Short operation name, used for logs and metrics labels
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CreateEvent { .. } => "create_event",
            Self::Reserve { .. } => "reserve",
            Self::Confirm { .. } => "confirm",
            Self::Cancel { .. } => "cancel",
            Self::Sweep => "sweep",
        }
    }
}

/// A hold identified by event and user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldRef {
    /// Event of the hold
    pub event_id: EventId,
    /// Holder
    pub user_name: UserName,
}

/// What one sweep pass did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Holds still running after the pass (including fresh promotions)
    pub active_holds: usize,
    /// Holds released because their time ran out
    pub expired: Vec<HoldRef>,
    /// Queued users that received a freed spot
    pub promoted: Vec<HoldRef>,
    /// Users still waiting after the pass
    pub queue_length: usize,
}

/// Result of an accepted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReservationOutcome {
    /// The event now exists
    EventCreated {
        /// The new event
        event: Event,
    },
    /// A temporary hold was granted; it must be confirmed within the window
    HoldGranted {
        /// Event holding the spot
        event_id: EventId,
        /// Length of the confirmation window
        expires_in_secs: u64,
    },
    /// No spot was free; the user is waiting
    Queued {
        /// 1-based queue position
        position: usize,
    },
    /// The hold became a confirmation
    Confirmed {
        /// Event after confirmation
        event: Event,
    },
    /// The hold was cancelled
    Cancelled {
        /// Event after cancellation
        event: Event,
        /// Whether a hold was actually found and removed
        released: bool,
    },
    /// An expiry pass ran
    Swept(SweepReport),
}

impl ReservationOutcome {
    /// Human-readable summary for API responses
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::EventCreated { event } => format!("Event '{}' created", event.name),
            Self::HoldGranted {
                expires_in_secs, ..
            } => format!(
                "Temporary reservation made. Confirm within {}.",
                describe_window(*expires_in_secs)
            ),
            Self::Queued { position } => format!(
                "No spots available, you were added to the waiting queue (position {position})."
            ),
            Self::Confirmed { .. } => "Reservation confirmed!".to_string(),
            Self::Cancelled { .. } => "Reservation cancelled.".to_string(),
            Self::Swept(report) => format!(
                "Sweep complete: {} expired, {} promoted",
                report.expired.len(),
                report.promoted.len()
            ),
        }
    }
}

fn describe_window(secs: u64) -> String {
    match secs {
        60 => "1 minute".to_string(),
        secs if secs > 0 && secs % 60 == 0 => format!("{} minutes", secs / 60),
        1 => "1 second".to_string(),
        secs => format!("{secs} seconds"),
    }
}
