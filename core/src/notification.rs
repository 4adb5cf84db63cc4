//! State change notifications pushed to observers.
//!
//! Every mutation of the engine produces one or more notifications. Each one
//! has a stable wire name (see [`Notification::name`]) and serializes as
//!
//! ```json
//! { "event": "event_reserved", "data": { "event": { ... }, "user_name": "ana" } }
//! ```

use crate::types::{Event, EventId, UserName};
use serde::{Deserialize, Serialize};

/// A named state change with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Notification {
    /// A new event was created
    EventCreated {
        /// The new event
        event: Event,
    },
    /// Full registry snapshot
    EventsUpdated {
        /// All events, in creation order
        events: Vec<Event>,
    },
    /// A user obtained a hold, directly or by promotion
    EventReserved {
        /// Event after the hold was granted
        event: Event,
        /// The holder
        user_name: UserName,
    },
    /// The waiting queue changed (or was re-announced after an expiry)
    QueueUpdated {
        /// Queue contents, head first
        queue: Vec<UserName>,
    },
    /// A hold became a confirmation
    ReservationConfirmed {
        /// Event after confirmation
        event: Event,
        /// The confirming user
        user_name: UserName,
    },
    /// A hold was cancelled by its owner
    ReservationCancelled {
        /// Event after cancellation
        event: Event,
        /// The cancelling user
        user_name: UserName,
    },
    /// An event changed because a hold expired
    EventUpdated {
        /// Event after the expiry
        event: Event,
    },
    /// Countdown for one active hold
    TimeLeft {
        /// Event the hold belongs to
        event_id: EventId,
        /// Whole seconds remaining, rounded down
        time_left: u64,
    },
    /// A queued user was promoted into a freed spot
    UserJoined {
        /// The promoted user
        user_name: UserName,
        /// Event after promotion
        event: Event,
    },
    /// Number of connected observers changed
    UserCount {
        /// Observers currently connected
        online_users: usize,
    },
}

impl Notification {
    /// Wire name of the notification
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EventCreated { .. } => "event_created",
            Self::EventsUpdated { .. } => "events_updated",
            Self::EventReserved { .. } => "event_reserved",
            Self::QueueUpdated { .. } => "queue_updated",
            Self::ReservationConfirmed { .. } => "reservation_confirmed",
            Self::ReservationCancelled { .. } => "reservation_cancelled",
            Self::EventUpdated { .. } => "event_updated",
            Self::TimeLeft { .. } => "time_left",
            Self::UserJoined { .. } => "user_joined",
            Self::UserCount { .. } => "user_count",
        }
    }
}
