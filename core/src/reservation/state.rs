//! Reservation state: the registry and the waiting queue, owned together.

use crate::queue::WaitingQueue;
use crate::registry::EventRegistry;
use crate::types::{Event, UserName};
use serde::{Deserialize, Serialize};

/// Everything the engine guards behind its exclusion lock
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationState {
    /// Events and their occupancy
    pub registry: EventRegistry,
    /// Users waiting for any spot
    pub queue: WaitingQueue,
}

impl ReservationState {
    /// Create an empty state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registry: EventRegistry::new(),
            queue: WaitingQueue::new(),
        }
    }

    /// Copy of every event, in creation order
    #[must_use]
    pub fn events_snapshot(&self) -> Vec<Event> {
        self.registry.list_all().to_vec()
    }

    /// Copy of the waiting queue, head first
    #[must_use]
    pub fn queue_snapshot(&self) -> Vec<UserName> {
        self.queue.snapshot()
    }
}
