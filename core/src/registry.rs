//! The event registry.
//!
//! Holds every event in creation order and hands out sequential ids. Events
//! are never removed, so the position of an event in the registry is stable.

use crate::error::ReservationError;
use crate::types::{Event, EventId, UserName};
use serde::{Deserialize, Serialize};

/// All events known to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRegistry {
    events: Vec<Event>,
    next_id: u64,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Create an empty registry; the first event gets id 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Create an event with every spot available.
    ///
    /// The name is trimmed before the uniqueness check.
    ///
    /// # Errors
    ///
    /// - [`ReservationError::InvalidRequest`] if the name is blank
    /// - [`ReservationError::DuplicateName`] if an event already uses the name
    pub fn create(&mut self, name: &str, capacity: u32) -> Result<&Event, ReservationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ReservationError::InvalidRequest(
                "event name must not be empty".to_string(),
            ));
        }
        if self.events.iter().any(|event| event.name == name) {
            return Err(ReservationError::DuplicateName {
                name: name.to_string(),
            });
        }

        let id = EventId::new(self.next_id);
        self.next_id += 1;
        self.events.push(Event::new(id, name, capacity));

        let index = self.events.len() - 1;
        Ok(&self.events[index])
    }

    /// Look up an event by id.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::NotFound`] for an unknown id.
    pub fn find(&self, event_id: EventId) -> Result<&Event, ReservationError> {
        self.index_of(event_id)
            .map(|index| &self.events[index])
            .ok_or(ReservationError::NotFound { event_id })
    }

    /// Look up an event by id for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::NotFound`] for an unknown id.
    pub fn find_mut(&mut self, event_id: EventId) -> Result<&mut Event, ReservationError> {
        match self.index_of(event_id) {
            Some(index) => Ok(&mut self.events[index]),
            None => Err(ReservationError::NotFound { event_id }),
        }
    }

    /// All events in creation order
    #[must_use]
    pub fn list_all(&self) -> &[Event] {
        &self.events
    }

    /// Event at a registry position, for passes that walk every event
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Event> {
        self.events.get_mut(index)
    }

    /// Id of the event where `user_name` holds or has confirmed a spot
    #[must_use]
    pub fn holder_of(&self, user_name: &UserName) -> Option<EventId> {
        self.events
            .iter()
            .find(|event| event.involves(user_name))
            .map(|event| event.id)
    }

    /// Number of active holds across every event
    #[must_use]
    pub fn active_holds(&self) -> usize {
        self.events.iter().map(|event| event.reserved_users.len()).sum()
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no event exists
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    fn index_of(&self, event_id: EventId) -> Option<usize> {
        // Ids are sequential and events are never removed
        let index = usize::try_from(event_id.get().checked_sub(1)?).ok()?;
        self.events
            .get(index)
            .filter(|event| event.id == event_id)
            .map(|_| index)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_and_insertion_order() {
        let mut registry = EventRegistry::new();
        let first = registry.create("Opening", 5).expect("create").id;
        let second = registry.create("Closing", 3).expect("create").id;

        assert_eq!(first, EventId::new(1));
        assert_eq!(second, EventId::new(2));
        let names: Vec<_> = registry.list_all().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Opening", "Closing"]);
    }

    #[test]
    fn test_duplicate_name_rejected_without_side_effects() {
        let mut registry = EventRegistry::new();
        registry.create("Opening", 5).expect("create");

        let err = registry.create("  Opening ", 9).unwrap_err();
        assert_eq!(
            err,
            ReservationError::DuplicateName {
                name: "Opening".to_string()
            }
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.create("Next", 1).expect("create").id, EventId::new(2));
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = EventRegistry::new();
        assert!(matches!(
            registry.create("   ", 1),
            Err(ReservationError::InvalidRequest(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_unknown_ids() {
        let mut registry = EventRegistry::new();
        registry.create("Opening", 5).expect("create");

        assert!(registry.find(EventId::new(1)).is_ok());
        for id in [0, 2, u64::MAX] {
            assert_eq!(
                registry.find(EventId::new(id)).unwrap_err(),
                ReservationError::NotFound {
                    event_id: EventId::new(id)
                }
            );
        }
    }
}
