//! # Reservations Testing
//!
//! Testing utilities and helpers for the reservation engine.
//!
//! This crate provides:
//! - Deterministic clocks and a recording notification sink
//! - A Given-When-Then harness for reducers
//! - Invariant assertions over event snapshots
//! - proptest strategies for user names and operation sequences
//!
//! ## Example
//!
//! ```ignore
//! use reservations_testing::{ManualClock, RecordingSink};
//!
//! #[tokio::test]
//! async fn test_hold_expires() {
//!     let clock = Arc::new(ManualClock::starting_at_test_epoch());
//!     let sink = Arc::new(RecordingSink::new());
//!     let engine = ReservationEngine::new(EngineConfig::default(), clock.clone(), sink.clone());
//!
//!     engine.create_event("Solo", 1).await.unwrap();
//!     engine.reserve(EventId::new(1), "ana").await.unwrap();
//!     clock.advance(Duration::from_secs(120));
//!     engine.sweep().await.unwrap();
//!
//!     assert!(sink.names().contains(&"event_updated"));
//! }
//! ```

use chrono::{DateTime, Utc};
use reservations_core::environment::{Clock, NotificationSink};


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, NotificationSink, Utc};
    use reservations_core::Notification;
    use std::sync::{Mutex, MutexGuard};
    use std::time::Duration;

    /// Lock a mutex, recovering the data if a panicking test poisoned it
    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reservations_testing::mocks::FixedClock;
    /// use reservations_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that only moves when told to
    ///
    /// Shared between a test and the engine through an `Arc`, so the test can
    /// age holds without sleeping.
    ///
    /// ```
    /// use reservations_testing::ManualClock;
    /// use reservations_core::environment::Clock;
    /// use std::time::Duration;
    ///
    /// let clock = ManualClock::starting_at_test_epoch();
    /// let start = clock.now();
    /// clock.advance(Duration::from_secs(90));
    /// assert_eq!((clock.now() - start).num_seconds(), 90);
    /// ```
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock reading `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Create a clock reading the same instant as [`test_clock`]
        #[must_use]
        pub fn starting_at_test_epoch() -> Self {
            Self::new(test_clock().now())
        }

        /// Move the clock forward
        ///
        /// # Panics
        ///
        /// Panics if `by` does not fit in a `chrono::Duration`.
        #[allow(clippy::expect_used)] // Test helper
        pub fn advance(&self, by: Duration) {
            let by = chrono::Duration::from_std(by).expect("advance fits in chrono::Duration");
            *lock(&self.time) += by;
        }

        /// Jump to an absolute time
        pub fn set(&self, time: DateTime<Utc>) {
            *lock(&self.time) = time;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *lock(&self.time)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Sink that keeps every notification in memory
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        published: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        /// Create an empty sink
        #[must_use]
        pub const fn new() -> Self {
            Self {
                published: Mutex::new(Vec::new()),
            }
        }

        /// Every notification so far, in publish order
        #[must_use]
        pub fn notifications(&self) -> Vec<Notification> {
            lock(&self.published).clone()
        }

        /// Wire names of every notification so far
        #[must_use]
        pub fn names(&self) -> Vec<&'static str> {
            lock(&self.published).iter().map(Notification::name).collect()
        }

        /// Number of notifications so far
        #[must_use]
        pub fn count(&self) -> usize {
            lock(&self.published).len()
        }

        /// Forget everything recorded so far
        pub fn clear(&self) {
            lock(&self.published).clear();
        }
    }

    impl NotificationSink for RecordingSink {
        fn publish(&self, notification: Notification) {
            lock(&self.published).push(notification);
        }
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use reservations_core::{Event, UserName};
    use std::collections::HashMap;

    /// Route `tracing` output through the test harness.
    ///
    /// Safe to call from every test; only the first call installs anything.
    /// Honours `RUST_LOG`.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Assert every event accounts for all of its spots.
    ///
    /// # Panics
    ///
    /// Panics if `available + holds + confirmations != capacity` for any
    /// event.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_capacity_conserved(events: &[Event]) {
        for event in events {
            assert_eq!(
                event.available_spots as usize + event.consumed_spots(),
                event.capacity as usize,
                "event {} ({}) does not conserve capacity: {} available, {} held, {} confirmed",
                event.id,
                event.name,
                event.available_spots,
                event.reserved_users.len(),
                event.confirmed_by.len(),
            );
        }
    }

    /// Assert no user appears in more than one hold or confirmation.
    ///
    /// # Panics
    ///
    /// Panics naming the first user found twice.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_one_reservation_per_user(events: &[Event]) {
        let mut seen: HashMap<&UserName, usize> = HashMap::new();
        for event in events {
            let holders = event.reserved_users.iter().map(|hold| &hold.user_name);
            for user in holders.chain(event.confirmed_by.iter()) {
                let count = seen.entry(user).or_default();
                *count += 1;
                assert!(*count == 1, "{user} holds more than one reservation");
            }
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use reservations_core::{EventId, ReservationAction, UserName};

    /// A user name drawn from a small pool so collisions are common
    pub fn user_name() -> impl Strategy<Value = UserName> {
        prop::sample::select(vec!["ana", "ben", "cid", "dee", "eve", "fay", "gus", "hal"])
            .prop_map(UserName::from)
    }

    /// An id among the first `events` events, plus one that never exists
    pub fn event_id(events: u64) -> impl Strategy<Value = EventId> {
        (1..=events + 1).prop_map(EventId::new)
    }

    /// Any user-facing operation or a sweep
    pub fn action(events: u64) -> impl Strategy<Value = ReservationAction> {
        prop_oneof![
            4 => (event_id(events), user_name())
                .prop_map(|(event_id, user_name)| ReservationAction::Reserve { event_id, user_name }),
            2 => (event_id(events), user_name())
                .prop_map(|(event_id, user_name)| ReservationAction::Confirm { event_id, user_name }),
            2 => (event_id(events), user_name())
                .prop_map(|(event_id, user_name)| ReservationAction::Cancel { event_id, user_name }),
            1 => Just(ReservationAction::Sweep),
        ]
    }

    /// A step of a scripted run: an action, then a clock advance in seconds
    pub fn timed_actions(
        events: u64,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<(ReservationAction, u64)>> {
        prop::collection::vec((action(events), 0u64..90), 0..max_len)
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, RecordingSink, test_clock};

#[cfg(test)]
mod tests {
    use super::*;
    use reservations_core::Notification;
    use std::time::Duration;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        let time1 = clock.now();
        let time2 = clock.now();
        assert_eq!(time1, time2);
    }

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::starting_at_test_epoch();
        clock.advance(Duration::from_millis(1500));
        assert_eq!((clock.now() - test_clock().now()).num_milliseconds(), 1500);
    }

    #[test]
    fn test_recording_sink() {
        let sink = RecordingSink::new();
        sink.publish(Notification::UserCount { online_users: 1 });
        sink.publish(Notification::QueueUpdated { queue: Vec::new() });

        assert_eq!(sink.names(), vec!["user_count", "queue_updated"]);
        assert_eq!(sink.count(), 2);
        sink.clear();
        assert_eq!(sink.count(), 0);
    }
}
