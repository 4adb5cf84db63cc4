//! Observer admission control.
//!
//! A fixed number of WebSocket observers may be connected at once. A slot is
//! taken with [`ObserverGate::try_admit`] and held by the returned
//! [`ObserverGuard`] until the connection ends. Every change of the online
//! count is published as [`Notification::UserCount`].

use reservations_core::environment::NotificationSink;
use reservations_core::Notification;
use reservations_runtime::metrics::ObserverMetrics;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts connected observers against a maximum
pub struct ObserverGate {
    online: AtomicUsize,
    max_online: usize,
    sink: Arc<dyn NotificationSink>,
}

impl ObserverGate {
    /// Create a gate admitting at most `max_online` observers
    #[must_use]
    pub fn new(max_online: usize, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            online: AtomicUsize::new(0),
            max_online,
            sink,
        }
    }

    /// Take a slot, or `None` when the gate is full
    pub fn try_admit(self: &Arc<Self>) -> Option<ObserverGuard> {
        let max = self.max_online;
        let previous = self
            .online
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .ok()?;

        ObserverMetrics::record_online(previous + 1);
        Some(ObserverGuard {
            gate: Arc::clone(self),
        })
    }

    /// Observers currently connected
    #[must_use]
    pub fn online(&self) -> usize {
        self.online.load(Ordering::Acquire)
    }

    /// Admission limit
    #[must_use]
    pub const fn max_online(&self) -> usize {
        self.max_online
    }

    fn publish_count(&self, online_users: usize) {
        self.sink.publish(Notification::UserCount { online_users });
    }
}

impl std::fmt::Debug for ObserverGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverGate")
            .field("online", &self.online())
            .field("max_online", &self.max_online)
            .finish_non_exhaustive()
    }
}

/// One admitted observer; releases its slot on drop
#[derive(Debug)]
pub struct ObserverGuard {
    gate: Arc<ObserverGate>,
}

impl ObserverGuard {
    /// Publish the online count including this observer.
    ///
    /// Call once the observer has subscribed so it sees its own arrival.
    pub fn announce(&self) {
        self.gate.publish_count(self.gate.online());
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let remaining = self.gate.online.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
        ObserverMetrics::record_online(remaining);
        self.gate.publish_count(remaining);
    }
}
