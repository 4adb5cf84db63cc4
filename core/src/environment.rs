//! Injected dependencies.
//!
//! Everything the reducer needs from the outside world is abstracted behind a
//! trait so tests can substitute deterministic implementations.

use crate::notification::Notification;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Clock trait - abstracts time operations for testability
///
/// # Examples
///
/// ```
/// use reservations_core::environment::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let before = clock.now();
/// assert!(clock.now() >= before);
/// ```
pub trait Clock: Send + Sync {
    /// Get the current time
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Receiver of state change notifications.
///
/// The engine calls `publish` once per notification, in mutation order, while
/// it still holds its exclusion lock. Implementations must not block and must
/// not call back into the engine.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification to subscribers
    fn publish(&self, notification: Notification);
}

impl<S: NotificationSink + ?Sized> NotificationSink for Arc<S> {
    fn publish(&self, notification: Notification) {
        (**self).publish(notification);
    }
}

/// Sink that drops everything, for callers without observers
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl NotificationSink for DiscardSink {
    fn publish(&self, _notification: Notification) {}
}
