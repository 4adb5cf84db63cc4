//! Broadcast fan-out of notifications.

use reservations_core::Notification;
use reservations_core::environment::NotificationSink;
use tokio::sync::broadcast;

/// Default buffer of the notification channel
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Notification sink backed by a `tokio::sync::broadcast` channel.
///
/// Every subscriber receives every notification published after it
/// subscribed. Slow subscribers that fall more than the channel capacity
/// behind observe `RecvError::Lagged` and skip ahead; publishing never blocks.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` notifications per subscriber
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every notification published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live subscribers
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, notification: Notification) {
        let name = notification.name();
        // No subscribers is not an error; nobody is watching
        if self.sender.send(notification).is_err() {
            tracing::trace!(notification = name, "No observers for notification");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_in_order() {
        let sink = BroadcastSink::new(8);
        let mut first = sink.subscribe();
        let mut second = sink.subscribe();

        sink.publish(Notification::UserCount { online_users: 1 });
        sink.publish(Notification::UserCount { online_users: 2 });

        for rx in [&mut first, &mut second] {
            assert_eq!(
                rx.recv().await.unwrap(),
                Notification::UserCount { online_users: 1 }
            );
            assert_eq!(
                rx.recv().await.unwrap(),
                Notification::UserCount { online_users: 2 }
            );
        }
        assert_eq!(sink.receiver_count(), 2);
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let sink = BroadcastSink::new(0);
        sink.publish(Notification::UserCount { online_users: 0 });
        assert_eq!(sink.receiver_count(), 0);
    }
}
