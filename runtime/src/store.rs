//! The Store: runtime coordinator for a reducer.

use reservations_core::environment::NotificationSink;
use reservations_core::reducer::{Reduced, Reducer};
use std::sync::Arc;
use tokio::sync::RwLock;

/// The Store - runtime coordinator for a reducer
///
/// The Store manages:
/// 1. State (behind `RwLock` for concurrent access)
/// 2. Reducer (business logic)
/// 3. Environment (injected dependencies)
/// 4. Notification dispatch to the injected sink
///
/// Every `send` runs the reducer and publishes the resulting notifications
/// while holding the write lock, so observers see notifications in exactly the
/// order the state changed.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(
///     ReservationState::new(),
///     ReservationReducer::new(),
///     environment,
///     Arc::new(DiscardSink),
/// );
///
/// store.send(ReservationAction::Sweep).await?;
/// let events = store.state(|s| s.events_snapshot()).await;
/// ```
pub struct Store<R>
where
    R: Reducer,
{
    state: Arc<RwLock<R::State>>,
    reducer: R,
    environment: R::Environment,
    sink: Arc<dyn NotificationSink>,
}

impl<R> Store<R>
where
    R: Reducer + Send + Sync,
    R::State: Send + Sync,
    R::Environment: Send + Sync,
{
    /// Create a new store with initial state, reducer, environment and sink
    #[must_use]
    pub fn new(
        initial_state: R::State,
        reducer: R,
        environment: R::Environment,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial_state)),
            reducer,
            environment,
            sink,
        }
    }

    /// Send an action to the store
    ///
    /// 1. Acquires the write lock on state
    /// 2. Calls the reducer with (state, action, environment)
    /// 3. Publishes the returned notifications, still under the lock
    ///
    /// Concurrent `send` calls serialize on the lock.
    ///
    /// # Errors
    ///
    /// Returns the reducer's error when it rejects the action. A rejected
    /// action publishes nothing.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub async fn send(&self, action: R::Action) -> Result<R::Output, R::Error> {
        let mut state = self.state.write().await;
        let Reduced { output, effects } =
            self.reducer.reduce(&mut *state, action, &self.environment)?;

        tracing::trace!(notifications = effects.len(), "Publishing notifications");
        for notification in effects {
            self.sink.publish(notification);
        }
        drop(state);

        Ok(output)
    }

    /// Read current state via a closure
    ///
    /// Takes the read lock, so the closure sees a state no writer is halfway
    /// through.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let state = self.state.read().await;
        f(&*state)
    }

    /// The injected environment
    #[must_use]
    pub const fn environment(&self) -> &R::Environment {
        &self.environment
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use reservations_core::reducer::Effects;
    use reservations_core::{Notification, smallvec};
    use reservations_testing::RecordingSink;

    /// Counter that refuses to go above a limit
    #[derive(Clone)]
    struct CappedCounter;

    impl Reducer for CappedCounter {
        type State = u32;
        type Action = u32;
        type Environment = u32;
        type Output = u32;
        type Error = String;

        fn reduce(
            &self,
            state: &mut u32,
            action: u32,
            limit: &u32,
        ) -> Result<Reduced<u32>, String> {
            if *state + action > *limit {
                return Err(format!("{} exceeds {limit}", *state + action));
            }
            *state += action;
            let effects: Effects = smallvec![Notification::UserCount {
                online_users: *state as usize
            }];
            Ok(Reduced::new(*state, effects))
        }
    }

    #[tokio::test]
    async fn test_send_publishes_effects() {
        let sink = Arc::new(RecordingSink::new());
        let store = Store::new(0, CappedCounter, 10, sink.clone());

        assert_eq!(store.send(4).await, Ok(4));
        assert_eq!(store.send(3).await, Ok(7));

        assert_eq!(store.state(|s| *s).await, 7);
        assert_eq!(
            sink.notifications(),
            vec![
                Notification::UserCount { online_users: 4 },
                Notification::UserCount { online_users: 7 },
            ]
        );
    }

    #[tokio::test]
    async fn test_rejected_action_publishes_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let store = Store::new(9, CappedCounter, 10, sink.clone());

        assert!(store.send(5).await.is_err());

        assert_eq!(store.state(|s| *s).await, 9);
        assert!(sink.notifications().is_empty());
        assert_eq!(*store.environment(), 10);
    }

    #[tokio::test]
    async fn test_concurrent_sends_serialize() {
        let sink = Arc::new(RecordingSink::new());
        let store = Arc::new(Store::new(0, CappedCounter, 1000, sink.clone()));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.send(1).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.state(|s| *s).await, 50);
        // Notifications came out in lock order
        let counts: Vec<usize> = sink
            .notifications()
            .into_iter()
            .map(|n| match n {
                Notification::UserCount { online_users } => online_users,
                _ => 0,
            })
            .collect();
        assert_eq!(counts, (1..=50).collect::<Vec<_>>());
    }
}
