//! The reservation engine facade.
//!
//! [`ReservationEngine`] wraps a [`Store`] running the
//! [`ReservationReducer`] and exposes one async method per operation. It is
//! cheap to clone; clones share the same state.

use crate::config::EngineConfig;
use crate::health::{Component, HealthCheck, HealthStatus};
use crate::metrics::EngineMetrics;
use crate::store::Store;
use crate::sweeper::{ExpirySweeper, SweeperHandle};
use reservations_core::environment::{Clock, NotificationSink};
use reservations_core::{
    Event, EventId, ReservationAction, ReservationEnvironment, ReservationError,
    ReservationOutcome, ReservationReducer, ReservationState, UserName,
};
use std::sync::Arc;
use std::time::Instant;

/// Queue length above which the engine reports itself degraded
const QUEUE_DEGRADED_THRESHOLD: usize = 1_000;

/// Shared handle to one reservation engine
///
/// # Example
///
/// ```
/// use reservations_core::{environment::{DiscardSink, SystemClock}, EventId, ReservationOutcome};
/// use reservations_runtime::{EngineConfig, ReservationEngine};
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let engine = ReservationEngine::new(
///     EngineConfig::default(),
///     Arc::new(SystemClock),
///     Arc::new(DiscardSink),
/// );
/// engine.create_event("Launch", 1).await?;
///
/// let outcome = engine.reserve(EventId::new(1), "ana").await?;
/// assert!(matches!(outcome, ReservationOutcome::HoldGranted { .. }));
/// # Ok::<(), reservations_core::ReservationError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct ReservationEngine {
    store: Arc<Store<ReservationReducer>>,
    config: Arc<EngineConfig>,
}

impl ReservationEngine {
    /// Create an engine with an empty registry
    #[must_use]
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let environment = ReservationEnvironment::new(clock)
            .with_reservation_timeout(config.reservation_timeout)
            .with_cancel_policy(config.cancel_policy);
        let store = Store::new(
            ReservationState::new(),
            ReservationReducer::new(),
            environment,
            sink,
        );

        Self {
            store: Arc::new(store),
            config: Arc::new(config),
        }
    }

    /// The configuration the engine was built with
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the configured seed events.
    ///
    /// Returns how many events were created.
    ///
    /// # Errors
    ///
    /// Stops at the first seed the registry rejects, for instance a duplicate
    /// name.
    pub async fn seed(&self) -> Result<usize, ReservationError> {
        for seed in &self.config.seed_events {
            self.create_event(seed.name.clone(), seed.capacity).await?;
        }
        tracing::info!(count = self.config.seed_events.len(), "Seed events created");
        Ok(self.config.seed_events.len())
    }

    /// Run one action through the store, recording metrics.
    ///
    /// # Errors
    ///
    /// Returns the reducer's rejection unchanged.
    pub async fn send(
        &self,
        action: ReservationAction,
    ) -> Result<ReservationOutcome, ReservationError> {
        let operation = action.name();
        let start = Instant::now();
        let result = self.store.send(action).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(outcome) => {
                EngineMetrics::record_operation(operation, "ok", elapsed);
                match outcome {
                    ReservationOutcome::Swept(report) => {
                        EngineMetrics::record_sweep(report, elapsed);
                    },
                    // Granting a hold also takes the user out of the queue
                    ReservationOutcome::HoldGranted { .. } | ReservationOutcome::Queued { .. } => {
                        let length = self.store.state(|s| s.queue.len()).await;
                        EngineMetrics::record_queue_length(length);
                    },
                    _ => {},
                }
            },
            Err(error) => {
                EngineMetrics::record_operation(operation, error.code(), elapsed);
                tracing::debug!(operation, %error, "Operation rejected");
            },
        }

        result
    }

    /// Create an event with `capacity` spots
    ///
    /// # Errors
    ///
    /// `DuplicateName` if the name is taken, `InvalidRequest` if it is blank.
    pub async fn create_event(
        &self,
        name: impl Into<String>,
        capacity: u32,
    ) -> Result<ReservationOutcome, ReservationError> {
        self.send(ReservationAction::CreateEvent {
            name: name.into(),
            capacity,
        })
        .await
    }

    /// Place a temporary hold, or join the waiting queue if the event is full
    ///
    /// # Errors
    ///
    /// `DuplicateReservation` if the user already holds or confirmed a spot
    /// anywhere, `NotFound` for an unknown event.
    pub async fn reserve(
        &self,
        event_id: EventId,
        user_name: impl Into<UserName>,
    ) -> Result<ReservationOutcome, ReservationError> {
        self.send(ReservationAction::Reserve {
            event_id,
            user_name: user_name.into(),
        })
        .await
    }

    /// Turn the user's hold into a confirmed reservation
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event, `HoldNotFound` without an active hold.
    pub async fn confirm(
        &self,
        event_id: EventId,
        user_name: impl Into<UserName>,
    ) -> Result<ReservationOutcome, ReservationError> {
        self.send(ReservationAction::Confirm {
            event_id,
            user_name: user_name.into(),
        })
        .await
    }

    /// Release the user's hold
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown event. `HoldNotFound` without an active hold
    /// unless the engine runs the always-release cancel policy.
    pub async fn cancel(
        &self,
        event_id: EventId,
        user_name: impl Into<UserName>,
    ) -> Result<ReservationOutcome, ReservationError> {
        self.send(ReservationAction::Cancel {
            event_id,
            user_name: user_name.into(),
        })
        .await
    }

    /// Run one expiry pass now
    ///
    /// # Errors
    ///
    /// A sweep is never rejected; the `Result` mirrors the other operations.
    pub async fn sweep(&self) -> Result<ReservationOutcome, ReservationError> {
        self.send(ReservationAction::Sweep).await
    }

    /// Look up one event
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn find(&self, event_id: EventId) -> Result<Event, ReservationError> {
        self.store
            .state(|s| s.registry.find(event_id).cloned())
            .await
    }

    /// Every event, in creation order
    pub async fn list_all(&self) -> Vec<Event> {
        self.store.state(ReservationState::events_snapshot).await
    }

    /// The waiting queue, head first
    pub async fn queue(&self) -> Vec<UserName> {
        self.store.state(ReservationState::queue_snapshot).await
    }

    /// Consistent copy of the whole state
    pub async fn snapshot(&self) -> ReservationState {
        self.store.state(Clone::clone).await
    }

    /// Report the engine's health.
    ///
    /// Degraded when the waiting queue grows past a thousand users.
    pub async fn health(&self) -> HealthCheck {
        let (events, holds, queued) = self
            .store
            .state(|s| (s.registry.len(), s.registry.active_holds(), s.queue.len()))
            .await;

        let check = HealthCheck::new(Component::Engine)
            .count("events", events as u64)
            .count("active_holds", holds as u64)
            .count("queue_length", queued as u64);
        if queued > QUEUE_DEGRADED_THRESHOLD {
            check.flag(HealthStatus::Degraded, format!("{queued} users waiting"))
        } else {
            check
        }
    }

    /// Start the periodic expiry sweeper on the current tokio runtime
    #[must_use]
    pub fn spawn_sweeper(&self) -> SweeperHandle {
        ExpirySweeper::new(self.clone(), self.config.sweep_interval).spawn()
    }
}

impl std::fmt::Debug for ReservationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
