//! Reservation reducer.
//!
//! All business rules of the engine live here. The reducer is synchronous and
//! free of I/O; the runtime serializes calls to it behind one write lock.

use super::{
    CancelPolicy, HoldRef, ReservationAction, ReservationEnvironment, ReservationOutcome,
    ReservationState, SweepReport,
};
use crate::error::ReservationError;
use crate::notification::Notification;
use crate::queue::WaitingQueue;
use crate::reducer::{Effects, Reduced, Reducer};
use crate::types::{Event, EventId, Hold, UserName};
use chrono::{DateTime, Utc};
use smallvec::smallvec;

type Reduction = Result<Reduced<ReservationOutcome>, ReservationError>;

/// Reservation reducer
///
/// Stateless; every piece of data it works on is in [`ReservationState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ReservationReducer;

impl ReservationReducer {
    /// Create a new reservation reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn create_event(state: &mut ReservationState, name: &str, capacity: u32) -> Reduction {
        let event = state.registry.create(name, capacity)?.clone();
        tracing::info!(
            event_id = %event.id,
            name = %event.name,
            capacity,
            "Event created"
        );

        let effects = smallvec![
            Notification::EventCreated {
                event: event.clone()
            },
            Notification::EventsUpdated {
                events: state.events_snapshot()
            },
        ];
        Ok(Reduced::new(ReservationOutcome::EventCreated { event }, effects))
    }

    fn reserve(
        state: &mut ReservationState,
        event_id: EventId,
        user_name: UserName,
        env: &ReservationEnvironment,
    ) -> Reduction {
        if user_name.is_blank() {
            return Err(ReservationError::InvalidRequest(
                "user name must not be empty".to_string(),
            ));
        }
        // One hold or confirmation per user, across every event
        if let Some(held_in) = state.registry.holder_of(&user_name) {
            tracing::warn!(%user_name, %held_in, "Duplicate reservation rejected");
            return Err(ReservationError::DuplicateReservation {
                user_name,
                event_id: held_in,
            });
        }

        let ReservationState { registry, queue } = state;
        let event = registry.find_mut(event_id)?;
        let mut effects = Effects::new();

        if event.grant_hold(Hold::new(user_name.clone(), env.clock.now())) {
            tracing::info!(
                %event_id,
                %user_name,
                available_spots = event.available_spots,
                "Temporary hold granted"
            );
            effects.push(Notification::EventReserved {
                event: event.clone(),
                user_name: user_name.clone(),
            });
            // A holder may not keep waiting for another spot
            if queue.remove(&user_name) {
                effects.push(Notification::QueueUpdated {
                    queue: queue.snapshot(),
                });
            }
            return Ok(Reduced::new(
                ReservationOutcome::HoldGranted {
                    event_id,
                    expires_in_secs: env.reservation_timeout.as_secs(),
                },
                effects,
            ));
        }

        let position = match queue.position(&user_name) {
            Some(position) => position,
            None => {
                let position = queue.enqueue(user_name.clone());
                effects.push(Notification::QueueUpdated {
                    queue: queue.snapshot(),
                });
                position
            },
        };
        tracing::info!(%event_id, %user_name, position, "Event full, user queued");

        Ok(Reduced::new(ReservationOutcome::Queued { position }, effects))
    }

    fn confirm(state: &mut ReservationState, event_id: EventId, user_name: UserName) -> Reduction {
        let event = state.registry.find_mut(event_id)?;
        if !event.confirm_hold(&user_name) {
            return Err(ReservationError::HoldNotFound {
                event_id,
                user_name,
            });
        }
        tracing::info!(%event_id, %user_name, "Reservation confirmed");

        let event = event.clone();
        let effects = smallvec![Notification::ReservationConfirmed {
            event: event.clone(),
            user_name,
        }];
        Ok(Reduced::new(ReservationOutcome::Confirmed { event }, effects))
    }

    fn cancel(
        state: &mut ReservationState,
        event_id: EventId,
        user_name: UserName,
        env: &ReservationEnvironment,
    ) -> Reduction {
        let event = state.registry.find_mut(event_id)?;
        let released = event.release_hold(&user_name);

        if !released {
            match env.cancel_policy {
                CancelPolicy::MatchedHold => {
                    return Err(ReservationError::HoldNotFound {
                        event_id,
                        user_name,
                    });
                },
                CancelPolicy::AlwaysRelease => {
                    event.available_spots = event.available_spots.saturating_add(1);
                    tracing::warn!(
                        %event_id,
                        %user_name,
                        available_spots = event.available_spots,
                        "Cancel without a hold released a spot"
                    );
                },
            }
        }
        tracing::info!(%event_id, %user_name, released, "Reservation cancelled");

        let event = event.clone();
        let effects = smallvec![Notification::ReservationCancelled {
            event: event.clone(),
            user_name,
        }];
        Ok(Reduced::new(
            ReservationOutcome::Cancelled { event, released },
            effects,
        ))
    }

    /// One expiry pass.
    ///
    /// Holds are evaluated against a single `now`. Users promoted into an
    /// event are not re-evaluated in the same pass.
    fn sweep(state: &mut ReservationState, env: &ReservationEnvironment) -> Reduction {
        let now = env.clock.now();
        let timeout = env.reservation_timeout;
        let ReservationState { registry, queue } = state;
        let mut effects = Effects::new();
        let mut report = SweepReport::default();

        for index in 0..registry.len() {
            let Some(event) = registry.get_mut(index) else {
                continue;
            };

            let mut expired = Vec::new();
            for hold in &event.reserved_users {
                if hold.is_expired(now, timeout) {
                    expired.push(hold.user_name.clone());
                } else {
                    let time_left = hold.remaining(now, timeout).as_secs();
                    tracing::debug!(event_id = %event.id, user_name = %hold.user_name, time_left, "Hold active");
                    effects.push(Notification::TimeLeft {
                        event_id: event.id,
                        time_left,
                    });
                }
            }

            for user_name in expired {
                event.release_hold(&user_name);
                tracing::info!(event_id = %event.id, %user_name, "Hold expired");
                effects.push(Notification::EventUpdated {
                    event: event.clone(),
                });
                effects.push(Notification::QueueUpdated {
                    queue: queue.snapshot(),
                });
                report.expired.push(HoldRef {
                    event_id: event.id,
                    user_name,
                });

                if event.has_available_spot() {
                    if let Some(next) = queue.dequeue_next() {
                        Self::promote(event, next.clone(), now, queue, &mut effects);
                        report.promoted.push(HoldRef {
                            event_id: event.id,
                            user_name: next,
                        });
                    }
                }
            }
        }

        report.active_holds = registry.active_holds();
        report.queue_length = queue.len();
        effects.push(Notification::EventsUpdated {
            events: registry.list_all().to_vec(),
        });

        Ok(Reduced::new(ReservationOutcome::Swept(report), effects))
    }

    /// Give the head of the queue a fresh hold on `event`.
    ///
    /// The caller has already dequeued `user_name` and checked that `event`
    /// has a free spot.
    fn promote(
        event: &mut Event,
        user_name: UserName,
        now: DateTime<Utc>,
        queue: &WaitingQueue,
        effects: &mut Effects,
    ) {
        event.grant_hold(Hold::new(user_name.clone(), now));
        tracing::info!(event_id = %event.id, %user_name, "Queued user promoted");

        effects.push(Notification::EventReserved {
            event: event.clone(),
            user_name: user_name.clone(),
        });
        effects.push(Notification::QueueUpdated {
            queue: queue.snapshot(),
        });
        effects.push(Notification::UserJoined {
            user_name,
            event: event.clone(),
        });
    }
}

impl Reducer for ReservationReducer {
    type State = ReservationState;
    type Action = ReservationAction;
    type Environment = ReservationEnvironment;
    type Output = ReservationOutcome;
    type Error = ReservationError;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Result<Reduced<Self::Output>, Self::Error> {
        match action {
            ReservationAction::CreateEvent { name, capacity } => {
                Self::create_event(state, &name, capacity)
            },
            ReservationAction::Reserve {
                event_id,
                user_name,
            } => Self::reserve(state, event_id, user_name, env),
            ReservationAction::Confirm {
                event_id,
                user_name,
            } => Self::confirm(state, event_id, user_name),
            ReservationAction::Cancel {
                event_id,
                user_name,
            } => Self::cancel(state, event_id, user_name, env),
            ReservationAction::Sweep => Self::sweep(state, env),
        }
    }
}
