//! # Reservations Core
//!
//! Domain types and business logic for the event reservation engine.
//!
//! A fixed set of *events* each owns a limited number of spots. Clients place
//! temporary holds on spots, confirm them before they expire, or cancel them.
//! When an event is full, users wait in a single FIFO queue and are promoted
//! into spots freed by expired holds.
//!
//! ## Core Concepts
//!
//! - **State**: [`ReservationState`] (event registry + waiting queue)
//! - **Action**: [`ReservationAction`], every input the engine accepts
//! - **Reducer**: [`ReservationReducer`], `(State, Action, Environment) → (Outcome, Notifications)`
//! - **Notification**: [`Notification`], a state change description for observers
//! - **Environment**: [`ReservationEnvironment`], injected clock and policy
//!
//! The reducer never performs I/O. Notifications are returned as values and
//! dispatched by the runtime while it still holds the exclusion lock, so
//! observers see changes in the order they happened.
//!
//! ## Example
//!
//! ```
//! use reservations_core::{
//!     environment::SystemClock, reducer::Reducer, ReservationAction, ReservationEnvironment,
//!     ReservationOutcome, ReservationReducer, ReservationState,
//! };
//! use std::sync::Arc;
//!
//! let env = ReservationEnvironment::new(Arc::new(SystemClock));
//! let mut state = ReservationState::default();
//! let reducer = ReservationReducer::new();
//!
//! let created = reducer
//!     .reduce(
//!         &mut state,
//!         ReservationAction::CreateEvent { name: "Launch".into(), capacity: 2 },
//!         &env,
//!     )
//!     .map(|reduced| reduced.output);
//! assert!(matches!(created, Ok(ReservationOutcome::EventCreated { .. })));
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

pub mod environment;
pub mod error;
pub mod notification;
pub mod queue;
pub mod reducer;
pub mod registry;
pub mod reservation;
pub mod types;

pub use error::ReservationError;
pub use notification::Notification;
pub use reservation::{
    CancelPolicy, HoldRef, ReservationAction, ReservationEnvironment, ReservationOutcome,
    ReservationReducer, ReservationState, SweepReport,
};
pub use types::{Event, EventId, Hold, UserName};
