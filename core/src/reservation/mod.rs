//! Reservation lifecycle: holds, confirmations, cancellations, expiry and
//! promotion of waiting users.
//!
//! # Hold State Machine
//!
//! ```text
//!            confirm
//! Active ───────────────→ Confirmed   (spot stays consumed)
//!   │
//!   │ cancel
//!   ├───────────────────→ Released    (spot freed)
//!   │
//!   │ timeout (sweep)
//!   └──→ Expired ──→ Released ──→ promote queue head ──→ Active
//! ```
//!
//! Every transition happens inside [`ReservationReducer::reduce`], which the
//! runtime only calls while holding its single write lock.

mod actions;
mod environment;
mod reducer;
mod state;


pub use actions::{HoldRef, ReservationAction, ReservationOutcome, SweepReport};
pub use environment::{
    CancelPolicy, ParseCancelPolicyError, ReservationEnvironment, DEFAULT_RESERVATION_TIMEOUT,
};
pub use reducer::ReservationReducer;
pub use state::ReservationState;
