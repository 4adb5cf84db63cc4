//! Reducer module - The core trait for business logic
//!
//! Reducers are pure functions: `(State, Action, Environment) → (Output, Notifications)`
//!
//! They contain all business logic and are deterministic and testable. A
//! rejected action returns an error and must leave the state untouched; an
//! accepted one returns its output together with the notifications it caused.

use crate::notification::Notification;
use smallvec::SmallVec;

/// Notifications produced by one reducer step, in emission order
pub type Effects = SmallVec<[Notification; 4]>;

/// Result of an accepted action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduced<O> {
    /// Value handed back to the caller
    pub output: O,
    /// Notifications to dispatch, in order
    pub effects: Effects,
}

impl<O> Reduced<O> {
    /// Bundle an output with its notifications
    #[must_use]
    pub const fn new(output: O, effects: Effects) -> Self {
        Self { output, effects }
    }
}

/// The Reducer trait - core abstraction for business logic
///
/// # Type Parameters
///
/// - `State`: The domain state this reducer operates on
/// - `Action`: The action type this reducer processes
/// - `Environment`: The injected dependencies this reducer needs
/// - `Output`: What an accepted action reports back
/// - `Error`: Why an action was rejected
///
/// # Example
///
/// ```ignore
/// impl Reducer for ReservationReducer {
///     type State = ReservationState;
///     type Action = ReservationAction;
///     type Environment = ReservationEnvironment;
///     type Output = ReservationOutcome;
///     type Error = ReservationError;
///
///     fn reduce(&self, state, action, env) -> Result<Reduced<Self::Output>, Self::Error> {
///         match action {
///             ReservationAction::Sweep => self.sweep(state, env),
///             // ...
///         }
///     }
/// }
/// ```
pub trait Reducer {
    /// The state type this reducer operates on
    type State;

    /// The action type this reducer processes
    type Action;

    /// The environment type with injected dependencies
    type Environment;

    /// Output of an accepted action
    type Output;

    /// Rejection reason
    type Error;

    /// Reduce an action into state changes and notifications
    ///
    /// This is a pure function that:
    /// 1. Validates the action
    /// 2. Updates state in place
    /// 3. Returns the output and the notifications to dispatch
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the action is rejected. The state must be
    /// unchanged in that case.
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Result<Reduced<Self::Output>, Self::Error>;
}
