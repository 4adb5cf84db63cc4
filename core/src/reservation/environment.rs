//! Injected dependencies of the reservation reducer.

use crate::environment::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Default confirmation window of a hold
pub const DEFAULT_RESERVATION_TIMEOUT: Duration = Duration::from_secs(120);

/// What `cancel` does when the user has no hold on the event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelPolicy {
    /// Reject with `HoldNotFound` and change nothing
    #[default]
    MatchedHold,
    /// Give a spot back anyway.
    ///
    /// Reproduces the behaviour of the legacy service; `available_spots` can
    /// then exceed what holds and confirmations account for.
    AlwaysRelease,
}

impl CancelPolicy {
    /// Config-file spelling of the policy
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MatchedHold => "matched-hold",
            Self::AlwaysRelease => "always-release",
        }
    }
}

impl fmt::Display for CancelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised cancel policy name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cancel policy '{0}' (expected 'matched-hold' or 'always-release')")]
pub struct ParseCancelPolicyError(String);

impl FromStr for CancelPolicy {
    type Err = ParseCancelPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "matched-hold" | "strict" => Ok(Self::MatchedHold),
            "always-release" | "legacy" => Ok(Self::AlwaysRelease),
            other => Err(ParseCancelPolicyError(other.to_string())),
        }
    }
}

/// Reservation environment
///
/// Carries the clock used to stamp and age holds and the knobs that shape
/// the lifecycle.
#[derive(Clone)]
pub struct ReservationEnvironment {
    /// Time source for hold creation and expiry
    pub clock: Arc<dyn Clock>,
    /// How long a hold lives before the sweeper releases it
    pub reservation_timeout: Duration,
    /// Behaviour of `cancel` without a matching hold
    pub cancel_policy: CancelPolicy,
}

impl ReservationEnvironment {
    /// Environment with the default timeout and cancel policy
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            reservation_timeout: DEFAULT_RESERVATION_TIMEOUT,
            cancel_policy: CancelPolicy::default(),
        }
    }

    /// Set the hold timeout
    #[must_use]
    pub fn with_reservation_timeout(mut self, timeout: Duration) -> Self {
        self.reservation_timeout = timeout;
        self
    }

    /// Set the cancel policy
    #[must_use]
    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }
}

impl fmt::Debug for ReservationEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationEnvironment")
            .field("reservation_timeout", &self.reservation_timeout)
            .field("cancel_policy", &self.cancel_policy)
            .finish_non_exhaustive()
    }
}
