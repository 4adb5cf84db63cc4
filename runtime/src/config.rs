//! Engine configuration.

use crate::sink::DEFAULT_BROADCAST_CAPACITY;
use reservations_core::CancelPolicy;
use reservations_core::reservation::DEFAULT_RESERVATION_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default cadence of the expiry sweeper
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Errors raised while reading configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A seed entry is not of the form `name:capacity`
    #[error("invalid seed event '{entry}': {reason}")]
    InvalidSeed {
        /// The offending entry
        entry: String,
        /// What is wrong with it
        reason: String,
    },
}

/// An event created at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedEvent {
    /// Event name
    pub name: String,
    /// Number of spots
    pub capacity: u32,
}

impl SeedEvent {
    /// Create a seed entry
    #[must_use]
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
        }
    }

    /// The five events the service has always started with
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        (1..=5).map(|n| Self::new(format!("Event {n}"), 5)).collect()
    }

    /// Parse a comma-separated `name:capacity` list.
    ///
    /// The capacity is split off at the last colon, so names may contain
    /// colons. Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] for an entry without a colon, with
    /// an empty name or with a capacity that is not a non-negative integer.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ConfigError> {
        input
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl FromStr for SeedEvent {
    type Err = ConfigError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::InvalidSeed {
            entry: entry.to_string(),
            reason: reason.to_string(),
        };

        let (name, capacity) = entry
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected name:capacity"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        let capacity = capacity
            .trim()
            .parse()
            .map_err(|_| invalid("capacity is not a non-negative integer"))?;

        Ok(Self::new(name, capacity))
    }
}

impl fmt::Display for SeedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.capacity)
    }
}

/// Configuration of a [`ReservationEngine`](crate::ReservationEngine)
///
/// # Example
///
/// ```
/// use reservations_runtime::EngineConfig;
/// use std::time::Duration;
///
/// let config = EngineConfig::default()
///     .with_reservation_timeout(Duration::from_secs(30))
///     .with_sweep_interval(Duration::from_millis(250));
/// assert_eq!(config.reservation_timeout, Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Lifetime of an unconfirmed hold
    pub reservation_timeout: Duration,
    /// Pause between sweeper passes
    pub sweep_interval: Duration,
    /// Behaviour of cancel without a matching hold
    pub cancel_policy: CancelPolicy,
    /// Buffer of the notification broadcast channel
    pub broadcast_capacity: usize,
    /// Events created by [`ReservationEngine::seed`](crate::ReservationEngine::seed)
    pub seed_events: Vec<SeedEvent>,
}

impl EngineConfig {
    /// Set the hold timeout
    #[must_use]
    pub const fn with_reservation_timeout(mut self, timeout: Duration) -> Self {
        self.reservation_timeout = timeout;
        self
    }

    /// Set the sweeper cadence
    #[must_use]
    pub const fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Set the cancel policy
    #[must_use]
    pub const fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }

    /// Set the notification channel buffer
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Replace the startup events
    #[must_use]
    pub fn with_seed_events(mut self, seed_events: Vec<SeedEvent>) -> Self {
        self.seed_events = seed_events;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reservation_timeout: DEFAULT_RESERVATION_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            cancel_policy: CancelPolicy::default(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
            seed_events: SeedEvent::defaults(),
        }
    }
}
