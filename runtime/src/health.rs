//! Readiness of the reservation service, as served on `/health`.
//!
//! Each part of the service reports one [`HealthCheck`] carrying a few
//! counters. [`HealthReport`] folds them into a single status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Parts of the service that report on themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    /// Event registry and waiting queue
    Engine,
    /// Background expiry sweeper
    Sweeper,
    /// WebSocket observer admission
    Observers,
}

/// Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Serving normally
    Healthy,
    /// Serving, but something needs attention (e.g. a long queue)
    Degraded,
    /// Not serving correctly
    Unhealthy,
}

/// What one component says about itself
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheck {
    /// Reporting component
    pub component: Component,
    /// Current status
    pub status: HealthStatus,
    /// Why the status is not healthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Named counters, e.g. `queue_length`
    pub counts: BTreeMap<&'static str, u64>,
}

impl HealthCheck {
    /// Healthy check with no counters yet
    #[must_use]
    pub const fn new(component: Component) -> Self {
        Self {
            component,
            status: HealthStatus::Healthy,
            reason: None,
            counts: BTreeMap::new(),
        }
    }

    /// Worsen the status to `status`.
    ///
    /// A flag no worse than the current status is ignored, so the reason
    /// always explains the status shown.
    #[must_use]
    pub fn flag(mut self, status: HealthStatus, reason: impl Into<String>) -> Self {
        if status > self.status {
            self.status = status;
            self.reason = Some(reason.into());
        }
        self
    }

    /// Attach a counter
    #[must_use]
    pub fn count(mut self, name: &'static str, value: u64) -> Self {
        self.counts.insert(name, value);
        self
    }
}

/// Every component's check plus the overall status.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// Worst status among the checks; healthy when there are none
    pub status: HealthStatus,
    /// Checks in the order they were taken
    pub checks: Vec<HealthCheck>,
    /// When the report was assembled
    pub timestamp: DateTime<Utc>,
}

impl HealthReport {
    /// Fold `checks` into a report stamped now
    #[must_use]
    pub fn new(checks: Vec<HealthCheck>) -> Self {
        let status = checks
            .iter()
            .map(|check| check.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            checks,
            timestamp: Utc::now(),
        }
    }

    /// The check reported by `component`, if it took part
    #[must_use]
    pub fn check(&self, component: Component) -> Option<&HealthCheck> {
        self.checks.iter().find(|check| check.component == component)
    }

    /// Whether the service should be taken out of rotation
    #[must_use]
    pub fn is_unhealthy(&self) -> bool {
        self.status == HealthStatus::Unhealthy
    }
}
