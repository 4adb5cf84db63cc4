//! Application state shared across handlers.

use crate::admission::ObserverGate;
use reservations_runtime::metrics::PrometheusMetrics;
use reservations_runtime::{BroadcastSink, ReservationEngine, SweeperMonitor};
use std::sync::Arc;

/// Everything a handler may need.
///
/// Cloned into every request by Axum; all fields are shared handles.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The reservation engine
    pub engine: ReservationEngine,
    /// Notification fan-out observers subscribe to
    pub notifications: Arc<BroadcastSink>,
    /// Observer admission control
    pub observers: Arc<ObserverGate>,
    /// Prometheus recorder, when metrics are enabled
    pub metrics: Option<Arc<PrometheusMetrics>>,
    /// Liveness of the background expiry sweeper, once spawned
    pub sweeper: Option<SweeperMonitor>,
}

impl AppState {
    /// Build state around an engine publishing into `notifications`
    #[must_use]
    pub fn new(
        engine: ReservationEngine,
        notifications: Arc<BroadcastSink>,
        max_online_users: usize,
    ) -> Self {
        let observers = Arc::new(ObserverGate::new(max_online_users, notifications.clone()));
        Self {
            engine,
            notifications,
            observers,
            metrics: None,
            sweeper: None,
        }
    }

    /// Serve `/metrics` from this recorder
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<PrometheusMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Include the sweeper in `/health`
    #[must_use]
    pub fn with_sweeper(mut self, monitor: SweeperMonitor) -> Self {
        self.sweeper = Some(monitor);
        self
    }
}
