//! Prometheus metrics for observability and monitoring.
//!
//! This module provides metric collection for the reservation engine:
//! - Engine operations by name and outcome
//! - Expired holds and queue promotions
//! - Sweep pass latency
//! - Waiting queue length and connected observers
//!
//! # Example
//!
//! ```rust,no_run
//! use reservations_runtime::metrics::PrometheusMetrics;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut metrics = PrometheusMetrics::new();
//! metrics.install()?;
//!
//! // Serve `metrics.render()` from an HTTP handler
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use reservations_core::SweepReport;
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
///
/// Rendering is left to the caller; the web crate serves it on `/metrics`.
#[derive(Default)]
pub struct PrometheusMetrics {
    handle: Option<PrometheusHandle>,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("installed", &self.handle.is_some())
            .finish()
    }
}

impl PrometheusMetrics {
    /// Create an uninstalled recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Register metric descriptions and install the global recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// If a metrics recorder is already installed (e.g., in tests), this logs
    /// a warning and leaves `handle()` empty.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!("Prometheus recorder installed");
                Ok(())
            },
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            },
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this instance did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "reservations_operations_total",
        "Engine operations by operation name and outcome"
    );
    describe_histogram!(
        "reservations_operation_duration_seconds",
        "Time spent inside the engine per operation, lock wait included"
    );
    describe_counter!(
        "reservations_holds_expired_total",
        "Holds released because they were not confirmed in time"
    );
    describe_counter!(
        "reservations_promotions_total",
        "Queued users promoted into a freed spot"
    );
    describe_histogram!(
        "reservations_sweep_duration_seconds",
        "Duration of one expiry sweep pass"
    );
    describe_gauge!(
        "reservations_waiting_queue_length",
        "Users currently waiting for a spot"
    );
    describe_gauge!(
        "reservations_active_holds",
        "Unconfirmed holds across all events"
    );
    describe_gauge!(
        "reservations_online_observers",
        "Connected real-time observers"
    );
}

/// Engine metrics recorder.
pub struct EngineMetrics;

impl EngineMetrics {
    /// Record one engine operation.
    ///
    /// `outcome` is `"ok"` or the error code of the rejection.
    pub fn record_operation(operation: &'static str, outcome: &'static str, duration: Duration) {
        counter!("reservations_operations_total", "operation" => operation, "outcome" => outcome)
            .increment(1);
        histogram!("reservations_operation_duration_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Record the result of a sweep pass.
    #[allow(clippy::cast_precision_loss)] // Queue and hold counts stay far below 2^52
    pub fn record_sweep(report: &SweepReport, duration: Duration) {
        counter!("reservations_holds_expired_total").increment(report.expired.len() as u64);
        counter!("reservations_promotions_total").increment(report.promoted.len() as u64);
        histogram!("reservations_sweep_duration_seconds").record(duration.as_secs_f64());
        gauge!("reservations_waiting_queue_length").set(report.queue_length as f64);
        gauge!("reservations_active_holds").set(report.active_holds as f64);
    }

    /// Record the waiting queue length after a queue change.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_queue_length(length: usize) {
        gauge!("reservations_waiting_queue_length").set(length as f64);
    }
}

/// Observer metrics recorder.
pub struct ObserverMetrics;

impl ObserverMetrics {
    /// Record the number of connected observers.
    #[allow(clippy::cast_precision_loss)]
    pub fn record_online(count: usize) {
        gauge!("reservations_online_observers").set(count as f64);
    }
}
