//! Periodic expiry sweeper.
//!
//! A single tokio task calls [`ReservationEngine::sweep`] on a fixed cadence.
//! The task holds the engine lock only for the duration of one pass and never
//! while sleeping. Shutdown is signalled through a `watch` channel.

use crate::engine::ReservationEngine;
use crate::error::SweeperError;
use crate::health::{Component, HealthCheck, HealthStatus};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Shortest accepted sweep interval
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Default)]
struct SweeperStatus {
    running: AtomicBool,
    passes: AtomicU64,
    failures: AtomicU64,
}

/// Background task that expires holds and promotes waiting users
#[derive(Debug)]
pub struct ExpirySweeper {
    engine: ReservationEngine,
    interval: Duration,
}

impl ExpirySweeper {
    /// Sweeper for `engine`, running every `interval` (at least 1 ms)
    #[must_use]
    pub fn new(engine: ReservationEngine, interval: Duration) -> Self {
        Self {
            engine,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Start the loop on the current tokio runtime.
    ///
    /// The first pass runs one interval after spawning.
    #[must_use]
    pub fn spawn(self) -> SweeperHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let status = Arc::new(SweeperStatus::default());
        status.running.store(true, Ordering::Release);

        tracing::info!(interval_ms = self.interval.as_millis(), "Expiry sweeper started");
        let task = tokio::spawn(self.run(shutdown_rx, Arc::clone(&status)));

        SweeperHandle {
            shutdown: shutdown_tx,
            task,
            status,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>, status: Arc<SweeperStatus>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.engine.sweep().await {
                        Ok(_) => {
                            status.passes.fetch_add(1, Ordering::Relaxed);
                        },
                        Err(error) => {
                            status.failures.fetch_add(1, Ordering::Relaxed);
                            tracing::warn!(%error, "Sweep pass rejected, continuing");
                        },
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        status.running.store(false, Ordering::Release);
        tracing::info!(
            passes = status.passes.load(Ordering::Relaxed),
            "Expiry sweeper stopped"
        );
    }
}

/// Owner of a running sweeper
///
/// Dropping the handle also stops the sweeper, because the shutdown channel
/// closes.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    status: Arc<SweeperStatus>,
}

impl SweeperHandle {
    /// Read-only view of the sweeper for health checks
    #[must_use]
    pub fn monitor(&self) -> SweeperMonitor {
        SweeperMonitor {
            status: Arc::clone(&self.status),
        }
    }

    /// Signal the loop to stop and wait for it, at most `timeout`.
    ///
    /// A pass already in progress completes first.
    ///
    /// # Errors
    ///
    /// - [`SweeperError::ShutdownTimeout`] if the task did not stop in time;
    ///   it is aborted
    /// - [`SweeperError::TaskJoinError`] if the task panicked
    pub async fn shutdown(self, timeout: Duration) -> Result<(), SweeperError> {
        tracing::info!("Stopping expiry sweeper");
        // Err means the task already exited
        let _ = self.shutdown.send(true);

        let abort = self.task.abort_handle();
        match tokio::time::timeout(timeout, self.task).await {
            Ok(joined) => joined.map_err(SweeperError::from),
            Err(_) => {
                abort.abort();
                tracing::error!(?timeout, "Expiry sweeper did not stop in time");
                Err(SweeperError::ShutdownTimeout(timeout))
            },
        }
    }
}

/// Shared, cloneable view of a sweeper's progress
#[derive(Debug, Clone)]
pub struct SweeperMonitor {
    status: Arc<SweeperStatus>,
}

impl SweeperMonitor {
    /// Whether the loop is still alive
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.running.load(Ordering::Acquire)
    }

    /// Completed passes
    #[must_use]
    pub fn passes(&self) -> u64 {
        self.status.passes.load(Ordering::Relaxed)
    }

    /// Health of the sweeper: unhealthy once the loop has stopped
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        let check = HealthCheck::new(Component::Sweeper)
            .count("passes", self.passes())
            .count("failures", self.status.failures.load(Ordering::Relaxed));
        if self.is_running() {
            check
        } else {
            check.flag(HealthStatus::Unhealthy, "Expiry sweeper is not running")
        }
    }
}
