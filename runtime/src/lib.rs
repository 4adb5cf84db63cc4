//! # Reservations Runtime
//!
//! Runtime for the reservation engine.
//!
//! This crate turns the pure reducer from `reservations-core` into a shared,
//! concurrent service.
//!
//! ## Core Components
//!
//! - **Store**: owns the state behind one `RwLock` and runs the reducer
//! - **`ReservationEngine`**: typed facade with one method per operation
//! - **`ExpirySweeper`**: background task releasing expired holds
//! - **`BroadcastSink`**: fans notifications out to any number of observers
//!
//! ## Example
//!
//! ```ignore
//! use reservations_runtime::{BroadcastSink, EngineConfig, ReservationEngine};
//!
//! let sink = Arc::new(BroadcastSink::default());
//! let engine = ReservationEngine::new(EngineConfig::default(), Arc::new(SystemClock), sink.clone());
//! engine.seed().await?;
//!
//! let sweeper = engine.spawn_sweeper();
//! let mut notifications = sink.subscribe();
//!
//! engine.reserve(EventId::new(1), "ana").await?;
//! sweeper.shutdown(Duration::from_secs(5)).await?;
//! ```

pub mod config;
pub mod engine;
pub mod health;
pub mod metrics;
pub mod sink;
pub mod store;
pub mod sweeper;

/// Error types for the runtime
pub mod error {
    use std::time::Duration;
    use thiserror::Error;

    /// Errors raised while stopping the expiry sweeper
    #[derive(Error, Debug)]
    pub enum SweeperError {
        /// The sweeper task did not finish within the shutdown timeout
        #[error("Sweeper did not stop within {0:?}")]
        ShutdownTimeout(Duration),

        /// The sweeper task panicked or was cancelled
        #[error("Sweeper task failed: {0}")]
        TaskJoinError(#[from] tokio::task::JoinError),
    }
}

pub use config::{ConfigError, EngineConfig, SeedEvent};
pub use engine::ReservationEngine;
pub use error::SweeperError;
pub use health::{Component, HealthCheck, HealthReport, HealthStatus};
pub use sink::BroadcastSink;
pub use store::Store;
pub use sweeper::{ExpirySweeper, SweeperHandle, SweeperMonitor};
