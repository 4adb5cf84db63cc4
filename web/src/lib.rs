//! HTTP and WebSocket front end for the event reservation engine.
//!
//! The engine itself lives in `reservations-runtime`; this crate only maps
//! requests onto it and streams its notifications to connected observers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Imperative Shell (Axum)         │  ← HTTP, JSON, WebSocket
//! │  - Request parsing                      │  ← CORS, request ids
//! │  - Observer admission                   │  ← Tracing, metrics
//! ├─────────────────────────────────────────┤
//! │         ReservationEngine               │
//! │  - One lock around registry + queue     │  ← Notifications in lock order
//! │  - Background expiry sweeper            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract** the JSON body
//! 3. **Call** the engine (`reserve`, `confirm`, ...)
//! 4. **Notifications** fan out to every WebSocket observer
//! 5. **Map** the outcome or [`ReservationError`](reservations_core::ReservationError)
//!    to an HTTP response
//!
//! # Example
//!
//! ```no_run
//! use reservations_core::environment::SystemClock;
//! use reservations_runtime::{BroadcastSink, EngineConfig, ReservationEngine};
//! use reservations_web::{build_router, AppState};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let sink = Arc::new(BroadcastSink::default());
//! let engine = ReservationEngine::new(EngineConfig::default(), Arc::new(SystemClock), sink.clone());
//! engine.seed().await?;
//!
//! let app = build_router(AppState::new(engine, sink, 3));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod admission;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export key types for convenience
pub use admission::{ObserverGate, ObserverGuard};
pub use config::Config;
pub use error::AppError;
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
