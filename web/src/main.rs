//! Reservation server
//!
//! Serves the reservation engine over HTTP and WebSocket.
//!
//! This binary:
//! - Loads configuration from the environment (and `.env`)
//! - Installs the Prometheus recorder
//! - Seeds the configured events
//! - Starts the background expiry sweeper
//! - Serves until Ctrl+C, then stops the sweeper
//!
//! # Usage
//!
//! ```bash
//! PORT=5000 SEED_EVENTS="Opening:5,Closing:3" cargo run --bin reservations-server
//! ```

use anyhow::Context;
use reservations_core::environment::SystemClock;
use reservations_runtime::metrics::PrometheusMetrics;
use reservations_runtime::{BroadcastSink, ReservationEngine};
use reservations_web::{build_router, AppState, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reservations_runtime=debug,reservations_web=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    tracing::info!(
        bind = %config.server.bind_address(),
        reservation_timeout_secs = config.engine.reservation_timeout.as_secs(),
        sweep_interval = ?config.engine.sweep_interval,
        cancel_policy = %config.engine.cancel_policy,
        max_online_users = config.max_online_users,
        "Configuration loaded"
    );

    let metrics = if config.metrics_enabled {
        let mut metrics = PrometheusMetrics::new();
        metrics.install().context("failed to install metrics recorder")?;
        Some(Arc::new(metrics))
    } else {
        None
    };

    let sink = Arc::new(BroadcastSink::new(config.engine.broadcast_capacity));
    let engine = ReservationEngine::new(config.engine.clone(), Arc::new(SystemClock), sink.clone());
    let seeded = engine.seed().await.context("failed to seed events")?;
    tracing::info!(seeded, "Events seeded");

    let sweeper = engine.spawn_sweeper();
    let mut state = AppState::new(engine, sink, config.max_online_users)
        .with_sweeper(sweeper.monitor());
    if let Some(metrics) = metrics {
        state = state.with_metrics(metrics);
    }

    let listener = tokio::net::TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_address()))?;
    tracing::info!(address = %config.server.bind_address(), "Reservation server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Stopping expiry sweeper...");
    if let Err(error) = sweeper.shutdown(config.server.shutdown_timeout).await {
        tracing::warn!(%error, "Sweeper did not stop cleanly");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
