//! Configuration management for the reservation server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Call `dotenvy::dotenv()` first to pick up a `.env` file.

use reservations_core::CancelPolicy;
use reservations_runtime::{ConfigError, EngineConfig, SeedEvent};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Engine settings
    pub engine: EngineConfig,
    /// Maximum concurrent WebSocket observers
    pub max_online_users: usize,
    /// Whether to install the Prometheus recorder and serve `/metrics`
    pub metrics_enabled: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// `host:port` for the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                shutdown_timeout: Duration::from_secs(30),
            },
            engine: EngineConfig::default(),
            max_online_users: 3,
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparseable numbers and flags fall back to their defaults with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSeed`] if `SEED_EVENTS` contains a
    /// malformed entry.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let seed_events = match lookup("SEED_EVENTS") {
            Some(list) => SeedEvent::parse_list(&list)?,
            None => defaults.engine.seed_events.clone(),
        };

        let engine = EngineConfig::default()
            .with_reservation_timeout(Duration::from_secs(parse_or(
                &lookup,
                "RESERVATION_TIMEOUT_SECS",
                defaults.engine.reservation_timeout.as_secs(),
            )))
            .with_sweep_interval(Duration::from_millis(parse_or(
                &lookup,
                "SWEEP_INTERVAL_MS",
                1000,
            )))
            .with_cancel_policy(parse_or(
                &lookup,
                "CANCEL_POLICY",
                CancelPolicy::default(),
            ))
            .with_broadcast_capacity(parse_or(
                &lookup,
                "BROADCAST_CAPACITY",
                defaults.engine.broadcast_capacity,
            ))
            .with_seed_events(seed_events);

        Ok(Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&lookup, "PORT", defaults.server.port),
                shutdown_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "SHUTDOWN_TIMEOUT_SECS",
                    defaults.server.shutdown_timeout.as_secs(),
                )),
            },
            engine,
            max_online_users: parse_or(&lookup, "MAX_ONLINE_USERS", defaults.max_online_users),
            metrics_enabled: parse_or(&lookup, "METRICS_ENABLED", defaults.metrics_enabled),
        })
    }
}

/// Parse `key` if present, warning and using `default` if it does not parse
fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = %raw, ?default, "Invalid configuration value, using default");
        default
    })
}
