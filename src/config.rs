// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads a backend selector, lowercased, falling back to `$default`.
macro_rules! backend_choice {
    // ---
    ($key:literal, $default:literal) => {
        std::env::var($key)
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_else(|_| $default.to_string())
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sessions: SessionConfig,
    pub metrics: MetricsBackend,
    pub bind_addr: String,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or a backend
    /// selector names an unknown backend.
    pub fn from_env() -> Result<Self> {
        // ---
        let bind_addr =
            std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        Ok(Self {
            storage: StorageConfig::from_env()?,
            sessions: SessionConfig::from_env()?,
            metrics: MetricsBackend::from_env()?,
            bind_addr,
        })
    }
}

// ============================================================
// Storage configuration
// ============================================================

/// Where marketplace records live. Selected by `AXUM_STORAGE_TYPE`.
#[derive(Debug, Clone)]
pub enum StorageConfig {
    Postgres(DatabaseConfig),
    Memory,
}

impl StorageConfig {
    // ---
    pub fn from_env() -> Result<Self> {
        // ---
        match backend_choice!("AXUM_STORAGE_TYPE", "postgres").as_str() {
            "postgres" => Ok(StorageConfig::Postgres(DatabaseConfig::from_env()?)),
            "memory" => Ok(StorageConfig::Memory),
            other => anyhow::bail!("Unknown AXUM_STORAGE_TYPE '{other}' (expected postgres or memory)"),
        }
    }
}

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of connection attempts before startup gives up. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if `DATABASE_URL` is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("AXUM_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs = optional_env_parse!("AXUM_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("AXUM_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("AXUM_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Session configuration
// ============================================================

/// Session token storage and lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub backend: SessionBackend,

    /// How long an issued token stays valid. Defaults to 7 days.
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    /// Redis connection string.
    Redis(String),
    Memory,
}

impl SessionConfig {
    /// Builds a [`SessionConfig`] from `AXUM_SESSION_TYPE`, `AXUM_REDIS_URL`
    /// and `AXUM_SESSION_TTL_SEC`.
    ///
    /// # Errors
    /// Returns an error if the Redis backend is selected without a URL.
    pub fn from_env() -> Result<Self> {
        // ---
        let backend = match backend_choice!("AXUM_SESSION_TYPE", "redis").as_str() {
            "redis" => SessionBackend::Redis(required_env!("AXUM_REDIS_URL")),
            "memory" => SessionBackend::Memory,
            other => anyhow::bail!("Unknown AXUM_SESSION_TYPE '{other}' (expected redis or memory)"),
        };
        let ttl_secs = optional_env_parse!("AXUM_SESSION_TTL_SEC", u64, 604_800);

        Ok(Self {
            backend,
            ttl: Duration::from_secs(ttl_secs),
        })
    }
}

// ============================================================
// Metrics configuration
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsBackend {
    Noop,
    Prometheus,
}

impl MetricsBackend {
    // ---
    pub fn from_env() -> Result<Self> {
        // ---
        match backend_choice!("AXUM_METRICS_TYPE", "noop").as_str() {
            "noop" => Ok(MetricsBackend::Noop),
            "prom" => Ok(MetricsBackend::Prometheus),
            other => anyhow::bail!("Unknown AXUM_METRICS_TYPE '{other}' (expected noop or prom)"),
        }
    }
}

// ============================================================
// Tests
// ============================================================
