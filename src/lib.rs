// src/lib.rs
use anyhow::Result;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
pub mod services;

pub use app_state::AppState;
pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_with_retry, // ---
    create_memory_repository,
    create_memory_sessions,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    create_redis_sessions,
};

// Administrative bootstrap and the error type it reports
pub use services::identity::create_superuser;
pub use services::ServiceError;

/// Build the HTTP router with backends determined by environment variables.
pub async fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let state = build_state(&config).await?;
    Ok(build_router(state))
}

/// Instantiates the storage, session and metrics backends named by `config`.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    // ---
    let repository = match &config.storage {
        StorageConfig::Postgres(db) => create_postgres_repository(connect_with_retry(db).await?),
        StorageConfig::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            create_memory_repository()
        }
    };

    let sessions = match &config.sessions.backend {
        SessionBackend::Redis(url) => create_redis_sessions(url, config.sessions.ttl)?,
        SessionBackend::Memory => create_memory_sessions(config.sessions.ttl),
    };

    let metrics = match config.metrics {
        MetricsBackend::Prometheus => create_prom_metrics()?,
        MetricsBackend::Noop => create_noop_metrics()?,
    };

    Ok(AppState::new(repository, sessions, metrics))
}

/// Routes of the marketplace API over an already-built state.
pub fn build_router(state: AppState) -> Router {
    // ---
    Router::new()
        .route("/", get(handlers::home))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/profile", get(handlers::profile))
        .nest(
            "/auth",
            Router::new()
                .route("/register", post(handlers::register))
                .route("/login", post(handlers::login))
                .route("/logout", post(handlers::logout)),
        )
        .route("/cars", post(handlers::create_car))
        .route(
            "/cars/{id}",
            get(handlers::get_car)
                .put(handlers::update_car)
                .delete(handlers::delete_car),
        )
        .route("/cars/{id}/like", post(handlers::toggle_like))
        .route("/cars/{id}/rent", post(handlers::rent_car))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::track_requests,
        ))
        .with_state(state)
}
