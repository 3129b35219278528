use anyhow::{Context, Result};
use rentcars_api::{build_router, build_state, AppConfig};
use tracing::info;

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    // A missing .env file is fine; real deployments set the environment directly.
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let state = build_state(&config).await?;
    let app = build_router(state);

    info!("Starting at endpoint:{}", config.bind_addr);
    info!("Starting rent-cars API server v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
