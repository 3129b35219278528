//! Postgres pool construction with startup retries and embedded migrations.

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;

const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Opens the pool, retrying while the database comes up, then runs migrations.
///
/// # Errors
/// Returns the last connection error once `retry_count` attempts are spent,
/// or any migration failure.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let attempts = config.retry_count.max(1);
    let mut attempt = 0;

    let pool = loop {
        attempt += 1;

        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => break pool,
            Err(err) if attempt < attempts => {
                tracing::warn!(attempt, attempts, "database not ready: {err}");
                tokio::time::sleep(RETRY_DELAY).await;
            }
            Err(err) => {
                return Err(err).context(format!("database unreachable after {attempts} attempts"))
            }
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    tracing::info!("database ready after {attempt} attempt(s)");

    Ok(pool)
}
