//! Startup helpers: database pool creation with retry, and migrations

use crate::{config::DatabaseConfig, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tokio::time::sleep;

/// Build pool options with per-connection statement and lock timeouts.
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    let statement_timeout = config.statement_timeout_seconds;
    let lock_timeout = config.lock_timeout_seconds;

    PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Set statement timeout (max query execution time)
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;

                // Set lock timeout (max lock wait time - fail fast)
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
}

/// Connect to the database, retrying with exponential backoff while it is unavailable.
///
/// `connect_max_attempts = 0` retries until the process is stopped.
pub async fn create_db_pool(config: &DatabaseConfig) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let initial = Duration::from_secs(config.connect_retry_initial_seconds.max(1));
    let max = Duration::from_secs(config.connect_retry_max_seconds.max(1));

    let mut retry_delay = initial;
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match pool_options(config).connect(&config.url).await {
            Ok(pool) => {
                tracing::info!(
                    min = config.pool_min_size,
                    max = config.pool_max_size,
                    attempt,
                    "Database pool created"
                );
                return Ok(pool);
            }
            Err(e) if is_retryable(&e) && !attempts_exhausted(attempt, config) => {
                tracing::error!(
                    attempt,
                    "Database unavailable: {} (retrying in {:?})",
                    e,
                    retry_delay
                );
                sleep(retry_delay).await;
                retry_delay = next_retry_delay(retry_delay, max);
            }
            Err(e) => return Err(crate::Error::Database(e)),
        }
    }
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn is_retryable(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::Tls(_)
    ) || matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("57P03"))
}

fn attempts_exhausted(attempt: u32, config: &DatabaseConfig) -> bool {
    config.connect_max_attempts != 0 && attempt >= config.connect_max_attempts
}

fn next_retry_delay(current: Duration, max: Duration) -> Duration {
    (current * 2).min(max)
}
