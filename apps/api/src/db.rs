use std::future::Future;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Creates a PostgreSQL connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Returns true when the error is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Runs `op` up to `attempts` times, retrying only on unique violations.
///
/// `op` receives the 1-based attempt number. Returns `Ok(None)` when every
/// attempt collided; any other error is returned immediately.
pub async fn with_unique_retry<T, F, Fut>(attempts: usize, mut op: F) -> Result<Option<T>, sqlx::Error>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    for attempt in 1..=attempts {
        match op(attempt).await {
            Ok(value) => return Ok(Some(value)),
            Err(e) if is_unique_violation(&e) => {
                warn!("Unique violation on attempt {attempt}/{attempts}, retrying");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

/// Pool for tests that need a live database. Reads `DATABASE_URL` and
/// applies migrations.
#[cfg(test)]
pub async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres@localhost/fair_interviews_test".to_string());
    create_pool(&database_url, 2).await.unwrap()
}
