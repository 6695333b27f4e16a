use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// Opens the pool. `acquire_timeout` bounds how long a request waits for a connection.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.url)
        .await
        .context("connect to database")?;
    Ok(db)
}

pub async fn migrate(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("run migrations")?;
    Ok(())
}

/// Migrated pool from `DATABASE_URL`, or `None` when the variable is unset so
/// database-backed tests are skipped.
#[cfg(test)]
pub(crate) async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let db = connect(&DatabaseConfig {
        url,
        max_connections: 2,
        acquire_timeout_secs: 5,
    })
    .await
    .expect("connect to DATABASE_URL");
    migrate(&db).await.expect("migrations");
    Some(db)
}
