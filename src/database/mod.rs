//! # Database Connection and Provisioning
//!
//! Pool construction from explicit [`DatabaseConfig`] plus the startup-time
//! provisioning and seeding routines in [`setup`].

pub mod setup;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

use crate::config::DatabaseConfig;

/// Build a connection pool from explicit configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
        .connect(&config.database_url())
        .await
}

/// Cheap connectivity probe used by the readiness endpoint.
pub async fn health_check(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let row = sqlx::query("SELECT 1 as health").fetch_one(pool).await?;
    let health: i32 = row.get("health");
    Ok(health == 1)
}
