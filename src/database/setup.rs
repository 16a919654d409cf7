//! # Database Provisioning and Seeding
//!
//! Startup-time bootstrap: create the database if missing, apply idempotent
//! DDL, and load the seed fixture. All three routines are safe to run on
//! every start.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{Connection, PgConnection, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{Result, WorkshopError};

const DDL_WORKORDER: &str = r#"
CREATE TABLE IF NOT EXISTS workorder (
    id TEXT PRIMARY KEY,
    product TEXT NOT NULL,
    qty INTEGER NOT NULL
);
"#;

const DDL_OPERATION: &str = r#"
CREATE TABLE IF NOT EXISTS operation (
    id TEXT PRIMARY KEY,
    work_order_id TEXT NOT NULL REFERENCES workorder(id) ON DELETE CASCADE,
    op_index INTEGER NOT NULL,
    machine_id TEXT NOT NULL,
    name TEXT NOT NULL,
    start_at TIMESTAMPTZ NOT NULL,
    end_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT op_intra_order_unique UNIQUE (work_order_id, op_index),
    CONSTRAINT op_time_sanity CHECK (start_at < end_at)
);
"#;

const DDL_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_operation_wo_idx ON operation (work_order_id, op_index);",
    "CREATE INDEX IF NOT EXISTS idx_operation_machine_time ON operation (machine_id, start_at, end_at);",
    "CREATE INDEX IF NOT EXISTS idx_operation_start ON operation (start_at);",
];

/// One work order in the seed fixture, operations embedded.
#[derive(Debug, Deserialize)]
pub struct SeedWorkOrder {
    pub id: String,
    pub product: String,
    pub qty: i32,
    pub operations: Vec<SeedOperation>,
}

/// One operation in the seed fixture. Field names mirror the fixture's
/// camelCase keys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOperation {
    pub id: String,
    pub work_order_id: String,
    pub index: i32,
    pub machine_id: String,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Create the configured database if it does not exist yet.
///
/// Connects to the admin `postgres` database, so it must run before the
/// application pool is built.
pub async fn ensure_database(config: &DatabaseConfig) -> Result<()> {
    let mut conn = PgConnection::connect(&config.admin_url()).await?;

    let exists: Option<(i32,)> = sqlx::query_as("SELECT 1 FROM pg_database WHERE datname = $1")
        .bind(&config.database)
        .fetch_optional(&mut conn)
        .await?;

    if exists.is_none() {
        info!(database = %config.database, "database not found, creating it");
        // Identifiers cannot be bound as parameters
        let quoted = config.database.replace('"', "\"\"");
        sqlx::query(&format!("CREATE DATABASE \"{quoted}\""))
            .execute(&mut conn)
            .await?;
    }

    conn.close().await?;
    Ok(())
}

/// Apply idempotent DDL for the workorder and operation tables.
pub async fn ensure_tables(pool: &PgPool) -> Result<()> {
    sqlx::query(DDL_WORKORDER).execute(pool).await?;
    sqlx::query(DDL_OPERATION).execute(pool).await?;
    for ddl in DDL_INDEXES {
        sqlx::query(ddl).execute(pool).await?;
    }
    info!("tables ensured: workorder + operation");
    Ok(())
}

/// Load the seed fixture into the tables. Idempotent: existing rows are left
/// untouched via `ON CONFLICT DO NOTHING`.
///
/// Returns the number of work orders and operations actually inserted.
pub async fn seed_data(pool: &PgPool, seed_file: &Path) -> Result<(u64, u64)> {
    if !seed_file.exists() {
        info!(path = %seed_file.display(), "seed file not found, skipping seeding");
        return Ok((0, 0));
    }

    let raw = std::fs::read_to_string(seed_file)
        .map_err(|e| WorkshopError::SetupError(format!("reading seed file: {e}")))?;
    let work_orders: Vec<SeedWorkOrder> = serde_json::from_str(&raw)
        .map_err(|e| WorkshopError::SetupError(format!("parsing seed file: {e}")))?;

    seed_work_orders(pool, &work_orders).await
}

/// Insert pre-parsed seed work orders. Split out so tests can seed from
/// literals without touching the filesystem.
pub async fn seed_work_orders(pool: &PgPool, work_orders: &[SeedWorkOrder]) -> Result<(u64, u64)> {
    let mut inserted_orders = 0;
    let mut inserted_operations = 0;

    for wo in work_orders {
        let result = sqlx::query(
            r#"
            INSERT INTO workorder (id, product, qty)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&wo.id)
        .bind(&wo.product)
        .bind(wo.qty)
        .execute(pool)
        .await?;
        inserted_orders += result.rows_affected();

        for op in &wo.operations {
            let result = sqlx::query(
                r#"
                INSERT INTO operation (id, work_order_id, op_index, machine_id, name, start_at, end_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(&op.id)
            .bind(&op.work_order_id)
            .bind(op.index)
            .bind(&op.machine_id)
            .bind(&op.name)
            .bind(op.start)
            .bind(op.end)
            .execute(pool)
            .await?;
            inserted_operations += result.rows_affected();
        }
    }

    info!(
        work_orders = inserted_orders,
        operations = inserted_operations,
        "seed data inserted"
    );
    Ok((inserted_orders, inserted_operations))
}
