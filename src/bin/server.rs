//! Scheduling service entry point: load configuration, provision and seed
//! the database, then serve the HTTP API.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use workshop_core::web::state::AppState;
use workshop_core::{config::WorkshopConfig, database, logging, web};

const SEED_FILE: &str = "fixtures/seed_data.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_structured_logging();

    let config = WorkshopConfig::load().context("loading configuration")?;

    database::setup::ensure_database(&config.database)
        .await
        .context("ensuring database exists")?;

    let pool = database::connect(&config.database)
        .await
        .context("building connection pool")?;

    database::setup::ensure_tables(&pool)
        .await
        .context("ensuring tables")?;
    let (work_orders, operations) = database::setup::seed_data(&pool, Path::new(SEED_FILE))
        .await
        .context("seeding data")?;

    info!(
        seeded_work_orders = work_orders,
        seeded_operations = operations,
        "database ready and seeded"
    );

    web::serve(AppState::new(pool, config))
        .await
        .context("running web server")?;

    info!("server shut down");
    Ok(())
}
