//! Shared fixtures for integration tests. Every test gets its own database
//! from `#[sqlx::test]`; these helpers lay down the schema and a known
//! schedule to edit against.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;

use workshop_core::database::setup;
use workshop_core::models::{NewOperation, NewWorkOrder, Operation, WorkOrder};

/// Instant inside the fixture day, far enough in the future that the no-past
/// admission rule never interferes.
pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 1, 6, hour, min, 0).unwrap()
}

pub async fn setup_schema(pool: &PgPool) {
    setup::ensure_tables(pool).await.expect("schema setup");
}

pub async fn create_work_order(pool: &PgPool, id: &str) -> WorkOrder {
    WorkOrder::create(
        pool,
        NewWorkOrder {
            id: id.to_string(),
            product: "Test Product".to_string(),
            qty: 10,
        },
    )
    .await
    .expect("work order fixture")
}

pub async fn create_operation(
    pool: &PgPool,
    id: &str,
    work_order_id: &str,
    op_index: i32,
    machine_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Operation {
    Operation::create(
        pool,
        NewOperation {
            id: id.to_string(),
            work_order_id: work_order_id.to_string(),
            op_index,
            machine_id: machine_id.to_string(),
            name: format!("step {op_index}"),
            start_at: start,
            end_at: end,
        },
    )
    .await
    .expect("operation fixture")
}

/// Three-step work order: predecessor ends 10:00, target [10:00, 11:00) at
/// position 2, successor starts 12:00. Each step on its own machine.
pub async fn seed_three_step_order(pool: &PgPool) {
    create_work_order(pool, "wo-1").await;
    create_operation(pool, "op-1", "wo-1", 1, "m-1", at(9, 0), at(10, 0)).await;
    create_operation(pool, "op-2", "wo-1", 2, "m-2", at(10, 0), at(11, 0)).await;
    create_operation(pool, "op-3", "wo-1", 3, "m-3", at(12, 0), at(13, 0)).await;
}
