//! Provisioning, seeding, and listing round-trip tests.

mod common;

use common::*;
use sqlx::PgPool;
use workshop_core::database::setup::{self, SeedOperation, SeedWorkOrder};
use workshop_core::models::WorkOrder;

fn fixture() -> Vec<SeedWorkOrder> {
    vec![
        SeedWorkOrder {
            id: "wo-2".to_string(),
            product: "Bracket".to_string(),
            qty: 25,
            operations: vec![
                SeedOperation {
                    id: "op-2-1".to_string(),
                    work_order_id: "wo-2".to_string(),
                    index: 1,
                    machine_id: "m-1".to_string(),
                    name: "Cut".to_string(),
                    start: at(8, 0),
                    end: at(9, 0),
                },
                SeedOperation {
                    id: "op-2-2".to_string(),
                    work_order_id: "wo-2".to_string(),
                    index: 2,
                    machine_id: "m-2".to_string(),
                    name: "Deburr".to_string(),
                    start: at(9, 0),
                    end: at(9, 30),
                },
            ],
        },
        SeedWorkOrder {
            id: "wo-3".to_string(),
            product: "Spacer".to_string(),
            qty: 500,
            operations: vec![],
        },
    ]
}

#[sqlx::test]
async fn seeding_is_idempotent(pool: PgPool) {
    setup_schema(&pool).await;

    let (orders, operations) = setup::seed_work_orders(&pool, &fixture()).await.unwrap();
    assert_eq!((orders, operations), (2, 2));

    // second run inserts nothing and changes nothing
    let (orders, operations) = setup::seed_work_orders(&pool, &fixture()).await.unwrap();
    assert_eq!((orders, operations), (0, 0));
}

#[sqlx::test]
async fn ensure_tables_is_repeatable(pool: PgPool) {
    setup_schema(&pool).await;
    setup_schema(&pool).await;
    setup::seed_work_orders(&pool, &fixture()).await.unwrap();
}

#[sqlx::test]
async fn listing_groups_operations_in_sequence_order(pool: PgPool) {
    setup_schema(&pool).await;
    setup::seed_work_orders(&pool, &fixture()).await.unwrap();

    let listed = WorkOrder::list_with_operations(&pool).await.unwrap();
    assert_eq!(listed.len(), 2);

    let bracket = listed.iter().find(|wo| wo.id == "wo-2").unwrap();
    assert_eq!(bracket.product, "Bracket");
    let indexes: Vec<i32> = bracket.operations.iter().map(|op| op.op_index).collect();
    assert_eq!(indexes, vec![1, 2]);

    let spacer = listed.iter().find(|wo| wo.id == "wo-3").unwrap();
    assert!(spacer.operations.is_empty());
}
