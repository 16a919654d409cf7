use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::operation::Operation;

/// WorkOrder represents one production job with a product and quantity.
/// Maps to the `workorder` table. Created by seeding; immutable thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkOrder {
    pub id: String,
    pub product: String,
    pub qty: i32,
}

/// New WorkOrder for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkOrder {
    pub id: String,
    pub product: String,
    pub qty: i32,
}

/// A work order with its operations ordered by sequence position, the shape
/// the listing endpoint serves.
#[derive(Debug, Clone, Serialize)]
pub struct WorkOrderWithOperations {
    pub id: String,
    pub product: String,
    pub qty: i32,
    pub operations: Vec<Operation>,
}

impl WorkOrder {
    /// Create a new work order
    pub async fn create(pool: &PgPool, new_order: NewWorkOrder) -> Result<WorkOrder, sqlx::Error> {
        sqlx::query_as::<_, WorkOrder>(
            r#"
            INSERT INTO workorder (id, product, qty)
            VALUES ($1, $2, $3)
            RETURNING id, product, qty
            "#,
        )
        .bind(new_order.id)
        .bind(new_order.product)
        .bind(new_order.qty)
        .fetch_one(pool)
        .await
    }

    /// Find a work order by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<WorkOrder>, sqlx::Error> {
        sqlx::query_as::<_, WorkOrder>("SELECT id, product, qty FROM workorder WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all work orders
    pub async fn list_all(pool: &PgPool) -> Result<Vec<WorkOrder>, sqlx::Error> {
        sqlx::query_as::<_, WorkOrder>("SELECT id, product, qty FROM workorder ORDER BY id")
            .fetch_all(pool)
            .await
    }

    /// List all work orders, each embedding its operations ordered by
    /// sequence position. Two queries plus in-memory grouping, so the
    /// listing never holds row locks.
    pub async fn list_with_operations(
        pool: &PgPool,
    ) -> Result<Vec<WorkOrderWithOperations>, sqlx::Error> {
        let work_orders = Self::list_all(pool).await?;
        let operations = Operation::list_all_ordered(pool).await?;

        let mut by_order: HashMap<String, Vec<Operation>> = HashMap::new();
        for op in operations {
            by_order.entry(op.work_order_id.clone()).or_default().push(op);
        }

        Ok(work_orders
            .into_iter()
            .map(|wo| {
                let operations = by_order.remove(&wo.id).unwrap_or_default();
                WorkOrderWithOperations {
                    id: wo.id,
                    product: wo.product,
                    qty: wo.qty,
                    operations,
                }
            })
            .collect())
    }
}
