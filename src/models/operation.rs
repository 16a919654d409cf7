use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, PgPool};

/// Operation represents one scheduled step of a work order, bound to one
/// machine and one half-open time interval `[start_at, end_at)`.
/// Maps to the `operation` table.
///
/// Serialized field names follow the API's camelCase contract
/// (`workOrderId`, `machineId`, `index`, `start`, `end`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: String,
    pub work_order_id: String,
    /// 1-based sequence position, unique within the work order
    #[serde(rename = "index")]
    pub op_index: i32,
    pub machine_id: String,
    pub name: String,
    #[serde(rename = "start")]
    pub start_at: DateTime<Utc>,
    #[serde(rename = "end")]
    pub end_at: DateTime<Utc>,
}

/// New Operation for creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOperation {
    pub id: String,
    pub work_order_id: String,
    pub op_index: i32,
    pub machine_id: String,
    pub name: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

const COLUMNS: &str = "id, work_order_id, op_index, machine_id, name, start_at, end_at";

impl Operation {
    /// Create a new operation
    pub async fn create(pool: &PgPool, new_op: NewOperation) -> Result<Operation, sqlx::Error> {
        sqlx::query_as::<_, Operation>(
            r#"
            INSERT INTO operation (id, work_order_id, op_index, machine_id, name, start_at, end_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, work_order_id, op_index, machine_id, name, start_at, end_at
            "#,
        )
        .bind(new_op.id)
        .bind(new_op.work_order_id)
        .bind(new_op.op_index)
        .bind(new_op.machine_id)
        .bind(new_op.name)
        .bind(new_op.start_at)
        .bind(new_op.end_at)
        .fetch_one(pool)
        .await
    }

    /// Find an operation by ID
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!("SELECT {COLUMNS} FROM operation WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Operations of one work order, ordered by sequence position
    pub async fn find_by_work_order(
        pool: &PgPool,
        work_order_id: &str,
    ) -> Result<Vec<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            "SELECT {COLUMNS} FROM operation WHERE work_order_id = $1 ORDER BY op_index"
        ))
        .bind(work_order_id)
        .fetch_all(pool)
        .await
    }

    /// All operations, ordered by sequence position (listing endpoint)
    pub async fn list_all_ordered(pool: &PgPool) -> Result<Vec<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            "SELECT {COLUMNS} FROM operation ORDER BY work_order_id, op_index"
        ))
        .fetch_all(pool)
        .await
    }

    /// Fetch an operation by ID under an exclusive row lock, held until the
    /// enclosing transaction commits or aborts.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: &str,
    ) -> Result<Option<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            "SELECT {COLUMNS} FROM operation WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Fetch the operation at a sequence position within a work order under
    /// an exclusive row lock.
    pub async fn lock_by_position(
        conn: &mut PgConnection,
        work_order_id: &str,
        op_index: i32,
    ) -> Result<Option<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            "SELECT {COLUMNS} FROM operation WHERE work_order_id = $1 AND op_index = $2 FOR UPDATE"
        ))
        .bind(work_order_id)
        .bind(op_index)
        .fetch_optional(conn)
        .await
    }

    /// Fetch, under an exclusive row lock, the first other operation on the
    /// given machine whose interval intersects `[start, end)`. Half-open
    /// semantics: touching endpoints do not match.
    ///
    /// Only rows that currently match the predicate get locked; there is no
    /// predicate lock on the proposed window itself. Two concurrent edits
    /// moving two same-machine operations into mutual overlap can therefore
    /// both pass this check. Preserved long-standing behavior; closing it
    /// would take serializable isolation or an exclusion constraint.
    pub async fn lock_machine_overlap(
        conn: &mut PgConnection,
        machine_id: &str,
        exclude_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Operation>, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            r#"
            SELECT {COLUMNS} FROM operation
            WHERE machine_id = $1 AND id != $2
              AND start_at < $4 AND end_at > $3
            LIMIT 1
            FOR UPDATE
            "#
        ))
        .bind(machine_id)
        .bind(exclude_id)
        .bind(start)
        .bind(end)
        .fetch_optional(conn)
        .await
    }

    /// Write a new interval onto an operation row. Only meaningful inside
    /// the transaction that already holds the row's lock.
    pub async fn update_interval(
        conn: &mut PgConnection,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Operation, sqlx::Error> {
        sqlx::query_as::<_, Operation>(&format!(
            r#"
            UPDATE operation
            SET start_at = $2, end_at = $3
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(start)
        .bind(end)
        .fetch_one(conn)
        .await
    }

    /// Duration of the scheduled interval
    pub fn duration(&self) -> chrono::Duration {
        self.end_at - self.start_at
    }
}
