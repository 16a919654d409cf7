//! # Storage Seam for the Validator
//!
//! The validator never issues a read without a lock for any row whose value
//! it relies on to decide an outcome. [`ScheduleStore`] captures exactly that
//! contract: locked point-reads plus a single-row interval update, all
//! executing inside one enclosing transaction. [`PgScheduleStore`] is the
//! production implementation over a Postgres transaction; the unit tests use
//! an in-memory one.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::Operation;

/// Locked reads and the single mutation the validator needs, scoped to one
/// atomic transaction. Every returned row stays exclusively locked until the
/// transaction ends.
#[async_trait]
pub trait ScheduleStore {
    /// Lock and fetch the reschedule target by id
    async fn lock_target(&mut self, operation_id: &str)
        -> Result<Option<Operation>, sqlx::Error>;

    /// Lock and fetch the operation at a sequence position within a work
    /// order (the target's predecessor or successor)
    async fn lock_step(
        &mut self,
        work_order_id: &str,
        op_index: i32,
    ) -> Result<Option<Operation>, sqlx::Error>;

    /// Lock and fetch the first other operation on `machine_id` whose
    /// interval intersects `[start, end)` under the half-open test
    async fn lock_machine_conflict(
        &mut self,
        machine_id: &str,
        exclude_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Operation>, sqlx::Error>;

    /// Write the new interval onto the target row, returning the updated
    /// operation
    async fn update_interval(
        &mut self,
        operation_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Operation, sqlx::Error>;
}

/// Postgres-backed store wrapping one transaction. Row locks come from
/// `SELECT ... FOR UPDATE` and are released at [`commit`](Self::commit) or
/// [`rollback`](Self::rollback).
pub struct PgScheduleStore {
    tx: Transaction<'static, Postgres>,
}

impl PgScheduleStore {
    /// Open the transaction this store lives in
    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Commit, making the update visible and releasing all row locks
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    /// Abort, leaving stored state unchanged and releasing all row locks
    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

#[async_trait]
impl ScheduleStore for PgScheduleStore {
    async fn lock_target(
        &mut self,
        operation_id: &str,
    ) -> Result<Option<Operation>, sqlx::Error> {
        Operation::lock_by_id(&mut self.tx, operation_id).await
    }

    async fn lock_step(
        &mut self,
        work_order_id: &str,
        op_index: i32,
    ) -> Result<Option<Operation>, sqlx::Error> {
        Operation::lock_by_position(&mut self.tx, work_order_id, op_index).await
    }

    async fn lock_machine_conflict(
        &mut self,
        machine_id: &str,
        exclude_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Operation>, sqlx::Error> {
        Operation::lock_machine_overlap(&mut self.tx, machine_id, exclude_id, start, end).await
    }

    async fn update_interval(
        &mut self,
        operation_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Operation, sqlx::Error> {
        Operation::update_interval(&mut self.tx, operation_id, start, end).await
    }
}
