//! # Rescheduling Validator
//!
//! Accepts a proposed new interval for one operation and decides, under
//! concurrent modification, whether applying it preserves temporal sanity,
//! intra-work-order sequencing, and per-machine exclusivity. Accepted edits
//! commit atomically; any rejection rolls the transaction back untouched.
//!
//! ## Locking protocol
//!
//! All rows whose values feed the decision are read under `FOR UPDATE` locks
//! held to commit/abort, in a fixed order: target, predecessor, successor,
//! machine-conflict candidate. A concurrent reschedule touching any of the
//! same rows blocks on the lock and then re-evaluates against committed
//! state. Sequence neighbors are locked unconditionally, so conflicting
//! edits within one work order can never both commit. The machine check
//! locks only rows that already match the overlap predicate, which leaves
//! one narrow gap: two edits moving two same-machine operations into mutual
//! overlap lock disjoint row sets (see
//! [`Operation::lock_machine_overlap`](crate::models::Operation::lock_machine_overlap)).

use std::fmt;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use super::rules::{check_not_past, check_proposed_interval, RuleViolation};
use super::store::{PgScheduleStore, ScheduleStore};
use crate::models::Operation;

/// Outcome of a rejected or failed reschedule. Domain rejections
/// ([`Violation`](Self::Violation)) are terminal for the given input;
/// storage failures ([`Storage`](Self::Storage)) are transient and the whole
/// request is safe to retry, since the transaction never committed.
#[derive(Debug)]
pub enum RescheduleError {
    Violation(RuleViolation),
    Storage(sqlx::Error),
}

impl fmt::Display for RescheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescheduleError::Violation(v) => write!(f, "rule violation: {v}"),
            RescheduleError::Storage(e) => write!(f, "storage failure: {e}"),
        }
    }
}

impl std::error::Error for RescheduleError {}

impl From<RuleViolation> for RescheduleError {
    fn from(violation: RuleViolation) -> Self {
        RescheduleError::Violation(violation)
    }
}

impl From<sqlx::Error> for RescheduleError {
    fn from(err: sqlx::Error) -> Self {
        RescheduleError::Storage(err)
    }
}

/// Rescheduling component owning a pool; one transaction per request
#[derive(Clone)]
pub struct RescheduleValidator {
    pool: PgPool,
}

impl RescheduleValidator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate and apply a proposed interval for one operation.
    ///
    /// Timestamps must already be UTC; naive inputs are normalized at the
    /// web boundary before reaching this point.
    #[instrument(skip(self))]
    pub async fn reschedule(
        &self,
        operation_id: &str,
        proposed_start: DateTime<Utc>,
        proposed_end: DateTime<Utc>,
    ) -> Result<Operation, RescheduleError> {
        // Pre-storage checks: malformed interval, then the point-in-time
        // admission rule. Neither takes a lock.
        check_proposed_interval(proposed_start, proposed_end)?;
        check_not_past(proposed_start, Utc::now())?;

        let mut store = PgScheduleStore::begin(&self.pool).await?;

        match decide_and_apply(&mut store, operation_id, proposed_start, proposed_end).await {
            Ok(updated) => {
                store.commit().await?;
                info!(
                    operation_id = %updated.id,
                    start = %updated.start_at,
                    end = %updated.end_at,
                    "operation rescheduled"
                );
                Ok(updated)
            }
            Err(err) => {
                if let Err(rollback_err) = store.rollback().await {
                    warn!(error = %rollback_err, "rollback after rejected reschedule failed");
                }
                Err(err)
            }
        }
    }
}

/// Steps 3–7 of the algorithm: everything that reads or writes storage, all
/// rows locked before their values are trusted. Generic over the store so
/// the decision logic is testable against an in-memory snapshot.
pub(crate) async fn decide_and_apply<S: ScheduleStore>(
    store: &mut S,
    operation_id: &str,
    proposed_start: DateTime<Utc>,
    proposed_end: DateTime<Utc>,
) -> Result<Operation, RescheduleError> {
    let Some(target) = store.lock_target(operation_id).await? else {
        return Err(RuleViolation::not_found().into());
    };

    // R1-backward: the predecessor must have ended by the proposed start
    if target.op_index > 1 {
        if let Some(prev) = store
            .lock_step(&target.work_order_id, target.op_index - 1)
            .await?
        {
            if proposed_start < prev.end_at {
                debug!(prev_end = %prev.end_at, "rejected by predecessor");
                return Err(RuleViolation::before_predecessor(prev.end_at).into());
            }
        }
    }

    // R1-forward: the successor must not have started before the proposed end
    if let Some(next) = store
        .lock_step(&target.work_order_id, target.op_index + 1)
        .await?
    {
        if next.start_at < proposed_end {
            debug!(next_start = %next.start_at, "rejected by successor");
            return Err(RuleViolation::after_successor(next.start_at).into());
        }
    }

    // R2: no other operation on the machine may intersect the proposed
    // half-open interval; the first conflict found is reported
    if let Some(conflict) = store
        .lock_machine_conflict(
            &target.machine_id,
            &target.id,
            proposed_start,
            proposed_end,
        )
        .await?
    {
        debug!(conflict_op = %conflict.id, "rejected by machine conflict");
        return Err(RuleViolation::machine_overlap(&conflict).into());
    }

    Ok(store
        .update_interval(operation_id, proposed_start, proposed_end)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduling::rules::{intervals_overlap, Rule};
    use async_trait::async_trait;
    use chrono::TimeZone;

    /// In-memory stand-in for the Postgres store: same contract, no locks
    /// needed because each test is single-threaded.
    struct MemoryStore {
        operations: Vec<Operation>,
    }

    #[async_trait]
    impl ScheduleStore for MemoryStore {
        async fn lock_target(
            &mut self,
            operation_id: &str,
        ) -> Result<Option<Operation>, sqlx::Error> {
            Ok(self
                .operations
                .iter()
                .find(|op| op.id == operation_id)
                .cloned())
        }

        async fn lock_step(
            &mut self,
            work_order_id: &str,
            op_index: i32,
        ) -> Result<Option<Operation>, sqlx::Error> {
            Ok(self
                .operations
                .iter()
                .find(|op| op.work_order_id == work_order_id && op.op_index == op_index)
                .cloned())
        }

        async fn lock_machine_conflict(
            &mut self,
            machine_id: &str,
            exclude_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Option<Operation>, sqlx::Error> {
            Ok(self
                .operations
                .iter()
                .find(|op| {
                    op.machine_id == machine_id
                        && op.id != exclude_id
                        && intervals_overlap(start, end, op.start_at, op.end_at)
                })
                .cloned())
        }

        async fn update_interval(
            &mut self,
            operation_id: &str,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Operation, sqlx::Error> {
            let op = self
                .operations
                .iter_mut()
                .find(|op| op.id == operation_id)
                .expect("update target must exist");
            op.start_at = start;
            op.end_at = end;
            Ok(op.clone())
        }
    }

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2099, 1, 6, hour, min, 0).unwrap()
    }

    fn op(
        id: &str,
        work_order_id: &str,
        op_index: i32,
        machine_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Operation {
        Operation {
            id: id.to_string(),
            work_order_id: work_order_id.to_string(),
            op_index,
            machine_id: machine_id.to_string(),
            name: format!("step {op_index}"),
            start_at: start,
            end_at: end,
        }
    }

    /// Position-2 target with predecessor ending 10:00 and successor
    /// starting 12:00; each step on its own machine.
    fn three_step_order() -> MemoryStore {
        MemoryStore {
            operations: vec![
                op("op-1", "wo-1", 1, "m-1", at(9, 0), at(10, 0)),
                op("op-2", "wo-1", 2, "m-2", at(10, 0), at(11, 0)),
                op("op-3", "wo-1", 3, "m-3", at(12, 0), at(13, 0)),
            ],
        }
    }

    fn rule_of(err: RescheduleError) -> Rule {
        match err {
            RescheduleError::Violation(v) => v.rule,
            RescheduleError::Storage(e) => panic!("unexpected storage error: {e}"),
        }
    }

    #[tokio::test]
    async fn accepts_extension_up_to_successor_start() {
        let mut store = three_step_order();
        let updated = decide_and_apply(&mut store, "op-2", at(10, 0), at(11, 30))
            .await
            .unwrap();
        assert_eq!(updated.start_at, at(10, 0));
        assert_eq!(updated.end_at, at(11, 30));
        // stored state reflects the accepted edit
        assert_eq!(store.operations[1].end_at, at(11, 30));
    }

    #[tokio::test]
    async fn rejects_start_before_predecessor_end() {
        let mut store = three_step_order();
        let err = decide_and_apply(&mut store, "op-2", at(9, 30), at(11, 0))
            .await
            .unwrap_err();
        match err {
            RescheduleError::Violation(v) => {
                assert_eq!(v.rule, Rule::R1);
                let details = v.details.unwrap();
                assert_eq!(details["prev_end"], "2099-01-06T10:00:00+00:00");
            }
            other => panic!("expected violation, got {other}"),
        }
        // rejection leaves stored state unchanged
        assert_eq!(store.operations[1].start_at, at(10, 0));
    }

    #[tokio::test]
    async fn rejects_end_past_successor_start() {
        let mut store = three_step_order();
        let err = decide_and_apply(&mut store, "op-2", at(10, 0), at(12, 30))
            .await
            .unwrap_err();
        assert_eq!(rule_of(err), Rule::R1);
    }

    #[tokio::test]
    async fn adjacency_with_successor_is_legal() {
        let mut store = three_step_order();
        // ends exactly when the successor starts
        let updated = decide_and_apply(&mut store, "op-2", at(10, 0), at(12, 0))
            .await
            .unwrap();
        assert_eq!(updated.end_at, at(12, 0));
    }

    #[tokio::test]
    async fn machine_adjacency_is_legal() {
        // two operations on machine M: A=[09:00,10:00), B=[10:00,11:00)
        let mut store = MemoryStore {
            operations: vec![
                op("op-a", "wo-1", 1, "m-1", at(9, 0), at(10, 0)),
                op("op-b", "wo-2", 1, "m-1", at(10, 0), at(11, 0)),
            ],
        };
        // shrink A so it still touches B's start: no overlap, accepted
        let updated = decide_and_apply(&mut store, "op-a", at(9, 30), at(10, 0))
            .await
            .unwrap();
        assert_eq!(updated.start_at, at(9, 30));
    }

    #[tokio::test]
    async fn machine_overlap_reports_the_conflicting_operation() {
        let mut store = MemoryStore {
            operations: vec![
                op("op-a", "wo-1", 1, "m-1", at(9, 0), at(10, 0)),
                op("op-b", "wo-2", 1, "m-1", at(10, 0), at(11, 0)),
            ],
        };
        let err = decide_and_apply(&mut store, "op-a", at(9, 30), at(10, 15))
            .await
            .unwrap_err();
        match err {
            RescheduleError::Violation(v) => {
                assert_eq!(v.rule, Rule::R2);
                let details = v.details.unwrap();
                assert_eq!(details["conflict_op"], "op-b");
                assert_eq!(details["conflict_start"], "2099-01-06T10:00:00+00:00");
                assert_eq!(details["conflict_end"], "2099-01-06T11:00:00+00:00");
            }
            other => panic!("expected violation, got {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_operation_is_not_found() {
        let mut store = three_step_order();
        let err = decide_and_apply(&mut store, "op-404", at(10, 0), at(11, 0))
            .await
            .unwrap_err();
        assert_eq!(rule_of(err), Rule::NotFound);
    }

    #[tokio::test]
    async fn single_operation_order_skips_sequencing() {
        let mut store = MemoryStore {
            operations: vec![op("solo", "wo-9", 1, "m-9", at(9, 0), at(10, 0))],
        };
        let updated = decide_and_apply(&mut store, "solo", at(14, 0), at(15, 0))
            .await
            .unwrap();
        assert_eq!(updated.start_at, at(14, 0));
    }

    #[tokio::test]
    async fn rejection_is_idempotent_and_mutates_nothing() {
        let mut store = three_step_order();
        let before = store.operations.clone();

        let first = decide_and_apply(&mut store, "op-2", at(9, 30), at(11, 0)).await;
        let second = decide_and_apply(&mut store, "op-2", at(9, 30), at(11, 0)).await;

        for result in [first, second] {
            assert_eq!(rule_of(result.unwrap_err()), Rule::R1);
        }
        assert_eq!(store.operations, before);
    }

    #[tokio::test]
    async fn accepted_interval_is_sane() {
        // P1: whatever commits has start strictly before end; the malformed
        // case is cut off before the store is touched
        assert!(check_proposed_interval(at(11, 0), at(10, 0)).is_err());
        let mut store = three_step_order();
        let updated = decide_and_apply(&mut store, "op-2", at(10, 30), at(11, 30))
            .await
            .unwrap();
        assert!(updated.start_at < updated.end_at);
    }
}
