//! # Scheduling Rules
//!
//! Named rules a proposed reschedule can violate, the structured violation
//! payload surfaced to callers, and the interval predicates the validator
//! evaluates. All overlap tests use half-open `[start, end)` semantics, so
//! touching endpoints are always legal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

use crate::models::Operation;

/// Caller-facing reason a proposed reschedule was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Proposed interval is malformed (start not before end)
    #[serde(rename = "INVALID")]
    Invalid,
    /// Intra-work-order sequencing would be violated
    R1,
    /// Machine exclusivity would be violated
    R2,
    /// Proposed start lies in the past
    R3,
    /// Operation id does not exist
    #[serde(rename = "NOT_FOUND")]
    NotFound,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Invalid => "INVALID",
            Rule::R1 => "R1",
            Rule::R2 => "R2",
            Rule::R3 => "R3",
            Rule::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured rejection of a proposed reschedule. `details` carries the
/// specific blocking value when one exists (predecessor end, successor
/// start, or the conflicting operation's id and interval).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleViolation {
    pub rule: Rule,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl RuleViolation {
    pub fn invalid_interval() -> Self {
        Self {
            rule: Rule::Invalid,
            message: "start must be before end".to_string(),
            details: None,
        }
    }

    pub fn past_start() -> Self {
        Self {
            rule: Rule::R3,
            message: "start time cannot be in the past".to_string(),
            details: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            rule: Rule::NotFound,
            message: "Operation not found".to_string(),
            details: None,
        }
    }

    pub fn before_predecessor(prev_end: DateTime<Utc>) -> Self {
        Self {
            rule: Rule::R1,
            message: "must start after previous operation ends".to_string(),
            details: Some(json!({ "prev_end": prev_end.to_rfc3339() })),
        }
    }

    pub fn after_successor(next_start: DateTime<Utc>) -> Self {
        Self {
            rule: Rule::R1,
            message: "must end before next operation starts".to_string(),
            details: Some(json!({ "next_start": next_start.to_rfc3339() })),
        }
    }

    pub fn machine_overlap(conflict: &Operation) -> Self {
        Self {
            rule: Rule::R2,
            message: "overlaps with another operation on same machine".to_string(),
            details: Some(json!({
                "conflict_op": conflict.id,
                "conflict_start": conflict.start_at.to_rfc3339(),
                "conflict_end": conflict.end_at.to_rfc3339(),
            })),
        }
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule, self.message)
    }
}

impl std::error::Error for RuleViolation {}

/// Half-open overlap test: `[a_start, a_end)` and `[b_start, b_end)` overlap
/// iff `a_start < b_end && b_start < a_end`.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Basic interval sanity: start strictly before end. Requires no storage
/// access, so it runs before any lock is taken.
pub fn check_proposed_interval(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), RuleViolation> {
    if start < end {
        Ok(())
    } else {
        Err(RuleViolation::invalid_interval())
    }
}

/// Admission check (R3): the proposed start may not precede `now`. Evaluated
/// once at validation time; the proposed end is deliberately not checked,
/// matching the system's long-standing behavior.
pub fn check_not_past(start: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), RuleViolation> {
    if start < now {
        Err(RuleViolation::past_start())
    } else {
        Ok(())
    }
}
