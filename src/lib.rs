//! # Workshop Core
//!
//! Scheduling core for manufacturing work orders. Each work order decomposes
//! into an ordered sequence of operations, each bound to one machine and one
//! time interval. The heart of the crate is the [`scheduling`] module: a
//! rescheduling validator that accepts a proposed new interval for a single
//! operation and decides, under concurrent modification, whether applying it
//! preserves the scheduling invariants, committing the change atomically when
//! it does.
//!
//! ## Invariants enforced on every accepted reschedule
//!
//! - **Sanity**: an operation starts strictly before it ends
//! - **Sequencing**: within a work order, operation k ends no later than
//!   operation k+1 starts (exact adjacency is allowed)
//! - **Machine exclusivity**: operations sharing a machine never overlap
//!   under half-open `[start, end)` semantics
//! - **No-past admission**: a proposed start may not lie in the past at the
//!   moment the edit is accepted
//!
//! ## Module Organization
//!
//! - [`models`] - WorkOrder and Operation row types with their queries
//! - [`scheduling`] - rule engine, storage seam, and the reschedule validator
//! - [`database`] - pool construction, provisioning, and seeding
//! - [`web`] - axum HTTP surface translating validator outcomes to responses
//! - [`config`] - typed configuration loaded at process start
//! - [`error`] - crate-level error handling
//!
//! ## Concurrency
//!
//! Every reschedule runs as one transaction. Row-level `FOR UPDATE` locks are
//! acquired on the target operation, its sequence neighbors, and any
//! same-machine conflict candidate before their values are trusted, and held
//! until commit or abort. Two concurrent edits touching the same rows
//! serialize on those locks; the loser re-evaluates against committed state.

pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod models;
pub mod scheduling;
pub mod web;

pub use config::{DatabaseConfig, WebConfig, WorkshopConfig};
pub use error::{Result, WorkshopError};
pub use models::{Operation, WorkOrder};
pub use scheduling::{RescheduleError, RescheduleValidator, Rule, RuleViolation};
