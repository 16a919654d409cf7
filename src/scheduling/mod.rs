//! # Rescheduling Core
//!
//! The decision and mutation logic for moving one operation to a new time
//! interval. [`rules`] defines the named rules and interval predicates,
//! [`store`] the locked-read storage seam, and [`validator`] the algorithm
//! that binds them together inside one transaction.

pub mod rules;
pub mod store;
pub mod validator;

pub use rules::{Rule, RuleViolation};
pub use store::{PgScheduleStore, ScheduleStore};
pub use validator::{RescheduleError, RescheduleValidator};
