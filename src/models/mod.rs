//! # Data Layer
//!
//! Row types for the two scheduling entities and their queries. WorkOrder is
//! the logical parent; deleting one cascades to its operations. In this core
//! the only mutation is an operation's `(start_at, end_at)` interval, applied
//! by the rescheduling validator under row locks.

pub mod operation;
pub mod work_order;

pub use operation::{NewOperation, Operation};
pub use work_order::{NewWorkOrder, WorkOrder, WorkOrderWithOperations};
