//! # Work Order Listing Handler

use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::models::{WorkOrder, WorkOrderWithOperations};
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// List all work orders with their operations: GET /workorders
///
/// Operations come back ordered by sequence position, instants serialized as
/// timezone-explicit RFC 3339 text.
pub async fn list_work_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<WorkOrderWithOperations>>, ApiError> {
    let work_orders = WorkOrder::list_with_operations(&state.pool).await?;
    debug!(count = work_orders.len(), "listed work orders");
    Ok(Json(work_orders))
}
