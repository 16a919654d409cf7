//! # Operation Rescheduling Handler
//!
//! The single mutating endpoint: propose a new interval for one operation.
//! Timestamp normalization to UTC happens here, before the validator runs.

use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Request body for PUT /operations/{id}
#[derive(Debug, Deserialize)]
pub struct OperationUpdate {
    #[serde(deserialize_with = "deserialize_instant")]
    pub start: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_instant")]
    pub end: DateTime<Utc>,
}

/// Accept RFC 3339 with any offset (converted to UTC) or an offset-less
/// timestamp, which is interpreted as UTC.
fn deserialize_instant<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(aware) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(aware.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>()
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(serde::de::Error::custom)
}

/// The updated interval echoed back to the caller
#[derive(Debug, Serialize)]
pub struct UpdatedInterval {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Response for a successful reschedule
#[derive(Debug, Serialize)]
pub struct RescheduleResponse {
    pub message: String,
    pub data: UpdatedInterval,
}

/// Reschedule one operation: PUT /operations/{operation_id}
pub async fn reschedule_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
    Json(body): Json<OperationUpdate>,
) -> Result<Json<RescheduleResponse>, ApiError> {
    info!(
        operation_id = %operation_id,
        start = %body.start,
        end = %body.end,
        "reschedule requested"
    );

    let updated = state
        .validator
        .reschedule(&operation_id, body.start, body.end)
        .await?;

    Ok(Json(RescheduleResponse {
        message: format!("Operation {} updated successfully.", updated.id),
        data: UpdatedInterval {
            id: updated.id,
            start: updated.start_at,
            end: updated.end_at,
        },
    }))
}
