//! # Health Check Handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use crate::database;
use crate::web::errors::ApiError;
use crate::web::state::AppState;

/// Basic health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
}

/// Basic health check endpoint: GET /health
///
/// Returns OK once the service is up; verifies database connectivity so a
/// green response means requests can actually be served.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    debug!("performing health check");
    database::health_check(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
