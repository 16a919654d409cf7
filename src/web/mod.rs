//! # HTTP Surface
//!
//! Thin boundary over the scheduling core: router assembly, CORS, and the
//! serve loop. Handlers translate validator outcomes into responses; status
//! code mapping lives in [`errors`].

pub mod errors;
pub mod handlers;
pub mod state;

use axum::http::HeaderValue;
use axum::routing::{get, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use crate::error::{Result, WorkshopError};
use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.web.cors_allowed_origins);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/workorders", get(handlers::work_orders::list_work_orders))
        .route(
            "/operations/{operation_id}",
            put(handlers::operations::reschedule_operation),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState) -> Result<()> {
    let bind_address = state.config.web.bind_address.clone();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| WorkshopError::SetupError(format!("binding {bind_address}: {e}")))?;
    info!(bind_address = %bind_address, "web server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| WorkshopError::SetupError(format!("serving: {e}")))
}
