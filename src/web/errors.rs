//! # Web API Error Types
//!
//! Maps domain outcomes to HTTP responses. The validator itself never thinks
//! in terms of transport status; the mapping lives entirely here:
//! `INVALID` → 400, `R1`/`R2`/`R3` → 409, `NOT_FOUND` → 404, transient
//! storage failure → 503 (safe to retry).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::scheduling::{RescheduleError, Rule, RuleViolation};

/// Web API specific errors with HTTP status code mappings. Malformed bodies
/// never reach this type: axum's `Json` extractor rejects them, and a
/// malformed interval surfaces as the validator's `INVALID` rule.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Violation(RuleViolation),

    #[error("transient storage failure")]
    Storage(#[from] sqlx::Error),
}

impl From<RescheduleError> for ApiError {
    fn from(err: RescheduleError) -> Self {
        match err {
            RescheduleError::Violation(v) => ApiError::Violation(v),
            RescheduleError::Storage(e) => ApiError::Storage(e),
        }
    }
}

fn status_for(rule: Rule) -> StatusCode {
    match rule {
        Rule::Invalid => StatusCode::BAD_REQUEST,
        Rule::R1 | Rule::R2 | Rule::R3 => StatusCode::CONFLICT,
        Rule::NotFound => StatusCode::NOT_FOUND,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Violation(violation) => {
                let status = status_for(violation.rule);
                (status, Json(json!({ "error": violation }))).into_response()
            }
            ApiError::Storage(err) => {
                tracing::error!(error = %err, "storage failure surfaced to web layer");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "error": {
                            "rule": "STORAGE",
                            "message": "transient storage failure, retry the request"
                        }
                    })),
                )
                    .into_response()
            }
        }
    }
}
