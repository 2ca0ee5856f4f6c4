//! Route handlers for the HTTP API.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::detector::Detection;
use crate::server::error::AppError;
use crate::server::AppContext;

/// Request body for `POST /detect`.
///
/// Fields are optional so that a missing field produces a validation
/// error naming it, rather than an opaque deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub url_original: Option<String>,
    pub url_suspect: Option<String>,
}

/// POST /detect
pub async fn detect(
    State(ctx): State<AppContext>,
    Json(payload): Json<DetectRequest>,
) -> Result<Json<Detection>, AppError> {
    let detection = ctx
        .detector
        .detect(payload.url_original.as_deref(), payload.url_suspect.as_deref())
        .await?;
    Ok(Json(detection))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
