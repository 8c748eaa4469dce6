use crate::models::ApiResponse;
use axum::Json;
use serde_json::{json, Value};

/// Liveness probe.
///
/// GET /health
pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::data(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
