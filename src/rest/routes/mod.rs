pub mod health;
pub mod tasks;

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Fallback for unmatched paths, keeping 404s in the JSON error envelope.
pub async fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "message": "Not found" } })),
    )
}
