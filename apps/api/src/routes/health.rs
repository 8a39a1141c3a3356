use axum::Json;
use serde_json::{json, Value};

use crate::engine::MODEL;

/// GET /health
/// Returns a simple status object with service version and model id.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "clearspeak-api",
        "model": MODEL
    }))
}
