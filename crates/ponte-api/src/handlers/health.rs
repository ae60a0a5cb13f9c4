//! Liveness and health probes.

use axum::Json;
use serde_json::{json, Value};

/// `GET /` — plain-text liveness probe.
///
/// Doubles as the URL check some webhook senders perform when an endpoint
/// is registered, so the body is exactly `OK`.
pub async fn liveness() -> &'static str {
    "OK"
}

/// `GET /health` — JSON ping endpoint for platform probes.
pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
