pub mod accounts;
pub mod auth;
pub mod transactions;
pub mod users;

use axum::Json;
use serde_json::{json, Value};

/// Liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bank-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
