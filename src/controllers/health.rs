//! health.rs
//!
//! Проверки живости и готовности процесса.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(ready))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "alive" })))
}

/// Готовность: обе базы отвечают, Redis пингуется. Недоступный Redis
/// готовности не отменяет - кэш best-effort.
async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let write_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db.write)
        .await
        .is_ok();
    let read_ok = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db.read)
        .await
        .is_ok();
    let cache_ok = state.cache.ping().await;

    let body = Json(json!({
        "writeStore": write_ok,
        "readStore": read_ok,
        "cache": cache_ok,
    }));

    if write_ok && read_ok {
        (StatusCode::OK, body)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, body)
    }
}
