//! mod.rs
//!
//! Корневой модуль маршрутизации API.

pub mod commands;
pub mod health;
pub mod queries;

use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

/// Собирает и возвращает главный маршрутизатор приложения.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(commands::routes())
        .merge(queries::routes())
        .merge(health::routes())
}

/// Единый конверт успешного ответа.
pub fn success<T: Serialize>(data: T, correlation_id: &str) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "data": data,
        "meta": { "correlationId": correlation_id }
    }))
}
