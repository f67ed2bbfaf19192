//! queries.rs
//!
//! Запросные эндпоинты: билеты пользователя и доступность мест по рейсу.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::success;
use crate::error::AppError;
use crate::middleware::{AuthUser, CorrelationId};
use crate::AppState;

/// Определяет запросные маршруты.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets/queries/my-tickets", get(list_my_tickets))
        .route(
            "/tickets/queries/schedules/{schedule_id}/availability",
            get(get_schedule_availability),
        )
        .route("/tickets/queries/{booking_id}", get(get_ticket_details))
}

#[derive(Debug, Deserialize)]
pub struct MyTicketsQuery {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/tickets/queries/my-tickets
///
/// Страница билетов текущего пользователя, новые сверху. Без фильтра по
/// статусу ответ кэшируется на минуту.
async fn list_my_tickets(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Query(params): Query<MyTicketsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .queries
        .list_user_tickets(
            &user.user_id,
            params.status.as_deref(),
            params.page,
            params.limit,
        )
        .await?;
    Ok((StatusCode::OK, success(page, &correlation.0)))
}

/// GET /api/tickets/queries/{booking_id}
///
/// Детали одного билета; доступен только владельцу.
async fn get_ticket_details(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Path(booking_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ticket = state
        .queries
        .get_ticket_details(booking_id, &user.user_id)
        .await?;
    Ok((StatusCode::OK, success(ticket, &correlation.0)))
}

/// GET /api/tickets/queries/schedules/{schedule_id}/availability
///
/// Счетчик свободных мест по рейсу из витрины чтения.
async fn get_schedule_availability(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    correlation: CorrelationId,
    Path(schedule_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let availability = state.queries.get_schedule_availability(&schedule_id).await?;
    Ok((StatusCode::OK, success(availability, &correlation.0)))
}
