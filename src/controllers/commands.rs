//! commands.rs
//!
//! Командные эндпоинты бронирования билетов.
//!
//! Включает в себя следующую функциональность:
//! - Прямая покупка билета (book) и резерв под сагу оплаты (reserve).
//! - Подтверждение оплаты (confirm) и отмена (cancel).
//! - Возврат средств (refund) для межсервисного платежного потока.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::success;
use crate::error::AppError;
use crate::middleware::{AuthUser, CorrelationId, Role};
use crate::services::booking_commands::OpenBookingCommand;
use crate::AppState;

/// Определяет командные маршруты.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tickets/commands/book", post(book_ticket))
        .route("/tickets/commands/reserve", post(reserve_ticket))
        .route("/tickets/commands/confirm", post(confirm_ticket))
        .route("/tickets/commands/cancel", post(cancel_ticket))
        .route("/tickets/commands/refund", post(refund_ticket))
}

// --- DTO ---

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketRequest {
    #[validate(length(min = 1))]
    pub route_id: String,
    #[validate(length(min = 1))]
    pub schedule_id: String,
    pub seat_number: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub passenger_name: String,
    #[validate(email)]
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
    pub price: Decimal,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReserveTicketRequest {
    #[serde(flatten)]
    #[validate(nested)]
    pub booking: BookTicketRequest,
    pub reservation_duration_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmTicketRequest {
    pub booking_id: Uuid,
    pub payment_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTicketRequest {
    pub booking_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundTicketRequest {
    pub booking_id: Uuid,
    pub refund_amount: Option<Decimal>,
}

fn to_command(req: BookTicketRequest, user: &AuthUser, correlation_id: &str) -> OpenBookingCommand {
    OpenBookingCommand {
        user_id: user.user_id.clone(),
        route_id: req.route_id,
        schedule_id: req.schedule_id,
        seat_number: req.seat_number,
        passenger_name: req.passenger_name,
        passenger_email: req.passenger_email,
        passenger_phone: req.passenger_phone,
        price: req.price,
        currency: req.currency.unwrap_or_else(|| "USD".to_string()),
        correlation_id: Some(correlation_id.to_string()),
    }
}

// --- Обработчики ---

/// POST /api/tickets/commands/book
///
/// Создает бронирование в статусе PENDING; указанное место сразу
/// помечается занятым.
async fn book_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Json(req): Json<BookTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let booking = state
        .commands
        .book(to_command(req, &user, &correlation.0))
        .await?;
    Ok((StatusCode::CREATED, success(booking, &correlation.0)))
}

/// POST /api/tickets/commands/reserve
///
/// Резервирует билет на ограниченное время под внешнюю сагу оплаты.
async fn reserve_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Json(req): Json<ReserveTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()?;
    let booking = state
        .commands
        .reserve(
            to_command(req.booking, &user, &correlation.0),
            req.reservation_duration_minutes,
        )
        .await?;
    Ok((StatusCode::CREATED, success(booking, &correlation.0)))
}

/// POST /api/tickets/commands/confirm
///
/// Подтверждает бронирование после успешной оплаты. Вызывается как
/// пользователем, так и платежным сервисом от его имени.
async fn confirm_ticket(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    correlation: CorrelationId,
    Json(req): Json<ConfirmTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state
        .commands
        .confirm(req.booking_id, req.payment_id, Some(correlation.0.clone()))
        .await?;
    Ok((StatusCode::OK, success(booking, &correlation.0)))
}

/// POST /api/tickets/commands/cancel
///
/// Отменяет бронирование. Пользователь может отменить только свое;
/// межсервисные вызовы (роль ADMIN) отменяют без проверки владения.
async fn cancel_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Json(req): Json<CancelTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = match user.role {
        Role::Admin => None,
        Role::User => Some(user.user_id.as_str()),
    };
    let booking = state
        .commands
        .cancel(
            req.booking_id,
            requester,
            req.reason,
            Some(correlation.0.clone()),
        )
        .await?;
    Ok((StatusCode::OK, success(booking, &correlation.0)))
}

/// POST /api/tickets/commands/refund
///
/// Возврат средств по завершенному платежному потоку. Только для
/// межсервисных вызовов.
async fn refund_ticket(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    correlation: CorrelationId,
    Json(req): Json<RefundTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    if user.role != Role::Admin {
        return Err(AppError::Forbidden("refund is a service-to-service call".into()));
    }
    let booking = state
        .commands
        .refund(
            req.booking_id,
            req.refund_amount,
            Some(correlation.0.clone()),
        )
        .await?;
    Ok((StatusCode::OK, success(booking, &correlation.0)))
}
