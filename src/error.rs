//! error.rs
//!
//! Типизированные ошибки ядра и их отображение в HTTP-ответы.
//!
//! Коды (`code`) стабильны и являются частью wire-контракта: клиенты и
//! смежные сервисы сопоставляют их, а не текст сообщения.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient seats: {0}")]
    InsufficientSeats(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Недопустимый переход жизненного цикла; current - статус на момент отказа
    #[error("Invalid booking state: {current}: {message}")]
    InvalidBookingState { current: String, message: String },

    #[error("Validation error")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientSeats(_) | Self::Conflict(_) | Self::InvalidBookingState { .. } => {
                StatusCode::CONFLICT
            }
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::InsufficientSeats(_) => "INSUFFICIENT_SEATS",
            Self::Conflict(_) => "CONFLICT",
            Self::InvalidBookingState { .. } => "INVALID_BOOKING_STATE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

// Инфраструктурные сбои (пул закрыт, соединение потеряно) наружу выходят
// как ServiceUnavailable; прочие ошибки SQL - как Internal.
impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::ServiceUnavailable(format!("database unavailable: {e}"))
            }
            _ => AppError::Internal(format!("database error: {e}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Детали по полям отдаем только для ошибок валидации.
        let details = match &self {
            AppError::Validation(errors) => serde_json::to_value(errors).ok(),
            AppError::InvalidBookingState { current, .. } => {
                Some(json!({ "currentStatus": current }))
            }
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), "request failed: {}", self);
        }

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "details": details,
            }
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_wire_contract() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InsufficientSeats("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::InvalidBookingState {
                current: "CANCELLED".into(),
                message: "x".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::ServiceUnavailable("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn stable_codes() {
        assert_eq!(AppError::InsufficientSeats("s".into()).code(), "INSUFFICIENT_SEATS");
        assert_eq!(
            AppError::InvalidBookingState {
                current: "EXPIRED".into(),
                message: "m".into()
            }
            .code(),
            "INVALID_BOOKING_STATE"
        );
    }

    #[test]
    fn infrastructure_errors_become_service_unavailable() {
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let err: AppError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
