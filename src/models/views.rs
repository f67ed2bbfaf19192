//! views.rs
//!
//! Строки стороны чтения. Заполняются только проектором; источником истины
//! не являются и целиком восстановимы из потока событий.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Денормализованная витрина билета. Отображаемые поля маршрута и рейса
/// пустые, пока их не заполнит обогащение.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub id: Uuid,
    pub user_id: String,
    pub route_id: String,
    pub schedule_id: String,
    pub seat_number: Option<String>,
    pub passenger_name: String,
    pub passenger_email: String,
    pub price: Decimal,
    pub currency: String,
    pub status: String,
    pub route_name: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub origin_stop: Option<String>,
    pub destination_stop: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Счетчик занятых мест по рейсу.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAvailability {
    pub schedule_id: String,
    pub total_seats: i32,
    pub booked_seats: i32,
}

impl ScheduleAvailability {
    pub fn available_seats(&self) -> i32 {
        (self.total_seats - self.booked_seats).max(0)
    }
}

// Курсор проектора: последнее примененное событие.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectionCheckpoint {
    pub projection_name: String,
    pub last_processed_event_id: Uuid,
    pub last_processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_seats_is_clamped_at_zero() {
        let s = ScheduleAvailability {
            schedule_id: "S1".into(),
            total_seats: 50,
            booked_seats: 60,
        };
        assert_eq!(s.available_seats(), 0);

        let s = ScheduleAvailability {
            schedule_id: "S1".into(),
            total_seats: 50,
            booked_seats: 12,
        };
        assert_eq!(s.available_seats(), 38);
    }
}
