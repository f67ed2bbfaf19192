//! booking.rs
//!
//! Агрегат бронирования и его машина состояний.
//!
//! Правила переходов (единственный авторитетный список):
//! - PENDING   -> CONFIRMED | CANCELLED
//! - RESERVED  -> CONFIRMED | CANCELLED | EXPIRED
//! - CONFIRMED -> CANCELLED | REFUNDED
//! - CANCELLED | EXPIRED | REFUNDED - терминальные, выхода нет.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Reserved,
    Confirmed,
    Cancelled,
    Expired,
    Refunded,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Reserved => "RESERVED",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Expired => "EXPIRED",
            BookingStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(BookingStatus::Pending),
            "RESERVED" => Some(BookingStatus::Reserved),
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            "EXPIRED" => Some(BookingStatus::Expired),
            "REFUNDED" => Some(BookingStatus::Refunded),
            _ => None,
        }
    }

    // Терминальный статус не покидается никогда.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::Expired | BookingStatus::Refunded
        )
    }

    // Статусы, в которых бронирование удерживает место за собой.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            BookingStatus::Pending | BookingStatus::Reserved | BookingStatus::Confirmed
        )
    }

    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Reserved, Confirmed)
                | (Reserved, Cancelled)
                | (Reserved, Expired)
                | (Confirmed, Cancelled)
                | (Confirmed, Refunded)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Строка агрегата из таблицы `bookings`. `version` растет на единицу при
/// каждой зафиксированной мутации; событие с тем же номером версии пишется
/// в той же транзакции.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: String,
    pub route_id: String,
    pub schedule_id: String,
    pub seat_number: Option<String>,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_id: Option<String>,
    pub reserved_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl Booking {
    pub fn current_status(&self) -> BookingStatus {
        // Статус пишется только из BookingStatus::as_str, чужих значений в
        // колонке быть не может.
        BookingStatus::parse(&self.status).unwrap_or(BookingStatus::Pending)
    }
}

/// Политика возврата: полный возврат только если отменяется оплаченное
/// (CONFIRMED) бронирование. TODO: заменить на тарифные правила, когда
/// сервис тарифов начнет их отдавать.
pub fn refund_amount_for(previous: BookingStatus, price: Decimal) -> Option<Decimal> {
    if previous == BookingStatus::Confirmed {
        Some(price)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Reserved,
        BookingStatus::Confirmed,
        BookingStatus::Cancelled,
        BookingStatus::Expired,
        BookingStatus::Refunded,
    ];

    #[test]
    fn legal_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Reserved.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Reserved.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Reserved.can_transition_to(BookingStatus::Expired));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Cancelled));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Refunded));
    }

    #[test]
    fn illegal_transitions() {
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Expired));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Reserved));
        assert!(!BookingStatus::Confirmed.can_transition_to(BookingStatus::Expired));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn status_roundtrip() {
        for s in ALL {
            assert_eq!(BookingStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(BookingStatus::parse("SOLD"), None);
    }

    #[test]
    fn refund_only_for_confirmed() {
        let price = Decimal::new(4000, 2); // 40.00
        assert_eq!(
            refund_amount_for(BookingStatus::Confirmed, price),
            Some(price)
        );
        assert_eq!(refund_amount_for(BookingStatus::Reserved, price), None);
        assert_eq!(refund_amount_for(BookingStatus::Pending, price), None);
    }

    proptest! {
        // Из терминального статуса не существует ни одного разрешенного перехода.
        #[test]
        fn terminal_states_have_no_exits(from in 0usize..6, to in 0usize..6) {
            let (from, to) = (ALL[from], ALL[to]);
            if from.is_terminal() {
                prop_assert!(!from.can_transition_to(to));
            }
        }

        // Любой разрешенный переход ведет из нетерминального статуса.
        #[test]
        fn transitions_start_from_active(from in 0usize..6, to in 0usize..6) {
            let (from, to) = (ALL[from], ALL[to]);
            if from.can_transition_to(to) {
                prop_assert!(from.is_active());
            }
        }
    }
}
