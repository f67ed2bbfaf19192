//! seat.rs
//!
//! Строка доступности места `(schedule_id, seat_number)`.
//!
//! Инварианты по статусам:
//! - AVAILABLE: booking_id и locked_until пустые;
//! - LOCKED: booking_id задан, locked_until в будущем;
//! - BOOKED: booking_id задан, locked_until пустой.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeatStatus {
    Available,
    Locked,
    Booked,
}

impl SeatStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SeatStatus::Available => "AVAILABLE",
            SeatStatus::Locked => "LOCKED",
            SeatStatus::Booked => "BOOKED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "AVAILABLE" => Some(SeatStatus::Available),
            "LOCKED" => Some(SeatStatus::Locked),
            "BOOKED" => Some(SeatStatus::Booked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatAvailability {
    pub schedule_id: String,
    pub seat_number: String,
    pub status: String,
    pub booking_id: Option<Uuid>,
    pub locked_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SeatAvailability {
    pub fn current_status(&self) -> SeatStatus {
        SeatStatus::parse(&self.status).unwrap_or(SeatStatus::Booked)
    }

    /// Место можно занять, если оно свободно либо залочено с истекшим
    /// `locked_until` (протухший резерв, до которого еще не дошла фоновая
    /// задача).
    pub fn is_acquirable(&self, now: DateTime<Utc>) -> bool {
        match self.current_status() {
            SeatStatus::Available => true,
            SeatStatus::Locked => self.locked_until.map(|t| t < now).unwrap_or(true),
            SeatStatus::Booked => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn seat(status: &str, locked_until: Option<DateTime<Utc>>) -> SeatAvailability {
        SeatAvailability {
            schedule_id: "S1".into(),
            seat_number: "A1".into(),
            status: status.into(),
            booking_id: None,
            locked_until,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn available_seat_is_acquirable() {
        assert!(seat("AVAILABLE", None).is_acquirable(Utc::now()));
    }

    #[test]
    fn booked_seat_is_not_acquirable() {
        assert!(!seat("BOOKED", None).is_acquirable(Utc::now()));
    }

    #[test]
    fn fresh_lock_blocks_acquisition() {
        let now = Utc::now();
        assert!(!seat("LOCKED", Some(now + Duration::minutes(10))).is_acquirable(now));
    }

    #[test]
    fn stale_lock_can_be_reacquired() {
        let now = Utc::now();
        assert!(seat("LOCKED", Some(now - Duration::minutes(1))).is_acquirable(now));
    }
}
