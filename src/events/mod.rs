//! mod.rs
//!
//! Доменные события бронирования: конверт + типизированные полезные
//! нагрузки.
//!
//! На шину событие уходит в JSON c camelCase-полями; ключом сообщения служит
//! идентификатор бронирования, что дает упорядоченность в пределах агрегата.
//! `event_type` в конверте хранится строкой: проектор обязан распознавать
//! незнакомые типы и пропускать их с предупреждением, а не падать на парсинге.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const AGGREGATE_TYPE_BOOKING: &str = "Booking";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    TicketBooked,
    TicketReserved,
    TicketConfirmed,
    TicketCancelled,
    TicketExpired,
    TicketRefunded,
}

impl EventType {
    pub fn as_str(self) -> &'static str {
        match self {
            EventType::TicketBooked => "TICKET_BOOKED",
            EventType::TicketReserved => "TICKET_RESERVED",
            EventType::TicketConfirmed => "TICKET_CONFIRMED",
            EventType::TicketCancelled => "TICKET_CANCELLED",
            EventType::TicketExpired => "TICKET_EXPIRED",
            EventType::TicketRefunded => "TICKET_REFUNDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TICKET_BOOKED" => Some(EventType::TicketBooked),
            "TICKET_RESERVED" => Some(EventType::TicketReserved),
            "TICKET_CONFIRMED" => Some(EventType::TicketConfirmed),
            "TICKET_CANCELLED" => Some(EventType::TicketCancelled),
            "TICKET_EXPIRED" => Some(EventType::TicketExpired),
            "TICKET_REFUNDED" => Some(EventType::TicketRefunded),
            _ => None,
        }
    }
}

/// Конверт события. Пара `(aggregate_id, version)` уникальна в хранилище
/// событий и служит барьером записи для конкурирующих транзакций.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub event_id: Uuid,
    pub event_type: String,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub timestamp: DateTime<Utc>,
    pub version: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    pub payload: Value,
}

impl EventEnvelope {
    pub fn new(
        event_type: EventType,
        aggregate_id: Uuid,
        version: i32,
        correlation_id: Option<String>,
        payload: Value,
    ) -> Self {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            event_type: event_type.as_str().to_string(),
            aggregate_id,
            aggregate_type: AGGREGATE_TYPE_BOOKING.to_string(),
            timestamp: Utc::now(),
            version,
            correlation_id,
            causation_id: None,
            metadata: Value::Object(serde_json::Map::new()),
            payload,
        }
    }

    pub fn known_type(&self) -> Option<EventType> {
        EventType::parse(&self.event_type)
    }
}

// --- Типизированные полезные нагрузки ---

/// Общая нагрузка TICKET_BOOKED / TICKET_RESERVED; `expires_at` заполнен
/// только у резерва.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketOpenedPayload {
    pub booking_id: Uuid,
    pub user_id: String,
    pub route_id: String,
    pub schedule_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<String>,
    pub passenger_name: String,
    pub passenger_email: String,
    pub price: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketConfirmedPayload {
    pub booking_id: Uuid,
    pub user_id: String,
    pub payment_id: String,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCancelledPayload {
    pub booking_id: Uuid,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketExpiredPayload {
    pub booking_id: Uuid,
    pub user_id: String,
    pub expired_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRefundedPayload {
    pub booking_id: Uuid,
    pub user_id: String,
    pub refund_amount: Decimal,
    pub refunded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_wire_shape_is_camel_case() {
        let payload = TicketOpenedPayload {
            booking_id: Uuid::new_v4(),
            user_id: "U1".into(),
            route_id: "R1".into(),
            schedule_id: "S1".into(),
            seat_number: Some("A1".into()),
            passenger_name: "Aibek".into(),
            passenger_email: "aibek@example.kz".into(),
            price: Decimal::new(2500, 2),
            currency: "USD".into(),
            expires_at: None,
        };
        let env = EventEnvelope::new(
            EventType::TicketBooked,
            payload.booking_id,
            1,
            Some("corr-1".into()),
            serde_json::to_value(&payload).unwrap(),
        );

        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["eventType"], "TICKET_BOOKED");
        assert_eq!(v["aggregateType"], "Booking");
        assert_eq!(v["version"], 1);
        assert_eq!(v["correlationId"], "corr-1");
        assert_eq!(v["payload"]["seatNumber"], "A1");
        assert_eq!(v["payload"]["price"], json!("25.00"));
        // expires_at отсутствует у обычного бронирования
        assert!(v["payload"].get("expiresAt").is_none());
    }

    #[test]
    fn envelope_roundtrip() {
        let env = EventEnvelope::new(
            EventType::TicketExpired,
            Uuid::new_v4(),
            2,
            None,
            json!({"bookingId": "x", "userId": "U1"}),
        );
        let s = serde_json::to_string(&env).unwrap();
        let back: EventEnvelope = serde_json::from_str(&s).unwrap();
        assert_eq!(back.event_id, env.event_id);
        assert_eq!(back.known_type(), Some(EventType::TicketExpired));
        assert_eq!(back.version, 2);
    }

    #[test]
    fn unknown_event_type_still_parses_as_envelope() {
        let raw = json!({
            "eventId": Uuid::new_v4(),
            "eventType": "TICKET_UPGRADED",
            "aggregateId": Uuid::new_v4(),
            "aggregateType": "Booking",
            "timestamp": Utc::now(),
            "version": 3,
            "payload": {}
        });
        let env: EventEnvelope = serde_json::from_value(raw).unwrap();
        assert_eq!(env.known_type(), None);
    }

    #[test]
    fn event_type_roundtrip() {
        for t in [
            EventType::TicketBooked,
            EventType::TicketReserved,
            EventType::TicketConfirmed,
            EventType::TicketCancelled,
            EventType::TicketExpired,
            EventType::TicketRefunded,
        ] {
            assert_eq!(EventType::parse(t.as_str()), Some(t));
        }
    }
}
