//! projector.rs
//!
//! Проектор: единственный писатель витрины чтения.
//!
//! Потребляет топик `ticket-events` (ручной коммит оффсетов), применяет
//! события к user_tickets_view и schedule_availability_view идемпотентно,
//! двигает курсор проекции и инвалидирует кэш. Ошибка применения не
//! двигает ни курсор, ни оффсет - брокер передоставит сообщение; после
//! исчерпания попыток сообщение уходит в dead-letter топик.

use futures::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::message::{BorrowedMessage, Message};
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cache::CacheService;
use crate::config::KafkaConfig;
use crate::database::Database;
use crate::events::{EventEnvelope, EventType};
use crate::models::ProjectionCheckpoint;
use crate::services::enrichment::EnrichmentClient;
use crate::services::publisher::EventPublisher;

pub const PROJECTION_NAME: &str = "user-tickets";

// Значение total_seats для рейсов, о которых сторона чтения еще ничего не
// знает. Совместимость с исходной витриной; авторитетного источника
// вместимости в этом сервисе нет.
const FALLBACK_TOTAL_SEATS: i32 = 50;

#[derive(Debug, thiserror::Error)]
enum ApplyError {
    // Повторная доставка не поможет: сообщение сразу в dead-letter.
    #[error("poison message: {0}")]
    Poison(String),
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

pub struct Projector {
    consumer: StreamConsumer,
    db: Database,
    cache: CacheService,
    publisher: EventPublisher,
    enrichment: EnrichmentClient,
    topic: String,
    dead_letter_topic: String,
    max_apply_attempts: u32,
}

impl Projector {
    pub fn new(
        config: &KafkaConfig,
        db: Database,
        cache: CacheService,
        publisher: EventPublisher,
        enrichment: EnrichmentClient,
    ) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("group.id", &config.consumer_group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()?;

        Ok(Projector {
            consumer,
            db,
            cache,
            publisher,
            enrichment,
            topic: config.ticket_events_topic.clone(),
            dead_letter_topic: config.dead_letter_topic.clone(),
            max_apply_attempts: config.max_apply_attempts.max(1),
        })
    }

    pub async fn run(self) {
        if let Err(e) = self.consumer.subscribe(&[self.topic.as_str()]) {
            error!("projector: failed to subscribe to {}: {}", self.topic, e);
            return;
        }
        info!(topic = %self.topic, projection = PROJECTION_NAME, "projector started");

        let mut stream = self.consumer.stream();
        while let Some(message) = stream.next().await {
            match message {
                Ok(message) => self.handle_message(&message).await,
                Err(e) => {
                    error!("projector: kafka receive error: {}", e);
                }
            }
        }
        info!("projector stopped");
    }

    /// Обработка с повторами. Оффсет коммитится только после успешного
    /// применения либо после ухода сообщения в dead-letter.
    async fn handle_message(&self, message: &BorrowedMessage<'_>) {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.process(message).await {
                Ok(()) => {
                    self.commit(message);
                    return;
                }
                Err(ApplyError::Poison(reason)) => {
                    warn!("projector: poison message, sending to dead-letter: {}", reason);
                    self.divert_to_dead_letter(message).await;
                    self.commit(message);
                    return;
                }
                Err(ApplyError::Storage(e)) if attempt >= self.max_apply_attempts => {
                    error!(
                        attempts = attempt,
                        "projector: apply failed repeatedly, sending to dead-letter: {}", e
                    );
                    self.divert_to_dead_letter(message).await;
                    self.commit(message);
                    return;
                }
                Err(ApplyError::Storage(e)) => {
                    warn!(attempt, "projector: apply failed, retrying: {}", e);
                    tokio::time::sleep(Duration::from_millis(200 * u64::from(attempt))).await;
                }
            }
        }
    }

    async fn process(&self, message: &BorrowedMessage<'_>) -> Result<(), ApplyError> {
        let payload = message
            .payload()
            .ok_or_else(|| ApplyError::Poison("message has no payload".into()))?;
        let envelope: EventEnvelope = serde_json::from_slice(payload)
            .map_err(|e| ApplyError::Poison(format!("malformed envelope: {e}")))?;

        let Some(event_type) = envelope.known_type() else {
            // Незнакомые типы пропускаем: сервис может отставать от схемы
            // соседей, это не повод останавливать партицию.
            warn!(event_type = %envelope.event_type, "projector: unknown event type, skipping");
            return Ok(());
        };

        // Защита от передоставки: последнее примененное событие не
        // применяется второй раз (иначе поехал бы счетчик мест).
        let checkpoint: Option<ProjectionCheckpoint> = sqlx::query_as(
            r#"
            SELECT projection_name, last_processed_event_id, last_processed_at
            FROM projection_checkpoints
            WHERE projection_name = $1
            "#,
        )
        .bind(PROJECTION_NAME)
        .fetch_optional(&self.db.read)
        .await?;
        if checkpoint.is_some_and(|c| c.last_processed_event_id == envelope.event_id) {
            debug!(event_id = %envelope.event_id, "projector: duplicate delivery, skipping");
            return Ok(());
        }

        // Применение и сдвиг курсора в одной транзакции стороны чтения.
        let mut tx = self.db.read.begin().await?;
        let touched = self.apply(&mut tx, &envelope, event_type).await?;
        sqlx::query(
            r#"
            INSERT INTO projection_checkpoints (projection_name, last_processed_event_id, last_processed_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (projection_name)
            DO UPDATE SET last_processed_event_id = $2, last_processed_at = NOW()
            "#,
        )
        .bind(PROJECTION_NAME)
        .bind(envelope.event_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        // Инвалидация кэша строго после обновления витрины.
        self.cache.invalidate_ticket(envelope.aggregate_id).await;
        if let Some(user_id) = &touched.user_id {
            self.cache.invalidate_user_pages(user_id).await;
        }
        if let Some(schedule_id) = &touched.schedule_id {
            self.cache.invalidate_schedule(schedule_id).await;
        }

        // Обогащение отображаемых полей маршрута: best-effort, витрина
        // остается валидной и без него.
        if matches!(event_type, EventType::TicketBooked | EventType::TicketReserved) {
            if let Some(route_id) = &touched.route_id {
                self.enrich_ticket(envelope.aggregate_id, route_id, touched.schedule_id.as_deref())
                    .await;
            }
        }

        debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.event_type,
            "projector: event applied"
        );
        Ok(())
    }

    async fn apply(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        envelope: &EventEnvelope,
        event_type: EventType,
    ) -> Result<TouchedKeys, ApplyError> {
        match event_type {
            EventType::TicketBooked | EventType::TicketReserved => {
                self.apply_opened(tx, envelope, event_type).await
            }
            EventType::TicketConfirmed => {
                let row: Option<(String, String)> = sqlx::query_as(
                    r#"
                    UPDATE user_tickets_view
                    SET status = 'CONFIRMED', updated_at = NOW()
                    WHERE id = $1
                    RETURNING user_id, schedule_id
                    "#,
                )
                .bind(envelope.aggregate_id)
                .fetch_optional(&mut **tx)
                .await?;
                Ok(TouchedKeys::from_row(row))
            }
            EventType::TicketCancelled => self.apply_closed(tx, envelope, "CANCELLED").await,
            EventType::TicketExpired => self.apply_closed(tx, envelope, "EXPIRED").await,
            EventType::TicketRefunded => self.apply_closed(tx, envelope, "REFUNDED").await,
        }
    }

    /// BOOKED/RESERVED: upsert витрины. Статус из события не понижает уже
    /// достигнутый: повтор BOOKED после примененного CONFIRMED оставляет
    /// CONFIRMED.
    async fn apply_opened(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        envelope: &EventEnvelope,
        event_type: EventType,
    ) -> Result<TouchedKeys, ApplyError> {
        let p = &envelope.payload;
        let status = if event_type == EventType::TicketBooked {
            "PENDING"
        } else {
            "RESERVED"
        };

        let user_id = payload_str(p, "userId")?;
        let route_id = payload_str(p, "routeId")?;
        let schedule_id = payload_str(p, "scheduleId")?;
        let passenger_name = payload_str(p, "passengerName")?;
        let passenger_email = payload_str(p, "passengerEmail")?;
        let seat_number = p.get("seatNumber").and_then(|v| v.as_str());
        let price = payload_price(p)?;
        let currency = payload_str(p, "currency")?;

        sqlx::query(
            r#"
            INSERT INTO user_tickets_view
                (id, user_id, route_id, schedule_id, seat_number,
                 passenger_name, passenger_email, price, currency, status,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::numeric, $9, $10, $11, NOW())
            ON CONFLICT (id) DO UPDATE SET
                status = CASE
                    WHEN user_tickets_view.status IN ('CONFIRMED', 'CANCELLED', 'EXPIRED', 'REFUNDED')
                        THEN user_tickets_view.status
                    ELSE EXCLUDED.status
                END,
                updated_at = NOW()
            "#,
        )
        .bind(envelope.aggregate_id)
        .bind(user_id)
        .bind(route_id)
        .bind(schedule_id)
        .bind(seat_number)
        .bind(passenger_name)
        .bind(passenger_email)
        .bind(price)
        .bind(currency)
        .bind(status)
        .bind(envelope.timestamp)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO schedule_availability_view (schedule_id, total_seats, booked_seats)
            VALUES ($1, $2, 1)
            ON CONFLICT (schedule_id)
            DO UPDATE SET booked_seats = schedule_availability_view.booked_seats + 1
            "#,
        )
        .bind(schedule_id)
        .bind(FALLBACK_TOTAL_SEATS)
        .execute(&mut **tx)
        .await?;

        Ok(TouchedKeys {
            user_id: Some(user_id.to_string()),
            schedule_id: Some(schedule_id.to_string()),
            route_id: Some(route_id.to_string()),
        })
    }

    /// CANCELLED/EXPIRED/REFUNDED: терминальный статус и возврат единицы в
    /// счетчик занятых мест (с отсечкой в нуле).
    async fn apply_closed(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        envelope: &EventEnvelope,
        status: &str,
    ) -> Result<TouchedKeys, ApplyError> {
        let row: Option<(String, String)> = sqlx::query_as(
            r#"
            UPDATE user_tickets_view
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING user_id, schedule_id
            "#,
        )
        .bind(envelope.aggregate_id)
        .bind(status)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some((_, schedule_id)) = &row {
            sqlx::query(
                r#"
                UPDATE schedule_availability_view
                SET booked_seats = GREATEST(booked_seats - 1, 0)
                WHERE schedule_id = $1
                "#,
            )
            .bind(schedule_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(TouchedKeys::from_row(row))
    }

    async fn enrich_ticket(&self, booking_id: Uuid, route_id: &str, schedule_id: Option<&str>) {
        let Some(schedule_id) = schedule_id else {
            return;
        };
        let Some(display) = self.enrichment.fetch_route_display(route_id, schedule_id).await
        else {
            return;
        };
        let result = sqlx::query(
            r#"
            UPDATE user_tickets_view
            SET route_name = $2, departure_time = $3, arrival_time = $4,
                origin_stop = $5, destination_stop = $6, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(booking_id)
        .bind(&display.route_name)
        .bind(display.departure_time)
        .bind(display.arrival_time)
        .bind(&display.origin_stop)
        .bind(&display.destination_stop)
        .execute(&self.db.read)
        .await;
        if let Err(e) = result {
            warn!(booking_id = %booking_id, "failed to store route enrichment: {}", e);
        }
    }

    async fn divert_to_dead_letter(&self, message: &BorrowedMessage<'_>) {
        let payload = message.payload().unwrap_or_default();
        let key = message
            .key()
            .map(|k| String::from_utf8_lossy(k).into_owned())
            .unwrap_or_default();
        if let Err(e) = self
            .publisher
            .publish_raw(&self.dead_letter_topic, &key, payload)
            .await
        {
            // Сообщение потеряно для витрины, но не для системы: хранилище
            // событий остается источником истины для перестроения.
            error!("projector: failed to publish to dead-letter topic: {}", e);
        }
    }

    fn commit(&self, message: &BorrowedMessage<'_>) {
        if let Err(e) = self.consumer.commit_message(message, CommitMode::Async) {
            warn!("projector: failed to commit offset: {}", e);
        }
    }
}

#[derive(Default)]
struct TouchedKeys {
    user_id: Option<String>,
    schedule_id: Option<String>,
    route_id: Option<String>,
}

impl TouchedKeys {
    fn from_row(row: Option<(String, String)>) -> Self {
        match row {
            Some((user_id, schedule_id)) => TouchedKeys {
                user_id: Some(user_id),
                schedule_id: Some(schedule_id),
                route_id: None,
            },
            None => TouchedKeys::default(),
        }
    }
}

fn payload_str<'a>(payload: &'a serde_json::Value, field: &str) -> Result<&'a str, ApplyError> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApplyError::Poison(format!("payload field {field} is missing")))
}

// Цена приходит строкой, но смежные сервисы могут прислать и число.
fn payload_price(payload: &serde_json::Value) -> Result<String, ApplyError> {
    match payload.get("price") {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ApplyError::Poison("payload field price is missing".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_field_extraction() {
        let p = json!({"userId": "U1", "seatNumber": null});
        assert_eq!(payload_str(&p, "userId").unwrap(), "U1");
        assert!(payload_str(&p, "scheduleId").is_err());
        assert!(payload_str(&p, "seatNumber").is_err());
    }

    #[test]
    fn price_accepts_string_and_number() {
        assert_eq!(payload_price(&json!({"price": "25.00"})).unwrap(), "25.00");
        assert_eq!(payload_price(&json!({"price": 25.0})).unwrap(), "25.0");
        assert!(payload_price(&json!({})).is_err());
    }
}
