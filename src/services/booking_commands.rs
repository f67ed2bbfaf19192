//! booking_commands.rs
//!
//! Командное ядро: book / reserve / confirm / cancel и перевод просроченных
//! резервов в EXPIRED.
//!
//! Каждая команда выполняется в одной транзакции стороны записи в строгом
//! порядке: блокировка строки бронирования (`SELECT ... FOR UPDATE`),
//! блокировка строки места, мутация bookings, мутация seat_availability,
//! вставка события с постмутационной версией, коммит. Уникальный индекс
//! `(aggregate_id, version)` в booking_events служит барьером: из двух
//! конкурирующих транзакций зафиксируется ровно одна.
//!
//! Публикация в Kafka происходит после коммита и не откатывает его: при
//! сбое публикации витрина чтения временно отстает, источником истины
//! остается хранилище событий.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{AppError, Result};
use crate::events::{
    EventEnvelope, EventType, TicketCancelledPayload, TicketConfirmedPayload,
    TicketExpiredPayload, TicketOpenedPayload, TicketRefundedPayload,
};
use crate::models::booking::refund_amount_for;
use crate::models::{Booking, BookingStatus, SeatAvailability, SeatStatus};
use crate::services::publisher::EventPublisher;

pub const DEFAULT_RESERVATION_MINUTES: i64 = 15;
pub const MIN_RESERVATION_MINUTES: i64 = 5;
pub const MAX_RESERVATION_MINUTES: i64 = 60;

/// Входные данные Book; Reserve добавляет к ним длительность резерва.
#[derive(Debug, Clone)]
pub struct OpenBookingCommand {
    pub user_id: String,
    pub route_id: String,
    pub schedule_id: String,
    pub seat_number: Option<String>,
    pub passenger_name: String,
    pub passenger_email: String,
    pub passenger_phone: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub correlation_id: Option<String>,
}

#[derive(Clone)]
pub struct BookingCommandService {
    db: Database,
    publisher: EventPublisher,
}

impl BookingCommandService {
    pub fn new(db: Database, publisher: EventPublisher) -> Self {
        Self { db, publisher }
    }

    // --- Команды ---

    /// Прямая покупка: бронирование сразу в PENDING, место (если указано)
    /// переходит AVAILABLE -> BOOKED в той же транзакции.
    pub async fn book(&self, cmd: OpenBookingCommand) -> Result<Booking> {
        validate_open_command(&cmd)?;
        let now = Utc::now();
        let booking_id = Uuid::new_v4();

        let mut tx = self.db.write.begin().await?;

        if let Some(seat) = &cmd.seat_number {
            self.acquire_seat(
                &mut tx,
                &cmd.schedule_id,
                seat,
                booking_id,
                SeatStatus::Booked,
                None,
                false,
                now,
            )
            .await?;
        }

        let booking = self
            .insert_booking(&mut tx, booking_id, &cmd, BookingStatus::Pending, None, None, now)
            .await?;

        let envelope = EventEnvelope::new(
            EventType::TicketBooked,
            booking_id,
            1,
            cmd.correlation_id.clone(),
            serde_json::to_value(opened_payload(&booking))
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(booking)
    }

    /// Резерв под сагу оплаты: RESERVED с дедлайном, место залочено до него.
    pub async fn reserve(
        &self,
        cmd: OpenBookingCommand,
        reservation_duration_minutes: Option<i64>,
    ) -> Result<Booking> {
        validate_open_command(&cmd)?;
        let duration = validate_reservation_duration(reservation_duration_minutes)?;

        let now = Utc::now();
        let expires_at = now + Duration::minutes(duration);
        let booking_id = Uuid::new_v4();

        let mut tx = self.db.write.begin().await?;

        if let Some(seat) = &cmd.seat_number {
            // Протухший LOCKED можно перехватить, не дожидаясь фоновой задачи.
            self.acquire_seat(
                &mut tx,
                &cmd.schedule_id,
                seat,
                booking_id,
                SeatStatus::Locked,
                Some(expires_at),
                true,
                now,
            )
            .await?;
        }

        let booking = self
            .insert_booking(
                &mut tx,
                booking_id,
                &cmd,
                BookingStatus::Reserved,
                Some(now),
                Some(expires_at),
                now,
            )
            .await?;

        let envelope = EventEnvelope::new(
            EventType::TicketReserved,
            booking_id,
            1,
            cmd.correlation_id.clone(),
            serde_json::to_value(opened_payload(&booking))
                .map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(booking)
    }

    /// Подтверждение оплаты: PENDING/RESERVED -> CONFIRMED. Просроченный
    /// резерв подтвердить нельзя, даже если фоновая задача еще не сняла его.
    pub async fn confirm(
        &self,
        booking_id: Uuid,
        payment_id: String,
        correlation_id: Option<String>,
    ) -> Result<Booking> {
        if payment_id.trim().is_empty() {
            return Err(AppError::BadRequest("paymentId is required".into()));
        }
        let now = Utc::now();

        let mut tx = self.db.write.begin().await?;
        let booking = self.lock_booking(&mut tx, booking_id).await?;
        let status = booking.current_status();

        if !status.can_transition_to(BookingStatus::Confirmed) {
            return Err(invalid_state(
                status,
                format!("booking {booking_id} cannot be confirmed"),
            ));
        }
        if status == BookingStatus::Reserved
            && booking.expires_at.map(|t| t < now).unwrap_or(false)
        {
            return Err(invalid_state(status, "reservation expired".to_string()));
        }

        let version = booking.version + 1;
        let updated: Booking = sqlx::query_as(
            r#"
            UPDATE bookings
            SET status = 'CONFIRMED', payment_id = $2, confirmed_at = $3,
                expires_at = NULL, updated_at = $3, version = $4
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(&payment_id)
        .bind(now)
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(seat) = &updated.seat_number {
            self.lock_seat(&mut tx, &updated.schedule_id, seat).await?;
            sqlx::query(
                r#"
                UPDATE seat_availability
                SET status = 'BOOKED', locked_until = NULL, updated_at = $3
                WHERE schedule_id = $1 AND seat_number = $2
                "#,
            )
            .bind(&updated.schedule_id)
            .bind(seat)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let payload = TicketConfirmedPayload {
            booking_id,
            user_id: updated.user_id.clone(),
            payment_id,
            confirmed_at: now,
        };
        let envelope = EventEnvelope::new(
            EventType::TicketConfirmed,
            booking_id,
            version,
            correlation_id,
            serde_json::to_value(payload).map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(updated)
    }

    /// Отмена. `requester` передается для пользовательских вызовов и
    /// проверяется на владение; межсервисные вызовы отменяют без него.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        requester: Option<&str>,
        reason: Option<String>,
        correlation_id: Option<String>,
    ) -> Result<Booking> {
        let now = Utc::now();

        let mut tx = self.db.write.begin().await?;
        let booking = self.lock_booking(&mut tx, booking_id).await?;

        if let Some(user_id) = requester {
            if booking.user_id != user_id {
                return Err(AppError::Forbidden(
                    "booking belongs to another user".into(),
                ));
            }
        }

        let status = booking.current_status();
        if !status.can_transition_to(BookingStatus::Cancelled) {
            return Err(invalid_state(
                status,
                format!("booking {booking_id} cannot be cancelled"),
            ));
        }

        let refund_amount = refund_amount_for(status, booking.price);
        let version = booking.version + 1;

        // payment_id обнуляется: он живет только у CONFIRMED и REFUNDED,
        // для возврата достаточно refund_amount в событии.
        let updated: Booking = sqlx::query_as(
            r#"
            UPDATE bookings
            SET status = 'CANCELLED', cancelled_at = $2, expires_at = NULL,
                payment_id = NULL, updated_at = $2, version = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(now)
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        self.release_seat(&mut tx, &updated, now).await?;

        let payload = TicketCancelledPayload {
            booking_id,
            user_id: updated.user_id.clone(),
            reason,
            cancelled_at: now,
            refund_amount,
        };
        let envelope = EventEnvelope::new(
            EventType::TicketCancelled,
            booking_id,
            version,
            correlation_id,
            serde_json::to_value(payload).map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(updated)
    }

    /// Перевод одного просроченного резерва в EXPIRED. Возвращает None, если
    /// бронирование исчезло из-под условия (конкурирующий confirm успел
    /// взять блокировку первым) - для фоновой задачи это не ошибка.
    pub async fn expire(&self, booking_id: Uuid) -> Result<Option<Booking>> {
        let now = Utc::now();

        let mut tx = self.db.write.begin().await?;
        let booking: Option<Booking> =
            sqlx::query_as("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(booking) = booking else {
            return Ok(None);
        };

        let still_expired = booking.current_status() == BookingStatus::Reserved
            && booking.expires_at.map(|t| t < now).unwrap_or(false);
        if !still_expired {
            return Ok(None);
        }

        let version = booking.version + 1;
        let updated: Booking = sqlx::query_as(
            r#"
            UPDATE bookings
            SET status = 'EXPIRED', expires_at = NULL, updated_at = $2, version = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(now)
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        self.release_seat(&mut tx, &updated, now).await?;

        let payload = TicketExpiredPayload {
            booking_id,
            user_id: updated.user_id.clone(),
            expired_at: now,
        };
        let envelope = EventEnvelope::new(
            EventType::TicketExpired,
            booking_id,
            version,
            None,
            serde_json::to_value(payload).map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(Some(updated))
    }

    /// Возврат средств по внешнему платежному потоку: CONFIRMED -> REFUNDED.
    pub async fn refund(
        &self,
        booking_id: Uuid,
        refund_amount: Option<Decimal>,
        correlation_id: Option<String>,
    ) -> Result<Booking> {
        let now = Utc::now();

        let mut tx = self.db.write.begin().await?;
        let booking = self.lock_booking(&mut tx, booking_id).await?;
        let status = booking.current_status();

        if !status.can_transition_to(BookingStatus::Refunded) {
            return Err(invalid_state(
                status,
                format!("booking {booking_id} cannot be refunded"),
            ));
        }

        let amount = refund_amount.unwrap_or(booking.price);
        let version = booking.version + 1;
        let updated: Booking = sqlx::query_as(
            r#"
            UPDATE bookings
            SET status = 'REFUNDED', updated_at = $2, version = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(now)
        .bind(version)
        .fetch_one(&mut *tx)
        .await?;

        self.release_seat(&mut tx, &updated, now).await?;

        let payload = TicketRefundedPayload {
            booking_id,
            user_id: updated.user_id.clone(),
            refund_amount: amount,
            refunded_at: now,
        };
        let envelope = EventEnvelope::new(
            EventType::TicketRefunded,
            booking_id,
            version,
            correlation_id,
            serde_json::to_value(payload).map_err(|e| AppError::Internal(e.to_string()))?,
        );
        self.append_event(&mut tx, &envelope).await?;

        tx.commit().await?;
        self.publish_after_commit(&envelope).await;
        Ok(updated)
    }

    // --- Шаги транзакционного протокола ---

    async fn lock_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
    ) -> Result<Booking> {
        let booking: Option<Booking> =
            sqlx::query_as("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(booking_id)
                .fetch_optional(&mut **tx)
                .await?;
        booking.ok_or_else(|| AppError::NotFound(format!("booking {booking_id} not found")))
    }

    async fn lock_seat(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: &str,
        seat_number: &str,
    ) -> Result<Option<SeatAvailability>> {
        let seat: Option<SeatAvailability> = sqlx::query_as(
            r#"
            SELECT schedule_id, seat_number, status, booking_id, locked_until, updated_at
            FROM seat_availability
            WHERE schedule_id = $1 AND seat_number = $2
            FOR UPDATE
            "#,
        )
        .bind(schedule_id)
        .bind(seat_number)
        .fetch_optional(&mut **tx)
        .await?;
        Ok(seat)
    }

    /// Захват места под блокировкой строки. Отсутствующая строка создается:
    /// расписание мест принадлежит внешнему агрегату, и сервис видит только
    /// те места, которые кто-то уже пытался занять.
    #[allow(clippy::too_many_arguments)]
    async fn acquire_seat(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        schedule_id: &str,
        seat_number: &str,
        booking_id: Uuid,
        target: SeatStatus,
        locked_until: Option<DateTime<Utc>>,
        allow_stale_lock: bool,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let existing = self.lock_seat(tx, schedule_id, seat_number).await?;

        let conflict = || {
            AppError::InsufficientSeats(format!(
                "seat {seat_number} is not available on schedule {schedule_id}"
            ))
        };

        match existing {
            None => {
                // Две транзакции могут одновременно не найти строку и обе
                // пойти на вставку; проигравшая получает конфликт по
                // первичному ключу и отдает его как нехватку места.
                let inserted = sqlx::query(
                    r#"
                    INSERT INTO seat_availability
                        (schedule_id, seat_number, status, booking_id, locked_until, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(schedule_id)
                .bind(seat_number)
                .bind(target.as_str())
                .bind(booking_id)
                .bind(locked_until)
                .bind(now)
                .execute(&mut **tx)
                .await;
                match inserted {
                    Ok(_) => Ok(()),
                    Err(sqlx::Error::Database(db)) if db.code().as_deref() == Some("23505") => {
                        Err(conflict())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Some(seat) => {
                let acquirable = if allow_stale_lock {
                    seat.is_acquirable(now)
                } else {
                    seat.current_status() == SeatStatus::Available
                };
                if !acquirable {
                    return Err(conflict());
                }
                sqlx::query(
                    r#"
                    UPDATE seat_availability
                    SET status = $3, booking_id = $4, locked_until = $5, updated_at = $6
                    WHERE schedule_id = $1 AND seat_number = $2
                    "#,
                )
                .bind(schedule_id)
                .bind(seat_number)
                .bind(target.as_str())
                .bind(booking_id)
                .bind(locked_until)
                .bind(now)
                .execute(&mut **tx)
                .await?;
                Ok(())
            }
        }
    }

    /// Возврат места в AVAILABLE при отмене, истечении или возврате средств.
    async fn release_seat(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking: &Booking,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let Some(seat) = &booking.seat_number else {
            return Ok(());
        };
        self.lock_seat(tx, &booking.schedule_id, seat).await?;
        sqlx::query(
            r#"
            UPDATE seat_availability
            SET status = 'AVAILABLE', booking_id = NULL, locked_until = NULL, updated_at = $3
            WHERE schedule_id = $1 AND seat_number = $2
            "#,
        )
        .bind(&booking.schedule_id)
        .bind(seat)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_booking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        booking_id: Uuid,
        cmd: &OpenBookingCommand,
        status: BookingStatus,
        reserved_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<Booking> {
        let booking: Booking = sqlx::query_as(
            r#"
            INSERT INTO bookings
                (id, user_id, route_id, schedule_id, seat_number,
                 passenger_name, passenger_email, passenger_phone,
                 price, currency, status, payment_id,
                 reserved_at, confirmed_at, cancelled_at, expires_at,
                 created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL,
                    $12, NULL, NULL, $13, $14, $14, 1)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(&cmd.user_id)
        .bind(&cmd.route_id)
        .bind(&cmd.schedule_id)
        .bind(&cmd.seat_number)
        .bind(&cmd.passenger_name)
        .bind(&cmd.passenger_email)
        .bind(&cmd.passenger_phone)
        .bind(cmd.price)
        .bind(&cmd.currency)
        .bind(status.as_str())
        .bind(reserved_at)
        .bind(expires_at)
        .bind(now)
        .fetch_one(&mut **tx)
        .await?;
        Ok(booking)
    }

    async fn append_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        envelope: &EventEnvelope,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO booking_events
                (event_id, event_type, aggregate_id, aggregate_type,
                 payload, correlation_id, causation_id, version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(envelope.event_id)
        .bind(&envelope.event_type)
        .bind(envelope.aggregate_id)
        .bind(&envelope.aggregate_type)
        .bind(&envelope.payload)
        .bind(&envelope.correlation_id)
        .bind(&envelope.causation_id)
        .bind(envelope.version)
        .bind(envelope.timestamp)
        .execute(&mut **tx)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(map_version_fence(e)),
        }
    }

    async fn publish_after_commit(&self, envelope: &EventEnvelope) {
        // Коммит уже состоялся; при сбое публикации витрина догонит через
        // реплей хранилища событий.
        if let Err(e) = self.publisher.publish(envelope).await {
            warn!(
                event_id = %envelope.event_id,
                event_type = %envelope.event_type,
                aggregate_id = %envelope.aggregate_id,
                "failed to publish event after commit: {}", e
            );
        }
    }
}

// --- Валидация и вспомогательные функции ---

fn validate_open_command(cmd: &OpenBookingCommand) -> Result<()> {
    if cmd.user_id.trim().is_empty()
        || cmd.route_id.trim().is_empty()
        || cmd.schedule_id.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "userId, routeId and scheduleId are required".into(),
        ));
    }
    if cmd.passenger_name.trim().is_empty() || cmd.passenger_email.trim().is_empty() {
        return Err(AppError::BadRequest(
            "passengerName and passengerEmail are required".into(),
        ));
    }
    if cmd.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".into()));
    }
    if cmd.currency.len() != 3 || !cmd.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(
            "currency must be a three-letter code".into(),
        ));
    }
    if let Some(seat) = &cmd.seat_number {
        if seat.trim().is_empty() {
            return Err(AppError::BadRequest("seatNumber must not be blank".into()));
        }
    }
    Ok(())
}

fn validate_reservation_duration(minutes: Option<i64>) -> Result<i64> {
    let minutes = minutes.unwrap_or(DEFAULT_RESERVATION_MINUTES);
    if !(MIN_RESERVATION_MINUTES..=MAX_RESERVATION_MINUTES).contains(&minutes) {
        return Err(AppError::BadRequest(format!(
            "reservationDurationMinutes must be between {MIN_RESERVATION_MINUTES} and {MAX_RESERVATION_MINUTES}"
        )));
    }
    Ok(minutes)
}

fn invalid_state(current: BookingStatus, message: String) -> AppError {
    AppError::InvalidBookingState {
        current: current.as_str().to_string(),
        message,
    }
}

/// Нарушение уникальности `(aggregate_id, version)` - проигрыш гонки версий.
fn map_version_fence(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(
                "booking was modified concurrently, please retry".into(),
            );
        }
    }
    e.into()
}

fn opened_payload(booking: &Booking) -> TicketOpenedPayload {
    TicketOpenedPayload {
        booking_id: booking.id,
        user_id: booking.user_id.clone(),
        route_id: booking.route_id.clone(),
        schedule_id: booking.schedule_id.clone(),
        seat_number: booking.seat_number.clone(),
        passenger_name: booking.passenger_name.clone(),
        passenger_email: booking.passenger_email.clone(),
        price: booking.price,
        currency: booking.currency.clone(),
        expires_at: booking.expires_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_command() -> OpenBookingCommand {
        OpenBookingCommand {
            user_id: "U1".into(),
            route_id: "R1".into(),
            schedule_id: "S1".into(),
            seat_number: Some("A1".into()),
            passenger_name: "Aibek Karimov".into(),
            passenger_email: "aibek@example.kz".into(),
            passenger_phone: None,
            price: Decimal::new(2500, 2),
            currency: "USD".into(),
            correlation_id: None,
        }
    }

    #[test]
    fn valid_command_passes() {
        assert!(validate_open_command(&base_command()).is_ok());
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let mut cmd = base_command();
        cmd.price = Decimal::ZERO;
        assert!(matches!(
            validate_open_command(&cmd),
            Err(AppError::BadRequest(_))
        ));
        cmd.price = Decimal::new(-100, 2);
        assert!(matches!(
            validate_open_command(&cmd),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn bad_currency_is_rejected() {
        let mut cmd = base_command();
        cmd.currency = "US".into();
        assert!(validate_open_command(&cmd).is_err());
        cmd.currency = "123".into();
        assert!(validate_open_command(&cmd).is_err());
        cmd.currency = "EUR".into();
        assert!(validate_open_command(&cmd).is_ok());
    }

    #[test]
    fn missing_passenger_is_rejected() {
        let mut cmd = base_command();
        cmd.passenger_name = "  ".into();
        assert!(validate_open_command(&cmd).is_err());
    }

    #[test]
    fn reservation_duration_bounds() {
        assert_eq!(
            validate_reservation_duration(None).unwrap(),
            DEFAULT_RESERVATION_MINUTES
        );
        assert_eq!(validate_reservation_duration(Some(5)).unwrap(), 5);
        assert_eq!(validate_reservation_duration(Some(60)).unwrap(), 60);
        assert!(validate_reservation_duration(Some(4)).is_err());
        assert!(validate_reservation_duration(Some(61)).is_err());
        assert!(validate_reservation_duration(Some(0)).is_err());
    }
}
