//! queries.rs
//!
//! Ядро запросов: обслуживание витрины билетов с кэшем.
//!
//! Чтение идет через Redis (read-through с записью при промахе); фильтр по
//! статусу кэш обходит, потому что комбинаций ключей стало бы слишком
//! много, а фильтрованные запросы редки.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{
    CacheService, SCHEDULE_AVAILABILITY_TTL, TICKET_PAGE_TTL, TICKET_TTL,
};
use crate::database::Database;
use crate::error::{AppError, Result};
use crate::models::{BookingStatus, ScheduleAvailability, TicketView};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPage {
    pub data: Vec<TicketView>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAvailabilityResponse {
    pub schedule_id: String,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub available_seats: i32,
}

impl From<ScheduleAvailability> for ScheduleAvailabilityResponse {
    fn from(row: ScheduleAvailability) -> Self {
        let available_seats = row.available_seats();
        ScheduleAvailabilityResponse {
            schedule_id: row.schedule_id,
            total_seats: row.total_seats,
            booked_seats: row.booked_seats,
            available_seats,
        }
    }
}

#[derive(Clone)]
pub struct TicketQueryService {
    db: Database,
    cache: CacheService,
}

impl TicketQueryService {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self { db, cache }
    }

    /// Список билетов пользователя, новые сверху.
    pub async fn list_user_tickets(
        &self,
        user_id: &str,
        status_filter: Option<&str>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<TicketPage> {
        let page = validate_page(page)?;
        let limit = clamp_limit(limit);
        let status = status_filter
            .map(|s| {
                BookingStatus::parse(s)
                    .ok_or_else(|| AppError::BadRequest(format!("unknown status filter: {s}")))
            })
            .transpose()?;

        // Кэшируются только нефильтрованные страницы.
        let cache_key = (status.is_none())
            .then(|| CacheService::user_tickets_key(user_id, page, limit));
        if let Some(key) = &cache_key {
            if let Some(cached) = self.cache.get_json::<TicketPage>(key).await {
                return Ok(cached);
            }
        }

        let offset = i64::from(page - 1) * i64::from(limit);
        let (total, data) = match status {
            Some(status) => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM user_tickets_view WHERE user_id = $1 AND status = $2",
                )
                .bind(user_id)
                .bind(status.as_str())
                .fetch_one(&self.db.read)
                .await?;
                let data: Vec<TicketView> = sqlx::query_as(
                    r#"
                    SELECT * FROM user_tickets_view
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(user_id)
                .bind(status.as_str())
                .bind(i64::from(limit))
                .bind(offset)
                .fetch_all(&self.db.read)
                .await?;
                (total, data)
            }
            None => {
                let total: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM user_tickets_view WHERE user_id = $1",
                )
                .bind(user_id)
                .fetch_one(&self.db.read)
                .await?;
                let data: Vec<TicketView> = sqlx::query_as(
                    r#"
                    SELECT * FROM user_tickets_view
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(user_id)
                .bind(i64::from(limit))
                .bind(offset)
                .fetch_all(&self.db.read)
                .await?;
                (total, data)
            }
        };

        let result = TicketPage {
            data,
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        };

        if let Some(key) = &cache_key {
            self.cache.set_json(key, &result, TICKET_PAGE_TTL).await;
        }
        Ok(result)
    }

    /// Детали билета. Владение проверяется и на закэшированном снимке.
    pub async fn get_ticket_details(
        &self,
        booking_id: Uuid,
        user_id: &str,
    ) -> Result<TicketView> {
        let key = CacheService::ticket_key(booking_id);
        if let Some(cached) = self.cache.get_json::<TicketView>(&key).await {
            if cached.user_id != user_id {
                return Err(AppError::Forbidden("ticket belongs to another user".into()));
            }
            return Ok(cached);
        }

        let ticket: Option<TicketView> =
            sqlx::query_as("SELECT * FROM user_tickets_view WHERE id = $1")
                .bind(booking_id)
                .fetch_optional(&self.db.read)
                .await?;
        let ticket =
            ticket.ok_or_else(|| AppError::NotFound(format!("ticket {booking_id} not found")))?;

        if ticket.user_id != user_id {
            return Err(AppError::Forbidden("ticket belongs to another user".into()));
        }

        self.cache.set_json(&key, &ticket, TICKET_TTL).await;
        Ok(ticket)
    }

    /// Счетчик доступности мест по рейсу.
    pub async fn get_schedule_availability(
        &self,
        schedule_id: &str,
    ) -> Result<ScheduleAvailabilityResponse> {
        let key = CacheService::schedule_key(schedule_id);
        if let Some(cached) = self.cache.get_json::<ScheduleAvailability>(&key).await {
            return Ok(cached.into());
        }

        let row: Option<ScheduleAvailability> = sqlx::query_as(
            "SELECT schedule_id, total_seats, booked_seats FROM schedule_availability_view WHERE schedule_id = $1",
        )
        .bind(schedule_id)
        .fetch_optional(&self.db.read)
        .await?;
        let row = row.ok_or_else(|| {
            AppError::NotFound(format!("schedule {schedule_id} has no availability data"))
        })?;

        self.cache
            .set_json(&key, &row, SCHEDULE_AVAILABILITY_TTL)
            .await;
        Ok(row.into())
    }
}

pub fn validate_page(page: Option<u32>) -> Result<u32> {
    let page = page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        return Err(AppError::BadRequest("page must be >= 1".into()));
    }
    Ok(page)
}

pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub fn total_pages(total: i64, limit: u32) -> i64 {
    if total == 0 {
        0
    } else {
        (total + i64::from(limit) - 1) / i64::from(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_validation() {
        assert_eq!(validate_page(None).unwrap(), 1);
        assert_eq!(validate_page(Some(3)).unwrap(), 3);
        assert!(validate_page(Some(0)).is_err());
    }

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None), 10);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(100)), 100);
        assert_eq!(clamp_limit(Some(250)), 100);
    }

    #[test]
    fn total_pages_is_ceiling() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(101, 100), 2);
    }
}
