//! cache.rs
//!
//! Кэш стороны чтения поверх Redis.
//!
//! Все операции best-effort: недоступный Redis никогда не является ошибкой
//! для вызывающего, запрос просто уходит в базу чтения. Значения хранятся
//! JSON-снимками.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::redis_client::RedisClient;

// TTL в секундах
pub const TICKET_PAGE_TTL: u64 = 60;
pub const TICKET_TTL: u64 = 300;
pub const SCHEDULE_AVAILABILITY_TTL: u64 = 60;

#[derive(Clone)]
pub struct CacheService {
    redis: RedisClient,
}

impl CacheService {
    pub fn new(redis: RedisClient) -> Self {
        Self { redis }
    }

    // === Ключи ===

    pub fn user_tickets_key(user_id: &str, page: u32, limit: u32) -> String {
        format!("user:{user_id}:tickets:page:{page}:limit:{limit}")
    }

    pub fn ticket_key(booking_id: Uuid) -> String {
        format!("ticket:{booking_id}")
    }

    pub fn schedule_key(schedule_id: &str) -> String {
        format!("schedule:{schedule_id}:availability")
    }

    // === Чтение/запись снимков ===

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.redis.conn.clone();
        let data: Option<String> = conn.get(key).await.ok().flatten();
        data.and_then(|s| serde_json::from_str(&s).ok())
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: u64) {
        let Ok(data) = serde_json::to_string(value) else {
            return;
        };
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.set_ex(key, data, ttl_seconds).await;
    }

    // === Инвалидация ===

    pub async fn invalidate_ticket(&self, booking_id: Uuid) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del(Self::ticket_key(booking_id)).await;
        debug!("invalidated ticket cache for {}", booking_id);
    }

    /// Удаляет все закэшированные страницы списка билетов пользователя.
    pub async fn invalidate_user_pages(&self, user_id: &str) {
        let mut conn = self.redis.conn.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("user:{user_id}:tickets:*"))
            .query_async(&mut conn)
            .await
            .unwrap_or_default();

        if keys.is_empty() {
            return;
        }
        let mut pipe = redis::pipe();
        for key in &keys {
            pipe.del(key);
        }
        let _: Result<(), _> = pipe.query_async(&mut conn).await;
        debug!("invalidated {} ticket pages for user {}", keys.len(), user_id);
    }

    pub async fn invalidate_schedule(&self, schedule_id: &str) {
        let mut conn = self.redis.conn.clone();
        let _: Result<(), _> = conn.del(Self::schedule_key(schedule_id)).await;
    }

    /// PING для readiness-проверки.
    pub async fn ping(&self) -> bool {
        let mut conn = self.redis.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_match_contract() {
        let id = Uuid::nil();
        assert_eq!(
            CacheService::user_tickets_key("U1", 2, 10),
            "user:U1:tickets:page:2:limit:10"
        );
        assert_eq!(
            CacheService::ticket_key(id),
            format!("ticket:{id}")
        );
        assert_eq!(
            CacheService::schedule_key("S1"),
            "schedule:S1:availability"
        );
    }
}
