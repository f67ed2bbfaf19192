//! enrichment.rs
//!
//! Клиент обогащения витрины билетов отображаемыми полями: сервис
//! маршрутов отдает название и остановки, сервис расписаний - время
//! отправления и прибытия.
//!
//! Все сетевые вызовы защищены паттерном "Автоматический выключатель":
//! после серии сбоев запросы к внешним сервисам временно прекращаются,
//! проектор продолжает работать без обогащения.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{CircuitBreakerConfig, ExternalServicesConfig};

/// Состояния "Автоматического выключателя" (Circuit Breaker).
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitState {
    /// Нормальный режим, запросы разрешены.
    Closed,
    /// Режим блокировки после множественных сбоев.
    Open,
    /// Тестовый режим: после таймаута разрешается один пробный запрос.
    HalfOpen,
}

pub struct CircuitBreaker {
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    /// Секунды от момента создания выключателя до последнего сбоя.
    last_failure_at: AtomicU64,
    started: Instant,
    failure_threshold: u32,
    timeout_duration: Duration,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, timeout_seconds: u64) -> Self {
        Self {
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            last_failure_at: AtomicU64::new(0),
            started: Instant::now(),
            failure_threshold,
            timeout_duration: Duration::from_secs(timeout_seconds),
        }
    }

    /// Проверяет, можно ли выполнить следующий запрос.
    pub fn can_execute(&self) -> bool {
        let state = self.state.read().unwrap();
        match *state {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let now = self.started.elapsed().as_secs();
                let last_failure = self.last_failure_at.load(Ordering::Relaxed);
                if now.saturating_sub(last_failure) >= self.timeout_duration.as_secs() {
                    drop(state); // Освобождаем блокировку чтения перед записью.
                    *self.state.write().unwrap() = CircuitState::HalfOpen;
                    info!("circuit breaker transitioning to HalfOpen state");
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => true,
        }
    }

    pub fn record_success(&self) {
        let mut state = self.state.write().unwrap();
        match *state {
            CircuitState::HalfOpen => {
                *state = CircuitState::Closed;
                self.failure_count.store(0, Ordering::Relaxed);
                info!("circuit breaker recovered - transitioning to Closed state");
            }
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Relaxed);
            }
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let failure_count = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.last_failure_at
            .store(self.started.elapsed().as_secs(), Ordering::Relaxed);

        let mut state = self.state.write().unwrap();
        match *state {
            CircuitState::Closed => {
                if failure_count >= self.failure_threshold {
                    *state = CircuitState::Open;
                    warn!(
                        "circuit breaker OPENED - {} failures reached threshold {}",
                        failure_count, self.failure_threshold
                    );
                }
            }
            CircuitState::HalfOpen => {
                *state = CircuitState::Open;
                warn!("circuit breaker test failed - returning to Open state");
            }
            CircuitState::Open => {}
        }
    }

    pub fn get_state(&self) -> CircuitState {
        self.state.read().unwrap().clone()
    }
}

/// Отображаемые поля, собранные из двух внешних сервисов.
#[derive(Debug, Clone)]
pub struct RouteDisplay {
    pub route_name: Option<String>,
    pub departure_time: Option<DateTime<Utc>>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub origin_stop: Option<String>,
    pub destination_stop: Option<String>,
}

// Ответ сервиса маршрутов.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RouteInfo {
    route_name: Option<String>,
    origin_stop: Option<String>,
    destination_stop: Option<String>,
}

// Ответ сервиса расписаний.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleTimes {
    departure_time: Option<DateTime<Utc>>,
    arrival_time: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct EnrichmentClient {
    http: Client,
    route_service_url: String,
    schedule_service_url: String,
    breaker: Arc<CircuitBreaker>,
}

impl EnrichmentClient {
    pub fn new(external: &ExternalServicesConfig, breaker_config: &CircuitBreakerConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            http,
            route_service_url: external.route_service_url.clone(),
            schedule_service_url: external.schedule_service_url.clone(),
            breaker: Arc::new(CircuitBreaker::new(
                breaker_config.failure_threshold,
                breaker_config.timeout_seconds,
            )),
        }
    }

    #[cfg(test)]
    fn with_base_url(base_url: String, breaker_config: &CircuitBreakerConfig) -> Self {
        Self {
            http: Client::new(),
            route_service_url: base_url.clone(),
            schedule_service_url: base_url,
            breaker: Arc::new(CircuitBreaker::new(
                breaker_config.failure_threshold,
                breaker_config.timeout_seconds,
            )),
        }
    }

    /// Собирает отображаемые поля из сервиса маршрутов и сервиса
    /// расписаний. Частичный результат допустим; None - когда не ответил
    /// ни один из сервисов или выключатель разомкнут.
    pub async fn fetch_route_display(
        &self,
        route_id: &str,
        schedule_id: &str,
    ) -> Option<RouteDisplay> {
        if !self.breaker.can_execute() {
            debug!("enrichment skipped: circuit breaker is open");
            return None;
        }

        let route_url = format!("{}/routes/{}/display", self.route_service_url, route_id);
        let times_url = format!("{}/schedules/{}/times", self.schedule_service_url, schedule_id);

        let route: Option<RouteInfo> = self.get_json(&route_url).await;
        let times: Option<ScheduleTimes> = self.get_json(&times_url).await;

        if route.is_none() && times.is_none() {
            return None;
        }

        let route = route.unwrap_or(RouteInfo {
            route_name: None,
            origin_stop: None,
            destination_stop: None,
        });
        let times = times.unwrap_or(ScheduleTimes {
            departure_time: None,
            arrival_time: None,
        });

        Some(RouteDisplay {
            route_name: route.route_name,
            departure_time: times.departure_time,
            arrival_time: times.arrival_time,
            origin_stop: route.origin_stop,
            destination_stop: route.destination_stop,
        })
    }

    // Один сетевой вызов - одна выборка для выключателя.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Option<T> {
        match self.http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<T>().await {
                Ok(value) => {
                    self.breaker.record_success();
                    Some(value)
                }
                Err(e) => {
                    self.breaker.record_failure();
                    warn!("enrichment: malformed response from {}: {}", url, e);
                    None
                }
            },
            Ok(resp) => {
                self.breaker.record_failure();
                warn!("enrichment: {} returned {}", url, resp.status());
                None
            }
            Err(e) => {
                self.breaker.record_failure();
                warn!("enrichment: request to {} failed: {}", url, e);
                None
            }
        }
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.get_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn breaker_config(threshold: u32) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: threshold,
            timeout_seconds: 60,
        }
    }

    #[test]
    fn breaker_opens_after_threshold() {
        let breaker = CircuitBreaker::new(3, 60);
        assert!(breaker.can_execute());
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Open);
        assert!(!breaker.can_execute());
    }

    #[test]
    fn success_resets_failure_count() {
        let breaker = CircuitBreaker::new(2, 60);
        breaker.record_failure();
        breaker.record_success();
        breaker.record_failure();
        assert_eq!(breaker.get_state(), CircuitState::Closed);
    }

    #[tokio::test]
    async fn merges_route_and_schedule_responses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/routes/R1/display"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "routeName": "Алматы - Астана",
                "originStop": "Sayran",
                "destinationStop": "Saryarka"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/schedules/S1/times"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "departureTime": "2026-08-01T06:30:00Z",
                "arrivalTime": "2026-08-01T21:10:00Z"
            })))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_base_url(server.uri(), &breaker_config(5));
        let display = client.fetch_route_display("R1", "S1").await.unwrap();
        assert_eq!(display.route_name.as_deref(), Some("Алматы - Астана"));
        assert_eq!(display.origin_stop.as_deref(), Some("Sayran"));
        assert!(display.departure_time.is_some());
        assert!(display.arrival_time.is_some());
    }

    #[tokio::test]
    async fn partial_failure_still_enriches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/routes/R1/display"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "routeName": "Алматы - Астана"
            })))
            .mount(&server)
            .await;
        // Сервис расписаний лежит; поля времени остаются пустыми.
        Mock::given(method("GET"))
            .and(path("/schedules/S1/times"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = EnrichmentClient::with_base_url(server.uri(), &breaker_config(5));
        let display = client.fetch_route_display("R1", "S1").await.unwrap();
        assert_eq!(display.route_name.as_deref(), Some("Алматы - Астана"));
        assert!(display.departure_time.is_none());
    }

    #[tokio::test]
    async fn repeated_failures_open_the_breaker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        // Порог 2: один вызов обогащения делает два сетевых запроса,
        // обоих сбоев хватает для размыкания.
        let client = EnrichmentClient::with_base_url(server.uri(), &breaker_config(2));
        assert!(client.fetch_route_display("R1", "S1").await.is_none());
        assert_eq!(client.breaker_state(), CircuitState::Open);
        // Выключатель разомкнут: запрос даже не уходит в сеть.
        assert!(client.fetch_route_display("R1", "S1").await.is_none());
    }
}
