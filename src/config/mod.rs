use serde::Deserialize;
use std::env;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub kafka: KafkaConfig,
    pub jwt: JwtConfig,
    pub external: ExternalServicesConfig,
    pub circuit_breaker: CircuitBreakerConfig,
    pub sweeper: SweeperConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Настройки баз данных: отдельные подключения для стороны записи и стороны чтения
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub write_url: String,
    pub read_url: String,
    pub pool_size: u32,
    pub statement_timeout_seconds: u64,
}

// Настройки Redis
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub password: Option<String>,
    pub command_timeout_seconds: u64,
}

// Настройки Kafka
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    pub client_id: String,
    pub ticket_events_topic: String,
    pub dead_letter_topic: String,
    pub consumer_group_id: String,
    pub publish_timeout_seconds: u64,
    pub max_apply_attempts: u32,
}

// Настройки JWT
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
}

// Настройки внешних сервисов
#[derive(Debug, Clone, Deserialize)]
pub struct ExternalServicesConfig {
    pub route_service_url: String,
    pub schedule_service_url: String,
}

// Настройки Circuit Breaker для клиента обогащения витрины билетов
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout_seconds: u64,
}

// Настройки фоновой задачи, снимающей просроченные резервы
#[derive(Debug, Clone, Deserialize)]
pub struct SweeperConfig {
    pub interval_seconds: u64,
    pub batch_size: i64,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "ticketing_service=debug,tower_http=debug".to_string()),
            },
            database: DatabaseConfig {
                write_url: env::var("WRITE_DATABASE_URL").expect("WRITE_DATABASE_URL must be set"),
                read_url: env::var("READ_DATABASE_URL").expect("READ_DATABASE_URL must be set"),
                pool_size: env::var("DB_POOL_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .expect("DB_POOL_SIZE must be a valid number"),
                statement_timeout_seconds: env::var("DB_STATEMENT_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .expect("DB_STATEMENT_TIMEOUT_SECONDS must be a valid number"),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").expect("REDIS_URL must be set"),
                password: env::var("REDIS_PASSWORD").ok(),
                command_timeout_seconds: env::var("REDIS_COMMAND_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("REDIS_COMMAND_TIMEOUT_SECONDS must be a valid number"),
            },
            kafka: KafkaConfig {
                brokers: env::var("KAFKA_BROKERS").expect("KAFKA_BROKERS must be set"),
                client_id: env::var("KAFKA_CLIENT_ID")
                    .unwrap_or_else(|_| "ticketing-service".to_string()),
                ticket_events_topic: env::var("KAFKA_TICKET_EVENTS_TOPIC")
                    .unwrap_or_else(|_| "ticket-events".to_string()),
                dead_letter_topic: env::var("KAFKA_DEAD_LETTER_TOPIC")
                    .unwrap_or_else(|_| "ticket-events-dlq".to_string()),
                consumer_group_id: env::var("KAFKA_CONSUMER_GROUP_ID")
                    .unwrap_or_else(|_| "ticketing-projector".to_string()),
                publish_timeout_seconds: env::var("KAFKA_PUBLISH_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("KAFKA_PUBLISH_TIMEOUT_SECONDS must be a valid number"),
                max_apply_attempts: env::var("PROJECTOR_MAX_APPLY_ATTEMPTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("PROJECTOR_MAX_APPLY_ATTEMPTS must be a valid number"),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "scmtp-auth".to_string()),
            },
            external: ExternalServicesConfig {
                route_service_url: env::var("EXTERNAL_ROUTE_SERVICE_URL")
                    .unwrap_or_else(|_| "http://route-service:8000/api".to_string()),
                schedule_service_url: env::var("EXTERNAL_SCHEDULE_SERVICE_URL")
                    .unwrap_or_else(|_| "http://schedule-service:8000/api".to_string()),
            },
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: env::var("CIRCUIT_BREAKER_FAILURE_THRESHOLD")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_FAILURE_THRESHOLD must be a valid number"),
                timeout_seconds: env::var("CIRCUIT_BREAKER_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("CIRCUIT_BREAKER_TIMEOUT_SECONDS must be a valid number"),
            },
            sweeper: SweeperConfig {
                interval_seconds: env::var("SWEEPER_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .expect("SWEEPER_INTERVAL_SECONDS must be a valid number"),
                batch_size: env::var("SWEEPER_BATCH_SIZE")
                    .unwrap_or_else(|_| "100".to_string())
                    .parse()
                    .expect("SWEEPER_BATCH_SIZE must be a valid number"),
            },
        }
    }
}
