pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod events;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod services;

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub redis: redis_client::RedisClient,
    pub cache: cache::CacheService,
    pub config: config::Config,
    pub commands: services::booking_commands::BookingCommandService,
    pub queries: services::queries::TicketQueryService,
}
