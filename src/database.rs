use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::config::DatabaseConfig;

// Два пула: сторона записи (bookings, booking_events, seat_availability)
// и сторона чтения (user_tickets_view, schedule_availability_view).
#[derive(Clone)]
pub struct Database {
    pub write: PgPool,
    pub read: PgPool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let write = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.statement_timeout_seconds))
            .idle_timeout(Duration::from_secs(300))
            .connect(&config.write_url)
            .await?;

        let read = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.statement_timeout_seconds))
            .idle_timeout(Duration::from_secs(300))
            .connect(&config.read_url)
            .await?;

        Ok(Database { write, read })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/migrations/write")
            .run(&self.write)
            .await?;
        sqlx::migrate!("./src/migrations/read")
            .run(&self.read)
            .await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.write.close().await;
        self.read.close().await;
    }
}
