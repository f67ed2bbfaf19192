//! sweeper.rs
//!
//! Фоновая задача, переводящая просроченные резервы в EXPIRED.
//!
//! Работает один логический экземпляр на процесс; при нескольких репликах
//! корректность сохраняется за счет строковых блокировок в командном ядре
//! (двойного истечения не будет), лишние реплики просто делают пустую
//! работу.

use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::SweeperConfig;
use crate::database::Database;
use crate::services::booking_commands::BookingCommandService;

pub struct ExpirySweeper {
    db: Database,
    commands: BookingCommandService,
    config: SweeperConfig,
}

impl ExpirySweeper {
    pub fn new(db: Database, commands: BookingCommandService, config: SweeperConfig) -> Self {
        Self { db, commands, config }
    }

    pub async fn run(self) {
        info!(
            interval_seconds = self.config.interval_seconds,
            "expiry sweeper started"
        );
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.interval_seconds));
        // Первый tick срабатывает сразу; пропускаем его, чтобы не сканировать
        // на старте, пока пул только прогревается.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.sweep_once().await;
        }
    }

    /// Один проход: выбираем кандидатов без блокировок, затем каждый резерв
    /// истекает в собственной короткой транзакции командного ядра.
    pub async fn sweep_once(&self) -> usize {
        let candidates: Vec<Uuid> = match sqlx::query_scalar(
            r#"
            SELECT id FROM bookings
            WHERE status = 'RESERVED' AND expires_at < NOW()
            ORDER BY expires_at
            LIMIT $1
            "#,
        )
        .bind(self.config.batch_size)
        .fetch_all(&self.db.write)
        .await
        {
            Ok(ids) => ids,
            Err(e) => {
                error!("sweeper: failed to scan expired reservations: {}", e);
                return 0;
            }
        };

        if candidates.is_empty() {
            debug!("sweeper: no expired reservations");
            return 0;
        }

        info!("sweeper: found {} expired reservations", candidates.len());

        let mut expired = 0usize;
        for booking_id in candidates {
            match self.commands.expire(booking_id).await {
                Ok(Some(_)) => {
                    expired += 1;
                    info!(booking_id = %booking_id, "reservation expired");
                }
                // Конкурирующий confirm взял блокировку раньше нас.
                Ok(None) => debug!(booking_id = %booking_id, "reservation no longer expirable"),
                Err(e) => error!(booking_id = %booking_id, "failed to expire reservation: {}", e),
            }
        }
        expired
    }
}
