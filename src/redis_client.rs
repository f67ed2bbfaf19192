use redis::{aio::MultiplexedConnection, Client, IntoConnectionInfo};
use std::time::Duration;

use crate::config::RedisConfig;

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(config: &RedisConfig) -> redis::RedisResult<Self> {
        let mut info = config.url.as_str().into_connection_info()?;
        if let Some(password) = &config.password {
            info.redis.password = Some(password.clone());
        }
        let client = Client::open(info)?;
        let timeout = Duration::from_secs(config.command_timeout_seconds);
        let conn = client
            .get_multiplexed_tokio_connection_with_response_timeouts(timeout, timeout)
            .await?;
        Ok(RedisClient { conn })
    }
}
