//! publisher.rs
//!
//! Публикация доменных событий в Kafka.
//!
//! Ключ сообщения - идентификатор бронирования: события одного агрегата
//! попадают в одну партицию и сохраняют порядок. Заголовки несут тип
//! события, correlation id и момент публикации.

use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::KafkaConfig;
use crate::events::EventEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("kafka error: {0}")]
    Kafka(#[from] KafkaError),
}

#[derive(Clone)]
pub struct EventPublisher {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl EventPublisher {
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set(
                "message.timeout.ms",
                (config.publish_timeout_seconds * 1000).to_string(),
            )
            .set("acks", "all")
            .create()?;

        info!(brokers = %config.brokers, topic = %config.ticket_events_topic, "Kafka producer created");

        Ok(EventPublisher {
            producer,
            topic: config.ticket_events_topic.clone(),
            timeout: Duration::from_secs(config.publish_timeout_seconds),
        })
    }

    pub async fn publish(&self, envelope: &EventEnvelope) -> Result<(), PublishError> {
        let payload = serde_json::to_vec(envelope)?;
        let key = envelope.aggregate_id.to_string();
        let timestamp = envelope.timestamp.to_rfc3339();

        let mut headers = OwnedHeaders::new()
            .insert(Header {
                key: "eventType",
                value: Some(envelope.event_type.as_str()),
            })
            .insert(Header {
                key: "timestamp",
                value: Some(timestamp.as_str()),
            });
        if let Some(correlation_id) = &envelope.correlation_id {
            headers = headers.insert(Header {
                key: "correlationId",
                value: Some(correlation_id.as_str()),
            });
        }

        let record = FutureRecord::to(&self.topic)
            .payload(&payload)
            .key(&key)
            .headers(headers);

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                debug!(
                    topic = %self.topic,
                    partition,
                    offset,
                    event_type = %envelope.event_type,
                    aggregate_id = %envelope.aggregate_id,
                    "event published"
                );
                Ok(())
            }
            Err((e, _)) => Err(PublishError::Kafka(e)),
        }
    }

    /// Публикация сырого сообщения (используется проектором для отправки
    /// отравленных сообщений в dead-letter топик).
    pub async fn publish_raw(
        &self,
        topic: &str,
        key: &str,
        payload: &[u8],
    ) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).payload(payload).key(key);
        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| ())
            .map_err(|(e, _)| PublishError::Kafka(e))
    }

    /// Дожидается доставки всего буферизованного при остановке процесса.
    pub fn flush(&self, timeout: Duration) {
        if let Err(e) = self.producer.flush(Timeout::After(timeout)) {
            tracing::warn!("failed to flush kafka producer: {}", e);
        }
    }
}
