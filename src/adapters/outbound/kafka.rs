use crate::common::{ApplicationError, ApplicationResult};
use crate::config::KafkaConfig;
use crate::domains::telemetry::TelemetrySink;
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use std::time::Duration;

/// Telemetry sink publishing one record per tag to a Kafka topic named
/// after the tag identifier.
pub struct KafkaTelemetrySink {
    producer: FutureProducer,
    enqueue_timeout: Duration,
}

impl KafkaTelemetrySink {
    pub fn new(config: &KafkaConfig) -> Result<Self, String> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("client.id", &config.client_id)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .create()
            .map_err(|e| format!("Failed to create Kafka producer: {}", e))?;

        Ok(Self {
            producer,
            enqueue_timeout: Duration::from_millis(config.message_timeout_ms),
        })
    }
}

#[async_trait]
impl TelemetrySink for KafkaTelemetrySink {
    async fn publish(&self, topic: &str, payload: &[u8]) -> ApplicationResult<()> {
        let record = FutureRecord::to(topic).key(topic).payload(payload);

        self.producer
            .send(record, self.enqueue_timeout)
            .await
            .map_err(|(e, _)| ApplicationError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }
}

/// Log the broker setup; topics are created by the broker on first publish.
pub fn describe_kafka_setup(config: &KafkaConfig) {
    tracing::info!("Telemetry brokers: {:?}", config.brokers);
    tracing::warn!("Per-tag topics are not created here. Enable auto.create.topics.enable on the broker or create them up front.");
}
