use std::time::Duration;

use super::message::{encode, topic_for};
use super::ports::TelemetrySink;
use crate::domains::logger::DomainLogger;
use crate::domains::tracking::{TagId, TagRegistry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub published: usize,
    pub failed: Vec<TagId>,
}

/// Best-effort, at-most-once publication of every tag once per cycle.
#[derive(Debug, Clone)]
pub struct TelemetryPublisher {
    delay: Duration,
}

impl TelemetryPublisher {
    /// `delay` is the pause between two consecutive publishes.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub async fn publish(
        &self,
        registry: &TagRegistry,
        sink: &dyn TelemetrySink,
        logger: &dyn DomainLogger,
    ) -> PublishReport {
        let mut report = PublishReport::default();
        for (i, tag) in registry.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let topic = topic_for(tag.id);
            let result = match encode(tag) {
                Ok(payload) => sink.publish(&topic, &payload).await,
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(()) => report.published += 1,
                Err(e) => {
                    logger.error(&format!("Failed to publish to topic '{}': {}", topic, e));
                    report.failed.push(tag.id);
                }
            }
        }
        report
    }
}
