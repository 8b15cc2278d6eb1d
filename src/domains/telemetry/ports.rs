use async_trait::async_trait;

use crate::common::ApplicationResult;

/// Port to the publish/subscribe broker.
/// Implementations must bound every call with a timeout.
#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> ApplicationResult<()>;
}
