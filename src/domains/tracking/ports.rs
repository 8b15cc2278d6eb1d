use async_trait::async_trait;

use super::aggregate::TagId;
use super::snapshot::TagRecord;
use crate::common::ApplicationResult;

/// Port to the real-time locating service.
/// Implementations must bound every call with a timeout.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Latest state of every tag the service knows about.
    async fn fetch_all(&self) -> ApplicationResult<Vec<TagRecord>>;

    /// Latest state of a single tag.
    async fn fetch_tag(&self, id: TagId) -> ApplicationResult<TagRecord>;
}
