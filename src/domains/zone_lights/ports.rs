use async_trait::async_trait;

use crate::common::ApplicationResult;

/// Port to the physical light controller.
/// Implementations must bound every call with a timeout.
#[async_trait]
pub trait ActuatorPort: Send + Sync {
    /// Drive `pin` high (`true`) or low (`false`).
    async fn set_pin(&self, pin: u8, state: bool) -> ApplicationResult<()>;
}
