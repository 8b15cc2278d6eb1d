use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::common::{ApplicationError, ApplicationResult};
use crate::config::LightsConfig;
use crate::domains::zone_lights::ActuatorPort;

#[derive(Debug, Serialize)]
struct PinCommand {
    pin: u8,
    state: bool,
}

/// HTTP client for the GPIO server that switches the warning lights.
pub struct HttpLightController {
    client: Client,
    control_url: String,
}

impl HttpLightController {
    pub fn new(config: &LightsConfig) -> ApplicationResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApplicationError::Actuator {
                pin: 0,
                reason: format!("HTTP client init failed: {}", e),
            })?;
        Ok(Self {
            client,
            control_url: config.control_url.clone(),
        })
    }
}

#[async_trait]
impl ActuatorPort for HttpLightController {
    async fn set_pin(&self, pin: u8, state: bool) -> ApplicationResult<()> {
        // .json() also sets Content-Type: application/json
        let response = self
            .client
            .post(&self.control_url)
            .json(&PinCommand { pin, state })
            .send()
            .await
            .map_err(|e| ApplicationError::Actuator {
                pin,
                reason: e.to_string(),
            })?;

        response.error_for_status().map_err(|e| ApplicationError::Actuator {
            pin,
            reason: e.to_string(),
        })?;
        tracing::debug!("Pin {} set to {}", pin, state);
        Ok(())
    }
}
