use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::ports::ActuatorPort;
use crate::domains::logger::DomainLogger;
use crate::domains::tracking::TagRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightState {
    /// Zone clear; the light signals normal operation.
    On,
    /// Zone occupied by at least one tag.
    Off,
}

impl LightState {
    pub fn as_pin_level(self) -> bool {
        matches!(self, LightState::On)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneCommand {
    pub zone: String,
    pub pin: u8,
    pub state: LightState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LightsReport {
    pub sent: usize,
    pub failed: Vec<(u8, String)>,
}

impl LightsReport {
    pub fn all_sent(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Maps light-zone occupancy to warning light states.
#[derive(Debug, Clone)]
pub struct ZoneLightController {
    zone_pins: BTreeMap<String, u8>,
    sweep_delay: Duration,
}

impl ZoneLightController {
    pub fn new(zone_pins: BTreeMap<String, u8>, sweep_delay: Duration) -> Self {
        Self {
            zone_pins,
            sweep_delay,
        }
    }

    pub fn zone_pins(&self) -> &BTreeMap<String, u8> {
        &self.zone_pins
    }

    /// Recomputed from scratch every cycle: a zone's light is ON unless some
    /// tag currently reports being inside that light zone.
    pub fn compute_zone_states(&self, registry: &TagRegistry) -> Vec<ZoneCommand> {
        let penetrated: BTreeSet<&str> = registry
            .iter()
            .flat_map(|tag| tag.light_zones.iter().map(String::as_str))
            .collect();

        self.zone_pins
            .iter()
            .map(|(zone, &pin)| ZoneCommand {
                zone: zone.clone(),
                pin,
                state: if penetrated.contains(zone.as_str()) {
                    LightState::Off
                } else {
                    LightState::On
                },
            })
            .collect()
    }

    /// Send every command; a failed pin is logged and the rest still go out.
    pub async fn apply(
        &self,
        commands: &[ZoneCommand],
        actuator: &dyn ActuatorPort,
        logger: &dyn DomainLogger,
    ) -> LightsReport {
        let mut report = LightsReport::default();
        for command in commands {
            match actuator.set_pin(command.pin, command.state.as_pin_level()).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    logger.error(&format!(
                        "Light for zone {} (pin {}) not updated: {}",
                        command.zone, command.pin, e
                    ));
                    report.failed.push((command.pin, e.to_string()));
                }
            }
        }
        report
    }

    /// Startup sweep: every light off, then every light on.
    pub async fn self_test(&self, actuator: &dyn ActuatorPort, logger: &dyn DomainLogger) -> LightsReport {
        logger.info(&format!("Light self-test over {} zones", self.zone_pins.len()));
        let mut report = self.set_all(LightState::Off, actuator, logger).await;
        let on = self.set_all(LightState::On, actuator, logger).await;
        report.sent += on.sent;
        report.failed.extend(on.failed);
        report
    }

    /// Every light ON, the state that is safe to leave behind on exit.
    pub async fn drive_safe_state(&self, actuator: &dyn ActuatorPort, logger: &dyn DomainLogger) -> LightsReport {
        self.set_all(LightState::On, actuator, logger).await
    }

    async fn set_all(
        &self,
        state: LightState,
        actuator: &dyn ActuatorPort,
        logger: &dyn DomainLogger,
    ) -> LightsReport {
        let mut report = LightsReport::default();
        for (i, (zone, &pin)) in self.zone_pins.iter().enumerate() {
            if i > 0 && !self.sweep_delay.is_zero() {
                tokio::time::sleep(self.sweep_delay).await;
            }
            let command = ZoneCommand {
                zone: zone.clone(),
                pin,
                state,
            };
            let single = self.apply(std::slice::from_ref(&command), actuator, logger).await;
            report.sent += single.sent;
            report.failed.extend(single.failed);
        }
        report
    }
}
