use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use anyhow::{bail, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub locating: LocatingConfig,
    pub lights: LightsConfig,
    pub kafka: KafkaConfig,
    pub engine: EngineConfig,
    pub scheduler: SchedulerConfig,
    pub logging: LoggingConfig,
}

/// Real-time locating service (tag snapshot source).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatingConfig {
    /// Tag collection endpoint, e.g. `http://host:8080/sensmapserver/api/tags`.
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightsConfig {
    pub control_url: String,
    pub timeout_ms: u64,
    /// Pause between pins during the startup sweep.
    pub sweep_delay_ms: u64,
    /// Light zone to output pin assignments.
    pub zones: Vec<ZonePin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePin {
    pub zone: String,
    pub pin: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub client_id: String,
    pub message_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum movement (in position units) before a new position is accepted.
    pub fluctuation_threshold: f64,
    #[serde(default = "default_admit_new_tags")]
    pub admit_new_tags: bool,
    /// Polygons (lists of `[x, y]` corners) describing areas of poor signal.
    /// Loaded and reported at startup; no engine stage consumes them yet.
    #[serde(default)]
    pub bad_signal_areas: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub cycle_interval_ms: u64,
    pub publish_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Domain log file; console-only logging when absent.
    pub file: Option<String>,
}

fn default_admit_new_tags() -> bool {
    true
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the TOML file and apply `AWACS__SECTION__KEY` environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("AWACS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.engine.fluctuation_threshold >= 0.0) {
            bail!(
                "engine.fluctuation_threshold must be a non-negative number, got {}",
                self.engine.fluctuation_threshold
            );
        }
        if self.scheduler.cycle_interval_ms == 0 {
            bail!("scheduler.cycle_interval_ms must be greater than zero");
        }
        let mut seen = std::collections::BTreeSet::new();
        for z in &self.lights.zones {
            if !seen.insert(z.zone.as_str()) {
                bail!("lights.zones lists zone '{}' more than once", z.zone);
            }
        }
        if let Some(i) = self.engine.bad_signal_areas.iter().position(|area| area.is_empty()) {
            bail!("engine.bad_signal_areas[{}] has no corners", i);
        }
        Ok(())
    }
}

impl LocatingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LightsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn sweep_delay(&self) -> Duration {
        Duration::from_millis(self.sweep_delay_ms)
    }

    pub fn zone_pins(&self) -> BTreeMap<String, u8> {
        self.zones.iter().map(|z| (z.zone.clone(), z.pin)).collect()
    }
}

impl SchedulerConfig {
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn publish_delay(&self) -> Duration {
        Duration::from_millis(self.publish_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locating: LocatingConfig {
                base_url: "http://localhost:8080/sensmapserver/api/tags".to_string(),
                api_key: String::new(),
                timeout_ms: 1000,
            },
            lights: LightsConfig {
                control_url: "http://localhost:4000/gpio/control".to_string(),
                timeout_ms: 1000,
                sweep_delay_ms: 400,
                zones: [("LZ1", 2), ("LZ2", 3), ("LZ3", 14), ("LZ4", 4)]
                    .into_iter()
                    .map(|(zone, pin)| ZonePin { zone: zone.to_string(), pin })
                    .collect(),
            },
            kafka: KafkaConfig {
                brokers: vec!["localhost:9092".to_string()],
                client_id: "awacs-server".to_string(),
                message_timeout_ms: 1000,
            },
            engine: EngineConfig {
                fluctuation_threshold: 0.8,
                admit_new_tags: true,
                bad_signal_areas: vec![vec![[0.0, 21.0], [10.0, 30.0]]],
            },
            scheduler: SchedulerConfig {
                cycle_interval_ms: 150,
                publish_delay_ms: 50,
            },
            logging: LoggingConfig {
                file: Some("awacs-server.log".to_string()),
            },
        }
    }
}
