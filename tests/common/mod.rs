#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use awacs_server::application::{Collaborators, Scheduler};
use awacs_server::common::{ApplicationError, ApplicationResult};
use awacs_server::domains::logger::{DomainLogger, DynLogger};
use awacs_server::domains::telemetry::{TelemetryPublisher, TelemetrySink};
use awacs_server::domains::tracking::{SnapshotSource, TagId, TagRecord, UpdateEngine};
use awacs_server::domains::zone_lights::{ActuatorPort, ZoneLightController};

/// Locating-service timestamp `secs` seconds after 2024-05-01 10:00:00.
pub fn at(secs: u32) -> String {
    format!("2024-05-01 10:{:02}:{:02}.000000", secs / 60, secs % 60)
}

pub fn record(id: TagId, x: f64, y: f64, secs: u32, zones: &[&str]) -> TagRecord {
    record_from(json!({
        "id": id.to_string(),
        "alias": format!("tag-{}", id),
        "datastreams": [
            {"id": "posX", "current_value": x.to_string(), "at": at(secs)},
            {"id": "posY", "current_value": y.to_string(), "at": at(secs)}
        ],
        "zones": zones.iter().map(|z| json!({"zone_name": z})).collect::<Vec<_>>()
    }))
}

pub fn record_from(value: Value) -> TagRecord {
    serde_json::from_value(value).unwrap()
}

/// Snapshot source replaying a queue of responses; an empty queue fails.
#[derive(Default)]
pub struct ScriptedSource {
    snapshots: Mutex<VecDeque<ApplicationResult<Vec<TagRecord>>>>,
    single: Mutex<HashMap<TagId, TagRecord>>,
    panic_on_empty: bool,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panicking_when_exhausted() -> Self {
        Self {
            panic_on_empty: true,
            ..Self::default()
        }
    }

    pub fn push(&self, records: Vec<TagRecord>) {
        self.snapshots.lock().unwrap().push_back(Ok(records));
    }

    pub fn push_failure(&self) {
        self.snapshots
            .lock()
            .unwrap()
            .push_back(Err(ApplicationError::Fetch("connection refused".to_string())));
    }

    pub fn set_single(&self, record: TagRecord, id: TagId) {
        self.single.lock().unwrap().insert(id, record);
    }
}

#[async_trait]
impl SnapshotSource for ScriptedSource {
    async fn fetch_all(&self) -> ApplicationResult<Vec<TagRecord>> {
        let next = self.snapshots.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None if self.panic_on_empty => panic!("scripted source exhausted"),
            None => Err(ApplicationError::Fetch("no snapshot scripted".to_string())),
        }
    }

    async fn fetch_tag(&self, id: TagId) -> ApplicationResult<TagRecord> {
        self.single
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| ApplicationError::Fetch(format!("tag {} not found", id)))
    }
}

#[derive(Default)]
pub struct RecordingActuator {
    pub calls: Mutex<Vec<(u8, bool)>>,
    failing_pins: HashSet<u8>,
}

impl RecordingActuator {
    pub fn failing(pins: &[u8]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_pins: pins.iter().copied().collect(),
        }
    }

    pub fn calls(&self) -> Vec<(u8, bool)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ActuatorPort for RecordingActuator {
    async fn set_pin(&self, pin: u8, state: bool) -> ApplicationResult<()> {
        self.calls.lock().unwrap().push((pin, state));
        if self.failing_pins.contains(&pin) {
            return Err(ApplicationError::Actuator {
                pin,
                reason: "503 Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub published: Mutex<Vec<(String, Value)>>,
    failing_topics: HashSet<String>,
}

impl RecordingSink {
    pub fn failing(topics: &[&str]) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failing_topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn published(&self) -> Vec<(String, Value)> {
        self.published.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<(String, Value)> {
        std::mem::take(&mut *self.published.lock().unwrap())
    }
}

#[async_trait]
impl TelemetrySink for RecordingSink {
    async fn publish(&self, topic: &str, payload: &[u8]) -> ApplicationResult<()> {
        if self.failing_topics.contains(topic) {
            return Err(ApplicationError::Publish {
                topic: topic.to_string(),
                reason: "broker unavailable".to_string(),
            });
        }
        let value: Value = serde_json::from_slice(payload).unwrap();
        self.published.lock().unwrap().push((topic.to_string(), value));
        Ok(())
    }
}

#[derive(Default)]
pub struct CaptureLogger {
    pub messages: Mutex<Vec<String>>,
}

impl CaptureLogger {
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().unwrap().iter().any(|m| m.contains(needle))
    }
}

impl DomainLogger for CaptureLogger {
    fn log(&self, level: log::Level, msg: &str) {
        self.messages.lock().unwrap().push(format!("{}:{}", level, msg));
    }
}

pub fn zone_pins() -> std::collections::BTreeMap<String, u8> {
    [("LZ1", 2u8), ("LZ2", 3), ("LZ3", 14), ("LZ4", 4)]
        .into_iter()
        .map(|(z, p)| (z.to_string(), p))
        .collect()
}

pub struct Harness {
    pub source: Arc<ScriptedSource>,
    pub actuator: Arc<RecordingActuator>,
    pub sink: Arc<RecordingSink>,
    pub logger: Arc<CaptureLogger>,
}

impl Harness {
    pub fn new(source: ScriptedSource) -> Self {
        Self {
            source: Arc::new(source),
            actuator: Arc::new(RecordingActuator::default()),
            sink: Arc::new(RecordingSink::default()),
            logger: Arc::new(CaptureLogger::default()),
        }
    }

    /// Scheduler with no delays, default threshold and the reference zone map.
    pub fn scheduler(&self) -> Scheduler {
        self.scheduler_with_sweep(Duration::ZERO)
    }

    pub fn scheduler_with_sweep(&self, sweep_delay: Duration) -> Scheduler {
        let logger: DynLogger = self.logger.clone();
        Scheduler::new(
            UpdateEngine::new(0.8, true),
            ZoneLightController::new(zone_pins(), sweep_delay),
            TelemetryPublisher::new(Duration::ZERO),
            Collaborators {
                source: self.source.clone(),
                actuator: self.actuator.clone(),
                sink: self.sink.clone(),
            },
            logger,
            Duration::from_millis(5),
        )
    }
}
