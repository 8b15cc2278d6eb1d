use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

use super::aggregate::{Position2D, TagId};
use crate::common::{DomainError, DomainResult};

const STREAM_POS_X: &str = "posX";
const STREAM_POS_Y: &str = "posY";
const STREAM_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const MONITORED_PREFIX: char = 'M';
const LIGHT_PREFIX: char = 'L';
const BAD_SIGNAL_PREFIX: char = 'B';

/// Body of the locating service's tag collection endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagsResponse {
    /// A malformed entry decodes to an unkeyable record, rejected later
    /// on its own.
    #[serde(default, deserialize_with = "lenient_items")]
    pub results: Vec<TagRecord>,
}

/// One tag as reported by the locating service. Every field may be absent,
/// `null` or of an unexpected type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagRecord {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub alias: Value,
    #[serde(default, deserialize_with = "lenient_items")]
    pub datastreams: Vec<DataStream>,
    #[serde(default, deserialize_with = "lenient_items")]
    pub zones: Vec<ZoneMembership>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataStream {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default)]
    pub current_value: Value,
    #[serde(default)]
    pub at: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneMembership {
    #[serde(default, deserialize_with = "lenient")]
    pub zone_name: String,
}

/// Decode `T`, falling back to its default when the value is `null` or
/// has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Lenient list: a non-list becomes empty and each malformed item becomes
/// its default.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let values: Vec<Value> = lenient(deserializer)?;
    Ok(values
        .into_iter()
        .map(|value| serde_json::from_value(value).unwrap_or_default())
        .collect())
}

/// Typed view of a `TagRecord` after field extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct TagReading {
    pub id: TagId,
    pub alias: String,
    pub position: Option<Position2D>,
    pub timestamp: Option<f64>,
    pub monitored_zones: BTreeSet<String>,
    pub light_zones: BTreeSet<String>,
    pub bad_signal_zones: BTreeSet<String>,
}

impl TagReading {
    /// Extract the typed reading. Only an unusable identifier is an error;
    /// every other missing or malformed field degrades to unknown/empty.
    pub fn from_record(record: &TagRecord) -> DomainResult<Self> {
        let id = parse_id(&record.id)?;
        let position = match (
            stream_value(record, STREAM_POS_X),
            stream_value(record, STREAM_POS_Y),
        ) {
            (Some(x), Some(y)) => Some(Position2D::new(x, y)),
            _ => None,
        };

        Ok(Self {
            id,
            alias: text(&record.alias).unwrap_or_default(),
            position,
            timestamp: latest_position_time(record),
            monitored_zones: zones_with_prefix(record, MONITORED_PREFIX),
            light_zones: zones_with_prefix(record, LIGHT_PREFIX),
            bad_signal_zones: zones_with_prefix(record, BAD_SIGNAL_PREFIX),
        })
    }
}

fn parse_id(value: &Value) -> DomainResult<TagId> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<TagId>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| DomainError::InvalidRecord {
        reason: format!("tag id {} is not a non-negative integer", value),
    })
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn stream_value(record: &TagRecord, stream_id: &str) -> Option<f64> {
    let stream = record.datastreams.iter().find(|s| s.id == stream_id)?;
    let value = match &stream.current_value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

/// Latest sample time across the position streams, in epoch seconds (UTC).
fn latest_position_time(record: &TagRecord) -> Option<f64> {
    record
        .datastreams
        .iter()
        .filter(|s| s.id == STREAM_POS_X || s.id == STREAM_POS_Y)
        .filter_map(|s| s.at.as_str())
        .filter_map(parse_stream_time)
        .fold(None, |latest: Option<f64>, t| Some(latest.map_or(t, |l| l.max(t))))
}

pub fn parse_stream_time(raw: &str) -> Option<f64> {
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), STREAM_TIME_FORMAT).ok()?;
    let utc = parsed.and_utc();
    Some(utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_micros()) / 1_000_000.0)
}

fn zones_with_prefix(record: &TagRecord, prefix: char) -> BTreeSet<String> {
    record
        .zones
        .iter()
        .filter(|z| z.zone_name.starts_with(prefix))
        .map(|z| z.zone_name.clone())
        .collect()
}
