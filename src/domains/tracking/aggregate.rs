use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryFrom;

use super::snapshot::TagReading;

/// Identifier assigned to a tag by the locating service.
pub type TagId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position2D {
    pub x: f64,
    pub y: f64,
}

impl Position2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The sample that preceded the current one. Overwritten on every commit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub position: Option<Position2D>,
    pub timestamp: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagState {
    pub id: TagId,
    pub alias: String,
    pub position: Option<Position2D>,
    /// Seconds since the Unix epoch.
    pub timestamp: Option<f64>,
    pub history: History,
    /// km/h, one decimal.
    pub speed: f64,
    /// Degrees clockwise from the +y axis, `[0, 360)`.
    pub heading: Option<f64>,
    pub monitored_zones: BTreeSet<String>,
    pub light_zones: BTreeSet<String>,
    pub bad_signal_zones: BTreeSet<String>,
    pub vectors: Vec<RelativeVector>,
}

impl TagState {
    /// First sighting of a tag: kinematics start unknown, no vectors yet.
    pub fn from_reading(reading: TagReading) -> Self {
        Self {
            id: reading.id,
            alias: reading.alias,
            position: reading.position,
            timestamp: reading.timestamp,
            history: History::default(),
            speed: 0.0,
            heading: None,
            monitored_zones: reading.monitored_zones,
            light_zones: reading.light_zones,
            bad_signal_zones: reading.bad_signal_zones,
            vectors: Vec::new(),
        }
    }

    pub fn in_bad_signal_zone(&self) -> bool {
        !self.bad_signal_zones.is_empty()
    }
}

/// Relative bearing from a subject to another tag, or one of the sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Direction {
    /// Degrees clockwise from the subject's heading, `[0, 360)`.
    Bearing(u16),
    /// Subject heading unknown, or geometry on both sides untrusted.
    Unknown,
    /// Reserved; the other tag's bad signal is reported via `fuzzy` instead.
    OtherInBadSignal,
    /// Reserved; both tags in bad signal currently map to `Unknown`.
    BothInBadSignal,
}

impl From<Direction> for i32 {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bearing(deg) => i32::from(deg),
            Direction::Unknown => -1,
            Direction::OtherInBadSignal => -2,
            Direction::BothInBadSignal => -3,
        }
    }
}

impl TryFrom<i32> for Direction {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Unknown),
            -2 => Ok(Direction::OtherInBadSignal),
            -3 => Ok(Direction::BothInBadSignal),
            0..=359 => Ok(Direction::Bearing(value as u16)),
            other => Err(format!("direction {} out of range", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeVector {
    pub other: TagId,
    pub direction: Direction,
    /// `None` when either position is unknown.
    pub distance: Option<f64>,
    /// The other tag is inside a bad-signal zone.
    pub fuzzy: bool,
}

/// All tags ever seen, keyed and iterated by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagRegistry {
    tags: BTreeMap<TagId, TagState>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.tags.contains_key(&id)
    }

    pub fn get(&self, id: TagId) -> Option<&TagState> {
        self.tags.get(&id)
    }

    pub fn get_mut(&mut self, id: TagId) -> Option<&mut TagState> {
        self.tags.get_mut(&id)
    }

    /// Insert a tag unless its identifier is already registered.
    /// Returns `false` when the existing entry was kept.
    pub fn register(&mut self, tag: TagState) -> bool {
        if self.tags.contains_key(&tag.id) {
            return false;
        }
        self.tags.insert(tag.id, tag);
        true
    }

    pub fn ids(&self) -> impl Iterator<Item = TagId> + '_ {
        self.tags.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TagState> {
        self.tags.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TagState> {
        self.tags.values_mut()
    }
}
