use serde::Serialize;
use std::collections::BTreeSet;

use crate::common::DomainResult;
use crate::domains::tracking::{Direction, Position2D, RelativeVector, TagId, TagState};

/// Wire form of a tag's state as consumed by the vehicle clients.
#[derive(Debug, Serialize)]
pub struct TelemetryMessage<'a> {
    pub id: TagId,
    pub aka: &'a str,
    pub pos: Option<[f64; 2]>,
    pub tms: Option<f64>,
    pub his: HistoryMessage,
    pub spd: f64,
    pub hdg: Option<f64>,
    pub mvz: &'a BTreeSet<String>,
    pub liz: &'a BTreeSet<String>,
    pub bsz: &'a BTreeSet<String>,
    pub vct: Vec<VectorMessage>,
}

#[derive(Debug, Serialize)]
pub struct HistoryMessage {
    pub pos: Option<[f64; 2]>,
    pub tms: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct VectorMessage {
    pub id: TagId,
    pub d: Direction,
    pub r: Option<f64>,
    pub f: bool,
}

fn pair(position: Option<Position2D>) -> Option<[f64; 2]> {
    position.map(|p| [p.x, p.y])
}

impl<'a> From<&'a TagState> for TelemetryMessage<'a> {
    fn from(tag: &'a TagState) -> Self {
        Self {
            id: tag.id,
            aka: &tag.alias,
            pos: pair(tag.position),
            tms: tag.timestamp,
            his: HistoryMessage {
                pos: pair(tag.history.position),
                tms: tag.history.timestamp,
            },
            spd: tag.speed,
            hdg: tag.heading,
            mvz: &tag.monitored_zones,
            liz: &tag.light_zones,
            bsz: &tag.bad_signal_zones,
            vct: tag.vectors.iter().map(VectorMessage::from).collect(),
        }
    }
}

impl From<&RelativeVector> for VectorMessage {
    fn from(v: &RelativeVector) -> Self {
        Self {
            id: v.other,
            d: v.direction,
            r: v.distance,
            f: v.fuzzy,
        }
    }
}

/// Topic a tag's telemetry is published under.
pub fn topic_for(id: TagId) -> String {
    id.to_string()
}

pub fn encode(tag: &TagState) -> DomainResult<Vec<u8>> {
    Ok(serde_json::to_vec(&TelemetryMessage::from(tag))?)
}
