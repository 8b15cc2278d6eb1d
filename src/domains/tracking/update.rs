use super::aggregate::{History, TagId, TagRegistry, TagState};
use super::geometry;
use super::snapshot::{TagReading, TagRecord};

/// What happened to one snapshot record during an update pass.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// First sighting; a new tag was registered.
    Created { id: TagId },
    /// Position and timestamp committed, kinematics recomputed.
    Moved { id: TagId },
    /// No position before or after; only the timestamp was committed.
    Unplaced { id: TagId },
    /// Movement below the fluctuation threshold; only zones refreshed.
    Filtered { id: TagId },
    /// Unknown tag while admission is disabled; nothing changed.
    Ignored { id: TagId },
    /// The record could not be keyed to a tag.
    Rejected { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub outcomes: Vec<UpdateOutcome>,
}

impl UpdateReport {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Created { .. }))
    }

    pub fn moved(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Moved { .. }))
    }

    pub fn unplaced(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Unplaced { .. }))
    }

    pub fn filtered(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Filtered { .. }))
    }

    pub fn ignored(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Ignored { .. }))
    }

    pub fn rejected(&self) -> usize {
        self.count(|o| matches!(o, UpdateOutcome::Rejected { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&UpdateOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Merges locating-service snapshots into the registry.
#[derive(Debug, Clone)]
pub struct UpdateEngine {
    fluctuation_threshold: f64,
    admit_new_tags: bool,
}

impl UpdateEngine {
    pub fn new(fluctuation_threshold: f64, admit_new_tags: bool) -> Self {
        Self {
            fluctuation_threshold,
            admit_new_tags,
        }
    }

    pub fn fluctuation_threshold(&self) -> f64 {
        self.fluctuation_threshold
    }

    /// Build a registry from an initial snapshot. Unkeyable records are
    /// skipped; a repeated identifier keeps its first record.
    pub fn initialize(&self, records: &[TagRecord]) -> (TagRegistry, UpdateReport) {
        let mut registry = TagRegistry::new();
        let mut report = UpdateReport::default();
        for record in records {
            let outcome = match TagReading::from_record(record) {
                Ok(reading) => {
                    let id = reading.id;
                    if registry.register(TagState::from_reading(reading)) {
                        UpdateOutcome::Created { id }
                    } else {
                        UpdateOutcome::Ignored { id }
                    }
                }
                Err(e) => UpdateOutcome::Rejected { reason: e.to_string() },
            };
            report.outcomes.push(outcome);
        }
        (registry, report)
    }

    /// Apply one snapshot. Tags missing from the snapshot are left untouched.
    pub fn apply_update(&self, registry: &mut TagRegistry, records: &[TagRecord]) -> UpdateReport {
        let mut report = UpdateReport::default();
        for record in records {
            let outcome = match TagReading::from_record(record) {
                Ok(reading) => self.apply_reading(registry, reading),
                Err(e) => UpdateOutcome::Rejected { reason: e.to_string() },
            };
            report.outcomes.push(outcome);
        }
        report
    }

    fn apply_reading(&self, registry: &mut TagRegistry, reading: TagReading) -> UpdateOutcome {
        let id = reading.id;
        if !registry.contains(id) {
            if !self.admit_new_tags {
                return UpdateOutcome::Ignored { id };
            }
            registry.register(TagState::from_reading(reading));
            return UpdateOutcome::Created { id };
        }
        let Some(tag) = registry.get_mut(id) else {
            return UpdateOutcome::Ignored { id };
        };

        let moved = self.commit_if_moved(tag, &reading);
        tag.speed = recompute_speed(tag);
        if moved {
            if let (Some(from), Some(to)) = (tag.history.position, tag.position) {
                if from != to {
                    tag.heading = Some(geometry::heading(from, to));
                }
            }
        }

        tag.monitored_zones = reading.monitored_zones;
        tag.light_zones = reading.light_zones;
        tag.bad_signal_zones = reading.bad_signal_zones;
        tag.vectors.clear();

        match (moved, tag.position) {
            (true, Some(_)) => UpdateOutcome::Moved { id },
            (true, None) => UpdateOutcome::Unplaced { id },
            (false, _) => UpdateOutcome::Filtered { id },
        }
    }

    /// Fluctuation filter. Position and timestamp always change together.
    fn commit_if_moved(&self, tag: &mut TagState, reading: &TagReading) -> bool {
        let accept = match (tag.position, reading.position) {
            (None, _) => true,
            (Some(prior), Some(candidate)) => {
                geometry::distance(prior, candidate) >= self.fluctuation_threshold
            }
            // A lost fix is not movement.
            (Some(_), None) => false,
        };
        if accept {
            tag.history = History {
                position: tag.position,
                timestamp: tag.timestamp,
            };
            tag.position = reading.position;
            tag.timestamp = reading.timestamp;
        }
        accept
    }
}

fn recompute_speed(tag: &TagState) -> f64 {
    match (
        tag.history.position,
        tag.history.timestamp,
        tag.position,
        tag.timestamp,
    ) {
        (Some(from), Some(t_from), Some(to), Some(t_to)) => {
            geometry::speed_kmh(from, t_from, to, t_to)
        }
        _ => tag.speed,
    }
}
