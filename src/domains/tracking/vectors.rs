use std::collections::BTreeMap;

use super::aggregate::{Direction, RelativeVector, TagId, TagRegistry, TagState};
use super::geometry;

/// Relative vectors for every ordered pair of distinct tags.
///
/// Pure function of positions, headings and bad-signal membership. Each
/// subject's list is ordered by counterpart identifier and has exactly
/// `registry.len() - 1` entries.
pub fn compute_vectors(registry: &TagRegistry) -> BTreeMap<TagId, Vec<RelativeVector>> {
    registry
        .iter()
        .map(|subject| {
            let vectors = registry
                .iter()
                .filter(|other| other.id != subject.id)
                .map(|other| relative_vector(subject, other))
                .collect();
            (subject.id, vectors)
        })
        .collect()
}

/// Store freshly computed vectors; every tag's previous list is replaced.
pub fn assign_vectors(registry: &mut TagRegistry, mut vectors: BTreeMap<TagId, Vec<RelativeVector>>) {
    for tag in registry.iter_mut() {
        tag.vectors = vectors.remove(&tag.id).unwrap_or_default();
    }
}

pub fn relative_vector(subject: &TagState, other: &TagState) -> RelativeVector {
    let fuzzy = other.in_bad_signal_zone();
    let (direction, distance) = match (subject.position, other.position) {
        (Some(from), Some(to)) => {
            let direction = match subject.heading {
                _ if subject.in_bad_signal_zone() && fuzzy => Direction::Unknown,
                Some(facing) => Direction::Bearing(geometry::relative_direction(from, to, facing)),
                None => Direction::Unknown,
            };
            (direction, Some(geometry::distance(from, to)))
        }
        _ => (Direction::Unknown, None),
    };

    RelativeVector {
        other: other.id,
        direction,
        distance,
        fuzzy,
    }
}
