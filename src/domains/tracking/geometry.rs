//! Planar geometry on locating-service coordinates.
//!
//! Bearings are degrees clockwise from the +y axis, so a move from `(0, 0)`
//! to `(0, 10)` has bearing 0 and a move to `(10, 0)` has bearing 90.

use super::aggregate::Position2D;

const MPS_TO_KMH: f64 = 3.6;

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Euclidean distance rounded to one decimal.
pub fn distance(a: Position2D, b: Position2D) -> f64 {
    round1((b.x - a.x).hypot(b.y - a.y))
}

/// Unrounded bearing from `from` to `to`, in `[0, 360)`.
pub fn bearing(from: Position2D, to: Position2D) -> f64 {
    (to.x - from.x).atan2(to.y - from.y).to_degrees().rem_euclid(360.0)
}

/// Bearing rounded to the nearest whole degree, normalised into `[0, 360)`.
pub fn heading(from: Position2D, to: Position2D) -> f64 {
    bearing(from, to).round().rem_euclid(360.0)
}

/// Bearing of `to` as seen from `from` facing `facing` degrees.
pub fn relative_direction(from: Position2D, to: Position2D, facing: f64) -> u16 {
    (bearing(from, to) - facing).round().rem_euclid(360.0) as u16
}

/// Speed in km/h between two timed samples, one decimal.
/// Non-positive elapsed time (duplicate or reordered samples) gives 0.
pub fn speed_kmh(from: Position2D, t_from: f64, to: Position2D, t_to: f64) -> f64 {
    let dt = t_to - t_from;
    if dt <= 0.0 {
        return 0.0;
    }
    round1(distance(from, to) / dt * MPS_TO_KMH)
}
