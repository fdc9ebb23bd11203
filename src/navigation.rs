//! Turn-by-turn camera policy.
//!
//! A pure mapping from travel mode and distance to the next maneuver onto a
//! pitch and zoom. Driving widens and flattens the view far from a maneuver,
//! tightens on approach, then flattens again at the maneuver so the turn is
//! legible. Walking keeps a steep, close view and zooms in smoothly inside
//! the last 50 m.

#[cfg(test)]
#[path = "navigation_test.rs"]
mod navigation_test;

use serde::{Deserialize, Serialize};

use crate::geo::normalize_heading;

/// How the user is travelling. Also selects the follow and heading profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Driving,
    #[default]
    Walking,
}

/// Camera configuration for one navigation step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCamera {
    pub pitch: f64,
    pub zoom: f64,
    /// Set only when a finite heading override was supplied.
    pub heading: Option<f64>,
}

const DRIVING_BASE: (f64, f64) = (45.0, 16.0);
const WALKING_BASE: (f64, f64) = (60.0, 18.0);

/// `(distance_above_m, pitch, zoom)`, checked top to bottom.
const DRIVING_BANDS: [(f64, f64, f64); 4] = [
    (1000.0, 35.0, 14.0),
    (500.0, 40.0, 15.0),
    (200.0, 45.0, 16.0),
    (50.0, 50.0, 17.0),
];
const DRIVING_AT_MANEUVER: (f64, f64) = (30.0, 18.0);

const WALKING_APPROACH_M: f64 = 50.0;
const WALKING_APPROACH_ZOOM_FLOOR: f64 = 19.0;

/// Pitch/zoom (and optional heading) for the current step.
///
/// A missing, negative or non-finite distance yields the mode's base view.
#[must_use]
pub fn camera_for_step(mode: TravelMode, distance_m: Option<f64>, heading_override: Option<f64>) -> StepCamera {
    let distance = distance_m.filter(|d| d.is_finite() && *d >= 0.0);
    let (pitch, zoom) = match mode {
        TravelMode::Driving => distance.map_or(DRIVING_BASE, driving_band),
        TravelMode::Walking => distance.map_or(WALKING_BASE, walking_band),
    };
    let heading = heading_override.filter(|h| h.is_finite()).map(normalize_heading);
    StepCamera { pitch, zoom, heading }
}

fn driving_band(distance: f64) -> (f64, f64) {
    DRIVING_BANDS
        .iter()
        .find(|(above, _, _)| distance > *above)
        .map_or(DRIVING_AT_MANEUVER, |(_, pitch, zoom)| (*pitch, *zoom))
}

fn walking_band(distance: f64) -> (f64, f64) {
    if distance < WALKING_APPROACH_M {
        (0.0, (22.0 - distance / 10.0).max(WALKING_APPROACH_ZOOM_FLOOR))
    } else {
        WALKING_BASE
    }
}
