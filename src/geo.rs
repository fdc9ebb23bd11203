//! Geographic coordinates, viewport padding, and heading arithmetic.

#[cfg(test)]
#[path = "geo_test.rs"]
mod geo_test;

use serde::{Deserialize, Serialize};

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Both axes are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Absolute per-axis delta in degrees: `(d_lat, d_lon)`.
    #[must_use]
    pub fn axis_delta(&self, other: Coordinate) -> (f64, f64) {
        ((self.latitude - other.latitude).abs(), (self.longitude - other.longitude).abs())
    }
}

/// Screen-space insets the map cannot use for framing, in pixels.
///
/// Each side is optional so "no drawer" and "drawer of height 0" stay distinct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
    pub left: Option<f64>,
    pub right: Option<f64>,
}

impl Padding {
    /// Padding with only a bottom inset (the drawer case).
    #[must_use]
    pub fn bottom(px: f64) -> Self {
        Self { bottom: Some(px), ..Self::default() }
    }

    /// Vertical insets (`top + bottom`), absent sides counting as zero.
    #[must_use]
    pub fn vertical(&self) -> f64 {
        side(self.top) + side(self.bottom)
    }

    /// Horizontal insets (`left + right`), absent sides counting as zero.
    #[must_use]
    pub fn horizontal(&self) -> f64 {
        side(self.left) + side(self.right)
    }

    /// Bottom inset when present and positive.
    #[must_use]
    pub fn bottom_px(&self) -> Option<f64> {
        self.bottom.filter(|px| *px > 0.0)
    }

    /// Every present side is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.top, self.bottom, self.left, self.right]
            .into_iter()
            .flatten()
            .all(|px| px.is_finite() && px >= 0.0)
    }
}

fn side(px: Option<f64>) -> f64 {
    px.unwrap_or(0.0).max(0.0)
}

/// Map any finite heading into `[0, 360)`.
#[must_use]
pub fn normalize_heading(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Signed shortest rotation from `from` to `to`, in `(-180, 180]`.
#[must_use]
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    let mut delta = (to - from).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Re-express `raw` so that it lies within 180° of `last`.
///
/// `unwrap_heading(350.0, 10.0)` is `370.0`: the surface rotates +20° instead
/// of spinning -340° across the 0°/360° seam.
#[must_use]
pub fn unwrap_heading(last: f64, raw: f64) -> f64 {
    let mut target = raw;
    let diff = target - last;
    if diff > 180.0 {
        target -= 360.0 * ((diff + 180.0) / 360.0).floor();
    } else if diff < -180.0 {
        target += 360.0 * ((-diff + 180.0) / 360.0).floor();
    }
    target
}
