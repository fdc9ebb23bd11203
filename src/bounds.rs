//! Bounds-fit: a center and discrete zoom that frame a set of coordinates.
//!
//! The zoom comes from an empirically tuned ladder keyed by the larger of the
//! two padding-adjusted spans. Padding inflates the span on its axis by
//! `1 + px / 400`, so a tall drawer yields a wider view. A bottom inset also
//! moves the center south by `adjusted_lat_span * px / 800`, which lifts the
//! content into the visible half of the screen above the drawer.

#[cfg(test)]
#[path = "bounds_test.rs"]
mod bounds_test;

use crate::geo::{Coordinate, Padding};

/// Pixels of padding that double the span on their axis.
pub const PADDING_SPAN_DIVISOR: f64 = 400.0;

/// Divisor converting bottom padding into a southward center shift.
pub const BOTTOM_SHIFT_DIVISOR: f64 = 800.0;

/// Span-to-zoom ladder plus the route boost. Kept as data so it can be tuned
/// without touching the calculator.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomLadder {
    /// `(span_below_deg, zoom)` in ascending span order.
    pub steps: Vec<(f64, f64)>,
    /// Zoom when the span exceeds every step.
    pub fallback: f64,
    /// Added to the ladder zoom when framing a route.
    pub route_boost: f64,
    /// Upper bound on a boosted route zoom.
    pub route_cap: f64,
}

impl Default for ZoomLadder {
    fn default() -> Self {
        Self {
            steps: vec![
                (0.001, 16.0),
                (0.005, 14.0),
                (0.01, 13.0),
                (0.05, 11.0),
                (0.1, 10.0),
                (0.5, 8.0),
                (1.0, 7.0),
            ],
            fallback: 6.0,
            route_boost: 1.2,
            route_cap: 20.0,
        }
    }
}

impl ZoomLadder {
    /// First rung whose span bound exceeds `span`.
    #[must_use]
    pub fn zoom_for_span(&self, span: f64) -> f64 {
        self.steps
            .iter()
            .find(|(below, _)| span < *below)
            .map_or(self.fallback, |(_, zoom)| *zoom)
    }

    /// `zoom` plus the route boost, capped.
    #[must_use]
    pub fn boost_for_route(&self, zoom: f64) -> f64 {
        (zoom + self.route_boost).min(self.route_cap)
    }
}

/// Result of a bounds-fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsFit {
    pub center: Coordinate,
    pub zoom: f64,
    /// Latitude span after padding inflation.
    pub lat_span: f64,
    /// Longitude span after padding inflation.
    pub lon_span: f64,
}

/// Frame `coords` given the viewport `padding`.
///
/// Non-finite coordinates are skipped; `None` when nothing usable remains.
#[must_use]
pub fn fit_bounds(coords: &[Coordinate], padding: &Padding, ladder: &ZoomLadder) -> Option<BoundsFit> {
    let mut finite = coords.iter().filter(|c| c.is_finite());
    let first = finite.next()?;
    let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
    let (mut min_lon, mut max_lon) = (first.longitude, first.longitude);
    for c in finite {
        min_lat = min_lat.min(c.latitude);
        max_lat = max_lat.max(c.latitude);
        min_lon = min_lon.min(c.longitude);
        max_lon = max_lon.max(c.longitude);
    }

    let lat_span = (max_lat - min_lat) * (1.0 + padding.vertical() / PADDING_SPAN_DIVISOR);
    let lon_span = (max_lon - min_lon) * (1.0 + padding.horizontal() / PADDING_SPAN_DIVISOR);
    let zoom = ladder.zoom_for_span(lat_span.max(lon_span));

    let mut center = Coordinate::new((min_lat + max_lat) / 2.0, (min_lon + max_lon) / 2.0);
    if let Some(bottom) = padding.bottom_px() {
        center.latitude -= lat_span * bottom / BOTTOM_SHIFT_DIVISOR;
    }

    Some(BoundsFit { center, zoom, lat_span, lon_span })
}
