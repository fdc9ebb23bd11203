//! Compass-driven camera rotation.
//!
//! Raw compass readings are throttled in time and filtered by an angular dead
//! zone measured along the shortest arc, so 359 to 1 is a 2 degree move.
//! Bearings reach the store normalized; the store unwraps them against the
//! heading it last commanded so the surface always turns the short way.

#[cfg(test)]
#[path = "heading_test.rs"]
mod heading_test;

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::camera::CameraPatch;
use crate::config::HeadingTuning;
use crate::controller::ControllerId;
use crate::geo::{normalize_heading, shortest_delta};
use crate::store::{ApplyOutcome, ViewportStore};
use crate::surface::CameraSurface;

/// Whether the map rotates with the device outside navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingMode {
    #[default]
    NorthUp,
    FollowDevice,
}

#[derive(Debug, Clone, Default)]
pub struct HeadingController {
    mode: HeadingMode,
    /// Last bearing that reached the store, normalized to `[0, 360)`.
    last_applied: Option<f64>,
    last_at: Option<Instant>,
}

impl HeadingController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn mode(&self) -> HeadingMode {
        self.mode
    }

    /// Switch mode. Returns whether the mode changed.
    pub fn set_mode(&mut self, mode: HeadingMode) -> bool {
        if self.mode == mode {
            return false;
        }
        self.mode = mode;
        self.last_at = None;
        true
    }

    /// Feed one compass reading.
    ///
    /// Rotation is active while navigating or in [`HeadingMode::FollowDevice`].
    /// Returns `None` when the reading was throttled, inside the dead zone,
    /// non-finite, or rotation is inactive.
    pub fn on_heading_at<S: CameraSurface>(
        &mut self,
        store: &mut ViewportStore<S>,
        raw: f64,
        tuning: &HeadingTuning,
        navigating: bool,
        now: Instant,
    ) -> Option<ApplyOutcome> {
        if !raw.is_finite() {
            trace!(raw, "compass reading ignored: non-finite");
            return None;
        }
        if !navigating && self.mode == HeadingMode::NorthUp {
            return None;
        }
        if let Some(at) = self.last_at
            && now.saturating_duration_since(at) < tuning.throttle
        {
            return None;
        }

        let last = self.last_applied.unwrap_or(store.state().heading);
        let target = normalize_heading(raw);
        if shortest_delta(last, target).abs() < tuning.dead_zone_deg {
            return None;
        }

        let outcome = store.apply_at(CameraPatch::heading(target), navigating, Some(ControllerId::Heading), now);
        if !matches!(outcome, ApplyOutcome::Rejected(_)) {
            self.last_applied = Some(target);
            self.last_at = Some(now);
        }
        debug!(?outcome, heading = target, "compass tick");
        Some(outcome)
    }
}
