//! Follow-location: keep the camera centered on the live position.
//!
//! A tick is skipped only when it is both close to the last position used
//! for a camera update (per axis, under the profile's distance threshold) and
//! soon after that update (under the profile's minimum interval). Small moves
//! therefore still land at a bounded rate, and large moves land at once.

#[cfg(test)]
#[path = "follow_test.rs"]
mod follow_test;

use std::time::Instant;

use tracing::{debug, warn};

use crate::camera::CameraPatch;
use crate::config::FollowTuning;
use crate::controller::ControllerId;
use crate::geo::Coordinate;
use crate::store::{ApplyOutcome, ViewportStore};
use crate::surface::CameraSurface;

#[derive(Debug, Clone, Copy)]
struct Reference {
    position: Coordinate,
    at: Instant,
}

#[derive(Debug, Clone)]
pub struct FollowController {
    enabled: bool,
    /// Position and time of the last accepted camera update.
    reference: Option<Reference>,
    /// Latest fix seen, whether or not following was enabled.
    last_fix: Option<Coordinate>,
}

impl Default for FollowController {
    fn default() -> Self {
        Self { enabled: true, reference: None, last_fix: None }
    }
}

impl FollowController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Latest position fix, used as the snap-back target.
    #[must_use]
    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    /// Position of the last accepted camera update.
    #[must_use]
    pub fn last_followed(&self) -> Option<Coordinate> {
        self.reference.map(|r| r.position)
    }

    /// Flip following. Turning it off forgets the debounce reference.
    pub fn toggle(&mut self) -> bool {
        if self.enabled {
            self.disable_temporarily();
        } else {
            self.enabled = true;
        }
        self.enabled
    }

    /// Stop following and forget the debounce reference.
    ///
    /// Returns whether following was enabled; a second call is a no-op.
    pub fn disable_temporarily(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.reference = None;
        true
    }

    /// Stop following but keep the reference (navigation pan).
    pub fn suspend(&mut self) {
        self.enabled = false;
    }

    pub fn reactivate(&mut self) {
        self.enabled = true;
    }

    /// Feed one position tick.
    ///
    /// Returns `None` when the tick never reached the store: following off,
    /// a locked animation in flight, debounced, or a non-finite fix.
    pub fn on_location_at<S: CameraSurface>(
        &mut self,
        store: &mut ViewportStore<S>,
        fix: Coordinate,
        tuning: &FollowTuning,
        forced: bool,
        now: Instant,
    ) -> Option<ApplyOutcome> {
        if !fix.is_finite() {
            warn!(?fix, "position fix ignored: non-finite coordinate");
            return None;
        }
        self.last_fix = Some(fix);
        if !self.enabled || store.is_locked_at(now) {
            return None;
        }

        if let Some(reference) = self.reference {
            let (d_lat, d_lon) = fix.axis_delta(reference.position);
            let close = d_lat < tuning.distance_deg && d_lon < tuning.distance_deg;
            let recent = now.saturating_duration_since(reference.at) < tuning.min_interval;
            if close && recent {
                return None;
            }
        }

        let patch = CameraPatch::centered(fix).with_duration(tuning.animation_ms);
        let outcome = store.apply_at(patch, forced, Some(ControllerId::Follow), now);
        if !matches!(outcome, ApplyOutcome::Rejected(_)) {
            self.reference = Some(Reference { position: fix, at: now });
        }
        debug!(?outcome, forced, "follow tick");
        Some(outcome)
    }
}
