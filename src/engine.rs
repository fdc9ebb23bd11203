//! Camera core: the one context object every producer talks to.
//!
//! DESIGN
//! ======
//! The host constructs a single [`CameraCore`] per map view and routes every
//! event into it: position and compass ticks, pans, drawer lifecycle,
//! navigation steps, fly-to and bounds-fit requests. The core owns the
//! viewport store and each controller, so "exactly one camera" holds without
//! any global state.
//!
//! Nothing here runs on its own. Deadlines (animation lock, claim lifetime,
//! recenter countdown, staggered replay) are instants compared against the
//! `now` handed to [`CameraCore::tick_at`]; the host calls it from its event
//! loop, ideally at [`CameraCore::next_deadline`].
//!
//! Forced versus unforced, per producer:
//! - navigation steps, fly-to, bounds-fit and recenter snap-backs are forced
//! - follow and compass ticks are forced only during navigation
//! - drawer requests through [`CameraCore::apply_at`] choose for themselves

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::time::Instant;

use tracing::{debug, info};

use crate::bounds::{BoundsFit, fit_bounds};
use crate::camera::{CameraPatch, CameraState};
use crate::config::CameraConfig;
use crate::controller::{ControllerId, Drawer};
use crate::follow::FollowController;
use crate::geo::{Coordinate, Padding};
use crate::gesture::{GestureController, PanEffect};
use crate::heading::{HeadingController, HeadingMode};
use crate::navigation::{TravelMode, camera_for_step};
use crate::store::{ApplyOutcome, ViewportStore};
use crate::surface::{CameraSurface, NoAdvisor, ZoomAdvisor};

pub struct CameraCore<S, A = NoAdvisor> {
    store: ViewportStore<S>,
    follow: FollowController,
    heading: HeadingController,
    gesture: GestureController,
    advisor: A,
    config: CameraConfig,
    /// Travel mode of the active navigation session.
    navigation: Option<TravelMode>,
    /// Seeded on the first recenter outside navigation.
    recenter_zoom: Option<f64>,
}

impl<S: CameraSurface> CameraCore<S, NoAdvisor> {
    #[must_use]
    pub fn new(surface: S, config: CameraConfig) -> Self {
        Self::with_advisor(surface, NoAdvisor, config)
    }
}

impl<S: CameraSurface, A: ZoomAdvisor> CameraCore<S, A> {
    #[must_use]
    pub fn with_advisor(surface: S, advisor: A, config: CameraConfig) -> Self {
        Self {
            store: ViewportStore::new(surface, &config),
            follow: FollowController::new(),
            heading: HeadingController::new(),
            gesture: GestureController::new(),
            advisor,
            config,
            navigation: None,
            recenter_zoom: None,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[must_use]
    pub fn state(&self) -> &CameraState {
        self.store.state()
    }

    #[must_use]
    pub fn store(&self) -> &ViewportStore<S> {
        &self.store
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        self.store.surface()
    }

    pub fn surface_mut(&mut self) -> &mut S {
        self.store.surface_mut()
    }

    /// Tear down the core and hand back the surface.
    #[must_use]
    pub fn into_surface(self) -> S {
        self.store.into_surface()
    }

    #[must_use]
    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    #[must_use]
    pub fn follow(&self) -> &FollowController {
        &self.follow
    }

    #[must_use]
    pub fn is_following(&self) -> bool {
        self.follow.is_enabled()
    }

    #[must_use]
    pub fn is_navigating(&self) -> bool {
        self.navigation.is_some()
    }

    #[must_use]
    pub fn heading_mode(&self) -> HeadingMode {
        self.heading.mode()
    }

    /// Motion profile for follow and compass thresholds: driving only while
    /// navigating in a car, walking otherwise.
    #[must_use]
    pub fn profile(&self) -> TravelMode {
        match self.navigation {
            Some(TravelMode::Driving) => TravelMode::Driving,
            _ => TravelMode::Walking,
        }
    }

    /// When the pending recenter snap-back fires, if one is armed.
    #[must_use]
    pub fn recenter_due(&self) -> Option<Instant> {
        self.gesture.recenter_due()
    }

    /// Earliest instant at which [`Self::tick_at`] has work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.store.next_replay_due(), self.gesture.recenter_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // =========================================================================
    // Surface lifecycle and timers
    // =========================================================================

    pub fn on_surface_ready(&mut self) {
        self.on_surface_ready_at(Instant::now());
    }

    pub fn on_surface_ready_at(&mut self, now: Instant) {
        self.store.surface_ready_at(now);
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    /// Fire due deadlines: lock and claim expiry, queued replay, and the
    /// navigation recenter countdown.
    pub fn tick_at(&mut self, now: Instant) {
        self.store.tick_at(now);
        if !self.gesture.take_due(now) {
            return;
        }
        self.follow.reactivate();
        if let Some(target) = self.follow.last_fix() {
            let zoom = self.store.state().zoom;
            info!(?target, "no pan within recenter delay: snapping back");
            self.snap_back(target, zoom, now);
        }
    }

    // =========================================================================
    // Generic requests
    // =========================================================================

    /// Route an arbitrary request through arbitration, e.g. a drawer
    /// framing its own content while it holds the claim.
    pub fn apply_at(
        &mut self,
        patch: CameraPatch,
        forced: bool,
        controller: Option<ControllerId>,
        now: Instant,
    ) -> ApplyOutcome {
        self.store.apply_at(patch, forced, controller, now)
    }

    pub fn animate_locked(&mut self, center: Coordinate, zoom: f64, duration_ms: u64, pitch: Option<f64>) -> ApplyOutcome {
        self.animate_locked_at(center, zoom, duration_ms, pitch, Instant::now())
    }

    /// Forced fly-to that no unforced request can interrupt until
    /// `duration_ms` plus the lock margin has passed.
    pub fn animate_locked_at(
        &mut self,
        center: Coordinate,
        zoom: f64,
        duration_ms: u64,
        pitch: Option<f64>,
        now: Instant,
    ) -> ApplyOutcome {
        let mut patch = CameraPatch::centered(center).with_zoom(zoom);
        if let Some(pitch) = pitch {
            patch = patch.with_pitch(pitch);
        }
        self.store.apply_locked_at(patch, duration_ms, ControllerId::OneShot, now)
    }

    // =========================================================================
    // Drawers
    // =========================================================================

    pub fn claim_at(&mut self, id: ControllerId, now: Instant) {
        self.store.claim_at(id, now);
    }

    pub fn release_at(&mut self, id: Option<ControllerId>, now: Instant) -> bool {
        self.store.release_at(id, now)
    }

    /// Reserve the bottom `height_px` of the viewport for a drawer.
    pub fn set_drawer_padding(&mut self, height_px: f64) -> bool {
        self.set_drawer_padding_at(height_px, Instant::now())
    }

    pub fn set_drawer_padding_at(&mut self, height_px: f64, now: Instant) -> bool {
        self.store.set_padding_at(Padding::bottom(height_px), now)
    }

    /// Claim the camera for `drawer` and reserve its height.
    pub fn present_drawer_at(&mut self, drawer: Drawer, height_px: f64, now: Instant) {
        self.store.claim_at(ControllerId::Drawer(drawer), now);
        self.set_drawer_padding_at(height_px, now);
    }

    /// Release `drawer`'s claim and give its height back to the map.
    ///
    /// A drawer that does not hold the camera leaves the padding alone; it
    /// belongs to whichever drawer replaced it.
    pub fn dismiss_drawer_at(&mut self, drawer: Drawer, now: Instant) -> bool {
        let released = self.store.release_at(Some(ControllerId::Drawer(drawer)), now);
        if released {
            self.store.set_padding_at(Padding::default(), now);
        }
        released
    }

    // =========================================================================
    // Follow and compass
    // =========================================================================

    pub fn on_location(&mut self, fix: Coordinate) -> Option<ApplyOutcome> {
        self.on_location_at(fix, Instant::now())
    }

    pub fn on_location_at(&mut self, fix: Coordinate, now: Instant) -> Option<ApplyOutcome> {
        let tuning = self.config.follow.get(self.profile());
        let forced = self.is_navigating();
        self.follow.on_location_at(&mut self.store, fix, &tuning, forced, now)
    }

    pub fn toggle_follow(&mut self) -> bool {
        self.follow.toggle()
    }

    pub fn disable_follow_temporarily(&mut self) -> bool {
        self.follow.disable_temporarily()
    }

    pub fn reactivate_follow(&mut self) {
        self.follow.reactivate();
    }

    pub fn on_heading(&mut self, raw: f64) -> Option<ApplyOutcome> {
        self.on_heading_at(raw, Instant::now())
    }

    pub fn on_heading_at(&mut self, raw: f64, now: Instant) -> Option<ApplyOutcome> {
        let tuning = self.config.heading.get(self.profile());
        let navigating = self.is_navigating();
        self.heading.on_heading_at(&mut self.store, raw, &tuning, navigating, now)
    }

    /// Switch compass mode. Entering north-up outside navigation turns the
    /// map back to north once.
    pub fn set_heading_mode_at(&mut self, mode: HeadingMode, now: Instant) -> Option<ApplyOutcome> {
        if !self.heading.set_mode(mode) {
            return None;
        }
        info!(?mode, "heading mode changed");
        if mode == HeadingMode::NorthUp && !self.is_navigating() {
            return Some(self.store.apply_at(CameraPatch::heading(0.0), false, Some(ControllerId::Heading), now));
        }
        None
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    pub fn on_map_pan_drag(&mut self) -> PanEffect {
        self.on_map_pan_drag_at(Instant::now())
    }

    pub fn on_map_pan_drag_at(&mut self, now: Instant) -> PanEffect {
        let navigating = self.is_navigating();
        self.gesture.on_pan_at(&mut self.follow, navigating, self.config.recenter_delay, now)
    }

    pub fn manual_recenter(&mut self) -> Option<ApplyOutcome> {
        self.manual_recenter_at(Instant::now())
    }

    /// Cancel any countdown, resume following, and snap back to the latest
    /// position fix if there is one.
    pub fn manual_recenter_at(&mut self, now: Instant) -> Option<ApplyOutcome> {
        self.gesture.cancel();
        self.follow.reactivate();
        let Some(target) = self.follow.last_fix() else {
            debug!("recenter requested before any position fix");
            return None;
        };
        let zoom = if self.is_navigating() {
            self.store.state().zoom
        } else {
            self.recenter_zoom_for(target)
        };
        info!(?target, zoom, "manual recenter");
        Some(self.snap_back(target, zoom, now))
    }

    fn snap_back(&mut self, target: Coordinate, zoom: f64, now: Instant) -> ApplyOutcome {
        let patch = CameraPatch::centered(target).with_zoom(zoom);
        self.store.apply_locked_at(patch, self.config.snap_duration_ms, ControllerId::Gesture, now)
    }

    fn recenter_zoom_for(&mut self, target: Coordinate) -> f64 {
        if let Some(zoom) = self.recenter_zoom {
            return zoom;
        }
        let zoom = self
            .advisor
            .suggested_zoom(target)
            .filter(|z| z.is_finite())
            .unwrap_or(self.config.recenter_zoom);
        debug!(zoom, "recenter zoom seeded");
        self.recenter_zoom = Some(zoom);
        zoom
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Begin a turn-by-turn session. Following resumes and the motion profile
    /// switches to `mode`.
    pub fn start_navigation(&mut self, mode: TravelMode) {
        self.navigation = Some(mode);
        self.follow.reactivate();
        info!(?mode, "navigation started");
    }

    /// End the session. Returns whether one was active.
    pub fn stop_navigation(&mut self) -> bool {
        let Some(mode) = self.navigation.take() else {
            return false;
        };
        self.gesture.cancel();
        info!(?mode, "navigation stopped");
        true
    }

    pub fn on_navigation_step(&mut self, distance_m: Option<f64>, heading_override: Option<f64>) -> Option<ApplyOutcome> {
        self.on_navigation_step_at(distance_m, heading_override, Instant::now())
    }

    /// Apply the step camera for the current distance to the next maneuver.
    /// Ignored outside a navigation session.
    pub fn on_navigation_step_at(
        &mut self,
        distance_m: Option<f64>,
        heading_override: Option<f64>,
        now: Instant,
    ) -> Option<ApplyOutcome> {
        let Some(mode) = self.navigation else {
            debug!("navigation step ignored: no active session");
            return None;
        };
        let step = camera_for_step(mode, distance_m, heading_override);
        let mut patch = CameraPatch::default()
            .with_pitch(step.pitch)
            .with_zoom(step.zoom)
            .with_duration(self.config.navigation_duration_ms);
        if let Some(heading) = step.heading {
            patch = patch.with_heading(heading);
        }
        let outcome = self.store.apply_at(patch, true, Some(ControllerId::Navigation), now);
        debug!(?mode, ?distance_m, pitch = step.pitch, zoom = step.zoom, ?outcome, "navigation step");
        Some(outcome)
    }

    // =========================================================================
    // Bounds-fit
    // =========================================================================

    pub fn fit_to_coordinates(
        &mut self,
        coords: &[Coordinate],
        padding: Option<Padding>,
        duration_ms: u64,
    ) -> Option<ApplyOutcome> {
        self.fit_to_coordinates_at(coords, padding, duration_ms, Instant::now())
    }

    /// Frame `coords` with a forced update. `padding` defaults to the current
    /// viewport padding. `None` when no coordinate is usable.
    pub fn fit_to_coordinates_at(
        &mut self,
        coords: &[Coordinate],
        padding: Option<Padding>,
        duration_ms: u64,
        now: Instant,
    ) -> Option<ApplyOutcome> {
        let fit = self.fit(coords, padding)?;
        Some(self.apply_fit(fit.center, fit.zoom, duration_ms, now))
    }

    /// Bounds-fit for a route: framed slightly tighter than a generic fit.
    pub fn fit_route_at(
        &mut self,
        coords: &[Coordinate],
        padding: Option<Padding>,
        duration_ms: u64,
        now: Instant,
    ) -> Option<ApplyOutcome> {
        let fit = self.fit(coords, padding)?;
        let zoom = self.config.ladder.boost_for_route(fit.zoom);
        Some(self.apply_fit(fit.center, zoom, duration_ms, now))
    }

    fn fit(&self, coords: &[Coordinate], padding: Option<Padding>) -> Option<BoundsFit> {
        let padding = padding.unwrap_or(self.store.state().padding);
        let fit = fit_bounds(coords, &padding, &self.config.ladder);
        if fit.is_none() {
            debug!(count = coords.len(), "bounds-fit skipped: no usable coordinates");
        }
        fit
    }

    fn apply_fit(&mut self, center: Coordinate, zoom: f64, duration_ms: u64, now: Instant) -> ApplyOutcome {
        let patch = CameraPatch::centered(center).with_zoom(zoom).with_duration(duration_ms);
        self.store.apply_at(patch, true, Some(ControllerId::OneShot), now)
    }
}
