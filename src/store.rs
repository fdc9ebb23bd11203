//! Viewport state store: the single entry point that mutates the camera.
//!
//! DESIGN
//! ======
//! Every producer goes through [`ViewportStore::apply_at`]. A request is
//! checked for non-finite numbers, run through the arbitration table, then
//! diffed against the current state with per-field dead zones. Only fields
//! that moved are committed and forwarded to the surface, so sensor noise
//! never causes a redundant render.
//!
//! Headings are committed in `[0, 360)` but sent to the surface unwrapped
//! against the last heading it was sent, so every rotation the surface sees
//! is at most half a turn no matter how many times north is crossed.
//!
//! Before the surface is ready, committed requests are buffered with their
//! `forced` flag and controller and replayed in order once it is. Padding
//! shares that queue while it is non-empty. Dropping a
//! request because of a lock or claim is normal flow control and is reported
//! as an [`ApplyOutcome`], never as an error.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::arbitration::{AnimationLock, Ownership, RejectReason, Verdict, arbitrate};
use crate::camera::{CameraPatch, CameraState, DeadZone, SurfaceCommand};
use crate::config::CameraConfig;
use crate::controller::ControllerId;
use crate::geo::{Padding, unwrap_heading};
use crate::queue::{PendingQueue, PendingRequest};
use crate::surface::CameraSurface;

/// What happened to a camera request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Committed and forwarded to the surface.
    Applied,
    /// Committed; the surface will receive it once ready.
    Queued,
    /// Every field was inside its dead zone.
    Unchanged,
    Rejected(RejectReason),
}

impl ApplyOutcome {
    /// The request changed the camera state.
    #[must_use]
    pub fn is_committed(self) -> bool {
        matches!(self, Self::Applied | Self::Queued)
    }
}

pub struct ViewportStore<S> {
    state: CameraState,
    ownership: Ownership,
    lock: AnimationLock,
    queue: PendingQueue,
    surface: S,
    surface_ready: bool,
    dead_zone: DeadZone,
    claim_ttl: Duration,
    lock_margin: Duration,
    /// Last heading sent to the surface, unnormalised.
    commanded_heading: f64,
}

impl<S: CameraSurface> ViewportStore<S> {
    #[must_use]
    pub fn new(surface: S, config: &CameraConfig) -> Self {
        Self {
            state: CameraState::default(),
            ownership: Ownership::default(),
            lock: AnimationLock::default(),
            queue: PendingQueue::new(config.queue_stagger),
            surface,
            surface_ready: false,
            dead_zone: config.dead_zone,
            claim_ttl: config.claim_ttl,
            lock_margin: config.lock_margin,
            commanded_heading: 0.0,
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn into_surface(self) -> S {
        self.surface
    }

    #[must_use]
    pub fn is_surface_ready(&self) -> bool {
        self.surface_ready
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Next instant at which a queued request becomes due.
    #[must_use]
    pub fn next_replay_due(&self) -> Option<Instant> {
        self.queue.next_due()
    }

    /// Heading as last commanded to the surface, continuous across north.
    #[must_use]
    pub fn commanded_heading(&self) -> f64 {
        self.commanded_heading
    }

    #[must_use]
    pub fn is_locked_at(&self, now: Instant) -> bool {
        self.lock.is_active(now)
    }

    #[must_use]
    pub fn holder_at(&self, now: Instant) -> Option<ControllerId> {
        self.ownership.holder(now)
    }

    // --- Mutation entry point ---

    pub fn apply(&mut self, patch: CameraPatch, forced: bool, controller: Option<ControllerId>) -> ApplyOutcome {
        self.apply_at(patch, forced, controller, Instant::now())
    }

    /// Arbitrate, dead-zone, commit, and forward (or queue) one request.
    pub fn apply_at(
        &mut self,
        mut patch: CameraPatch,
        forced: bool,
        controller: Option<ControllerId>,
        now: Instant,
    ) -> ApplyOutcome {
        if !patch.is_finite() {
            warn!(?controller, ?patch, "camera request rejected: non-finite value");
            return ApplyOutcome::Rejected(RejectReason::InvalidInput);
        }

        let verdict = arbitrate(self.lock.is_active(now), self.ownership.holder(now), controller, forced);
        if let Verdict::Reject(reason) = verdict {
            debug!(?controller, ?reason, "camera request dropped");
            return ApplyOutcome::Rejected(reason);
        }

        if let Some(heading) = patch.heading {
            patch.heading = Some(unwrap_heading(self.commanded_heading, heading));
        }
        let command = self.state.diff(&patch, &self.dead_zone);
        if command.is_empty() {
            return ApplyOutcome::Unchanged;
        }
        self.state.commit(&command);
        if let Some(heading) = command.heading {
            self.commanded_heading = heading;
        }

        if self.surface_ready && self.queue.is_empty() {
            self.surface.set_camera(&command);
            ApplyOutcome::Applied
        } else {
            self.queue.push(PendingRequest::new(command, forced, controller), now);
            debug!(?controller, pending = self.queue.len(), "camera request queued until surface ready");
            ApplyOutcome::Queued
        }
    }

    /// Apply a forced request, then hold the lock for `duration_ms` plus the margin.
    pub fn apply_locked_at(
        &mut self,
        patch: CameraPatch,
        duration_ms: u64,
        controller: ControllerId,
        now: Instant,
    ) -> ApplyOutcome {
        let outcome = self.apply_at(patch.with_duration(duration_ms), true, Some(controller), now);
        if outcome != ApplyOutcome::Rejected(RejectReason::InvalidInput) {
            let expires_at = now + Duration::from_millis(duration_ms) + self.lock_margin;
            self.lock.lock_until(expires_at);
            info!(%controller, duration_ms, "camera animation lock acquired");
        }
        outcome
    }

    // --- Ownership ---

    /// Grant `id` exclusive ownership for the configured lifetime.
    pub fn claim_at(&mut self, id: ControllerId, now: Instant) {
        if let Some(displaced) = self.ownership.claim(id, now, self.claim_ttl) {
            info!(%id, %displaced, "camera claim taken over");
        } else {
            info!(%id, "camera claimed");
        }
    }

    /// Release ownership; see [`Ownership::release`] for the id rules.
    pub fn release_at(&mut self, id: Option<ControllerId>, now: Instant) -> bool {
        let released = self.ownership.release(id, now);
        if released {
            info!(?id, "camera claim released");
        } else {
            debug!(?id, "camera release ignored: not the holder");
        }
        released
    }

    // --- Padding ---

    pub fn set_padding(&mut self, padding: Padding) -> bool {
        self.set_padding_at(padding, Instant::now())
    }

    /// Record new viewport padding; forward it now or queue it behind pending moves.
    pub fn set_padding_at(&mut self, padding: Padding, now: Instant) -> bool {
        if !padding.is_valid() {
            warn!(?padding, "viewport padding rejected: negative or non-finite inset");
            return false;
        }
        if self.state.padding == padding {
            return false;
        }
        let command = SurfaceCommand::padding(padding);
        self.state.commit(&command);
        if self.surface_ready && self.queue.is_empty() {
            self.surface.set_camera(&command);
        } else {
            self.queue.push(PendingRequest::padding(padding), now);
            debug!(?padding, pending = self.queue.len(), "viewport padding queued");
        }
        true
    }

    // --- Surface lifecycle and timers ---

    /// The surface finished loading: start replaying the queue.
    pub fn surface_ready_at(&mut self, now: Instant) {
        if self.surface_ready {
            return;
        }
        self.surface_ready = true;
        info!(pending = self.queue.len(), "camera surface ready");
        self.queue.start_replay(now);
        self.replay_due(now);
    }

    /// Fire whatever deadlines have passed: queued replays and expired lock or claim.
    pub fn tick_at(&mut self, now: Instant) {
        if self.lock.expire(now) {
            debug!("camera animation lock expired");
        }
        if let Some(holder) = self.ownership.expire(now) {
            warn!(%holder, "camera claim expired without release");
        }
        if self.surface_ready {
            self.replay_due(now);
        }
    }

    fn replay_due(&mut self, now: Instant) {
        for request in self.queue.drain_due(now) {
            debug!(controller = ?request.controller, forced = request.forced, "replaying queued camera request");
            self.surface.set_camera(&request.command);
        }
    }
}
