//! Pan gestures and the navigation recenter countdown.
//!
//! DESIGN
//! ======
//! A pan outside navigation simply stops following. During navigation the
//! user is expected to glance around and come back, so a pan suspends
//! following and arms a countdown; each further pan restarts it, and when it
//! expires the host's next tick snaps the camera back. A manual recenter
//! disarms the countdown and snaps back immediately.
//!
//! The controller only owns the countdown. The snap-back itself is a locked
//! animation issued by the engine, which knows the zoom to use.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::time::{Duration, Instant};

use tracing::debug;

use crate::follow::FollowController;

/// What a pan did to following.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanEffect {
    /// Navigating: follow suspended, snap-back due at the given instant.
    RecenterArmed { due: Instant },
    /// Not navigating: follow was on and is now off.
    FollowReleased,
    /// Not navigating and follow was already off.
    Ignored,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GestureController {
    last_manual: Option<Instant>,
    recenter_due: Option<Instant>,
}

impl GestureController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// When the pending snap-back fires, if one is armed.
    #[must_use]
    pub fn recenter_due(&self) -> Option<Instant> {
        self.recenter_due
    }

    /// Instant of the most recent pan.
    #[must_use]
    pub fn last_manual(&self) -> Option<Instant> {
        self.last_manual
    }

    pub fn on_pan_at(
        &mut self,
        follow: &mut FollowController,
        navigating: bool,
        delay: Duration,
        now: Instant,
    ) -> PanEffect {
        self.last_manual = Some(now);
        if navigating {
            follow.suspend();
            let due = now + delay;
            self.recenter_due = Some(due);
            debug!(delay_ms = delay.as_millis(), "pan during navigation: recenter armed");
            return PanEffect::RecenterArmed { due };
        }
        if follow.disable_temporarily() {
            debug!("pan released follow");
            PanEffect::FollowReleased
        } else {
            PanEffect::Ignored
        }
    }

    /// Disarm the countdown if it has expired. Returns whether it fired.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.recenter_due {
            Some(due) if now >= due => {
                self.recenter_due = None;
                true
            }
            _ => false,
        }
    }

    /// Disarm the countdown. Returns whether one was armed.
    pub fn cancel(&mut self) -> bool {
        self.recenter_due.take().is_some()
    }
}
