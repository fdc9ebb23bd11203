//! Requests issued before the rendering surface is ready.
//!
//! DESIGN
//! ======
//! Entries buffer in insertion order while the surface is still loading.
//! When the surface reports ready the queue is scheduled once: entry `i`
//! becomes due `i * stagger` after readiness, so the surface is not hit by a
//! burst. Anything pushed while replay is still draining is scheduled behind
//! the last entry, which keeps FIFO order across the handover. Padding
//! changes travel through the same queue as camera moves, so an inset set
//! mid-replay lands after the moves issued before it. Drained entries are
//! gone; nothing is replayed twice.

#[cfg(test)]
#[path = "queue_test.rs"]
mod queue_test;

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::camera::SurfaceCommand;
use crate::controller::ControllerId;
use crate::geo::Padding;

/// A request captured with the arbitration context it was issued under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingRequest {
    pub command: SurfaceCommand,
    pub forced: bool,
    pub controller: Option<ControllerId>,
}

impl PendingRequest {
    #[must_use]
    pub fn new(command: SurfaceCommand, forced: bool, controller: Option<ControllerId>) -> Self {
        Self { command, forced, controller }
    }

    /// A padding change; it carries no controller and is never arbitrated.
    #[must_use]
    pub fn padding(padding: Padding) -> Self {
        Self { command: SurfaceCommand::padding(padding), forced: false, controller: None }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    request: PendingRequest,
    /// `None` until replay has been scheduled.
    due: Option<Instant>,
}

/// FIFO buffer with one-shot staggered replay.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: VecDeque<Entry>,
    stagger: Duration,
    replay_started: bool,
}

impl PendingQueue {
    #[must_use]
    pub fn new(stagger: Duration) -> Self {
        Self { entries: VecDeque::new(), stagger, replay_started: false }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replay has been scheduled and entries are still waiting to drain.
    #[must_use]
    pub fn is_replaying(&self) -> bool {
        self.replay_started && !self.entries.is_empty()
    }

    /// Append a request. During replay it is scheduled behind the last entry.
    pub fn push(&mut self, request: PendingRequest, now: Instant) {
        let due = if self.replay_started {
            let after_last = self
                .entries
                .back()
                .and_then(|e| e.due)
                .map_or(now, |last| last + self.stagger);
            Some(after_last.max(now))
        } else {
            None
        };
        self.entries.push_back(Entry { request, due });
    }

    /// Schedule replay starting at `now`. Only the first call has any effect.
    pub fn start_replay(&mut self, now: Instant) -> bool {
        if self.replay_started {
            return false;
        }
        self.replay_started = true;
        let mut due = now;
        for entry in &mut self.entries {
            entry.due = Some(due);
            due += self.stagger;
        }
        true
    }

    /// Remove and return every entry due at or before `now`, in order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<PendingRequest> {
        let mut out = Vec::new();
        while let Some(entry) = self.entries.front() {
            match entry.due {
                Some(due) if due <= now => {}
                _ => break,
            }
            if let Some(entry) = self.entries.pop_front() {
                out.push(entry.request);
            }
        }
        out
    }

    /// When the next replay entry becomes due, for hosts that schedule wakeups.
    #[must_use]
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.front().and_then(|e| e.due)
    }
}
