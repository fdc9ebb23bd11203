//! Arbitration between camera producers.
//!
//! DESIGN
//! ======
//! Two independent axes decide whether an unforced request lands:
//! - **locked**: an in-flight locked animation ([`AnimationLock`]).
//! - **claimed**: a drawer holding exclusive ownership ([`Ownership`]).
//!
//! | locked | claimed       | unforced | forced  |
//! |--------|---------------|----------|---------|
//! | no     | no            | applied  | applied |
//! | no     | yes, same id  | applied  | applied |
//! | no     | yes, other id | dropped  | applied |
//! | yes    | any           | dropped  | applied |
//!
//! Both axes are deadlines checked against the monotonic clock on every call,
//! never timer callbacks, so a request landing in the same instant the timer
//! would have fired sees one consistent answer. Each axis has a bounded
//! lifetime: nothing stays locked or claimed forever.

#[cfg(test)]
#[path = "arbitration_test.rs"]
mod arbitration_test;

use std::time::{Duration, Instant};

use crate::controller::ControllerId;

/// Why a request did not mutate the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A locked animation is in flight.
    AnimationLocked,
    /// Another controller holds exclusive ownership.
    ClaimedBy(ControllerId),
    /// A numeric field was NaN or infinite.
    InvalidInput,
}

/// Result of running a request through the arbitration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Apply,
    Reject(RejectReason),
}

/// The arbitration table. Pure: callers resolve the lock and holder at `now` first.
#[must_use]
pub fn arbitrate(
    locked: bool,
    holder: Option<ControllerId>,
    requester: Option<ControllerId>,
    forced: bool,
) -> Verdict {
    if forced {
        return Verdict::Apply;
    }
    if locked {
        return Verdict::Reject(RejectReason::AnimationLocked);
    }
    match holder {
        Some(holder) if requester != Some(holder) => Verdict::Reject(RejectReason::ClaimedBy(holder)),
        _ => Verdict::Apply,
    }
}

// =============================================================================
// ANIMATION LOCK
// =============================================================================

/// Time-boxed lock held while a fly-to animation plays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationLock {
    #[default]
    Unlocked,
    Locked { expires_at: Instant },
}

impl AnimationLock {
    #[must_use]
    pub fn is_active(&self, now: Instant) -> bool {
        match self {
            Self::Unlocked => false,
            Self::Locked { expires_at } => now < *expires_at,
        }
    }

    /// Lock until `expires_at`. An overlapping lock keeps the later expiry.
    pub fn lock_until(&mut self, expires_at: Instant) {
        let expires_at = match *self {
            Self::Locked { expires_at: current } if current > expires_at => current,
            _ => expires_at,
        };
        *self = Self::Locked { expires_at };
    }

    /// Drop an expired lock. Returns true when this call cleared it.
    pub fn expire(&mut self, now: Instant) -> bool {
        match *self {
            Self::Locked { expires_at } if now >= expires_at => {
                *self = Self::Unlocked;
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Exclusive camera ownership held by at most one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ownership {
    #[default]
    Open,
    Claimed { holder: ControllerId, expires_at: Instant },
}

impl Ownership {
    /// Current holder, treating an expired claim as released.
    #[must_use]
    pub fn holder(&self, now: Instant) -> Option<ControllerId> {
        match self {
            Self::Claimed { holder, expires_at } if now < *expires_at => Some(*holder),
            _ => None,
        }
    }

    /// Take ownership for `ttl`. Returns the previous live holder when a
    /// different controller is displaced.
    pub fn claim(&mut self, id: ControllerId, now: Instant, ttl: Duration) -> Option<ControllerId> {
        let displaced = self.holder(now).filter(|holder| *holder != id);
        *self = Self::Claimed { holder: id, expires_at: now + ttl };
        displaced
    }

    /// Release ownership.
    ///
    /// `Some(id)` only releases when `id` is the holder; `None` releases
    /// whoever holds it. Returns true when a live claim was cleared.
    pub fn release(&mut self, id: Option<ControllerId>, now: Instant) -> bool {
        let Some(holder) = self.holder(now) else {
            *self = Self::Open;
            return false;
        };
        if id.is_some_and(|id| id != holder) {
            return false;
        }
        *self = Self::Open;
        true
    }

    /// Drop an expired claim, returning the controller whose claim lapsed.
    pub fn expire(&mut self, now: Instant) -> Option<ControllerId> {
        match *self {
            Self::Claimed { holder, expires_at } if now >= expires_at => {
                *self = Self::Open;
                Some(holder)
            }
            _ => None,
        }
    }
}
