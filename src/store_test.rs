#![allow(clippy::float_cmp)]

use super::*;
use crate::controller::Drawer;
use crate::geo::Coordinate;
use crate::surface::RecordingSurface;

const PARKING: ControllerId = ControllerId::Drawer(Drawer::Parking);

// =============================================================
// Helpers
// =============================================================

fn ready_store(t0: Instant) -> ViewportStore<RecordingSurface> {
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.surface_ready_at(t0);
    store
}

fn zoom(z: f64) -> CameraPatch {
    CameraPatch::default().with_zoom(z)
}

fn at(lat: f64, lon: f64) -> CameraPatch {
    CameraPatch::centered(Coordinate::new(lat, lon))
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// =============================================================
// Entry point basics
// =============================================================

#[test]
fn applied_request_reaches_surface_and_state() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    assert_eq!(store.apply_at(at(52.0, 13.0).with_zoom(15.0), false, None, t0), ApplyOutcome::Applied);
    assert_eq!(store.state().center, Some(Coordinate::new(52.0, 13.0)));
    assert_eq!(store.state().zoom, 15.0);
    assert_eq!(store.surface().commands().len(), 1);
}

#[test]
fn surface_receives_only_changed_fields() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_at(at(1.0, 1.0).with_zoom(15.0), false, None, t0);
    store.apply_at(at(1.0, 1.0).with_zoom(17.0), false, None, t0);
    let last = store.surface().commands()[1];
    assert_eq!(last.center, None);
    assert_eq!(last.zoom, Some(17.0));
}

#[test]
fn same_patch_twice_renders_once() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let patch = at(48.0, 2.0).with_zoom(12.0).with_pitch(30.0).with_heading(90.0);
    assert_eq!(store.apply_at(patch, false, None, t0), ApplyOutcome::Applied);
    assert_eq!(store.apply_at(patch, false, None, t0), ApplyOutcome::Unchanged);
    assert_eq!(store.surface().commands().len(), 1);
}

#[test]
fn sensor_noise_is_absorbed() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_at(at(48.0, 2.0).with_heading(90.0), false, None, t0);
    let noisy = at(48.00003, 2.00004).with_heading(90.6);
    assert_eq!(store.apply_at(noisy, false, None, t0), ApplyOutcome::Unchanged);
    assert_eq!(store.state().center, Some(Coordinate::new(48.0, 2.0)));
}

#[test]
fn non_finite_request_is_rejected_before_state() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_at(CameraPatch::heading(45.0), false, None, t0);
    let outcome = store.apply_at(CameraPatch::heading(f64::NAN), true, None, t0);
    assert_eq!(outcome, ApplyOutcome::Rejected(RejectReason::InvalidInput));
    assert_eq!(store.state().heading, 45.0);
    assert_eq!(store.surface().commands().len(), 1);
}

#[test]
fn committed_heading_is_normalised_and_surface_turns_short_way() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_at(CameraPatch::heading(350.0), false, None, t0);
    store.apply_at(CameraPatch::heading(370.0), false, None, t0);
    assert!((store.state().heading - 10.0).abs() < 1e-9);
    let sent: Vec<_> = store.surface().commands().iter().filter_map(|c| c.heading).collect();
    assert_eq!(sent, vec![-10.0, 10.0]);
    assert_eq!(store.commanded_heading(), 10.0);
}

#[test]
fn queued_headings_are_unwrapped_in_order() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    for bearing in [350.0, 10.0, 20.0, 30.0] {
        assert_eq!(store.apply_at(CameraPatch::heading(bearing), false, None, t0), ApplyOutcome::Queued);
    }
    store.surface_ready_at(t0);
    store.tick_at(t0 + Duration::from_secs(1));

    let sent: Vec<_> = store.surface().commands().iter().filter_map(|c| c.heading).collect();
    assert_eq!(sent, vec![-10.0, 10.0, 20.0, 30.0]);
}

// =============================================================
// Mutual exclusion (claim)
// =============================================================

#[test]
fn only_holder_mutates_while_claimed() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.claim_at(PARKING, t0);

    let mut z = 10.0;
    for i in 0..10 {
        z += 1.0;
        let requester = if i % 2 == 0 { PARKING } else { ControllerId::Follow };
        let outcome = store.apply_at(zoom(z), false, Some(requester), t0);
        if requester == PARKING {
            assert_eq!(outcome, ApplyOutcome::Applied);
            assert_eq!(store.state().zoom, z);
        } else {
            assert_eq!(outcome, ApplyOutcome::Rejected(RejectReason::ClaimedBy(PARKING)));
            assert_eq!(store.state().zoom, z - 1.0);
        }
    }
}

#[test]
fn anonymous_request_dropped_while_claimed() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.claim_at(PARKING, t0);
    assert!(matches!(store.apply_at(zoom(5.0), false, None, t0), ApplyOutcome::Rejected(_)));
}

#[test]
fn forced_request_bypasses_claim() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.claim_at(PARKING, t0);
    let outcome = store.apply_at(zoom(17.0), true, Some(ControllerId::Navigation), t0);
    assert_eq!(outcome, ApplyOutcome::Applied);
}

#[test]
fn release_by_non_holder_keeps_claim() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.claim_at(PARKING, t0);
    assert!(!store.release_at(Some(ControllerId::Drawer(Drawer::Search)), t0));
    assert_eq!(store.holder_at(t0), Some(PARKING));
    assert!(store.release_at(Some(PARKING), t0));
    assert_eq!(store.apply_at(zoom(9.0), false, Some(ControllerId::Follow), t0), ApplyOutcome::Applied);
}

#[test]
fn claim_expires_after_ttl() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.claim_at(PARKING, t0);
    let later = t0 + CameraConfig::default().claim_ttl;
    store.tick_at(later);
    assert_eq!(store.holder_at(later), None);
    assert_eq!(store.apply_at(zoom(9.0), false, Some(ControllerId::Follow), later), ApplyOutcome::Applied);
}

// =============================================================
// Animation lock
// =============================================================

#[test]
fn lock_blocks_unforced_but_not_forced() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_locked_at(at(10.0, 10.0).with_zoom(16.0), 500, ControllerId::OneShot, t0);
    assert!(store.is_locked_at(t0 + ms(100)));

    for (requester, z) in [(None, 3.0), (Some(ControllerId::Follow), 4.0), (Some(PARKING), 5.0)] {
        let outcome = store.apply_at(zoom(z), false, requester, t0 + ms(100));
        assert_eq!(outcome, ApplyOutcome::Rejected(RejectReason::AnimationLocked));
    }
    assert_eq!(store.state().zoom, 16.0);

    assert_eq!(store.apply_at(zoom(12.0), true, None, t0 + ms(100)), ApplyOutcome::Applied);
    assert_eq!(store.state().zoom, 12.0);
}

#[test]
fn lock_expires_at_duration_plus_margin() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_locked_at(at(10.0, 10.0), 800, ControllerId::OneShot, t0);
    assert!(store.is_locked_at(t0 + ms(1799)));
    assert!(!store.is_locked_at(t0 + ms(1801)));
    // No tick needed: the deadline alone reopens arbitration.
    assert_eq!(store.apply_at(zoom(5.0), false, None, t0 + ms(1801)), ApplyOutcome::Applied);
}

#[test]
fn locked_request_carries_duration() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    store.apply_locked_at(at(1.0, 1.0), 650, ControllerId::OneShot, t0);
    assert_eq!(store.surface().commands()[0].animation_duration_ms, Some(650));
}

#[test]
fn invalid_locked_request_does_not_lock() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let outcome = store.apply_locked_at(at(f64::NAN, 1.0), 650, ControllerId::OneShot, t0);
    assert_eq!(outcome, ApplyOutcome::Rejected(RejectReason::InvalidInput));
    assert!(!store.is_locked_at(t0));
}

// =============================================================
// Pending queue
// =============================================================

#[test]
fn requests_before_ready_are_queued_and_committed() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    assert_eq!(store.apply_at(zoom(11.0), false, None, t0), ApplyOutcome::Queued);
    assert_eq!(store.state().zoom, 11.0);
    assert!(store.surface().commands().is_empty());
    assert_eq!(store.pending_len(), 1);
}

#[test]
fn queue_replays_in_order_with_stagger() {
    let t0 = Instant::now();
    let stagger = CameraConfig::default().queue_stagger;
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.apply_at(zoom(11.0), false, None, t0);
    store.apply_at(zoom(12.0), true, Some(ControllerId::Navigation), t0);
    store.apply_at(zoom(13.0), false, Some(ControllerId::Follow), t0);

    let ready = t0 + ms(500);
    store.surface_ready_at(ready);
    assert_eq!(store.surface().commands().len(), 1);

    store.tick_at(ready + stagger);
    store.tick_at(ready + stagger * 2);
    let zooms: Vec<f64> = store.surface().commands().iter().filter_map(|c| c.zoom).collect();
    assert_eq!(zooms, vec![11.0, 12.0, 13.0]);
    assert_eq!(store.pending_len(), 0);

    store.tick_at(ready + stagger * 10);
    assert_eq!(store.surface().commands().len(), 3);
}

#[test]
fn request_during_replay_waits_its_turn() {
    let t0 = Instant::now();
    let stagger = CameraConfig::default().queue_stagger;
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.apply_at(zoom(11.0), false, None, t0);
    store.apply_at(zoom(12.0), false, None, t0);
    store.surface_ready_at(t0);

    assert_eq!(store.apply_at(zoom(15.0), false, None, t0 + ms(1)), ApplyOutcome::Queued);
    store.tick_at(t0 + stagger * 3);
    let zooms: Vec<f64> = store.surface().commands().iter().filter_map(|c| c.zoom).collect();
    assert_eq!(zooms, vec![11.0, 12.0, 15.0]);

    assert_eq!(store.apply_at(zoom(16.0), false, None, t0 + stagger * 3), ApplyOutcome::Applied);
}

#[test]
fn surface_ready_is_idempotent() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.apply_at(zoom(11.0), false, None, t0);
    store.surface_ready_at(t0);
    store.surface_ready_at(t0 + ms(10));
    assert_eq!(store.surface().commands().len(), 1);
}

#[test]
fn dropped_requests_are_not_queued() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.claim_at(PARKING, t0);
    store.apply_at(zoom(11.0), false, Some(ControllerId::Follow), t0);
    assert_eq!(store.pending_len(), 0);
}

// =============================================================
// Padding
// =============================================================

#[test]
fn padding_forwarded_when_ready() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    assert!(store.set_padding(Padding::bottom(300.0)));
    assert!(!store.set_padding(Padding::bottom(300.0)));
    assert_eq!(store.state().padding, Padding::bottom(300.0));
    assert_eq!(store.surface().commands(), &[SurfaceCommand::padding(Padding::bottom(300.0))]);
}

#[test]
fn padding_set_early_is_pushed_on_ready() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.set_padding(Padding::bottom(120.0));
    assert!(store.surface().commands().is_empty());
    store.surface_ready_at(t0);
    assert_eq!(store.surface().commands()[0].padding, Some(Padding::bottom(120.0)));
}

#[test]
fn padding_set_during_replay_waits_its_turn() {
    let t0 = Instant::now();
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.apply_at(zoom(10.0), false, None, t0);
    store.apply_at(zoom(11.0), false, None, t0);
    store.surface_ready_at(t0);
    assert_eq!(store.pending_len(), 1);

    assert!(store.set_padding_at(Padding::bottom(200.0), t0 + Duration::from_millis(1)));
    assert_eq!(store.state().padding, Padding::bottom(200.0));
    assert_eq!(store.surface().commands().len(), 1);

    store.tick_at(t0 + Duration::from_secs(1));
    let sent = store.surface().commands();
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[1].zoom, Some(11.0));
    assert_eq!(sent[2], SurfaceCommand::padding(Padding::bottom(200.0)));
}

#[test]
fn invalid_padding_is_rejected() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    assert!(!store.set_padding(Padding::bottom(f64::NAN)));
    assert_eq!(store.state().padding, Padding::default());
}
