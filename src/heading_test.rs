#![allow(clippy::float_cmp)]

use std::time::Duration;

use super::*;
use crate::arbitration::RejectReason;
use crate::config::CameraConfig;
use crate::controller::Drawer;
use crate::surface::RecordingSurface;

fn ready_store(t0: Instant) -> ViewportStore<RecordingSurface> {
    let mut store = ViewportStore::new(RecordingSurface::new(), &CameraConfig::default());
    store.surface_ready_at(t0);
    store
}

fn driving() -> HeadingTuning {
    CameraConfig::default().heading.driving
}

fn walking() -> HeadingTuning {
    CameraConfig::default().heading.walking
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn sent_headings(store: &ViewportStore<RecordingSurface>) -> Vec<f64> {
    store.surface().commands().iter().filter_map(|c| c.heading).collect()
}

// =============================================================
// Wraparound
// =============================================================

#[test]
fn crossing_north_rotates_the_short_way() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();

    heading.on_heading_at(&mut store, 350.0, &driving(), true, t0);
    heading.on_heading_at(&mut store, 10.0, &driving(), true, t0 + ms(150));

    assert_eq!(sent_headings(&store), vec![-10.0, 10.0]);
    assert_eq!(store.state().heading, 10.0);
}

#[test]
fn repeated_north_crossings_never_turn_more_than_half() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();

    for (i, bearing) in [350.0, 10.0, 20.0, 30.0, 350.0, 10.0, 340.0].into_iter().enumerate() {
        let now = t0 + ms(200 * u64::try_from(i).unwrap());
        assert!(heading.on_heading_at(&mut store, bearing, &driving(), true, now).is_some());
    }

    let sent = sent_headings(&store);
    assert_eq!(sent, vec![-10.0, 10.0, 20.0, 30.0, -10.0, 10.0, -20.0]);
    assert!(sent.windows(2).all(|w| (w[1] - w[0]).abs() <= 180.0));
    assert_eq!(store.state().heading, 340.0);
}

#[test]
fn continuous_spin_keeps_commanding_forward() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();

    let bearings = [100.0, 200.0, 300.0, 40.0, 140.0, 240.0, 340.0, 80.0];
    for (i, bearing) in bearings.into_iter().enumerate() {
        let now = t0 + ms(200 * u64::try_from(i).unwrap());
        heading.on_heading_at(&mut store, bearing, &driving(), true, now);
    }

    assert_eq!(sent_headings(&store), vec![100.0, 200.0, 300.0, 400.0, 500.0, 600.0, 700.0, 800.0]);
    assert_eq!(store.commanded_heading(), 800.0);
    assert_eq!(store.state().heading, 80.0);
}

#[test]
fn dead_zone_is_measured_across_the_seam() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();

    heading.on_heading_at(&mut store, 340.0, &walking(), true, t0);
    heading.on_heading_at(&mut store, 359.0, &walking(), true, t0 + ms(300));
    let out = heading.on_heading_at(&mut store, 2.0, &walking(), true, t0 + ms(600));
    assert_eq!(out, None);
    assert_eq!(sent_headings(&store), vec![-20.0, -1.0]);
}

#[test]
fn readings_outside_range_are_normalised() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    heading.on_heading_at(&mut store, 450.0, &driving(), true, t0);
    assert_eq!(store.state().heading, 90.0);
}

// =============================================================
// Throttle and dead zone
// =============================================================

#[test]
fn readings_inside_throttle_window_are_dropped() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    heading.on_heading_at(&mut store, 90.0, &driving(), true, t0);
    assert_eq!(heading.on_heading_at(&mut store, 120.0, &driving(), true, t0 + ms(50)), None);
    assert!(heading.on_heading_at(&mut store, 120.0, &driving(), true, t0 + ms(100)).is_some());
}

#[test]
fn small_turns_are_absorbed_per_profile() {
    let t0 = Instant::now();

    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    heading.on_heading_at(&mut store, 90.0, &driving(), true, t0);
    assert!(heading.on_heading_at(&mut store, 93.0, &driving(), true, t0 + ms(500)).is_some());

    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    heading.on_heading_at(&mut store, 90.0, &walking(), true, t0);
    assert_eq!(heading.on_heading_at(&mut store, 93.0, &walking(), true, t0 + ms(500)), None);
}

#[test]
fn non_finite_reading_is_a_no_op() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    assert_eq!(heading.on_heading_at(&mut store, f64::NAN, &driving(), true, t0), None);
    assert_eq!(heading.on_heading_at(&mut store, f64::INFINITY, &driving(), true, t0), None);
    assert!(store.surface().commands().is_empty());
}

// =============================================================
// Modes and arbitration
// =============================================================

#[test]
fn north_up_ignores_compass_outside_navigation() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    assert_eq!(heading.mode(), HeadingMode::NorthUp);
    assert_eq!(heading.on_heading_at(&mut store, 90.0, &walking(), false, t0), None);
}

#[test]
fn follow_device_rotates_unforced() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    assert!(heading.set_mode(HeadingMode::FollowDevice));
    assert!(!heading.set_mode(HeadingMode::FollowDevice));

    store.claim_at(ControllerId::Drawer(Drawer::PlaceDetails), t0);
    let out = heading.on_heading_at(&mut store, 90.0, &walking(), false, t0);
    assert_eq!(
        out,
        Some(ApplyOutcome::Rejected(RejectReason::ClaimedBy(ControllerId::Drawer(Drawer::PlaceDetails))))
    );
}

#[test]
fn rejected_reading_does_not_start_throttle() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    heading.set_mode(HeadingMode::FollowDevice);
    store.claim_at(ControllerId::Drawer(Drawer::Search), t0);
    heading.on_heading_at(&mut store, 90.0, &walking(), false, t0);
    store.release_at(None, t0 + ms(1));
    assert_eq!(
        heading.on_heading_at(&mut store, 90.0, &walking(), false, t0 + ms(2)),
        Some(ApplyOutcome::Applied)
    );
}

#[test]
fn navigation_heading_is_forced_through_claims() {
    let t0 = Instant::now();
    let mut store = ready_store(t0);
    let mut heading = HeadingController::new();
    store.claim_at(ControllerId::Drawer(Drawer::Search), t0);
    assert_eq!(
        heading.on_heading_at(&mut store, 45.0, &driving(), true, t0),
        Some(ApplyOutcome::Applied)
    );
}
