//! Location staging and delivery through the session.

use std::time::Duration;

use alpharemote::adapters::sim;
use alpharemote::fsm::CameraState;
use alpharemote::protocol::location::{FRAME_LEN, FRAME_LEN_WITH_ZONE};
use alpharemote::protocol::{Capabilities, GattStatus, LocationFix, LocationFrameView, Target};
use alpharemote::RemoteConfig;

use crate::mock_transport::{Harness, ZONE, minimal_caps};

fn fix_at(h: &Harness, latitude: f64, longitude: f64) -> LocationFix {
    LocationFix {
        latitude,
        longitude,
        captured_at: h.clock.now(),
    }
}

fn sent_views(h: &Harness) -> Vec<LocationFrameView> {
    h.transport()
        .writes_to(Target::LocationReceiver)
        .iter()
        .map(|f| LocationFrameView::parse(f).expect("frame parses"))
        .collect()
}

#[test]
fn staged_fix_is_sent_after_enable() {
    let mut h = Harness::new();
    let fix = fix_at(&h, 48.125, -11.5625);
    h.session.submit_location_fix(fix);
    assert_eq!(h.session.staged_fix(), Some(&fix));

    h.ready();

    let frames = h.transport().writes_to(Target::LocationReceiver);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), FRAME_LEN_WITH_ZONE);
    let view = LocationFrameView::parse(&frames[0]).unwrap();
    assert_eq!((view.latitude, view.longitude), (48.125, -11.5625));
    assert_eq!(
        (view.year, view.month, view.day, view.hour, view.minute, view.second),
        (2024, 5, 1, 10, 20, 30)
    );
    assert_eq!(view.zone, Some(ZONE));
    assert_eq!(h.session.staged_fix(), None);
}

#[test]
fn staged_fix_goes_out_after_enable_write() {
    let mut h = Harness::new();
    h.session.submit_location_fix(fix_at(&h, 1.0, 2.0));
    h.connect_with(Capabilities::full());
    loop {
        match h.complete_next() {
            Some(Target::LocationEnabled) => break,
            Some(_) => {}
            None => panic!("bootstrap ended before the enable write"),
        }
    }

    match h.session.in_flight() {
        Some(op) => assert_eq!(op.target(), Target::LocationReceiver),
        None => panic!("location frame not dispatched"),
    }
}

#[test]
fn fix_while_ready_is_sent_immediately() {
    let mut h = Harness::new();
    h.fixtures.data_format = sim::data_format(false);
    h.ready();

    h.clock.advance(Duration::from_secs(60));
    h.session.submit_location_fix(fix_at(&h, -33.75, 151.25));

    let frames = h.transport().writes_to(Target::LocationReceiver);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].len(), FRAME_LEN);
    let view = LocationFrameView::parse(&frames[0]).unwrap();
    assert_eq!((view.latitude, view.longitude), (-33.75, 151.25));
    assert_eq!(view.zone, None);
}

#[test]
fn stale_fix_is_never_written() {
    let mut h = Harness::new();
    h.ready();
    let fix = fix_at(&h, 10.0, 10.0);
    h.clock.advance(Duration::from_secs(31));
    h.session.submit_location_fix(fix);

    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
    assert!(h.state().is_ready());
}

#[test]
fn fix_at_age_limit_is_still_sent() {
    let mut h = Harness::new();
    h.ready();
    let fix = fix_at(&h, 10.0, 10.0);
    h.clock.advance(Duration::from_secs(30));
    h.session.submit_location_fix(fix);
    assert_eq!(h.transport().writes_to(Target::LocationReceiver).len(), 1);
}

#[test]
fn stale_staged_fix_stays_staged() {
    let mut h = Harness::new();
    let fix = fix_at(&h, 10.0, 10.0);
    h.session.submit_location_fix(fix);
    h.clock.advance(Duration::from_secs(45));
    h.ready();

    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
    assert_eq!(h.session.staged_fix(), Some(&fix));
}

#[test]
fn newest_staged_fix_wins() {
    let mut h = Harness::new();
    h.session.submit_location_fix(fix_at(&h, 1.0, 1.0));
    h.clock.advance(Duration::from_secs(1));
    h.session.submit_location_fix(fix_at(&h, 2.5, 3.5));
    h.ready();

    let views = sent_views(&h);
    assert_eq!(views.len(), 1);
    assert_eq!((views[0].latitude, views[0].longitude), (2.5, 3.5));
}

#[test]
fn lock_rejection_is_not_fatal() {
    let mut h = Harness::new();
    h.session.submit_location_fix(fix_at(&h, 5.0, 6.0));
    h.connect_with(Capabilities::full());
    h.settle_failing(Target::LocationLock, GattStatus::FEATURE_DISABLED);

    assert!(h.state().is_ready());
    assert_eq!(sent_views(&h).len(), 1);
}

#[test]
fn enable_failure_keeps_fix_staged() {
    let mut h = Harness::new();
    let fix = fix_at(&h, 5.0, 6.0);
    h.session.submit_location_fix(fix);
    h.connect_with(Capabilities::full());
    h.settle_failing(Target::LocationEnabled, GattStatus(0x03));

    assert!(h.state().is_ready());
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
    assert_eq!(h.session.staged_fix(), Some(&fix));

    // a later fix is staged as well
    h.session.submit_location_fix(fix_at(&h, 7.0, 8.0));
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
}

#[test]
fn data_format_failure_disables_location() {
    let mut h = Harness::new();
    h.session.submit_location_fix(fix_at(&h, 5.0, 6.0));
    h.connect_with(Capabilities::full());
    h.settle_failing(Target::LocationDataFormat, GattStatus(0x02));

    assert!(h.state().is_ready());
    // configuration writes still go out
    assert_eq!(h.transport().writes_to(Target::LocationEnabled), vec![vec![0x01]]);
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
}

#[test]
fn camera_without_location_stages_fixes() {
    let mut h = Harness::new();
    h.ready_with(minimal_caps());
    let fix = fix_at(&h, 5.0, 6.0);
    h.session.submit_location_fix(fix);
    assert_eq!(h.session.staged_fix(), Some(&fix));
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
}

#[test]
fn location_sync_off_drops_fixes() {
    let config = RemoteConfig {
        location_sync: false,
        ..Default::default()
    };
    let mut h = Harness::with_config(config);
    h.session.submit_location_fix(fix_at(&h, 5.0, 6.0));
    h.ready();

    assert_eq!(h.session.staged_fix(), None);
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
}

#[test]
fn staged_fix_survives_reconnect() {
    let mut h = Harness::new();
    let fix = fix_at(&h, 5.0, 6.0);
    h.session.submit_location_fix(fix);
    h.connect_with(Capabilities::full());
    h.event(alpharemote::TransportEvent::Disconnected);
    assert_eq!(*h.state(), CameraState::Gone);
    assert_eq!(h.session.staged_fix(), Some(&fix));

    h.ready();
    assert_eq!(sent_views(&h).len(), 1);
}

#[test]
fn fix_after_disconnect_is_staged_until_next_session() {
    let mut h = Harness::new();
    h.ready();
    h.event(alpharemote::TransportEvent::Disconnected);
    h.session.submit_location_fix(fix_at(&h, 5.0, 6.0));
    assert!(h.session.staged_fix().is_some());
    assert!(h.transport().writes_to(Target::LocationReceiver).is_empty());
}
