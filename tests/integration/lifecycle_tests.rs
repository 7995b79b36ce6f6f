//! Link lifecycle: disconnects, bond changes, attribute-table changes and
//! transport failures.

use alpharemote::error::{Error, TransportError};
use alpharemote::fsm::CameraState;
use alpharemote::protocol::{ButtonCode, Capabilities, GattStatus, Target};
use alpharemote::{ActionStep, TransportEvent};

use crate::mock_transport::{CAMERA_NAME, Harness, TransportCall, minimal_caps};

fn count(h: &Harness, call: &TransportCall) -> usize {
    h.transport().calls.iter().filter(|c| *c == call).count()
}

#[test]
fn disconnect_event_goes_gone_and_drops_queue() {
    let mut h = Harness::new();
    h.ready();
    h.session.execute_action(ActionStep::press(ButtonCode::ShutterFull));
    assert!(h.session.in_flight().is_some());

    h.event(TransportEvent::Disconnected);
    assert_eq!(*h.state(), CameraState::Gone);
    assert!(h.session.is_idle());

    // completion for the dropped write arrives late
    let seen = h.states().len();
    h.event(TransportEvent::WriteComplete {
        target: Target::RemoteCommand,
        status: GattStatus::SUCCESS,
    });
    assert_eq!(*h.state(), CameraState::Gone);
    assert_eq!(h.states().len(), seen);
}

#[test]
fn disconnect_intent_tears_down_link() {
    let mut h = Harness::new();
    h.ready();
    h.session.disconnect();

    assert_eq!(*h.state(), CameraState::Gone);
    assert_eq!(h.transport().calls.last(), Some(&TransportCall::Disconnect));
    assert!(h.session.is_idle());
    assert_eq!(h.session.capabilities(), Capabilities::empty());
}

#[test]
fn disconnect_intent_while_gone_publishes_nothing() {
    let mut h = Harness::new();
    h.session.disconnect();
    assert!(h.states().is_empty());
}

#[test]
fn services_changed_mid_bootstrap_restarts_discovery() {
    let mut h = Harness::new();
    h.connect_with(Capabilities::full());
    h.complete_next();
    assert!(matches!(h.state(), CameraState::Identified { .. }));

    h.event(TransportEvent::ServicesChanged);
    assert_eq!(*h.state(), CameraState::Connecting);
    assert!(h.session.is_idle());
    assert_eq!(count(&h, &TransportCall::Discover), 2);

    // stale ack from the abandoned bootstrap
    h.event(TransportEvent::SubscribeComplete {
        target: Target::RemoteStatus,
        status: GattStatus::SUCCESS,
    });
    assert_eq!(*h.state(), CameraState::Connecting);

    h.event(TransportEvent::ServicesDiscovered(Ok(Capabilities::full())));
    h.settle();
    let ready = h.state().as_ready().unwrap();
    assert_eq!(ready.name.as_deref(), Some(CAMERA_NAME));
}

#[test]
fn services_changed_without_session_is_ignored() {
    let mut h = Harness::new();
    h.event(TransportEvent::ServicesChanged);
    assert_eq!(*h.state(), CameraState::Gone);
    assert_eq!(count(&h, &TransportCall::Discover), 0);
}

#[test]
fn services_changed_while_ready_rebuilds_session() {
    let mut h = Harness::new();
    h.ready();
    h.notify(Target::RemoteStatus, &[0x02, 0xd5, 0x20]);

    h.event(TransportEvent::ServicesChanged);
    h.event(TransportEvent::ServicesDiscovered(Ok(minimal_caps())));
    h.settle();

    let ready = h.state().as_ready().unwrap();
    assert!(!ready.recording.state);
    assert!(ready.media_status.is_none());
    assert_eq!(h.session.capabilities(), minimal_caps());
}

#[test]
fn disconnect_keeps_error_visible() {
    let mut h = Harness::new();
    h.connect_with(Capabilities::from_targets([Target::RemoteCommand]));
    let missing = CameraState::error(None, "Remote service not found.");
    assert_eq!(*h.state(), missing);

    h.event(TransportEvent::Disconnected);
    assert_eq!(*h.state(), missing);
}

#[test]
fn late_discovery_result_is_ignored() {
    let mut h = Harness::new();
    h.ready();
    h.event(TransportEvent::ServicesDiscovered(Ok(minimal_caps())));
    h.event(TransportEvent::Connected);
    assert!(h.state().is_ready());
    assert_eq!(h.session.capabilities(), Capabilities::full());
    assert_eq!(count(&h, &TransportCall::Discover), 1);
}

#[test]
fn bond_loss_and_recovery() {
    let mut h = Harness::new();
    h.ready();

    h.event(TransportEvent::BondStateChanged { bonded: false });
    assert_eq!(*h.state(), CameraState::NotBonded);
    assert_eq!(h.transport().calls.last(), Some(&TransportCall::Disconnect));
    assert!(h.session.is_idle());

    h.event(TransportEvent::BondStateChanged { bonded: true });
    assert_eq!(*h.state(), CameraState::Connecting);
    assert_eq!(h.transport().calls.last(), Some(&TransportCall::Connect));
}

#[test]
fn bond_change_during_bootstrap_is_ignored() {
    let mut h = Harness::new();
    h.connect_with(Capabilities::full());
    h.event(TransportEvent::BondStateChanged { bonded: false });
    assert_eq!(*h.state(), CameraState::Connecting);
}

#[test]
fn reconnect_starts_from_fresh_baseline() {
    let mut h = Harness::new();
    h.ready();
    h.session.execute_action(ActionStep::press(ButtonCode::ShutterFull));
    h.complete_next();
    h.notify(Target::RemoteStatus, &[0x02, 0xa0, 0x20]);

    h.event(TransportEvent::Disconnected);
    h.fixtures.battery = alpharemote::adapters::sim::battery_frame(50, false);
    h.ready();

    let ready = h.state().as_ready().unwrap();
    assert!(!ready.shutter.state);
    assert_eq!(ready.shutter.last_change, None);
    assert!(ready.pressed_buttons.is_empty());
    assert_eq!(ready.name.as_deref(), Some(CAMERA_NAME));
    assert_eq!(ready.battery_status.as_ref().map(|b| b.percentage), Some(50));
}

#[test]
fn dispatch_failure_reports_transport_cause() {
    let mut h = Harness::new();
    h.ready();
    h.fail_next.set(Some(TransportError::NotConnected));
    h.session.execute_action(ActionStep::press(ButtonCode::AfOn));

    assert_eq!(
        *h.state(),
        CameraState::Error {
            cause: Some(Error::Transport(TransportError::NotConnected)),
            description: "Bluetooth operation failed.".into(),
        }
    );
    assert!(h.session.is_idle());
}

#[test]
fn dispatch_failure_after_completion_reports_error() {
    let mut h = Harness::new();
    h.ready();
    h.session.execute_action(ActionStep::press(ButtonCode::ShutterHalf));
    h.session.execute_action(ActionStep::press(ButtonCode::ShutterFull));

    // the second write fails when dispatched from the first completion
    h.fail_next.set(Some(TransportError::PermissionDenied));
    h.complete_next();
    assert!(matches!(
        h.state(),
        CameraState::Error {
            cause: Some(Error::Transport(TransportError::PermissionDenied)),
            ..
        }
    ));
}
