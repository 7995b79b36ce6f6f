//! Mock transport, clock and observer for integration tests.
//!
//! The transport records every call so tests can assert on the exact
//! GATT traffic; completions are fed back by the test through
//! [`Harness`], never by the mock itself.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use alpharemote::adapters::sim;
use alpharemote::app::ports::{Clock, GattTransport, StateObserver};
use alpharemote::app::service::CameraSession;
use alpharemote::error::TransportError;
use alpharemote::fsm::CameraState;
use alpharemote::protocol::{Capabilities, GattStatus, Target, ZoneOffsets};
use alpharemote::serializer::Operation;
use alpharemote::{RemoteConfig, TransportEvent};
use chrono::{DateTime, TimeZone, Utc};

// ── Transport call record ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Connect,
    Disconnect,
    Discover,
    Write { target: Target, payload: Vec<u8> },
    Read(Target),
    Subscribe(Target),
}

impl TransportCall {
    pub fn is_gatt_op(&self) -> bool {
        matches!(self, Self::Write { .. } | Self::Read(_) | Self::Subscribe(_))
    }
}

// ── MockTransport ─────────────────────────────────────────────

pub struct MockTransport {
    pub calls: Vec<TransportCall>,
    pub bonded: Result<bool, TransportError>,
    /// Error returned by the next `issue_*`.
    pub fail_next: Rc<Cell<Option<TransportError>>>,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            bonded: Ok(true),
            fail_next: Rc::new(Cell::new(None)),
        }
    }

    pub fn gatt_ops(&self) -> Vec<TransportCall> {
        self.calls.iter().filter(|c| c.is_gatt_op()).cloned().collect()
    }

    pub fn writes_to(&self, target: Target) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Write { target: t, payload } if *t == target => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    fn issue(&mut self, call: TransportCall) -> Result<(), TransportError> {
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        self.calls.push(call);
        Ok(())
    }
}

impl GattTransport for MockTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Connect);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.calls.push(TransportCall::Disconnect);
    }

    fn discover(&mut self) -> Result<(), TransportError> {
        self.calls.push(TransportCall::Discover);
        Ok(())
    }

    fn is_bonded(&self) -> Result<bool, TransportError> {
        self.bonded
    }

    fn address(&self) -> &str {
        "D0:40:EF:AA:BB:CC"
    }

    fn issue_write(&mut self, target: Target, payload: &[u8]) -> Result<(), TransportError> {
        self.issue(TransportCall::Write {
            target,
            payload: payload.to_vec(),
        })
    }

    fn issue_read(&mut self, target: Target) -> Result<(), TransportError> {
        self.issue(TransportCall::Read(target))
    }

    fn issue_subscribe(&mut self, target: Target) -> Result<(), TransportError> {
        self.issue(TransportCall::Subscribe(target))
    }
}

// ── ManualClock ───────────────────────────────────────────────

/// Monotonic time advanced by the test; wall clock pinned.
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

#[allow(dead_code)]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }
}

pub const ZONE: ZoneOffsets = ZoneOffsets {
    raw_minutes: 60,
    dst_minutes: 60,
};

impl Clock for ManualClock {
    fn monotonic(&self) -> Duration {
        self.now.get()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap()
    }

    fn zone_offsets(&self) -> ZoneOffsets {
        ZONE
    }
}

// ── RecordingObserver ─────────────────────────────────────────

#[derive(Default)]
pub struct RecordingObserver {
    pub states: Vec<CameraState>,
}

impl StateObserver for RecordingObserver {
    fn on_state(&mut self, state: &CameraState) {
        self.states.push(state.clone());
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type TestSession = CameraSession<MockTransport, ManualClock, RecordingObserver>;

pub const CAMERA_NAME: &str = "ILCE-7M4";

/// Values the mock camera answers reads with.
pub struct Fixtures {
    pub name: Vec<u8>,
    pub media: Vec<u8>,
    pub battery: Vec<u8>,
    pub data_format: Vec<u8>,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            name: CAMERA_NAME.as_bytes().to_vec(),
            media: sim::media_shots_frame(420),
            battery: sim::battery_frame(83, true),
            data_format: sim::data_format(true),
        }
    }
}

pub struct Harness {
    pub session: TestSession,
    pub clock: ManualClock,
    pub fixtures: Fixtures,
    pub fail_next: Rc<Cell<Option<TransportError>>>,
}

#[allow(dead_code)]
impl Harness {
    pub fn new() -> Self {
        Self::with_config(RemoteConfig::default())
    }

    pub fn with_config(config: RemoteConfig) -> Self {
        Self::with_transport(MockTransport::new(), config)
    }

    pub fn with_transport(transport: MockTransport, config: RemoteConfig) -> Self {
        let clock = ManualClock::default();
        let fail_next = transport.fail_next.clone();
        Self {
            session: CameraSession::new(transport, clock.clone(), RecordingObserver::default(), config),
            clock,
            fixtures: Fixtures::default(),
            fail_next,
        }
    }

    pub fn transport(&self) -> &MockTransport {
        self.session.transport()
    }

    pub fn state(&self) -> &CameraState {
        self.session.state()
    }

    /// Every snapshot the observer saw, oldest first.
    pub fn states(&self) -> &[CameraState] {
        &self.session.observer().states
    }

    pub fn state_names(&self) -> Vec<&'static str> {
        self.states().iter().map(CameraState::name).collect()
    }

    pub fn event(&mut self, event: TransportEvent) {
        self.session.handle_event(event);
    }

    /// Request a session and answer the connect and discovery steps.
    pub fn connect_with(&mut self, caps: Capabilities) {
        self.session.request_session();
        self.event(TransportEvent::Connected);
        self.event(TransportEvent::ServicesDiscovered(Ok(caps)));
    }

    /// Complete the in-flight operation with `status`; reads answer from
    /// the fixtures.  Returns the completed operation's target.
    pub fn complete_with(&mut self, status: GattStatus) -> Option<Target> {
        let (target, event) = match self.session.in_flight()? {
            Operation::Write { target, .. } => (
                *target,
                TransportEvent::WriteComplete {
                    target: *target,
                    status,
                },
            ),
            Operation::Subscribe { target } => (
                *target,
                TransportEvent::SubscribeComplete {
                    target: *target,
                    status,
                },
            ),
            Operation::Read { target, .. } => (
                *target,
                TransportEvent::ReadComplete {
                    target: *target,
                    status,
                    value: if status.is_success() {
                        self.read_value(*target)
                    } else {
                        Vec::new()
                    },
                },
            ),
        };
        self.event(event);
        Some(target)
    }

    pub fn complete_next(&mut self) -> Option<Target> {
        self.complete_with(GattStatus::SUCCESS)
    }

    /// Successfully complete operations until the queue drains.
    pub fn settle(&mut self) {
        while self.complete_next().is_some() {}
    }

    /// Like [`settle`](Self::settle), but operations on `failing` complete
    /// with `status`.
    pub fn settle_failing(&mut self, failing: Target, status: GattStatus) {
        loop {
            let target = match self.session.in_flight() {
                Some(op) => op.target(),
                None => break,
            };
            let status = if target == failing {
                status
            } else {
                GattStatus::SUCCESS
            };
            self.complete_with(status);
        }
    }

    /// Connect with `caps` and run the bootstrap to completion.
    pub fn ready_with(&mut self, caps: Capabilities) {
        self.connect_with(caps);
        self.settle();
        assert!(self.state().is_ready(), "expected Ready, got {}", self.state());
    }

    pub fn ready(&mut self) {
        self.ready_with(Capabilities::full());
    }

    pub fn notify(&mut self, target: Target, value: &[u8]) {
        self.event(TransportEvent::Notification {
            target,
            value: value.to_vec(),
        });
    }

    fn read_value(&self, target: Target) -> Vec<u8> {
        match target {
            Target::DeviceName => self.fixtures.name.clone(),
            Target::CameraMedia => self.fixtures.media.clone(),
            Target::CameraBattery => self.fixtures.battery.clone(),
            Target::LocationDataFormat => self.fixtures.data_format.clone(),
            _ => Vec::new(),
        }
    }
}

/// Capabilities of a camera without the optional services.
pub fn minimal_caps() -> Capabilities {
    Capabilities::from_targets(Capabilities::REQUIRED)
}
