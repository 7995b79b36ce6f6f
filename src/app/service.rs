//! Camera session: the hexagonal core.
//!
//! [`CameraSession`] owns the authoritative [`CameraState`], the GATT
//! operation queue and the location stager.  It consumes
//! [`TransportEvent`]s and application intents and drives the platform
//! through the [`GattTransport`] port.
//!
//! ```text
//!  TransportEvent ──▶ ┌──────────────────────────┐ ──▶ StateObserver
//!                     │      CameraSession        │
//!  ActionStep ──────▶ │ state · queue · location  │ ──▶ GattTransport
//!  LocationFix ─────▶ └──────────────────────────┘
//! ```
//!
//! The session is single-threaded; [`SharedSession`](crate::shared::SharedSession)
//! supplies the critical section when several contexts feed it.

use log::{debug, error, info, warn};

use crate::config::RemoteConfig;
use crate::error::{Error, TransportError};
use crate::fsm::{CameraState, ReadyState};
use crate::protocol::command::{self, StatusFlag};
use crate::protocol::location::CONFIG_ON;
use crate::protocol::telemetry;
use crate::protocol::{Capabilities, GattStatus, HexBytes, LocationFix, Target};
use crate::serializer::{OpKind, Operation, OperationQueue};

use super::commands::ActionStep;
use super::events::TransportEvent;
use super::location::{Disposition, LocationStager};
use super::ports::{Clock, GattTransport, StateObserver};

/// What a completed read feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadHandler {
    DeviceName,
    MediaPriming,
    BatteryPriming,
    LocationFormat,
}

pub type SessionOperation = Operation<ReadHandler>;

const MSG_DISCOVERY_FAILED: &str = "Service discovery failed.";
const MSG_SERVICE_MISSING: &str = "Remote service not found.";
const MSG_OPERATION_FAILED: &str = "Bluetooth operation failed.";
const MSG_BOND_QUERY_FAILED: &str = "Could not query bond state.";
const MSG_CONNECT_FAILED: &str = "Could not connect.";

// ───────────────────────────────────────────────────────────────
// CameraSession
// ───────────────────────────────────────────────────────────────

pub struct CameraSession<T, C, O> {
    transport: T,
    clock: C,
    observer: O,
    config: RemoteConfig,
    state: CameraState,
    queue: OperationQueue<ReadHandler>,
    caps: Capabilities,
    location: LocationStager,
    /// Name from the bootstrap read, carried into every `Ready` baseline.
    name: Option<String>,
}

impl<T, C, O> CameraSession<T, C, O>
where
    T: GattTransport,
    C: Clock,
    O: StateObserver,
{
    /// Build an idle session in `Gone`.  Nothing is sent until
    /// [`request_session`](Self::request_session).
    pub fn new(transport: T, clock: C, observer: O, config: RemoteConfig) -> Self {
        Self {
            transport,
            clock,
            observer,
            config,
            state: CameraState::Gone,
            queue: OperationQueue::new(),
            caps: Capabilities::empty(),
            location: LocationStager::new(),
            name: None,
        }
    }

    // ── Intents ───────────────────────────────────────────────

    /// Connect if bonded, otherwise report `NotBonded`.  A no-op while a
    /// session is already up or being set up.
    pub fn request_session(&mut self) {
        match self.state {
            CameraState::Connecting
            | CameraState::Identified { .. }
            | CameraState::Ready(_)
            | CameraState::RemoteDisabled => {
                debug!("Session already active ({})", self.state.name());
            }
            CameraState::Gone | CameraState::NotBonded | CameraState::Error { .. } => {
                match self.transport.is_bonded() {
                    Ok(true) => self.connect(),
                    Ok(false) => self.transition(CameraState::NotBonded),
                    Err(e) => self.fail(Some(e.into()), MSG_BOND_QUERY_FAILED),
                }
            }
        }
    }

    /// Tear the link down and go to `Gone`.
    pub fn disconnect(&mut self) {
        info!("Disconnect requested");
        self.drop_link_state();
        self.transport.disconnect();
        if self.state != CameraState::Gone {
            self.transition(CameraState::Gone);
        }
    }

    /// Run one action step.  Only honoured in `Ready`.
    pub fn execute_action(&mut self, step: ActionStep) {
        let Some(ready) = self.state.as_ready_mut() else {
            debug!("Action {:?} ignored in {}", step, self.state.name());
            return;
        };
        let frame = match step {
            ActionStep::Button { button, pressed } => {
                ready.pressed_buttons.set(button, pressed);
                command::encode_button(button, pressed)
            }
            ActionStep::Jog { jog, pressed, step } => {
                ready.pressed_jogs.set(jog, pressed);
                command::encode_jog(jog, pressed, step)
            }
            ActionStep::Countdown(_) | ActionStep::WaitFor(_) => {
                debug!("Action {:?} has no transport effect", step);
                return;
            }
        };
        self.publish();
        self.enqueue_write(Target::RemoteCommand, &frame);
    }

    /// Send `fix` now if location is configured, otherwise stage it.
    pub fn submit_location_fix(&mut self, fix: LocationFix) {
        if !self.config.location_sync {
            debug!("Location sync disabled, fix dropped");
            return;
        }
        match self
            .location
            .offer(fix, &self.clock, self.config.max_fix_age())
        {
            Disposition::Send(frame) => self.enqueue_write(Target::LocationReceiver, &frame),
            Disposition::Staged => {}
            Disposition::Dropped(e) => warn!("Location fix dropped: {}", e),
        }
    }

    // ── Transport events ──────────────────────────────────────

    pub fn handle_event(&mut self, event: TransportEvent) {
        debug!("Transport event: {}", event.name());
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Disconnected => self.on_disconnected(),
            TransportEvent::BondStateChanged { bonded } => self.on_bond_changed(bonded),
            TransportEvent::ServicesDiscovered(Ok(caps)) => self.on_discovered(caps),
            TransportEvent::ServicesDiscovered(Err(status)) => {
                if self.state == CameraState::Connecting {
                    error!("Service discovery failed, status {}", status);
                    self.fail(None, MSG_DISCOVERY_FAILED);
                }
            }
            TransportEvent::ServicesChanged => self.on_services_changed(),
            TransportEvent::WriteComplete { target, status } => {
                if self.queue.finish(OpKind::Write, target).is_some() {
                    self.on_write_complete(target, status);
                    self.dispatch_next();
                }
            }
            TransportEvent::ReadComplete {
                target,
                status,
                value,
            } => {
                if let Some(Operation::Read { handler, .. }) = self.queue.finish(OpKind::Read, target) {
                    self.on_read_complete(handler, status, &value);
                    self.dispatch_next();
                }
            }
            TransportEvent::SubscribeComplete { target, status } => {
                if self.queue.finish(OpKind::Subscribe, target).is_some() {
                    self.on_subscribe_complete(target, status);
                    self.dispatch_next();
                }
            }
            TransportEvent::Notification { target, value } => self.on_notification(target, &value),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Characteristics found by the last successful discovery.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Fix waiting for location initialisation, if any.
    pub fn staged_fix(&self) -> Option<&LocationFix> {
        self.location.pending()
    }

    /// No GATT operation queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_idle()
    }

    /// The operation awaiting completion from the transport.
    pub fn in_flight(&self) -> Option<&SessionOperation> {
        self.queue.in_flight()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    // ── Lifecycle handlers ────────────────────────────────────

    fn connect(&mut self) {
        self.drop_link_state();
        self.transition(CameraState::Connecting);
        if let Err(e) = self.transport.connect() {
            self.fail(Some(e.into()), MSG_CONNECT_FAILED);
        }
    }

    fn on_connected(&mut self) {
        if self.state != CameraState::Connecting {
            debug!("Connected while {}, ignored", self.state.name());
            return;
        }
        if let Err(e) = self.transport.discover() {
            self.fail(Some(e.into()), MSG_DISCOVERY_FAILED);
        }
    }

    fn on_disconnected(&mut self) {
        self.drop_link_state();
        match self.state {
            // keep the explanation visible
            CameraState::Gone | CameraState::NotBonded | CameraState::Error { .. } => {}
            _ => self.transition(CameraState::Gone),
        }
    }

    fn on_bond_changed(&mut self, bonded: bool) {
        match (&self.state, bonded) {
            (CameraState::NotBonded, true) => {
                info!("Bond established, connecting");
                self.connect();
            }
            (CameraState::Ready(_) | CameraState::RemoteDisabled, false) => {
                warn!("Bond lost");
                self.drop_link_state();
                self.transport.disconnect();
                self.transition(CameraState::NotBonded);
            }
            _ => debug!("Bond state {} in {}, ignored", bonded, self.state.name()),
        }
    }

    fn on_services_changed(&mut self) {
        match self.state {
            CameraState::Gone | CameraState::NotBonded => {
                debug!("Services changed without a session, ignored");
                return;
            }
            _ => {}
        }
        info!("Attribute table changed, rediscovering");
        self.drop_link_state();
        self.transition(CameraState::Connecting);
        if let Err(e) = self.transport.discover() {
            self.fail(Some(e.into()), MSG_DISCOVERY_FAILED);
        }
    }

    fn on_discovered(&mut self, caps: Capabilities) {
        if self.state != CameraState::Connecting || !self.queue.is_idle() {
            warn!("Discovery result in {}, ignored", self.state.name());
            return;
        }
        if !caps.has_required() {
            for t in caps.missing_required() {
                error!("Required characteristic missing: {}", t);
            }
            self.fail(None, MSG_SERVICE_MISSING);
            self.transport.disconnect();
            return;
        }

        self.caps = caps;
        self.location
            .begin_session(self.config.location_sync && caps.supports_location());
        info!(
            "Remote service discovered (media={}, battery={}, location={})",
            caps.contains(Target::CameraMedia),
            caps.contains(Target::CameraBattery),
            self.location.is_supported()
        );
        if let Err(e) = self.bootstrap() {
            self.dispatch_failed(e);
        }
    }

    /// Queue the fixed bootstrap sequence for a freshly discovered camera.
    fn bootstrap(&mut self) -> Result<(), TransportError> {
        let caps = self.caps;
        let prime = self.config.prime_telemetry;

        self.queue_op(Operation::Read {
            target: Target::DeviceName,
            handler: ReadHandler::DeviceName,
        })?;
        self.queue_op(Operation::Subscribe {
            target: Target::RemoteStatus,
        })?;

        for (target, handler) in [
            (Target::CameraMedia, ReadHandler::MediaPriming),
            (Target::CameraBattery, ReadHandler::BatteryPriming),
        ] {
            if !caps.contains(target) {
                continue;
            }
            self.queue_op(Operation::Subscribe { target })?;
            if prime {
                self.queue_op(Operation::Read { target, handler })?;
            }
        }

        if self.location.is_supported() {
            self.queue_op(Operation::Read {
                target: Target::LocationDataFormat,
                handler: ReadHandler::LocationFormat,
            })?;
            for target in [Target::LocationLock, Target::LocationEnabled] {
                if let Some(op) = Operation::write(target, &CONFIG_ON) {
                    self.queue_op(op)?;
                }
            }
        }
        Ok(())
    }

    // ── Completion handlers ───────────────────────────────────

    fn on_write_complete(&mut self, target: Target, status: GattStatus) {
        match target {
            Target::RemoteCommand => {
                if status == GattStatus::FEATURE_DISABLED {
                    if self.state.is_ready() {
                        warn!("Command rejected: remote control disabled on camera");
                        self.transition(CameraState::RemoteDisabled);
                    }
                } else if !status.is_success() {
                    warn!("Command write failed, status {}", status);
                }
            }
            Target::LocationLock if status.is_success() => debug!("Location lock written"),
            Target::LocationLock if status == GattStatus::FEATURE_DISABLED => {
                warn!("Location lock rejected; another device may own the camera's location link");
            }
            Target::LocationEnabled if status.is_success() => {
                info!("Location initialised");
                if let Some(frame) = self
                    .location
                    .complete_init(&self.clock, self.config.max_fix_age())
                {
                    self.enqueue_write(Target::LocationReceiver, &frame);
                }
            }
            Target::LocationReceiver if status.is_success() => debug!("Location fix delivered"),
            _ if !status.is_success() => warn!("Write to {} failed, status {}", target, status),
            _ => debug!("Write to {} complete", target),
        }
    }

    fn on_read_complete(&mut self, handler: ReadHandler, status: GattStatus, value: &[u8]) {
        let ok = status.is_success();
        match handler {
            ReadHandler::DeviceName if ok => {
                let name = String::from_utf8_lossy(value)
                    .trim_end_matches('\0')
                    .to_string();
                info!("Camera identified: {}", name);
                self.name = Some(name.clone());
                if self.state == CameraState::Connecting {
                    let address = self.transport.address().to_string();
                    self.transition(CameraState::Identified { name, address });
                }
            }
            ReadHandler::MediaPriming if ok => self.apply_media(value),
            ReadHandler::BatteryPriming if ok => self.apply_battery(value),
            ReadHandler::LocationFormat => self.location.on_data_format(ok.then_some(value)),
            _ => warn!("{:?} read failed, status {}", handler, status),
        }
    }

    fn on_subscribe_complete(&mut self, target: Target, status: GattStatus) {
        if target != Target::RemoteStatus {
            if status.is_success() {
                debug!("Subscribed to {}", target);
            } else {
                warn!("Subscribing to {} failed, status {}", target, status);
            }
            return;
        }
        if !status.is_success() {
            warn!("Remote status subscription failed, status {}; button echo will be missing", status);
        }
        match self.state {
            CameraState::Identified { .. } => {}
            CameraState::Connecting => warn!("Camera name unknown, entering Ready without it"),
            _ => {
                debug!("Remote status subscribed in {}", self.state.name());
                return;
            }
        }
        self.transition(CameraState::Ready(ReadyState::baseline(self.name.clone())));
    }

    // ── Notifications ─────────────────────────────────────────

    fn on_notification(&mut self, target: Target, value: &[u8]) {
        match target {
            Target::RemoteStatus => self.apply_status(value),
            Target::CameraMedia => self.apply_media(value),
            Target::CameraBattery => self.apply_battery(value),
            Target::CameraStatus | Target::LocationNotify => {
                debug!("{} notification {} ignored", target, HexBytes(value));
            }
            _ => warn!("Unexpected notification on {}", target),
        }
    }

    fn apply_status(&mut self, value: &[u8]) {
        if self.state == CameraState::RemoteDisabled {
            info!("Status notification received, remote re-enabled");
            self.transition(CameraState::Ready(ReadyState::baseline(self.name.clone())));
        }
        let Some(change) = command::decode_status(value) else {
            debug!("Remote status {} ignored", HexBytes(value));
            return;
        };
        let now = self.clock.monotonic();
        let Some(ready) = self.state.as_ready_mut() else {
            return;
        };
        let flag = match change.flag {
            StatusFlag::Focus => &mut ready.focus,
            StatusFlag::Shutter => &mut ready.shutter,
            StatusFlag::Recording => &mut ready.recording,
        };
        flag.report(change.value, now);
        self.publish();
    }

    fn apply_media(&mut self, value: &[u8]) {
        let Some(media) = telemetry::decode_media(value) else {
            debug!("Media frame {} rejected, keeping last", HexBytes(value));
            return;
        };
        if let Some(ready) = self.state.as_ready_mut() {
            ready.media_status = Some(media);
            self.publish();
        }
    }

    fn apply_battery(&mut self, value: &[u8]) {
        let Some(battery) = telemetry::decode_battery(value) else {
            debug!("Battery frame {} rejected, keeping last", HexBytes(value));
            return;
        };
        if let Some(ready) = self.state.as_ready_mut() {
            ready.battery_status = Some(battery);
            self.publish();
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn transition(&mut self, next: CameraState) {
        info!("FSM transition: {} -> {}", self.state.name(), next.name());
        self.state = next;
        self.observer.on_state(&self.state);
    }

    /// Republish after an in-place `Ready` update.
    fn publish(&mut self) {
        self.observer.on_state(&self.state);
    }

    fn fail(&mut self, cause: Option<Error>, description: &str) {
        self.drop_link_state();
        self.transition(CameraState::error(cause, description));
    }

    /// Queue and operations belong to one link; forget them.
    fn drop_link_state(&mut self) {
        self.queue.reset();
        self.location.invalidate();
        self.caps = Capabilities::empty();
        self.name = None;
    }

    fn queue_op(&mut self, op: SessionOperation) -> Result<(), TransportError> {
        self.queue.enqueue(op, &mut self.transport)
    }

    fn enqueue_write(&mut self, target: Target, bytes: &[u8]) {
        let Some(op) = Operation::write(target, bytes) else {
            error!("Payload for {} too large ({} bytes)", target, bytes.len());
            return;
        };
        if let Err(e) = self.queue_op(op) {
            self.dispatch_failed(e);
        }
    }

    fn dispatch_next(&mut self) {
        if let Err(e) = self.queue.dispatch_next(&mut self.transport) {
            self.dispatch_failed(e);
        }
    }

    fn dispatch_failed(&mut self, e: TransportError) {
        error!("GATT dispatch failed: {}", e);
        self.fail(Some(e.into()), MSG_OPERATION_FAILED);
    }
}
