//! Simulated camera transport.
//!
//! Implements [`GattTransport`] against an in-memory camera model.  Instead
//! of calling back into the session, completions are posted to an
//! `embassy_sync` channel which the host loop drains into
//! [`SharedSession::handle_event`](crate::shared::SharedSession::handle_event),
//! the same shape a platform BLE callback thread would have.
//!
//! ```text
//!  session ──issue_*──▶ SimulatedCamera ──try_send──▶ Channel ──▶ host loop
//! ```

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::{debug, info, warn};

use crate::app::events::TransportEvent;
use crate::app::ports::GattTransport;
use crate::error::TransportError;
use crate::protocol::command::{CLASS_BUTTON, STATUS_FOCUS, STATUS_RECORDING, STATUS_SHUTTER};
use crate::protocol::{ButtonCode, Capabilities, GattStatus, InputCode, LocationFrameView, Target};

/// Completions buffered between the simulated camera and the host loop.
pub const EVENT_DEPTH: usize = 32;

pub type EventChannel = Channel<CriticalSectionRawMutex, TransportEvent, EVENT_DEPTH>;

/// Status a real camera returns when reading a non-readable attribute.
const STATUS_READ_NOT_PERMITTED: GattStatus = GattStatus(0x02);

// ───────────────────────────────────────────────────────────────
// Frame fixtures
// ───────────────────────────────────────────────────────────────

/// Media frame with slot 1 reporting `shots` remaining.
pub fn media_shots_frame(shots: u32) -> Vec<u8> {
    let mut f = vec![0u8; 20];
    f[3] = 0x02;
    f[4] = 0x03;
    f[6] = 0x01;
    f[8..12].copy_from_slice(&shots.to_be_bytes());
    f
}

/// Media frame with slot 1 reporting `seconds` of recording time.
pub fn media_seconds_frame(seconds: u32) -> Vec<u8> {
    let mut f = vec![0u8; 20];
    f[3] = 0x02;
    f[4] = 0x05;
    f[6] = 0x01;
    f[16..20].copy_from_slice(&seconds.to_be_bytes());
    f
}

/// Battery frame with pack 1 at `percentage`.
pub fn battery_frame(percentage: u32, charging: bool) -> Vec<u8> {
    let mut f = vec![0u8; 18];
    f[3] = 0x02;
    f[4] = 0x01;
    f[8] = if charging { 0x07 } else { 0x02 };
    f[10..14].copy_from_slice(&percentage.to_be_bytes());
    f
}

/// Data-format descriptor value; bit `0x02` of byte 4 requests zone offsets.
pub fn data_format(with_zone: bool) -> Vec<u8> {
    vec![0x00, 0x00, 0x00, 0x00, if with_zone { 0x02 } else { 0x00 }]
}

// ───────────────────────────────────────────────────────────────
// Camera model
// ───────────────────────────────────────────────────────────────

/// What the simulated camera exposes.
#[derive(Debug, Clone)]
pub struct SimProfile {
    pub name: String,
    pub address: String,
    pub bonded: bool,
    /// Off reproduces the camera's "Bluetooth remote" menu setting being
    /// disabled: command writes fail with status 144.
    pub remote_enabled: bool,
    pub capabilities: Capabilities,
    pub media: Vec<u8>,
    pub battery: Vec<u8>,
    pub data_format: Vec<u8>,
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            name: "ILCE-7M3".into(),
            address: "D0:40:EF:12:34:56".into(),
            bonded: true,
            remote_enabled: true,
            capabilities: Capabilities::full(),
            media: media_shots_frame(999),
            battery: battery_frame(76, false),
            data_format: data_format(true),
        }
    }
}

pub struct SimulatedCamera {
    profile: SimProfile,
    events: Arc<EventChannel>,
    connected: bool,
    recording: bool,
    /// Every location frame the camera accepted.
    fixes: Vec<LocationFrameView>,
}

impl SimulatedCamera {
    pub fn new(profile: SimProfile, events: Arc<EventChannel>) -> Self {
        Self {
            profile,
            events,
            connected: false,
            recording: false,
            fixes: Vec::new(),
        }
    }

    pub fn fixes(&self) -> &[LocationFrameView] {
        &self.fixes
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn post(&self, event: TransportEvent) {
        if let Err(e) = self.events.try_send(event) {
            warn!("Simulator event channel full, dropped {:?}", e);
        }
    }

    fn ensure_connected(&self) -> Result<(), TransportError> {
        if self.connected {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }

    fn notify_status(&self, flag: u8, value: bool) {
        self.post(TransportEvent::Notification {
            target: Target::RemoteStatus,
            value: vec![0x02, flag, if value { 0x20 } else { 0x00 }],
        });
    }

    /// Camera reaction to a remote command frame.
    fn on_command(&mut self, payload: &[u8]) {
        let [class, code, ..] = payload else {
            return;
        };
        if *class != CLASS_BUTTON {
            debug!("Simulator: jog {:02x}", code);
            return;
        }
        let half = ButtonCode::ShutterHalf;
        let full = ButtonCode::ShutterFull;
        let record = ButtonCode::Record;
        match *code {
            c if c == half.code(true) => self.notify_status(STATUS_FOCUS, true),
            c if c == half.code(false) => self.notify_status(STATUS_FOCUS, false),
            c if c == full.code(true) => self.notify_status(STATUS_SHUTTER, true),
            c if c == full.code(false) => self.notify_status(STATUS_SHUTTER, false),
            c if c == record.code(true) => {
                self.recording = !self.recording;
                self.notify_status(STATUS_RECORDING, self.recording);
            }
            _ => {}
        }
    }
}

impl GattTransport for SimulatedCamera {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        self.post(TransportEvent::Connected);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn discover(&mut self) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.post(TransportEvent::ServicesDiscovered(Ok(self.profile.capabilities)));
        Ok(())
    }

    fn is_bonded(&self) -> Result<bool, TransportError> {
        Ok(self.profile.bonded)
    }

    fn address(&self) -> &str {
        &self.profile.address
    }

    fn issue_write(&mut self, target: Target, payload: &[u8]) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let status = match target {
            Target::RemoteCommand if !self.profile.remote_enabled => GattStatus::FEATURE_DISABLED,
            Target::LocationReceiver => match LocationFrameView::parse(payload) {
                Some(view) => {
                    info!(
                        "Simulator: fix {:.5},{:.5} at {:04}-{:02}-{:02} {:02}:{:02}:{:02}Z",
                        view.latitude,
                        view.longitude,
                        view.year,
                        view.month,
                        view.day,
                        view.hour,
                        view.minute,
                        view.second
                    );
                    self.fixes.push(view);
                    GattStatus::SUCCESS
                }
                None => GattStatus(0x0d), // invalid attribute length
            },
            _ => GattStatus::SUCCESS,
        };
        self.post(TransportEvent::WriteComplete { target, status });
        if target == Target::RemoteCommand && status.is_success() {
            self.on_command(payload);
        }
        Ok(())
    }

    fn issue_read(&mut self, target: Target) -> Result<(), TransportError> {
        self.ensure_connected()?;
        let value = match target {
            Target::DeviceName => Some(self.profile.name.clone().into_bytes()),
            Target::CameraMedia => Some(self.profile.media.clone()),
            Target::CameraBattery => Some(self.profile.battery.clone()),
            Target::LocationDataFormat => Some(self.profile.data_format.clone()),
            _ => None,
        };
        let event = match value {
            Some(value) => TransportEvent::ReadComplete {
                target,
                status: GattStatus::SUCCESS,
                value,
            },
            None => TransportEvent::ReadComplete {
                target,
                status: STATUS_READ_NOT_PERMITTED,
                value: Vec::new(),
            },
        };
        self.post(event);
        Ok(())
    }

    fn issue_subscribe(&mut self, target: Target) -> Result<(), TransportError> {
        self.ensure_connected()?;
        self.post(TransportEvent::SubscribeComplete {
            target,
            status: GattStatus::SUCCESS,
        });
        Ok(())
    }
}
