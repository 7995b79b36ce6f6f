//! Camera session state.
//!
//! ```text
//!            request (bonded)             discovery ok
//!  Gone ───────────────────────▶ Connecting ───────────▶ (bootstrap)
//!   │  request (unbonded)            │ discovery failed /     │ name read
//!   ▼                                ▼ required missing       ▼
//!  NotBonded ◀── bond lost ──┐     Error                  Identified
//!   │ bonded                 │                                │ status subscribed
//!   └──────▶ Connecting      └──────────────────────────── Ready ◀──┐
//!                                            status 144 on ff01 │    │ any status
//!                                                               ▼    │ notification
//!                                                         RemoteDisabled
//! ```
//!
//! [`CameraState`] is a value: the session replaces it wholesale on every
//! transition and observers receive an immutable snapshot.

use core::fmt;
use core::marker::PhantomData;
use core::time::Duration;

use serde::Serialize;

use crate::error::Error;
use crate::protocol::{BatteryStatus, ButtonCode, InputCode, JogCode, MediaStatus};

// ───────────────────────────────────────────────────────────────
// Reported flags
// ───────────────────────────────────────────────────────────────

/// A boolean the camera reports, with the monotonic time of its last change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportedFlag {
    pub state: bool,
    /// `None` until the camera first reports a change.
    pub last_change: Option<Duration>,
}

impl ReportedFlag {
    /// Record a reported value.  The timestamp only moves when the value
    /// actually flips.
    pub fn report(&mut self, value: bool, now: Duration) {
        if self.state != value || self.last_change.is_none() {
            self.state = value;
            self.last_change = Some(now);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Pressed input sets
// ───────────────────────────────────────────────────────────────

/// Set of currently held buttons or jogs, one bit per input index.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PressedInputs<T> {
    bits: u16,
    _kind: PhantomData<T>,
}

impl<T> Default for PressedInputs<T> {
    fn default() -> Self {
        Self {
            bits: 0,
            _kind: PhantomData,
        }
    }
}

impl<T: InputCode> PressedInputs<T> {
    pub fn set(&mut self, input: T, pressed: bool) {
        let mask = 1u16 << input.index();
        if pressed {
            self.bits |= mask;
        } else {
            self.bits &= !mask;
        }
    }

    pub fn contains(&self, input: T) -> bool {
        self.bits & (1u16 << input.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }
}

impl<T> fmt::Debug for PressedInputs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PressedInputs(0b{:b})", self.bits)
    }
}

impl<T> Serialize for PressedInputs<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits)
    }
}

// ───────────────────────────────────────────────────────────────
// Ready
// ───────────────────────────────────────────────────────────────

/// Steady operating state.  [`Default`] is the zeroed baseline every entry
/// into `Ready` starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadyState {
    /// `None` when the name read failed.
    pub name: Option<String>,
    pub focus: ReportedFlag,
    pub shutter: ReportedFlag,
    pub recording: ReportedFlag,
    pub pressed_buttons: PressedInputs<ButtonCode>,
    pub pressed_jogs: PressedInputs<JogCode>,
    pub media_status: Option<MediaStatus>,
    pub battery_status: Option<BatteryStatus>,
}

impl ReadyState {
    /// Fresh baseline carrying only the device name.
    pub fn baseline(name: Option<String>) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }
}

// ───────────────────────────────────────────────────────────────
// CameraState
// ───────────────────────────────────────────────────────────────

/// Everything the session knows about the remote camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CameraState {
    /// No transport session.
    #[default]
    Gone,
    /// The platform reports the camera is not paired.
    NotBonded,
    /// Session requested, discovery in progress.
    Connecting,
    /// Fault that needs a new session request to clear.
    Error {
        cause: Option<Error>,
        description: String,
    },
    /// Discovery succeeded and the device name was read.
    Identified { name: String, address: String },
    /// The camera rejected a command because its BLE remote setting is off.
    RemoteDisabled,
    Ready(ReadyState),
}

impl CameraState {
    pub fn error(cause: Option<Error>, description: impl Into<String>) -> Self {
        Self::Error {
            cause,
            description: description.into(),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gone => "Gone",
            Self::NotBonded => "NotBonded",
            Self::Connecting => "Connecting",
            Self::Error { .. } => "Error",
            Self::Identified { .. } => "Identified",
            Self::RemoteDisabled => "RemoteDisabled",
            Self::Ready(_) => "Ready",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&ReadyState> {
        match self {
            Self::Ready(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_ready_mut(&mut self) -> Option<&mut ReadyState> {
        match self {
            Self::Ready(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error { description, .. } => write!(f, "Error({description})"),
            Self::Identified { name, address } => write!(f, "Identified({name} @ {address})"),
            Self::Ready(r) => match &r.name {
                Some(name) => write!(f, "Ready({name})"),
                None => f.write_str("Ready"),
            },
            other => f.write_str(other.name()),
        }
    }
}
