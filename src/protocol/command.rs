//! Remote-command frames (outgoing) and remote-status frames (incoming).
//!
//! Wire format, all frames on the remote service:
//!
//! ```text
//! Command (write ff01)            Status (notify ff02)
//! ┌──────┬──────┬───────────┐     ┌──────┬──────┬───────────┐
//! │ 0x01 │ code │           │     │  ??  │ flag │ value     │
//! │ 0x02 │ code │ magnitude │     │      │ id   │ bit 0x20  │
//! └──────┴──────┴───────────┘     └──────┴──────┴───────────┘
//!  class  action  jog only              3f focus
//!                                       a0 shutter
//!                                       d5 recording
//! ```

use heapless::Vec;

/// Command class byte for momentary buttons.
pub const CLASS_BUTTON: u8 = 0x01;
/// Command class byte for jog (rocker) controls.
pub const CLASS_JOG: u8 = 0x02;

pub const STATUS_FOCUS: u8 = 0x3f;
pub const STATUS_SHUTTER: u8 = 0xa0;
pub const STATUS_RECORDING: u8 = 0xd5;
const STATUS_VALUE_BIT: u8 = 0x20;

/// Longest command frame (jog).
pub const MAX_COMMAND_LEN: usize = 3;

/// An encoded command, ready for the command characteristic.
pub type CommandFrame = Vec<u8, MAX_COMMAND_LEN>;

// ───────────────────────────────────────────────────────────────
// Input identifiers
// ───────────────────────────────────────────────────────────────

/// Shared shape of buttons and jogs: a small dense index for set
/// membership and a press/release code pair.
pub trait InputCode: Copy + Eq + core::fmt::Debug {
    /// Dense index, `< 16`.
    fn index(self) -> u8;
    /// Action code for the given edge.
    fn code(self, pressed: bool) -> u8;
}

/// Physical buttons the camera accepts over BLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ButtonCode {
    ShutterHalf = 0,
    ShutterFull = 1,
    Record = 2,
    AfOn = 3,
    C1 = 4,
}

impl ButtonCode {
    pub const ALL: [Self; 5] = [
        Self::ShutterHalf,
        Self::ShutterFull,
        Self::Record,
        Self::AfOn,
        Self::C1,
    ];
}

impl InputCode for ButtonCode {
    fn index(self) -> u8 {
        self as u8
    }

    fn code(self, pressed: bool) -> u8 {
        let release = match self {
            Self::ShutterHalf => 0x06,
            Self::ShutterFull => 0x08,
            Self::Record => 0x0e,
            Self::AfOn => 0x14,
            Self::C1 => 0x20,
        };
        // press code is always release + 1
        if pressed { release + 1 } else { release }
    }
}

/// Rocker controls; the magnitude byte sets the speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum JogCode {
    ZoomTele = 0,
    ZoomWide = 1,
    FocusNear = 2,
    FocusFar = 3,
}

impl JogCode {
    pub const ALL: [Self; 4] = [Self::ZoomTele, Self::ZoomWide, Self::FocusNear, Self::FocusFar];
}

impl InputCode for JogCode {
    fn index(self) -> u8 {
        self as u8
    }

    fn code(self, pressed: bool) -> u8 {
        let release = match self {
            Self::ZoomTele => 0x6c,
            Self::ZoomWide => 0x6a,
            Self::FocusNear => 0x46,
            Self::FocusFar => 0x44,
        };
        if pressed { release + 1 } else { release }
    }
}

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

/// `[0x01, code]`
pub fn encode_button(button: ButtonCode, pressed: bool) -> CommandFrame {
    let mut frame = CommandFrame::new();
    // capacity 3 always fits 2 bytes
    let _ = frame.extend_from_slice(&[CLASS_BUTTON, button.code(pressed)]);
    frame
}

/// `[0x02, code, magnitude]`, magnitude forced to `0x00` on release.
pub fn encode_jog(jog: JogCode, pressed: bool, step: u8) -> CommandFrame {
    let mut frame = CommandFrame::new();
    let magnitude = if pressed { step } else { 0x00 };
    let _ = frame.extend_from_slice(&[CLASS_JOG, jog.code(pressed), magnitude]);
    frame
}

// ───────────────────────────────────────────────────────────────
// Remote status decode
// ───────────────────────────────────────────────────────────────

/// Which reported flag a status notification refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFlag {
    Focus,
    Shutter,
    Recording,
}

/// A decoded remote-status notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub flag: StatusFlag,
    pub value: bool,
}

/// Decode a remote-status notification.  `None` for short frames and for
/// flag identifiers this crate does not track.
pub fn decode_status(frame: &[u8]) -> Option<StatusChange> {
    if frame.len() < 3 {
        return None;
    }
    let flag = match frame[1] {
        STATUS_FOCUS => StatusFlag::Focus,
        STATUS_SHUTTER => StatusFlag::Shutter,
        STATUS_RECORDING => StatusFlag::Recording,
        _ => return None,
    };
    Some(StatusChange {
        flag,
        value: frame[2] & STATUS_VALUE_BIT != 0,
    })
}
