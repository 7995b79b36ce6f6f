//! Camera wire protocol: pure encode/decode, no I/O.
//!
//! ```text
//!  ActionStep ──▶ command::encode_* ──▶ [01 xx] / [02 xx mm] ──▶ ff01
//!  ff02 ──▶ command::decode_status ──▶ StatusChange
//!  cc0f / cc10 ──▶ telemetry::decode_* ──▶ MediaStatus / BatteryStatus
//!  LocationFix ──▶ location::encode_location ──▶ 91/95 bytes ──▶ dd11
//! ```
//!
//! Decoders return `Option`: cameras send partially populated frames
//! routinely and the session treats a rejected frame as "no news".

pub mod command;
pub mod gatt;
pub mod location;
pub mod telemetry;

use core::fmt;

pub use command::{ButtonCode, InputCode, JogCode, StatusChange, StatusFlag};
pub use gatt::{Capabilities, GattStatus, Target};
pub use location::{LocationFix, LocationFrameView, ZoneOffsets};
pub use telemetry::{BatteryStatus, MediaStatus};

/// Lower-case hex rendering of a payload for log lines.
pub struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
