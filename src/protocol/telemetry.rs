//! Media and battery telemetry decoding (camera service `cc0f` / `cc10`).
//!
//! Both frames share a 4-byte preamble whose bytes 1..=3 must read
//! `00 00 02`; anything else is a frame this crate does not understand and
//! is rejected.  Cameras are known to send partially populated frames, so a
//! rejected frame is never an error: the caller keeps its previous snapshot.
//!
//! ```text
//! Media (>= 20 bytes, slot 2 needs >= 24)
//!  0    1  2  3   4      5      6     7     8..12   12..16  16..20  20..24
//! ┌──┬──┬──┬──┬──────┬──────┬─────┬─────┬───────┬───────┬───────┬───────┐
//! │??│00│00│02│flags1│flags2│kind1│kind2│shots1 │shots2 │secs1  │secs2  │
//! └──┴──┴──┴──┴──────┴──────┴─────┴─────┴───────┴───────┴───────┴───────┘
//!   flags: 0x01 slot present, 0x02 shots valid, 0x04 seconds valid
//!
//! Battery (>= 18 bytes)
//!  0    1  2  3   4      5      6  7   8       9       10..14  14..18
//! ┌──┬──┬──┬──┬──────┬──────┬──┬──┬───────┬───────┬───────┬───────┐
//! │??│00│00│02│pres1 │pres2 │??│??│state1 │state2 │pct1   │pct2   │
//! └──┴──┴──┴──┴──────┴──────┴──┴──┴───────┴───────┴───────┴───────┘
//!   state 1..=11 valid, 6..=11 charging
//! ```

use serde::Serialize;

const MEDIA_MIN_LEN: usize = 20;
const MEDIA_SLOT2_MIN_LEN: usize = 24;
const BATTERY_MIN_LEN: usize = 18;

const SLOT_PRESENT: u8 = 0x01;
const SLOT_SHOTS_VALID: u8 = 0x02;
const SLOT_SECONDS_VALID: u8 = 0x04;

const ICON_CAMERA: &str = "\u{1F4F7}";
const ICON_CAMCORDER: &str = "\u{1F3A5}";
const ICON_BATTERY: &str = "\u{1F50B}";
const ICON_CHARGING: &str = "\u{26A1}";

/// Remaining capacity of the active storage slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaStatus {
    pub shots_remaining: Option<u32>,
    pub seconds_remaining: Option<u32>,
    /// Short label, e.g. `📷512` or `🎥01:02:03`.
    pub description: String,
}

/// Charge of the preferred battery pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatteryStatus {
    /// 0..=100
    pub percentage: u8,
    pub charging: bool,
    /// Short label, e.g. `🔋83%` or `⚡83%`.
    pub description: String,
}

fn has_preamble(data: &[u8]) -> bool {
    data[1] == 0x00 && data[2] == 0x00 && data[3] == 0x02
}

fn be_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// `MM:SS` below one hour, `H:MM:SS` otherwise.
pub fn format_elapsed(seconds: u32) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}

// ── Media ─────────────────────────────────────────────────────

fn media_slot(data: &[u8], slot: usize) -> Option<MediaStatus> {
    let flags = data[4 + slot];
    let kind = data[6 + slot];
    let shots = (flags & SLOT_SHOTS_VALID != 0).then(|| be_u32(data, 8 + 4 * slot));
    let seconds = (flags & SLOT_SECONDS_VALID != 0).then(|| be_u32(data, 16 + 4 * slot));

    if flags & SLOT_PRESENT == 0 || !(1..=5).contains(&kind) {
        return None;
    }
    let description = match (shots, seconds) {
        (_, Some(secs)) => format!("{ICON_CAMCORDER}{}", format_elapsed(secs)),
        (Some(count), None) => format!("{ICON_CAMERA}{count}"),
        (None, None) => return None,
    };
    Some(MediaStatus {
        shots_remaining: shots,
        seconds_remaining: seconds,
        description,
    })
}

/// Decode a media frame.  Slot 1 wins when valid; slot 2 is only
/// considered when the frame carries its fields.
pub fn decode_media(data: &[u8]) -> Option<MediaStatus> {
    if data.len() < MEDIA_MIN_LEN || !has_preamble(data) {
        return None;
    }
    if let Some(status) = media_slot(data, 0) {
        return Some(status);
    }
    if data.len() < MEDIA_SLOT2_MIN_LEN {
        return None;
    }
    media_slot(data, 1)
}

// ── Battery ───────────────────────────────────────────────────

fn battery_pack(data: &[u8], pack: usize) -> Option<BatteryStatus> {
    let present = data[4 + pack] & SLOT_PRESENT != 0;
    let state = data[8 + pack];
    let raw = be_u32(data, 10 + 4 * pack);

    if !present || !(1..=11).contains(&state) || raw > 100 {
        return None;
    }
    let percentage = raw as u8;
    let charging = (6..=11).contains(&state);
    let icon = if charging { ICON_CHARGING } else { ICON_BATTERY };
    Some(BatteryStatus {
        percentage,
        charging,
        description: format!("{icon}{percentage}%"),
    })
}

/// Decode a battery frame, preferring pack 1.
pub fn decode_battery(data: &[u8]) -> Option<BatteryStatus> {
    if data.len() < BATTERY_MIN_LEN || !has_preamble(data) {
        return None;
    }
    battery_pack(data, 0).or_else(|| battery_pack(data, 1))
}
