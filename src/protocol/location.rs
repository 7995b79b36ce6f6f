//! GPS fix injection frames for the location service (`dd11`).
//!
//! ```text
//!  0    1       2    3    4    5     6  7  8    9    10
//! ┌────┬───────┬────┬────┬────┬─────┬──┬──┬────┬────┬────┐
//! │ 00 │ len-2 │ 08 │ 02 │ fc │ tz  │00│00│ 10 │ 10 │ 10 │  header
//! └────┴───────┴────┴────┴────┴─────┴──┴──┴────┴────┴────┘
//!  11..15 lat*1e7 (i32 BE)   15..19 lon*1e7 (i32 BE)
//!  19..21 year (u16 BE)  21 month(1-12)  22 day  23 hour  24 min  25 sec
//!  26..91 zero padding
//!  91..93 raw UTC offset minutes (i16 BE)   } only when tz == 0x03
//!  93..95 DST offset minutes (i16 BE)       } (95-byte frame)
//! ```
//!
//! Calendar fields are the wall-clock UTC time at encode.  The camera uses
//! them to set its own clock, so they are not the fix's capture time.

use core::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use heapless::Vec;

use crate::error::LocationError;

pub const FRAME_LEN: usize = 91;
pub const FRAME_LEN_WITH_ZONE: usize = 95;

const HEADER: [u8; 11] = [
    0x00, 0x00, 0x08, 0x02, 0xfc, 0x00, 0x00, 0x00, 0x10, 0x10, 0x10,
];
const TZ_FLAG_OFFSET: usize = 5;
const TZ_PRESENT: u8 = 0x03;
const LAT_OFFSET: usize = 11;
const LON_OFFSET: usize = 15;
const YEAR_OFFSET: usize = 19;
const ZONE_OFFSET: usize = 91;
const DST_OFFSET: usize = 93;

const COORD_SCALE: f64 = 10_000_000.0;

/// Earliest wall-clock year taken as a set clock.
const MIN_YEAR: i32 = 2000;

/// Value written to the lock and enabled characteristics.
pub const CONFIG_ON: [u8; 1] = [0x01];

/// Data-format descriptor: byte 4 bit `0x02` asks for zone offsets.
const DATA_FORMAT_TZ_BYTE: usize = 4;
const DATA_FORMAT_TZ_BIT: u8 = 0x02;

/// An encoded location frame.
pub type LocationFrame = Vec<u8, FRAME_LEN_WITH_ZONE>;

/// A position sample from the host's location provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    /// Degrees, -90..=90.
    pub latitude: f64,
    /// Degrees, -180..=180.
    pub longitude: f64,
    /// Monotonic timestamp of the fix, same time base as `Clock::monotonic`.
    pub captured_at: Duration,
}

/// Local zone offsets in minutes, as the camera expects them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneOffsets {
    /// Standard offset from UTC, excluding daylight saving.
    pub raw_minutes: i16,
    /// Additional daylight-saving offset currently in effect (0 outside DST).
    pub dst_minutes: i16,
}

/// Whether the camera wants zone offsets appended, from the data-format
/// read.
pub fn parse_data_format(value: &[u8]) -> bool {
    value
        .get(DATA_FORMAT_TZ_BYTE)
        .is_some_and(|b| b & DATA_FORMAT_TZ_BIT != 0)
}

fn put(frame: &mut [u8], offset: usize, bytes: &[u8]) {
    frame[offset..offset + bytes.len()].copy_from_slice(bytes);
}

fn scale(degrees: f64, limit: f64) -> Result<i32, LocationError> {
    if !degrees.is_finite() || degrees.abs() > limit {
        return Err(LocationError::OutOfRange);
    }
    // truncates toward zero
    Ok((degrees * COORD_SCALE) as i32)
}

/// Encode `fix` into a 91-byte frame, or 95 bytes when `zone` is given.
///
/// `now` is the current monotonic time; fixes older than `max_age` are
/// rejected with [`LocationError::Stale`].  A fix stamped in the future
/// counts as fresh.
pub fn encode_location(
    fix: &LocationFix,
    now: Duration,
    max_age: Duration,
    utc: &DateTime<Utc>,
    zone: Option<ZoneOffsets>,
) -> Result<LocationFrame, LocationError> {
    if now.saturating_sub(fix.captured_at) > max_age {
        return Err(LocationError::Stale);
    }
    let lat = scale(fix.latitude, 90.0)?;
    let lon = scale(fix.longitude, 180.0)?;
    if utc.year() < MIN_YEAR {
        return Err(LocationError::ClockUnset);
    }
    let year = u16::try_from(utc.year()).map_err(|_| LocationError::ClockUnset)?;

    let len = if zone.is_some() {
        FRAME_LEN_WITH_ZONE
    } else {
        FRAME_LEN
    };
    let mut frame = LocationFrame::new();
    // len <= capacity
    let _ = frame.resize(len, 0);

    put(&mut frame, 0, &HEADER);
    frame[1] = (len - 2) as u8;
    frame[TZ_FLAG_OFFSET] = if zone.is_some() { TZ_PRESENT } else { 0x00 };

    put(&mut frame, LAT_OFFSET, &lat.to_be_bytes());
    put(&mut frame, LON_OFFSET, &lon.to_be_bytes());

    put(&mut frame, YEAR_OFFSET, &year.to_be_bytes());
    frame[21] = utc.month() as u8;
    frame[22] = utc.day() as u8;
    frame[23] = utc.hour() as u8;
    frame[24] = utc.minute() as u8;
    frame[25] = utc.second() as u8;

    if let Some(z) = zone {
        put(&mut frame, ZONE_OFFSET, &z.raw_minutes.to_be_bytes());
        put(&mut frame, DST_OFFSET, &z.dst_minutes.to_be_bytes());
    }
    Ok(frame)
}

// ───────────────────────────────────────────────────────────────
// Frame view
// ───────────────────────────────────────────────────────────────

/// Decoded view of a location frame, for the simulator and for checking
/// what was put on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFrameView {
    pub latitude: f64,
    pub longitude: f64,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub zone: Option<ZoneOffsets>,
}

impl LocationFrameView {
    /// Parse a 91/95-byte frame.  `None` when the length, length byte or
    /// zone flag disagree.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        let with_zone = match frame.len() {
            FRAME_LEN => false,
            FRAME_LEN_WITH_ZONE => true,
            _ => return None,
        };
        if usize::from(frame[1]) != frame.len() - 2 {
            return None;
        }
        let expected_flag = if with_zone { TZ_PRESENT } else { 0x00 };
        if frame[TZ_FLAG_OFFSET] != expected_flag {
            return None;
        }

        let i32_at = |o: usize| i32::from_be_bytes([frame[o], frame[o + 1], frame[o + 2], frame[o + 3]]);
        let i16_at = |o: usize| i16::from_be_bytes([frame[o], frame[o + 1]]);

        let zone = with_zone.then(|| ZoneOffsets {
            raw_minutes: i16_at(ZONE_OFFSET),
            dst_minutes: i16_at(DST_OFFSET),
        });
        Some(Self {
            latitude: f64::from(i32_at(LAT_OFFSET)) / COORD_SCALE,
            longitude: f64::from(i32_at(LON_OFFSET)) / COORD_SCALE,
            year: u16::from_be_bytes([frame[YEAR_OFFSET], frame[YEAR_OFFSET + 1]]),
            month: frame[21],
            day: frame[22],
            hour: frame[23],
            minute: frame[24],
            second: frame[25],
            zone,
        })
    }
}
