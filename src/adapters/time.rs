//! Host clock adapter.
//!
//! - monotonic time from `std::time::Instant`, counted from construction
//! - wall-clock UTC from `chrono`
//! - zone offsets from the host's IANA zone via `chrono-tz`, split into the
//!   standard offset and the DST share the camera expects separately
//!
//! Fixes handed to the session must be stamped with
//! [`SystemClock::monotonic`] (or an offset of it) so staleness checks
//! compare like with like.

use core::time::Duration;
use std::time::Instant;

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};
use log::{debug, warn};

use crate::app::ports::Clock;
use crate::protocol::ZoneOffsets;

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
    zone: Option<Tz>,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Resolves the host zone once; hosts without an IANA name fall back to
    /// the total local offset.
    pub fn new() -> Self {
        let zone = match iana_time_zone::get_timezone() {
            Ok(name) => match name.parse::<Tz>() {
                Ok(tz) => Some(tz),
                Err(e) => {
                    warn!("Unknown time zone {:?}: {}", name, e);
                    None
                }
            },
            Err(e) => {
                warn!("Host time zone unavailable: {}", e);
                None
            }
        };
        debug!("Clock zone: {:?}", zone);
        Self::with_zone(zone)
    }

    pub fn with_zone(zone: Option<Tz>) -> Self {
        Self {
            start: Instant::now(),
            zone,
        }
    }

    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }
}

/// Standard and DST offsets of `tz` in effect at `utc`.
pub fn offsets_in(tz: Tz, utc: &DateTime<Utc>) -> ZoneOffsets {
    let offset = tz.offset_from_utc_datetime(&utc.naive_utc());
    ZoneOffsets {
        raw_minutes: offset.base_utc_offset().num_minutes() as i16,
        dst_minutes: offset.dst_offset().num_minutes() as i16,
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.start.elapsed()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn zone_offsets(&self) -> ZoneOffsets {
        match self.zone {
            Some(tz) => offsets_in(tz, &Utc::now()),
            None => {
                // Only the total offset is known here.
                let seconds = Local::now().offset().local_minus_utc();
                ZoneOffsets {
                    raw_minutes: (seconds / 60) as i16,
                    dst_minutes: 0,
                }
            }
        }
    }
}
