//! Location staging.
//!
//! Holds back the newest fix until the camera's location service is
//! configured, then hands out encoded frames.  One slot, last write wins;
//! the slot is cleared only when a frame for it is produced.

use core::time::Duration;

use log::{debug, warn};

use crate::error::LocationError;
use crate::protocol::location::{LocationFrame, encode_location, parse_data_format};
use crate::protocol::LocationFix;

use super::ports::Clock;

/// What became of an offered fix.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Encoded and ready for the receiver characteristic.
    Send(LocationFrame),
    /// Held until initialisation completes.
    Staged,
    /// Location is ready but the fix could not be encoded.
    Dropped(LocationError),
}

#[derive(Debug, Default)]
pub struct LocationStager {
    /// The camera has every location characteristic and sync is enabled.
    supported: bool,
    /// From the data-format read; `None` until it completes.
    send_timezone: Option<bool>,
    /// The enabled write succeeded.
    init_done: bool,
    pending: Option<LocationFix>,
}

impl LocationStager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start of a discovery pass.  A staged fix survives.
    pub fn begin_session(&mut self, supported: bool) {
        self.supported = supported;
        self.send_timezone = None;
        self.init_done = false;
    }

    /// Link lost or table changed: configuration must be redone.
    pub fn invalidate(&mut self) {
        self.send_timezone = None;
        self.init_done = false;
    }

    /// Data-format read result; `None` when the read failed, which turns
    /// location off for this session.
    pub fn on_data_format(&mut self, value: Option<&[u8]>) {
        match value {
            Some(v) => {
                let tz = parse_data_format(v);
                debug!("Location data format: send_timezone={}", tz);
                self.send_timezone = Some(tz);
            }
            None => {
                warn!("Location data format read failed, location disabled");
                self.supported = false;
            }
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Frames can be sent right now.
    pub fn is_ready(&self) -> bool {
        self.supported && self.init_done && self.send_timezone.is_some()
    }

    pub fn pending(&self) -> Option<&LocationFix> {
        self.pending.as_ref()
    }

    /// Send now if ready, otherwise stage.
    pub fn offer(&mut self, fix: LocationFix, clock: &impl Clock, max_age: Duration) -> Disposition {
        if !self.is_ready() {
            debug!("Location not initialised, staging fix");
            self.pending = Some(fix);
            return Disposition::Staged;
        }
        match self.encode(&fix, clock, max_age) {
            Ok(frame) => {
                self.pending = None;
                Disposition::Send(frame)
            }
            Err(e) => Disposition::Dropped(e),
        }
    }

    /// The enabled write succeeded.  Returns the frame for the staged fix,
    /// if there is one and it is still fresh.
    pub fn complete_init(&mut self, clock: &impl Clock, max_age: Duration) -> Option<LocationFrame> {
        self.init_done = true;
        if !self.is_ready() {
            return None;
        }
        let fix = self.pending?;
        match self.encode(&fix, clock, max_age) {
            Ok(frame) => {
                self.pending = None;
                Some(frame)
            }
            Err(e) => {
                warn!("Staged fix not sent: {}", e);
                None
            }
        }
    }

    fn encode(
        &self,
        fix: &LocationFix,
        clock: &impl Clock,
        max_age: Duration,
    ) -> Result<LocationFrame, LocationError> {
        let zone = match self.send_timezone {
            Some(true) => Some(clock.zone_offsets()),
            _ => None,
        };
        encode_location(fix, clock.monotonic(), max_age, &clock.utc_now(), zone)
    }
}
