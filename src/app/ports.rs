//! Port traits: the hexagonal boundary between the session and the
//! platform.
//!
//! ```text
//!   Platform BLE stack ──▶ GattTransport ──▶ CameraSession ──▶ StateObserver
//!                                  Clock ──▶
//! ```
//!
//! The platform transport owns connection establishment, discovery and raw
//! GATT I/O.  Every `issue_*` call is fire-and-forget: the result arrives
//! later as a [`TransportEvent`](super::events::TransportEvent) fed back
//! into the session.  An `Err` return means the request never left the
//! host.

use core::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::TransportError;
use crate::fsm::CameraState;
use crate::protocol::{Target, ZoneOffsets};

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: session → platform BLE)
// ───────────────────────────────────────────────────────────────

/// GATT client bound to one camera.  The device handle is given to the
/// adapter at construction; the session never sees platform registries.
pub trait GattTransport {
    /// Open the link.  Completion arrives as `Connected`.
    fn connect(&mut self) -> Result<(), TransportError>;

    /// Close the link.  Idempotent; no `Disconnected` event is required.
    fn disconnect(&mut self);

    /// Start service discovery.  Completion arrives as `ServicesDiscovered`.
    fn discover(&mut self) -> Result<(), TransportError>;

    /// Whether the platform holds a bond for this camera.
    fn is_bonded(&self) -> Result<bool, TransportError>;

    /// Hardware address, for display.
    fn address(&self) -> &str;

    fn issue_write(&mut self, target: Target, payload: &[u8]) -> Result<(), TransportError>;

    fn issue_read(&mut self, target: Target) -> Result<(), TransportError>;

    /// Enable notifications (CCCD write) on `target`.
    fn issue_subscribe(&mut self, target: Target) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Time sources.  `monotonic` must share its base with
/// [`LocationFix::captured_at`](crate::protocol::LocationFix::captured_at).
pub trait Clock {
    fn monotonic(&self) -> Duration;

    fn utc_now(&self) -> DateTime<Utc>;

    /// Local zone offsets in effect now.
    fn zone_offsets(&self) -> ZoneOffsets;
}

// ───────────────────────────────────────────────────────────────
// State observer port (driven adapter: session → UI / service layer)
// ───────────────────────────────────────────────────────────────

/// Receives each new [`CameraState`] snapshot, once per transition and once
/// per in-place `Ready` update.  Called inside the session's critical
/// section: implementations must not call back into the session.
pub trait StateObserver {
    fn on_state(&mut self, state: &CameraState);
}
