//! Inbound transport events.
//!
//! The platform adapter translates its GATT callbacks into these and feeds
//! them to [`CameraSession::handle_event`](super::service::CameraSession::handle_event),
//! one at a time.

use crate::protocol::{Capabilities, GattStatus, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The link is up; discovery may start.
    Connected,

    /// The link went down (remote or local).
    Disconnected,

    /// Platform bonding changed for this camera.
    BondStateChanged { bonded: bool },

    /// Result of a discovery pass: the characteristics found, or the
    /// platform failure status.
    ServicesDiscovered(Result<Capabilities, GattStatus>),

    /// The camera reorganised its attribute table mid-session.
    ServicesChanged,

    WriteComplete { target: Target, status: GattStatus },

    ReadComplete {
        target: Target,
        status: GattStatus,
        value: Vec<u8>,
    },

    SubscribeComplete { target: Target, status: GattStatus },

    Notification { target: Target, value: Vec<u8> },
}

impl TransportEvent {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::BondStateChanged { .. } => "BondStateChanged",
            Self::ServicesDiscovered(_) => "ServicesDiscovered",
            Self::ServicesChanged => "ServicesChanged",
            Self::WriteComplete { .. } => "WriteComplete",
            Self::ReadComplete { .. } => "ReadComplete",
            Self::SubscribeComplete { .. } => "SubscribeComplete",
            Self::Notification { .. } => "Notification",
        }
    }
}
