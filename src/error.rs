//! Unified error types for the remote-control core.
//!
//! A single `Error` enum that every subsystem converts into, so the session
//! can carry the cause of a fault inside [`CameraState::Error`] without
//! allocation.  All variants are `Copy` and comparable, which keeps the
//! published state snapshots cheap to clone and easy to assert on.
//!
//! Telemetry decode failures are deliberately absent: a malformed frame is
//! an `Option::None`, not an error.
//!
//! [`CameraState::Error`]: crate::fsm::CameraState::Error

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The platform transport refused or failed an operation.
    Transport(TransportError),
    /// A location fix could not be encoded.
    Location(LocationError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Location(e) => write!(f, "location: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Synchronous refusal from the platform transport when an operation is
/// issued.  Asynchronous failures arrive as a non-success status instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No GATT session exists (torn down or never opened).
    NotConnected,
    /// The platform denied Bluetooth access.
    PermissionDenied,
    /// The requested characteristic is not in the discovered table.
    UnknownTarget,
    /// The platform rejected the request outright.
    Rejected,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no GATT session"),
            Self::PermissionDenied => write!(f, "Bluetooth permission denied"),
            Self::UnknownTarget => write!(f, "characteristic not discovered"),
            Self::Rejected => write!(f, "request rejected by platform"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Location errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    /// The fix is older than the configured maximum age.
    Stale,
    /// Latitude or longitude is outside the valid range or not finite.
    OutOfRange,
    /// The wall-clock year does not fit the frame.
    ClockUnset,
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => write!(f, "fix too old"),
            Self::OutOfRange => write!(f, "coordinates out of range"),
            Self::ClockUnset => write!(f, "wall clock not set"),
        }
    }
}

impl From<LocationError> for Error {
    fn from(e: LocationError) -> Self {
        Self::Location(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    Malformed,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
