//! GATT attribute map of the camera and transport status codes.
//!
//! ## GATT Service Layout
//!
//! | Service         | Characteristic     | UUID (short) | Use                 |
//! |-----------------|--------------------|--------------|---------------------|
//! | Generic Access  | Device Name        | `2a00`       | Read                |
//! | Remote          | Command            | `ff01`       | Write               |
//! |                 | Status             | `ff02`       | Notify              |
//! | Camera          | Status             | `cc09`       | Notify (logged)     |
//! |                 | Media              | `cc0f`       | Read + Notify       |
//! |                 | Battery            | `cc10`       | Read + Notify       |
//! | Location        | Notify             | `dd01`       | Notify (ignored)    |
//! |                 | Receiver           | `dd11`       | Write (fix frames)  |
//! |                 | Data Format        | `dd21`       | Read                |
//! |                 | Lock               | `dd30`       | Write `0x01`        |
//! |                 | Enabled            | `dd31`       | Write `0x01`        |
//! |                 | Time Correction    | `dd32`       | presence only       |
//! |                 | Area Adjustment    | `dd33`       | presence only       |

use core::fmt;

// ── Service UUIDs ────────────────────────────────────────────

pub const SERVICE_GENERIC_ACCESS: u128 = 0x00001800_0000_1000_8000_00805f9b34fb;
pub const SERVICE_REMOTE: u128 = 0x8000ff00_ff00_ffff_ffff_ffffffffffff;
pub const SERVICE_CAMERA: u128 = 0x8000cc00_cc00_ffff_ffff_ffffffffffff;
pub const SERVICE_LOCATION: u128 = 0x8000dd00_dd00_ffff_ffff_ffffffffffff;

// ── Characteristic UUIDs ─────────────────────────────────────

pub const CHAR_DEVICE_NAME: u128 = 0x00002a00_0000_1000_8000_00805f9b34fb;
pub const CHAR_REMOTE_COMMAND: u128 = 0x0000ff01_0000_1000_8000_00805f9b34fb;
pub const CHAR_REMOTE_STATUS: u128 = 0x0000ff02_0000_1000_8000_00805f9b34fb;
pub const CHAR_CAMERA_STATUS: u128 = 0x0000cc09_0000_1000_8000_00805f9b34fb;
pub const CHAR_CAMERA_MEDIA: u128 = 0x0000cc0f_0000_1000_8000_00805f9b34fb;
pub const CHAR_CAMERA_BATTERY: u128 = 0x0000cc10_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_NOTIFY: u128 = 0x0000dd01_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_RECEIVER: u128 = 0x0000dd11_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_DATA_FORMAT: u128 = 0x0000dd21_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_LOCK: u128 = 0x0000dd30_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_ENABLED: u128 = 0x0000dd31_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_TIME_CORRECTION: u128 = 0x0000dd32_0000_1000_8000_00805f9b34fb;
pub const CHAR_LOCATION_AREA_ADJUSTMENT: u128 = 0x0000dd33_0000_1000_8000_00805f9b34fb;

/// Client characteristic configuration descriptor written to subscribe.
pub const DESC_CLIENT_CONFIG: u128 = 0x00002902_0000_1000_8000_00805f9b34fb;

// ───────────────────────────────────────────────────────────────
// Target
// ───────────────────────────────────────────────────────────────

/// Every characteristic the session addresses.  The discriminant doubles as
/// the bit index inside [`Capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Target {
    DeviceName = 0,
    RemoteCommand = 1,
    RemoteStatus = 2,
    CameraStatus = 3,
    CameraMedia = 4,
    CameraBattery = 5,
    LocationNotify = 6,
    LocationReceiver = 7,
    LocationDataFormat = 8,
    LocationLock = 9,
    LocationEnabled = 10,
    LocationTimeCorrection = 11,
    LocationAreaAdjustment = 12,
}

impl Target {
    pub const ALL: [Self; 13] = [
        Self::DeviceName,
        Self::RemoteCommand,
        Self::RemoteStatus,
        Self::CameraStatus,
        Self::CameraMedia,
        Self::CameraBattery,
        Self::LocationNotify,
        Self::LocationReceiver,
        Self::LocationDataFormat,
        Self::LocationLock,
        Self::LocationEnabled,
        Self::LocationTimeCorrection,
        Self::LocationAreaAdjustment,
    ];

    /// Bit for this target inside a [`Capabilities`] mask.
    pub const fn mask(self) -> u16 {
        1 << (self as u8)
    }

    /// 128-bit characteristic UUID.
    pub const fn uuid(self) -> u128 {
        match self {
            Self::DeviceName => CHAR_DEVICE_NAME,
            Self::RemoteCommand => CHAR_REMOTE_COMMAND,
            Self::RemoteStatus => CHAR_REMOTE_STATUS,
            Self::CameraStatus => CHAR_CAMERA_STATUS,
            Self::CameraMedia => CHAR_CAMERA_MEDIA,
            Self::CameraBattery => CHAR_CAMERA_BATTERY,
            Self::LocationNotify => CHAR_LOCATION_NOTIFY,
            Self::LocationReceiver => CHAR_LOCATION_RECEIVER,
            Self::LocationDataFormat => CHAR_LOCATION_DATA_FORMAT,
            Self::LocationLock => CHAR_LOCATION_LOCK,
            Self::LocationEnabled => CHAR_LOCATION_ENABLED,
            Self::LocationTimeCorrection => CHAR_LOCATION_TIME_CORRECTION,
            Self::LocationAreaAdjustment => CHAR_LOCATION_AREA_ADJUSTMENT,
        }
    }

    /// 128-bit UUID of the service that hosts this characteristic.
    pub const fn service(self) -> u128 {
        match self {
            Self::DeviceName => SERVICE_GENERIC_ACCESS,
            Self::RemoteCommand | Self::RemoteStatus => SERVICE_REMOTE,
            Self::CameraStatus | Self::CameraMedia | Self::CameraBattery => SERVICE_CAMERA,
            _ => SERVICE_LOCATION,
        }
    }

    /// Reverse lookup used by transports that only know UUIDs.
    pub fn from_uuid(uuid: u128) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.uuid() == uuid)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::DeviceName => "device-name",
            Self::RemoteCommand => "remote-command",
            Self::RemoteStatus => "remote-status",
            Self::CameraStatus => "camera-status",
            Self::CameraMedia => "camera-media",
            Self::CameraBattery => "camera-battery",
            Self::LocationNotify => "location-notify",
            Self::LocationReceiver => "location-receiver",
            Self::LocationDataFormat => "location-data-format",
            Self::LocationLock => "location-lock",
            Self::LocationEnabled => "location-enabled",
            Self::LocationTimeCorrection => "location-time-correction",
            Self::LocationAreaAdjustment => "location-area-adjustment",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ───────────────────────────────────────────────────────────────
// Capabilities
// ───────────────────────────────────────────────────────────────

/// Set of characteristics found by one discovery pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities(u16);

impl Capabilities {
    /// Targets without which no session is possible.
    pub const REQUIRED: [Target; 3] = [
        Target::RemoteCommand,
        Target::RemoteStatus,
        Target::DeviceName,
    ];

    /// Targets that must all be present for location injection.
    pub const LOCATION: [Target; 6] = [
        Target::LocationReceiver,
        Target::LocationDataFormat,
        Target::LocationLock,
        Target::LocationEnabled,
        Target::LocationTimeCorrection,
        Target::LocationAreaAdjustment,
    ];

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every characteristic this crate knows about.
    pub fn full() -> Self {
        Self::from_targets(Target::ALL)
    }

    pub fn from_targets(targets: impl IntoIterator<Item = Target>) -> Self {
        let mut caps = Self::empty();
        for t in targets {
            caps.insert(t);
        }
        caps
    }

    pub fn insert(&mut self, target: Target) {
        self.0 |= target.mask();
    }

    pub fn remove(&mut self, target: Target) {
        self.0 &= !target.mask();
    }

    pub const fn contains(self, target: Target) -> bool {
        self.0 & target.mask() != 0
    }

    pub fn has_required(self) -> bool {
        Self::REQUIRED.iter().all(|t| self.contains(*t))
    }

    /// Required targets not present, for diagnostics.
    pub fn missing_required(self) -> impl Iterator<Item = Target> {
        Self::REQUIRED.into_iter().filter(move |t| !self.contains(*t))
    }

    pub fn supports_location(self) -> bool {
        Self::LOCATION.iter().all(|t| self.contains(*t))
    }

    pub const fn bits(self) -> u16 {
        self.0
    }
}

// ───────────────────────────────────────────────────────────────
// Status
// ───────────────────────────────────────────────────────────────

/// Completion status reported by the platform for a read/write/subscribe.
/// Wide enough for platform codes above 255 (Android `GATT_FAILURE` is 257).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GattStatus(pub u16);

impl GattStatus {
    pub const SUCCESS: Self = Self(0);

    /// Opaque code this camera family returns on a command write while the
    /// "Bluetooth remote" menu setting is off.  Not a general GATT meaning.
    pub const FEATURE_DISABLED: Self = Self(144);

    pub const fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }
}

impl fmt::Display for GattStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
