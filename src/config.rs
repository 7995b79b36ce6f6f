//! Session configuration parameters
//!
//! Tunable parameters for the remote-control session.  The host application
//! owns persistence; this crate only parses and validates.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Longest fix age accepted by validation (5 minutes).
const MAX_FIX_AGE_LIMIT_MS: u64 = 300_000;

/// Core session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    // --- Location ---
    /// Fixes older than this (monotonic milliseconds) are never sent
    pub max_fix_age_ms: u64,
    /// Configure the camera's location service and forward fixes
    pub location_sync: bool,

    // --- Telemetry ---
    /// Issue one read of media/battery after subscribing
    pub prime_telemetry: bool,

    // --- Remote ---
    /// Jog magnitude used by `ActionStep::jog`
    pub default_jog_step: u8,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            // Location
            max_fix_age_ms: 30_000,
            location_sync: true,

            // Telemetry
            prime_telemetry: true,

            // Remote
            default_jog_step: 0x20,
        }
    }
}

impl RemoteConfig {
    /// Parse a JSON document and validate it.  Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::warn!("Config parse failed: {}", e);
            ConfigError::Malformed
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range values rather than clamping them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_fix_age_ms == 0 || self.max_fix_age_ms > MAX_FIX_AGE_LIMIT_MS {
            return Err(ConfigError::ValidationFailed(
                "max_fix_age_ms must be within 1..=300000",
            ));
        }
        if self.default_jog_step == 0 || self.default_jog_step > 0x7f {
            return Err(ConfigError::ValidationFailed(
                "default_jog_step must be within 1..=127",
            ));
        }
        Ok(())
    }

    /// `max_fix_age_ms` as a `Duration`.
    pub fn max_fix_age(&self) -> core::time::Duration {
        core::time::Duration::from_millis(self.max_fix_age_ms)
    }
}
