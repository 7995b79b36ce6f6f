//! Inbound intents from the application.
//!
//! An [`ActionStep`] is one step of a user-defined camera action.  Button
//! and jog steps produce command writes; timed and wait steps are
//! orchestrated by the caller and produce no traffic here.

use core::time::Duration;

use crate::config::RemoteConfig;
use crate::protocol::{ButtonCode, JogCode};

/// Camera-reported event an action sequence can wait for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEvent {
    Focus,
    Shutter,
    Recording,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStep {
    Button { button: ButtonCode, pressed: bool },
    /// `step` is the jog speed, 1..=0x7f.
    Jog { jog: JogCode, pressed: bool, step: u8 },
    Countdown(Duration),
    WaitFor(WaitEvent),
}

impl ActionStep {
    pub fn press(button: ButtonCode) -> Self {
        Self::Button { button, pressed: true }
    }

    pub fn release(button: ButtonCode) -> Self {
        Self::Button { button, pressed: false }
    }

    /// Jog step at the configured default speed.
    pub fn jog(jog: JogCode, pressed: bool, config: &RemoteConfig) -> Self {
        Self::Jog {
            jog,
            pressed,
            step: config.default_jog_step,
        }
    }

    /// Whether this step sends anything to the camera.
    pub fn is_transport_step(&self) -> bool {
        matches!(self, Self::Button { .. } | Self::Jog { .. })
    }
}
