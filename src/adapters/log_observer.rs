//! Log-based state observer adapter.
//!
//! Implements [`StateObserver`] by writing every published camera state to
//! the `log` facade.  A UI binding would implement the same trait.

use log::info;

use crate::app::ports::StateObserver;
use crate::fsm::CameraState;

/// Adapter that logs every [`CameraState`] snapshot.
#[derive(Debug, Default)]
pub struct LogStateObserver {
    published: u64,
}

impl LogStateObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots seen so far.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl StateObserver for LogStateObserver {
    fn on_state(&mut self, state: &CameraState) {
        self.published += 1;
        match state {
            CameraState::Ready(r) => {
                info!(
                    "STATE | Ready {} | focus={} shutter={} rec={} | buttons={:?} jogs={:?} | media={} | battery={}",
                    r.name.as_deref().unwrap_or("?"),
                    r.focus.state,
                    r.shutter.state,
                    r.recording.state,
                    r.pressed_buttons,
                    r.pressed_jogs,
                    r.media_status.as_ref().map_or("-", |m| m.description.as_str()),
                    r.battery_status.as_ref().map_or("-", |b| b.description.as_str()),
                );
            }
            CameraState::Error { cause, description } => match cause {
                Some(e) => info!("STATE | Error | {} ({})", description, e),
                None => info!("STATE | Error | {}", description),
            },
            other => info!("STATE | {}", other),
        }
    }
}
