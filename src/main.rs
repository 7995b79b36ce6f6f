//! AlphaRemote simulator: drives a full camera session against the
//! in-memory camera model.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  main loop                                               │
//! │    intents ──▶ SharedSession ──issue_*──▶ SimulatedCamera │
//! │       ▲              ▲                         │         │
//! │       │              └── handle_event ◀── Channel ◀──────┘
//! │  LogStateObserver ◀── state snapshots                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `alpharemote-sim [--remote-disabled] [config.json]`
//! Log level follows `RUST_LOG` (default `info`).

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use alpharemote::adapters::log_observer::LogStateObserver;
use alpharemote::adapters::sim::{self, EventChannel, SimProfile, SimulatedCamera};
use alpharemote::adapters::time::SystemClock;
use alpharemote::protocol::{ButtonCode, JogCode, LocationFix, Target};
use alpharemote::{ActionStep, CameraState, Clock, RemoteConfig, SharedSession, TransportEvent};

type Session = SharedSession<SimulatedCamera, SystemClock, LogStateObserver>;

// ── Event pump ────────────────────────────────────────────────

/// Deliver every queued simulator completion to the session.
fn pump(session: &Session, events: &EventChannel) {
    while let Ok(event) = events.try_receive() {
        session.handle_event(event);
    }
}

fn step(session: &Session, events: &EventChannel, action: ActionStep) {
    session.execute_action(action);
    pump(session, events);
}

fn load_config(path: Option<&str>) -> Result<RemoteConfig> {
    let Some(path) = path else {
        return Ok(RemoteConfig::default());
    };
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let config = RemoteConfig::from_json(&text).map_err(alpharemote::Error::from)?;
    info!("Config loaded from {}", path);
    Ok(config)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("AlphaRemote simulator v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    let remote_disabled = args.iter().any(|a| a == "--remote-disabled");
    let config_path = args.iter().find(|a| !a.starts_with("--")).map(String::as_str);
    let config = load_config(config_path)?;

    // ── Wire adapters ─────────────────────────────────────────
    let events = Arc::new(EventChannel::new());
    let profile = SimProfile {
        remote_enabled: !remote_disabled,
        ..Default::default()
    };
    let clock = SystemClock::new();
    let session = Session::new(
        SimulatedCamera::new(profile, events.clone()),
        clock,
        LogStateObserver::new(),
        config.clone(),
    );

    // ── Connect and bootstrap ─────────────────────────────────
    // A fix taken before the link is up is staged and sent once location
    // is configured.
    session.submit_location_fix(LocationFix {
        latitude: 52.520_008,
        longitude: 13.404_954,
        captured_at: clock.monotonic(),
    });
    session.request_session();
    pump(&session, &events);

    let state = session.state();
    let Some(ready) = state.as_ready() else {
        anyhow::bail!("session did not reach Ready: {}", state);
    };
    info!("Ready snapshot: {}", serde_json::to_string(ready)?);

    // ── Remote control ────────────────────────────────────────
    step(&session, &events, ActionStep::press(ButtonCode::ShutterHalf));
    step(&session, &events, ActionStep::press(ButtonCode::ShutterFull));

    if session.state() == CameraState::RemoteDisabled {
        warn!("Camera refused the command; enable \"Bluetooth Rmt Ctrl\" on the camera");
        // what the camera sends once the user flips the setting back on
        let _ = events.try_send(TransportEvent::Notification {
            target: Target::RemoteStatus,
            value: vec![0x02, 0xa0, 0x00],
        });
        pump(&session, &events);
    }

    step(&session, &events, ActionStep::release(ButtonCode::ShutterFull));
    step(&session, &events, ActionStep::release(ButtonCode::ShutterHalf));
    step(&session, &events, ActionStep::jog(JogCode::ZoomTele, true, &config));
    step(&session, &events, ActionStep::jog(JogCode::ZoomTele, false, &config));

    // ── Telemetry and location in steady state ────────────────
    let _ = events.try_send(TransportEvent::Notification {
        target: Target::CameraMedia,
        value: sim::media_seconds_frame(3723),
    });
    let _ = events.try_send(TransportEvent::Notification {
        target: Target::CameraBattery,
        value: sim::battery_frame(64, true),
    });
    pump(&session, &events);

    session.submit_location_fix(LocationFix {
        latitude: 52.520_100,
        longitude: 13.405_000,
        captured_at: clock.monotonic(),
    });
    pump(&session, &events);

    if let Some(ready) = session.state().as_ready() {
        info!("Final snapshot: {}", serde_json::to_string(ready)?);
    }
    let fixes = session
        .inspect(|s| s.transport().fixes().len())
        .unwrap_or_default();
    info!("Location frames accepted by camera: {}", fixes);

    session.disconnect();
    pump(&session, &events);
    info!("Simulation finished in state {}", session.state());
    Ok(())
}
