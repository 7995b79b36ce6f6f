//! AlphaRemote core library.
//!
//! Transport and protocol layer for driving a Sony Alpha camera over BLE:
//! the GATT operation serializer, the camera session state machine, the
//! wire codec and location staging.  The platform BLE stack, clock and UI
//! plug in through the traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod fsm;
pub mod protocol;
pub mod serializer;
pub mod shared;

pub use app::commands::{ActionStep, WaitEvent};
pub use app::events::TransportEvent;
pub use app::ports::{Clock, GattTransport, StateObserver};
pub use config::RemoteConfig;
pub use error::{Error, Result};
pub use fsm::{CameraState, ReadyState};
pub use shared::SharedSession;
