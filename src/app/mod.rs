//! Application core: session logic, zero platform I/O.
//!
//! The camera session, its intents and the location stager live here.
//! All interaction with the BLE stack and the clock goes through the
//! **port traits** in [`ports`], keeping this layer testable with mock
//! adapters.

pub mod commands;
pub mod events;
pub mod location;
pub mod ports;
pub mod service;
