//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements     | Connects to                     |
//! |----------------|----------------|---------------------------------|
//! | `log_observer` | StateObserver  | `log` facade                    |
//! | `time`         | Clock          | `std::time::Instant` + `chrono` |
//! | `sim`          | GattTransport  | in-memory camera model          |
//!
//! A platform BLE stack binding implements `GattTransport` the same way
//! `sim` does and lives in the host application.

pub mod log_observer;
pub mod sim;
pub mod time;
