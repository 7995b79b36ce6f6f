//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one part of the camera
//! session against the recording mock transport.  No BLE stack required.

mod lifecycle_tests;
mod location_tests;
mod mock_transport;
