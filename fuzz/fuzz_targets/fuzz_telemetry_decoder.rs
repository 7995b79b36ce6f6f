//! Fuzz target: camera notification decoders
//!
//! Feeds arbitrary bytes to the status, media and battery decoders.  None
//! may panic, and anything accepted must be internally consistent.
//!
//! cargo fuzz run fuzz_telemetry_decoder

#![no_main]

use alpharemote::protocol::command::decode_status;
use alpharemote::protocol::telemetry::{decode_battery, decode_media};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if decode_status(data).is_some() {
        assert!(data.len() >= 3);
    }

    if let Some(media) = decode_media(data) {
        assert!(data.len() >= 20);
        assert!(media.shots_remaining.is_some() || media.seconds_remaining.is_some());
        assert!(!media.description.is_empty());
    }

    if let Some(battery) = decode_battery(data) {
        assert!(data.len() >= 18);
        assert!(battery.percentage <= 100);
    }
});
