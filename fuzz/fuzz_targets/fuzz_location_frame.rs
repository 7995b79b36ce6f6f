//! Fuzz target: location frame encode/parse
//!
//! The first bytes pick coordinates and a timestamp for the encoder; the
//! whole input is also handed to the frame parser.  Every frame the
//! encoder produces must parse back to the same calendar fields.
//!
//! cargo fuzz run fuzz_location_frame

#![no_main]

use core::time::Duration;

use alpharemote::protocol::location::encode_location;
use alpharemote::protocol::{LocationFix, LocationFrameView, ZoneOffsets};
use chrono::{Datelike, TimeZone, Utc};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = LocationFrameView::parse(data);

    let Some((head, _)) = data.split_first_chunk::<21>() else {
        return;
    };
    let f64_at = |o: usize| {
        let mut b = [0u8; 8];
        b.copy_from_slice(&head[o..o + 8]);
        f64::from_be_bytes(b)
    };
    let fix = LocationFix {
        latitude: f64_at(0),
        longitude: f64_at(8),
        captured_at: Duration::ZERO,
    };
    let secs = i64::from(u32::from_be_bytes([head[16], head[17], head[18], head[19]]));
    let Some(utc) = Utc.timestamp_opt(secs, 0).single() else {
        return;
    };
    let zone = (head[20] & 1 == 1).then_some(ZoneOffsets {
        raw_minutes: i16::from(head[20] as i8) * 5,
        dst_minutes: 0,
    });

    if let Ok(frame) = encode_location(&fix, Duration::ZERO, Duration::from_secs(30), &utc, zone) {
        let view = LocationFrameView::parse(&frame).expect("encoder output parses");
        assert_eq!(i32::from(view.year), utc.year());
        assert_eq!(view.zone, zone);
        assert!((view.latitude - fix.latitude).abs() < 1e-6);
    }
});
