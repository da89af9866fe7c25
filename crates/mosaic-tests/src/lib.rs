//! Deterministic receiver captures shared by the integration tests, the
//! benches and `generate_fixture`.
//!
//! A capture is a short preamble of boot noise followed by `epochs`
//! one-second epochs, each laid out the way a receiver configured for
//! PVTGeodetic + ReceiverTime + GGA emits them:
//!
//! ```text
//! ┌──────────────┬─────────────────────┬───────────────┬──────────────────────┐
//! │ preamble (8) │ PVTGeodetic (96 B)  │ $GPGGA … CRLF │ ReceiverTime (24 B)  │ …
//! └──────────────┴─────────────────────┴───────────────┴──────────────────────┘
//! ```

#![allow(clippy::pedantic)]

use mosaic_decoder::blocks::encode_pvt_geodetic;
use mosaic_wire::header::encode_block;
use mosaic_wire::{BlockId, TimeStamp};

/// Time of week of the first epoch: Thursday 00:00 GPS time.
pub const START_TOW_MS: u32 = 345_600_000;
pub const WEEK: u16 = 2300;
pub const EPOCH_MS: u32 = 1000;

/// Bytes a receiver prints before its first frame. Contains no `$`.
pub const PREAMBLE: &[u8] = b"\x00\xFFboot\r\n";

#[must_use]
pub fn stamp(tow_ms: u32) -> TimeStamp {
    TimeStamp {
        tow_ms: Some(tow_ms),
        wnc: Some(WEEK),
    }
}

/// RTK-fixed PVTGeodetic creeping north by one micro-degree per epoch.
#[must_use]
pub fn pvt_block(tow_ms: u32, epoch: usize) -> Vec<u8> {
    let latitude = (52.0 + epoch as f64 * 1e-6).to_radians();
    let payload = encode_pvt_geodetic(4, latitude, 4.5_f64.to_radians(), 41.25, Some((3, 5)));
    encode_block(BlockId::new(4007, 2), stamp(tow_ms), &payload)
}

/// ReceiverTime with a fixed UTC date and 18 leap seconds.
#[must_use]
pub fn receiver_time_block(tow_ms: u32) -> Vec<u8> {
    encode_block(
        BlockId::new(5914, 0),
        stamp(tow_ms),
        &[24, 1, 1, 0, 0, 0, 18, 3],
    )
}

/// XOR of every byte between `$` and `*`.
#[must_use]
pub fn nmea_checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

/// GGA sentence for `epoch`, without CRLF.
#[must_use]
pub fn gga(epoch: usize) -> String {
    let secs = 43_200 + epoch;
    let body = format!(
        "GPGGA,{:02}{:02}{:02}.00,5200.000,N,00430.000,E,4,12,0.8,41.2,M,47.0,M,1.0,0000",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    );
    format!("${body}*{:02X}", nmea_checksum(&body))
}

/// Flip the last byte of a block so its CRC no longer matches.
pub fn corrupt(block: &mut [u8]) {
    if let Some(last) = block.last_mut() {
        *last ^= 0xFF;
    }
}

/// The standard capture, optionally with the ReceiverTime block of one
/// epoch corrupted.
#[must_use]
pub fn sample_capture(epochs: usize, corrupt_epoch: Option<usize>) -> Vec<u8> {
    let mut out = PREAMBLE.to_vec();
    for epoch in 0..epochs {
        let tow_ms = START_TOW_MS + epoch as u32 * EPOCH_MS;
        out.extend_from_slice(&pvt_block(tow_ms, epoch));
        out.extend_from_slice(gga(epoch).as_bytes());
        out.extend_from_slice(b"\r\n");
        let mut time = receiver_time_block(tow_ms);
        if corrupt_epoch == Some(epoch) {
            corrupt(&mut time);
        }
        out.extend_from_slice(&time);
    }
    out
}
