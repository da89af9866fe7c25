//! Capture fixture generator.
//!
//! Writes `tests/fixtures/capture.sbf`, a ten-epoch capture with one
//! corrupted block, for trying the CLI by hand:
//!
//! ```bash
//! cargo run --bin generate_fixture -p mosaic-tests
//! cargo run --bin mosaic -- inspect crates/mosaic-tests/tests/fixtures/capture.sbf
//! cargo run --bin mosaic -- replay --frame-delay-ms 50 crates/mosaic-tests/tests/fixtures/capture.sbf
//! ```
//!
//! The first 64 bytes are printed as hex so a regenerated file can be
//! compared at a glance.

#![allow(clippy::pedantic)]

use std::path::PathBuf;

use mosaic_tests::sample_capture;

const EPOCHS: usize = 10;
const CORRUPT_EPOCH: usize = 4;

fn main() {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let path = manifest_dir.join("tests/fixtures/capture.sbf");

    let capture = sample_capture(EPOCHS, Some(CORRUPT_EPOCH));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(&path, &capture).expect("write capture");

    println!("wrote {} ({} bytes)", path.display(), capture.len());
    for (i, chunk) in capture.chunks(16).take(4).enumerate() {
        println!("  {:04x}  {}", i * 16, hex::encode(chunk));
    }
}
