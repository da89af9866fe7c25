#![no_main]

use libfuzzer_sys::fuzz_target;
use mosaic_decoder::{Frame, FrameSplitter};

// Fuzz target: FrameSplitter over arbitrary capture bytes.
//
// Every input byte must end up either inside exactly one frame or in the
// skipped counter, and a complete capture must be consumed entirely.
fuzz_target!(|data: &[u8]| {
    let mut splitter = FrameSplitter::new(data);
    let mut framed = 0u64;
    for frame in splitter.by_ref() {
        framed += match frame {
            Frame::Sbf(block) => block.bytes().len() as u64,
            Frame::Nmea(sentence) => sentence.len() as u64 + 2,
        };
    }

    let stats = splitter.stats();
    assert!(splitter.remaining().is_empty());
    assert_eq!(framed + stats.skipped_bytes, data.len() as u64);
});
