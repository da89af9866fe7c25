#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mosaic_wire::header::encode_block;
use mosaic_wire::{BlockId, TimeStamp, validate_block};

#[derive(Arbitrary, Debug)]
struct Input {
    number: u16,
    revision: u8,
    tow_ms: Option<u32>,
    wnc: Option<u16>,
    payload: Vec<u8>,
}

// Fuzz target: encode_block → validate_block roundtrip.
//
// An encoded block must validate, keep its identifier, and carry a
// padded length that is a multiple of 4.
fuzz_target!(|input: Input| {
    if input.payload.len() > 4096 {
        return;
    }
    let id = BlockId::new(input.number, input.revision);
    let time = TimeStamp {
        tow_ms: input.tow_ms.filter(|&t| t != u32::MAX),
        wnc: input.wnc.filter(|&w| w != u16::MAX),
    };

    let bytes = encode_block(id, time, &input.payload);
    let block = validate_block(&bytes).expect("encoded block must validate");

    assert_eq!(block.id(), id);
    assert_eq!(block.time_stamp(), time);
    assert_eq!(bytes.len() % 4, 0);
    assert_eq!(&block.bytes()[14..14 + input.payload.len()], input.payload.as_slice());
});
