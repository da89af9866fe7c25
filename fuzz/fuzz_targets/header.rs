#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: SbfHeader::read_from and validate_block with arbitrary bytes.
//
// Catches bugs in:
// - Sync byte checking
// - Length bounds (minimum, multiple of 4, longer than the buffer)
// - CRC coverage of the block
// - Time stamp extraction from short blocks
fuzz_target!(|data: &[u8]| {
    let _ = mosaic_wire::SbfHeader::read_from(data);
    if let Ok(block) = mosaic_wire::validate_block(data) {
        assert!(block.bytes().len() <= data.len());
        assert_eq!(block.bytes().len(), block.header().block_len());
        let _ = block.time_stamp();
        let _ = mosaic_decoder::PvtGeodetic::decode(&block);
    }
});
