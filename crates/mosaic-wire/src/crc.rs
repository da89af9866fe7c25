//! CRC-16-CCITT as used by the SBF block header.
//!
//! Polynomial 0x1021, initial value 0, no input or output reflection, no
//! final XOR (the variant usually catalogued as CRC-16/XMODEM). The CRC
//! covers everything after the CRC field itself: ID, Length and the block
//! body.

const POLY: u16 = 0x1021;

/// Lookup table, one entry per leading byte value. Built at compile time.
const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the SBF CRC over `bytes`.
#[must_use]
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    bytes.iter().fold(0u16, |crc, &b| {
        let idx = usize::from((crc >> 8) as u8 ^ b);
        (crc << 8) ^ TABLE[idx]
    })
}
