/// Errors raised by the checked SBF framing layer.
///
/// The primitive field decoders in [`crate::field`] never return these:
/// they treat a short input as a caller bug. Everything that sits in front
/// of them (header parsing, block validation, checked field views) reports
/// problems through this enum instead, so a frame is rejected before any
/// field inside it is touched.
///
/// ```text
/// ┌──────────────────┬──────────────────────────────────────────────────┐
/// │ Variant          │ Cause                                            │
/// ├──────────────────┼──────────────────────────────────────────────────┤
/// │ UnexpectedEof    │ Fewer than 8 header bytes available              │
/// │ InvalidSync      │ First two bytes are not "$@"                     │
/// │ InvalidLength    │ Declared length too small or not a multiple of 4 │
/// │ Truncated        │ Buffer shorter than the declared block length    │
/// │ CrcMismatch      │ CRC-16 over ID..end does not match the header    │
/// │ FieldOutOfBounds │ Checked field view exceeds the frame             │
/// └──────────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete block header could be read.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The sync bytes did not match `$@`.
    #[error("invalid sync bytes: expected 0x2440, got {found:#06X}")]
    InvalidSync { found: u16 },

    /// The declared block length is impossible.
    ///
    /// SBF lengths cover the whole block including the header, are always
    /// a multiple of 4, and never smaller than header plus time stamp.
    #[error("invalid block length {length}")]
    InvalidLength { length: u16 },

    /// The buffer holds fewer bytes than the header declares.
    #[error("block truncated: declared {declared} bytes, only {available} available")]
    Truncated { declared: usize, available: usize },

    /// The CRC stored in the header does not match the block contents.
    #[error("crc mismatch: header says {expected:#06X}, computed {computed:#06X}")]
    CrcMismatch { expected: u16, computed: u16 },

    /// A checked field view would read past the end of its frame.
    #[error("field at offset {offset} with width {width} exceeds frame of {len} bytes")]
    FieldOutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
}
