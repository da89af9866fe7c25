use crate::block_id::BlockId;
use crate::crc::crc16_ccitt;
use crate::error::WireError;
use crate::field::{RawField, decode_u16, decode_u32};

/// Sync bytes opening every SBF block: ASCII `$@`.
pub const SBF_SYNC: [u8; 2] = [0x24, 0x40];

/// Size of the fixed block header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Header plus the TOW/WNc time stamp every block carries.
pub const TIME_STAMP_END: usize = 14;

/// Smallest legal block length: the time stamp rounded up to the 4-byte
/// block alignment.
pub const MIN_BLOCK_LEN: usize = 16;

/// TOW value meaning "do not use".
pub const TOW_DO_NOT_USE: u32 = u32::MAX;

/// WNc value meaning "do not use".
pub const WNC_DO_NOT_USE: u16 = u16::MAX;

/// The 8-byte SBF block header.
///
/// ```text
/// ┌────────┬─────────┬─────────────────────────────────────────────┐
/// │ Offset │ Size    │ Description                                 │
/// ├────────┼─────────┼─────────────────────────────────────────────┤
/// │ 0x00   │ 2 bytes │ Sync: "$@" (0x24 0x40)                      │
/// │ 0x02   │ 2 bytes │ CRC-16 over bytes 4..length                 │
/// │ 0x04   │ 2 bytes │ ID: block number (13 bits) + revision (3)   │
/// │ 0x06   │ 2 bytes │ Length of the whole block, multiple of 4    │
/// └────────┴─────────┴─────────────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SbfHeader {
    pub crc: u16,
    pub id: BlockId,
    pub length: u16,
}

impl SbfHeader {
    /// Parse a header from the first 8 bytes of `buf`.
    ///
    /// Only the header itself is checked here; the CRC and the presence of
    /// the rest of the block are checked by [`validate_block`].
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is shorter than 8 bytes.
    /// - [`WireError::InvalidSync`] if the sync bytes are wrong.
    /// - [`WireError::InvalidLength`] if the length is below
    ///   [`MIN_BLOCK_LEN`] or not a multiple of 4.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        if buf[0..2] != SBF_SYNC {
            return Err(WireError::InvalidSync {
                found: u16::from_be_bytes([buf[0], buf[1]]),
            });
        }

        let crc = decode_u16(&buf[2..]);
        let id = BlockId::from_raw(decode_u16(&buf[4..]));
        let length = decode_u16(&buf[6..]);

        if usize::from(length) < MIN_BLOCK_LEN || length % 4 != 0 {
            return Err(WireError::InvalidLength { length });
        }

        Ok(Self { crc, id, length })
    }

    /// Write the header into the first 8 bytes of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if `buf` is shorter than 8
    /// bytes.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        buf[0..2].copy_from_slice(&SBF_SYNC);
        buf[2..4].copy_from_slice(&self.crc.to_le_bytes());
        buf[4..6].copy_from_slice(&self.id.raw().to_le_bytes());
        buf[6..8].copy_from_slice(&self.length.to_le_bytes());
        Ok(())
    }

    #[must_use]
    pub fn block_len(&self) -> usize {
        usize::from(self.length)
    }
}

/// The receiver time stamp at offset 8 of every block.
///
/// `None` marks a field the receiver flagged as "do not use", which is the
/// normal state before the first fix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeStamp {
    /// Time of week in milliseconds.
    pub tow_ms: Option<u32>,
    /// Continuous GPS week number.
    pub wnc: Option<u16>,
}

impl TimeStamp {
    /// Decode the time stamp of the block starting at `block`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is shorter than [`TIME_STAMP_END`]. Any validated
    /// block is long enough.
    #[must_use]
    pub fn read_from(block: &[u8]) -> Self {
        let tow = decode_u32(&block[8..]);
        let wnc = decode_u16(&block[12..]);
        Self {
            tow_ms: (tow != TOW_DO_NOT_USE).then_some(tow),
            wnc: (wnc != WNC_DO_NOT_USE).then_some(wnc),
        }
    }

    /// Both halves are present.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.tow_ms.is_some() && self.wnc.is_some()
    }
}

/// A complete block with a checked header and length.
///
/// Borrows exactly `header.length` bytes of the input, so every field
/// offset below the declared length is safe to decode. Blocks built by
/// [`validate_block`] have had their CRC verified as well.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SbfBlock<'a> {
    header: SbfHeader,
    bytes: &'a [u8],
}

impl<'a> SbfBlock<'a> {
    /// View the block at the start of `buf` without checking its CRC.
    ///
    /// For bytes that already went through [`validate_block`] once, such as
    /// a frame the splitter copied out of its read buffer. Header and
    /// length are still checked, so field access stays in bounds.
    ///
    /// # Errors
    ///
    /// Any [`SbfHeader::read_from`] error, or [`WireError::Truncated`].
    pub fn read_from(buf: &'a [u8]) -> Result<Self, WireError> {
        let header = SbfHeader::read_from(buf)?;
        let declared = header.block_len();
        let bytes = buf.get(..declared).ok_or(WireError::Truncated {
            declared,
            available: buf.len(),
        })?;
        Ok(Self { header, bytes })
    }

    #[must_use]
    pub fn header(&self) -> &SbfHeader {
        &self.header
    }

    #[must_use]
    pub fn id(&self) -> BlockId {
        self.header.id
    }

    /// The whole block, header included.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Everything after the 8-byte header (time stamp included).
    #[must_use]
    pub fn body(&self) -> &'a [u8] {
        &self.bytes[HEADER_SIZE..]
    }

    #[must_use]
    pub fn time_stamp(&self) -> TimeStamp {
        TimeStamp::read_from(self.bytes)
    }

    /// Checked view of a field, with `offset` counted from the start of the
    /// block as in the receiver reference guide.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::FieldOutOfBounds`] if the field extends past
    /// the declared block length.
    pub fn field(&self, offset: usize, width: usize) -> Result<RawField<'a>, WireError> {
        RawField::new(self.bytes, offset, width)
    }
}

/// Validate the block at the start of `buf`.
///
/// Checks, in order: header sync and length, that `buf` holds the whole
/// declared block, and the CRC. Bytes past the declared length are ignored.
///
/// # Errors
///
/// Any [`SbfHeader::read_from`] error, [`WireError::Truncated`] if the
/// buffer is short, or [`WireError::CrcMismatch`].
pub fn validate_block(buf: &[u8]) -> Result<SbfBlock<'_>, WireError> {
    let block = SbfBlock::read_from(buf)?;

    let computed = crc16_ccitt(&block.bytes[4..]);
    if computed != block.header.crc {
        return Err(WireError::CrcMismatch {
            expected: block.header.crc,
            computed,
        });
    }

    Ok(block)
}

/// Build a complete block around `payload`.
///
/// `payload` is everything after the time stamp. The block is zero-padded
/// to a multiple of 4 and the length and CRC are filled in. Used by the
/// fixture generator, tests and fuzz targets.
///
/// # Panics
///
/// Panics if the resulting block would be longer than `u16::MAX` bytes.
#[must_use]
pub fn encode_block(id: BlockId, time: TimeStamp, payload: &[u8]) -> Vec<u8> {
    let unpadded = TIME_STAMP_END + payload.len();
    let len = unpadded.next_multiple_of(4).max(MIN_BLOCK_LEN);
    let length = u16::try_from(len).expect("SBF block longer than 65535 bytes");

    let mut block = vec![0u8; len];
    block[8..12].copy_from_slice(&time.tow_ms.unwrap_or(TOW_DO_NOT_USE).to_le_bytes());
    block[12..14].copy_from_slice(&time.wnc.unwrap_or(WNC_DO_NOT_USE).to_le_bytes());
    block[TIME_STAMP_END..unpadded].copy_from_slice(payload);

    let mut header = SbfHeader { crc: 0, id, length };
    block[4..6].copy_from_slice(&id.raw().to_le_bytes());
    block[6..8].copy_from_slice(&length.to_le_bytes());
    header.crc = crc16_ccitt(&block[4..]);
    header
        .write_to(&mut block)
        .expect("block is at least HEADER_SIZE bytes");
    block
}
