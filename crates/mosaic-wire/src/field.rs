//! Primitive SBF field decoders.
//!
//! Every scalar on the SBF wire is little-endian, integers are
//! two's-complement and floats are IEEE-754 binary32/binary64. Each decoder
//! copies the bytes it needs into a fixed array and assembles the value with
//! `from_le_bytes`, so the result is the same on any host regardless of its
//! native byte order.
//!
//! ```text
//! ┌──────────────┬───────┬──────────────────────────────┐
//! │ Decoder      │ Width │ Wire encoding                │
//! ├──────────────┼───────┼──────────────────────────────┤
//! │ decode_u8    │ 1     │ unsigned                     │
//! │ decode_u16   │ 2     │ unsigned, little-endian      │
//! │ decode_u32   │ 4     │ unsigned, little-endian      │
//! │ decode_i8    │ 1     │ two's-complement             │
//! │ decode_i16   │ 2     │ two's-complement, LE         │
//! │ decode_i32   │ 4     │ two's-complement, LE         │
//! │ decode_f32   │ 4     │ IEEE-754 binary32, LE        │
//! │ decode_f64   │ 8     │ IEEE-754 binary64, LE        │
//! │ decode_text  │ n     │ raw bytes, no terminator     │
//! └──────────────┴───────┴──────────────────────────────┘
//! ```
//!
//! # Panics
//!
//! The free functions do not check their input length. Passing a slice
//! shorter than the field is a caller bug and panics with an
//! index-out-of-bounds. Validate the frame with
//! [`validate_block`](crate::header::validate_block) or build a checked
//! [`RawField`] before decoding anything inside it.

use std::borrow::Cow;
use std::fmt;

use crate::error::WireError;

#[must_use]
pub fn decode_u8(buf: &[u8]) -> u8 {
    buf[0]
}

#[must_use]
pub fn decode_u16(buf: &[u8]) -> u16 {
    u16::from_le_bytes([buf[0], buf[1]])
}

#[must_use]
pub fn decode_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

#[must_use]
pub fn decode_i8(buf: &[u8]) -> i8 {
    i8::from_le_bytes([buf[0]])
}

#[must_use]
pub fn decode_i16(buf: &[u8]) -> i16 {
    i16::from_le_bytes([buf[0], buf[1]])
}

#[must_use]
pub fn decode_i32(buf: &[u8]) -> i32 {
    i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}

/// Decode an IEEE-754 binary32 value.
///
/// Goes through the integer bit pattern, so NaN payloads survive intact.
#[must_use]
pub fn decode_f32(buf: &[u8]) -> f32 {
    f32::from_bits(decode_u32(buf))
}

/// Decode an IEEE-754 binary64 value.
#[must_use]
pub fn decode_f64(buf: &[u8]) -> f64 {
    f64::from_bits(u64::from_le_bytes([
        buf[0], buf[1], buf[2], buf[3], buf[4], buf[5], buf[6], buf[7],
    ]))
}

/// Borrow a fixed-width text field.
///
/// SBF text fields are padded byte arrays with no terminator and no
/// declared encoding, so the bytes are returned verbatim. Use
/// [`DecodedValue::text_lossy`] when a printable form is needed.
#[must_use]
pub fn decode_text(buf: &[u8], length: usize) -> &[u8] {
    &buf[..length]
}

/// Wire type of a single field, with its fixed width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    U16,
    U32,
    I8,
    I16,
    I32,
    F32,
    F64,
    /// Fixed-width text of the given byte length.
    Text(usize),
}

impl FieldKind {
    /// Number of bytes this field occupies on the wire.
    #[must_use]
    pub fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
            Self::Text(len) => len,
        }
    }

    /// Decode `buf` as this kind.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is shorter than [`width`](Self::width).
    #[must_use]
    pub fn decode(self, buf: &[u8]) -> DecodedValue<'_> {
        match self {
            Self::U8 => DecodedValue::U8(decode_u8(buf)),
            Self::U16 => DecodedValue::U16(decode_u16(buf)),
            Self::U32 => DecodedValue::U32(decode_u32(buf)),
            Self::I8 => DecodedValue::I8(decode_i8(buf)),
            Self::I16 => DecodedValue::I16(decode_i16(buf)),
            Self::I32 => DecodedValue::I32(decode_i32(buf)),
            Self::F32 => DecodedValue::F32(decode_f32(buf)),
            Self::F64 => DecodedValue::F64(decode_f64(buf)),
            Self::Text(len) => DecodedValue::Text(decode_text(buf, len)),
        }
    }
}

/// A single decoded field value.
///
/// Text borrows from the frame it was decoded from; every other variant is
/// a plain copy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecodedValue<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    I8(i8),
    I16(i16),
    I32(i32),
    F32(f32),
    F64(f64),
    Text(&'a [u8]),
}

impl DecodedValue<'_> {
    /// Widen any numeric variant to `f64`. Returns `None` for text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::U8(v) => Some(f64::from(v)),
            Self::U16(v) => Some(f64::from(v)),
            Self::U32(v) => Some(f64::from(v)),
            Self::I8(v) => Some(f64::from(v)),
            Self::I16(v) => Some(f64::from(v)),
            Self::I32(v) => Some(f64::from(v)),
            Self::F32(v) => Some(f64::from(v)),
            Self::F64(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    /// Printable form of a text field, with trailing NUL padding removed.
    /// Returns `None` for numeric variants.
    #[must_use]
    pub fn text_lossy(&self) -> Option<Cow<'_, str>> {
        match *self {
            Self::Text(bytes) => {
                let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                Some(String::from_utf8_lossy(&bytes[..end]))
            }
            _ => None,
        }
    }
}

impl fmt::Display for DecodedValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Text(_) => write!(f, "{:?}", self.text_lossy().unwrap_or_default()),
        }
    }
}

/// A bounds-checked view of one field inside a frame.
///
/// Construction is the only place a length check happens; once a
/// `RawField` exists, decoding it with a kind no wider than the view can
/// not panic. The view borrows the frame and cannot outlive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawField<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> RawField<'a> {
    /// Borrow `width` bytes of `frame` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::FieldOutOfBounds`] if the range does not fit
    /// inside `frame` (including when `offset + width` overflows).
    pub fn new(frame: &'a [u8], offset: usize, width: usize) -> Result<Self, WireError> {
        let out_of_bounds = WireError::FieldOutOfBounds {
            offset,
            width,
            len: frame.len(),
        };
        let end = offset.checked_add(width).ok_or(out_of_bounds.clone())?;
        let bytes = frame.get(offset..end).ok_or(out_of_bounds)?;
        Ok(Self { bytes, offset })
    }

    /// Checked view sized for `kind`.
    ///
    /// # Errors
    ///
    /// Same as [`RawField::new`].
    pub fn for_kind(frame: &'a [u8], offset: usize, kind: FieldKind) -> Result<Self, WireError> {
        Self::new(frame, offset, kind.width())
    }

    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Offset of the field from the start of its frame.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.bytes.len()
    }

    /// Decode the view as `kind`.
    ///
    /// # Panics
    ///
    /// Panics if `kind` is wider than the view. Views built with
    /// [`RawField::for_kind`] always match.
    #[must_use]
    pub fn decode(&self, kind: FieldKind) -> DecodedValue<'a> {
        kind.decode(self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_is_little_endian() {
        assert_eq!(decode_u16(&[0x34, 0x12]), 0x1234);
    }

    #[test]
    fn u32_is_little_endian() {
        assert_eq!(decode_u32(&[0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
        assert_eq!(decode_u32(&[0xFF; 4]), u32::MAX);
    }

    #[test]
    fn i16_all_ones_is_minus_one() {
        assert_eq!(decode_i16(&[0xFF, 0xFF]), -1);
    }

    #[test]
    fn signed_extremes() {
        assert_eq!(decode_i8(&[0x80]), i8::MIN);
        assert_eq!(decode_i8(&[0x7F]), i8::MAX);
        assert_eq!(decode_i16(&[0x00, 0x80]), i16::MIN);
        assert_eq!(decode_i32(&[0x00, 0x00, 0x00, 0x80]), i32::MIN);
        assert_eq!(decode_i32(&[0xFE, 0xFF, 0xFF, 0xFF]), -2);
    }

    #[test]
    fn f32_one() {
        assert_eq!(decode_f32(&[0x00, 0x00, 0x80, 0x3F]), 1.0);
    }

    #[test]
    fn f64_one_and_negative() {
        assert_eq!(
            decode_f64(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F]),
            1.0
        );
        assert_eq!(decode_f64(&(-2.5f64).to_le_bytes()), -2.5);
    }

    #[test]
    fn f32_nan_payload_preserved() {
        // SBF marks do-not-use floats with -2e10, but NaNs from the wire
        // must not be canonicalised either.
        let bits: u32 = 0x7FC0_0001;
        let value = decode_f32(&bits.to_le_bytes());
        assert!(value.is_nan());
        assert_eq!(value.to_bits(), bits);
    }

    #[test]
    fn decoders_ignore_trailing_bytes() {
        let buf = [0x01, 0x02, 0x03, 0x04, 0xAA, 0xBB];
        assert_eq!(decode_u8(&buf), 0x01);
        assert_eq!(decode_u16(&buf), 0x0201);
        assert_eq!(decode_u32(&buf), 0x0403_0201);
    }

    #[test]
    fn text_is_verbatim() {
        let buf = b"mosaic\0\0rest";
        assert_eq!(decode_text(buf, 8), b"mosaic\0\0");
        assert_eq!(decode_text(buf, 0), b"");
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn short_input_panics() {
        let _ = decode_u32(&[0x01, 0x02]);
    }

    #[test]
    fn field_kind_widths() {
        assert_eq!(FieldKind::U8.width(), 1);
        assert_eq!(FieldKind::I16.width(), 2);
        assert_eq!(FieldKind::F32.width(), 4);
        assert_eq!(FieldKind::F64.width(), 8);
        assert_eq!(FieldKind::Text(20).width(), 20);
    }

    #[test]
    fn field_kind_decode_dispatch() {
        let buf = [0xFF, 0xFF, 0x00, 0x00];
        assert_eq!(FieldKind::U16.decode(&buf), DecodedValue::U16(0xFFFF));
        assert_eq!(FieldKind::I16.decode(&buf), DecodedValue::I16(-1));
        assert_eq!(FieldKind::I32.decode(&buf), DecodedValue::I32(0xFFFF));
        assert_eq!(
            FieldKind::Text(2).decode(&buf),
            DecodedValue::Text(&[0xFF, 0xFF])
        );
    }

    #[test]
    fn as_f64_widens_numbers_only() {
        assert_eq!(DecodedValue::I8(-3).as_f64(), Some(-3.0));
        assert_eq!(DecodedValue::U32(7).as_f64(), Some(7.0));
        assert_eq!(DecodedValue::Text(b"x").as_f64(), None);
    }

    #[test]
    fn text_lossy_trims_nul_padding() {
        let value = DecodedValue::Text(b"AsteRx\0\0\0");
        assert_eq!(value.text_lossy().as_deref(), Some("AsteRx"));
        assert_eq!(DecodedValue::Text(b"\0\0").text_lossy().as_deref(), Some(""));
        assert_eq!(DecodedValue::U8(1).text_lossy(), None);
    }

    #[test]
    fn display_formats() {
        assert_eq!(DecodedValue::I16(-1).to_string(), "-1");
        assert_eq!(DecodedValue::F64(1.5).to_string(), "1.5");
        assert_eq!(DecodedValue::Text(b"ab\0").to_string(), "\"ab\"");
    }

    #[test]
    fn raw_field_in_bounds() {
        let frame = [0u8, 1, 2, 3, 4, 5];
        let field = RawField::new(&frame, 2, 3).unwrap();
        assert_eq!(field.bytes(), &[2, 3, 4]);
        assert_eq!(field.offset(), 2);
        assert_eq!(field.width(), 3);
    }

    #[test]
    fn raw_field_exactly_at_end() {
        let frame = [0u8; 4];
        assert!(RawField::new(&frame, 0, 4).is_ok());
        assert!(RawField::new(&frame, 4, 0).is_ok());
    }

    #[test]
    fn raw_field_out_of_bounds() {
        let frame = [0u8; 4];
        assert_eq!(
            RawField::new(&frame, 2, 4),
            Err(WireError::FieldOutOfBounds {
                offset: 2,
                width: 4,
                len: 4
            })
        );
    }

    #[test]
    fn raw_field_offset_overflow_is_rejected() {
        let frame = [0u8; 4];
        assert!(matches!(
            RawField::new(&frame, usize::MAX, 2),
            Err(WireError::FieldOutOfBounds { .. })
        ));
    }

    #[test]
    fn raw_field_decode_for_kind() {
        let frame = [0x00, 0x00, 0x00, 0x80, 0x3F];
        let field = RawField::for_kind(&frame, 1, FieldKind::F32).unwrap();
        assert_eq!(field.decode(FieldKind::F32), DecodedValue::F32(1.0));
    }
}
