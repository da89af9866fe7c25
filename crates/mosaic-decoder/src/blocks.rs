//! Typed views of the SBF blocks the dispatcher turns into messages.
//!
//! Offsets are counted from the start of the block, sync bytes included,
//! matching the tables in the receiver reference guide.

use mosaic_wire::field::{decode_f64, decode_u8, decode_u16};
use mosaic_wire::{SbfBlock, WireError};

/// Latitude, longitude and height are set to this when there is no PVT.
pub const F64_DO_NOT_USE: f64 = -2e10;

/// Accuracy fields use this when unknown.
pub const U16_DO_NOT_USE: u16 = u16::MAX;

/// PVT solution type, from the low nibble of the `Mode` byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PvtMode {
    NoPvt,
    Standalone,
    Differential,
    FixedLocation,
    RtkFixed,
    RtkFloat,
    Sbas,
    MovingBaseRtkFixed,
    MovingBaseRtkFloat,
    Ppp,
    /// A value this decoder does not know.
    Other(u8),
}

impl PvtMode {
    #[must_use]
    pub fn from_raw(mode: u8) -> Self {
        match mode & 0x0F {
            0 => Self::NoPvt,
            1 => Self::Standalone,
            2 => Self::Differential,
            3 => Self::FixedLocation,
            4 => Self::RtkFixed,
            5 => Self::RtkFloat,
            6 => Self::Sbas,
            7 => Self::MovingBaseRtkFixed,
            8 => Self::MovingBaseRtkFloat,
            10 => Self::Ppp,
            other => Self::Other(other),
        }
    }
}

/// `PVTGeodetic` (block 4007): position in geodetic coordinates.
///
/// ```text
/// ┌────────┬──────┬────────────┬──────────────────────────────────┐
/// │ Offset │ Type │ Field      │ Notes                            │
/// ├────────┼──────┼────────────┼──────────────────────────────────┤
/// │ 14     │ u8   │ Mode       │ low nibble = PvtMode             │
/// │ 15     │ u8   │ Error      │ 0 = no error                     │
/// │ 16     │ f64  │ Latitude   │ radians                          │
/// │ 24     │ f64  │ Longitude  │ radians                          │
/// │ 32     │ f64  │ Height     │ metres above the ellipsoid       │
/// │ 90     │ u16  │ HAccuracy  │ cm, 2DRMS, revision 1 and later  │
/// │ 92     │ u16  │ VAccuracy  │ cm, 2σ, revision 1 and later     │
/// └────────┴──────┴────────────┴──────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PvtGeodetic {
    pub mode: PvtMode,
    pub error: u8,
    /// Radians, `None` when the receiver flagged it "do not use".
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub height: Option<f64>,
    /// Centimetres. `None` when unknown or when the block predates the
    /// field.
    pub h_accuracy_cm: Option<u16>,
    pub v_accuracy_cm: Option<u16>,
}

impl PvtGeodetic {
    pub const MODE: usize = 14;
    pub const ERROR: usize = 15;
    pub const LATITUDE: usize = 16;
    pub const LONGITUDE: usize = 24;
    pub const HEIGHT: usize = 32;
    pub const H_ACCURACY: usize = 90;
    pub const V_ACCURACY: usize = 92;

    /// Decode the fields above from `block`.
    ///
    /// # Errors
    ///
    /// [`WireError::FieldOutOfBounds`] if the block is too short to hold
    /// the position. Missing accuracy fields are not an error.
    pub fn decode(block: &SbfBlock<'_>) -> Result<Self, WireError> {
        let f64_at = |offset| -> Result<Option<f64>, WireError> {
            let value = decode_f64(block.field(offset, 8)?.bytes());
            Ok((value != F64_DO_NOT_USE).then_some(value))
        };
        let accuracy_at = |offset| {
            block
                .field(offset, 2)
                .ok()
                .map(|f| decode_u16(f.bytes()))
                .filter(|&v| v != U16_DO_NOT_USE)
        };

        Ok(Self {
            mode: PvtMode::from_raw(decode_u8(block.field(Self::MODE, 1)?.bytes())),
            error: decode_u8(block.field(Self::ERROR, 1)?.bytes()),
            latitude: f64_at(Self::LATITUDE)?,
            longitude: f64_at(Self::LONGITUDE)?,
            height: f64_at(Self::HEIGHT)?,
            h_accuracy_cm: accuracy_at(Self::H_ACCURACY),
            v_accuracy_cm: accuracy_at(Self::V_ACCURACY),
        })
    }

    /// A usable position: a PVT mode, no error, and all three coordinates.
    #[must_use]
    pub fn has_position(&self) -> bool {
        self.mode != PvtMode::NoPvt
            && self.error == 0
            && self.latitude.is_some()
            && self.longitude.is_some()
            && self.height.is_some()
    }
}

/// Build a `PVTGeodetic` payload (everything after the time stamp) for
/// tests and fixtures.
#[must_use]
pub fn encode_pvt_geodetic(
    mode: u8,
    latitude: f64,
    longitude: f64,
    height: f64,
    accuracy_cm: Option<(u16, u16)>,
) -> Vec<u8> {
    const PAYLOAD_LEN: usize = 96 - 14;
    let at = |offset: usize| offset - 14;

    let mut payload = vec![0u8; PAYLOAD_LEN];
    payload[at(PvtGeodetic::MODE)] = mode;
    payload[at(PvtGeodetic::LATITUDE)..at(PvtGeodetic::LATITUDE) + 8]
        .copy_from_slice(&latitude.to_le_bytes());
    payload[at(PvtGeodetic::LONGITUDE)..at(PvtGeodetic::LONGITUDE) + 8]
        .copy_from_slice(&longitude.to_le_bytes());
    payload[at(PvtGeodetic::HEIGHT)..at(PvtGeodetic::HEIGHT) + 8]
        .copy_from_slice(&height.to_le_bytes());
    let (h, v) = accuracy_cm.unwrap_or((U16_DO_NOT_USE, U16_DO_NOT_USE));
    payload[at(PvtGeodetic::H_ACCURACY)..at(PvtGeodetic::H_ACCURACY) + 2]
        .copy_from_slice(&h.to_le_bytes());
    payload[at(PvtGeodetic::V_ACCURACY)..at(PvtGeodetic::V_ACCURACY) + 2]
        .copy_from_slice(&v.to_le_bytes());
    payload
}
