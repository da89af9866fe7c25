/// SBF block identifier.
///
/// The 16-bit ID field packs two values:
///
/// ```text
///  15  14  13  12                                      0
/// ┌───────────┬─────────────────────────────────────────┐
/// │ revision  │ block number                            │
/// │ (3 bits)  │ (13 bits, 0..=8191)                     │
/// └───────────┴─────────────────────────────────────────┘
/// ```
///
/// Both halves are always in range because they are produced by masking;
/// there is no way to construct an out-of-range `BlockId`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockId(u16);

/// Mask selecting the block-number bits.
pub const BLOCK_NUMBER_MASK: u16 = 0x1FFF;

/// Shift of the revision bits.
pub const REVISION_SHIFT: u16 = 13;

impl BlockId {
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Build an identifier from its parts. Extra high bits in either part
    /// are masked off.
    #[must_use]
    pub const fn new(number: u16, revision: u8) -> Self {
        Self((number & BLOCK_NUMBER_MASK) | (((revision as u16) & 0x7) << REVISION_SHIFT))
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Block number, 0..=8191.
    #[must_use]
    pub const fn number(self) -> u16 {
        self.0 & BLOCK_NUMBER_MASK
    }

    /// Block revision, 0..=7.
    #[must_use]
    pub const fn revision(self) -> u8 {
        ((self.0 >> REVISION_SHIFT) & 0x7) as u8
    }

    /// Well-known name for this block number, if it is one we recognise.
    #[must_use]
    pub fn name(self) -> Option<&'static str> {
        block_number::name(self.number())
    }
}

/// Split a raw ID into `(block_number, revision)`.
#[must_use]
pub const fn split_block_identifier(raw: u16) -> (u16, u8) {
    let id = BlockId::from_raw(raw);
    (id.number(), id.revision())
}

/// Block numbers the rest of the workspace refers to by name.
///
/// This is not a catalog; it only covers blocks the driver publishes from
/// or that show up in captures often enough to be worth labelling.
pub mod block_number {
    pub const PVT_CARTESIAN: u16 = 4006;
    pub const PVT_GEODETIC: u16 = 4007;
    pub const POS_COV_GEODETIC: u16 = 5906;
    pub const VEL_COV_GEODETIC: u16 = 5908;
    pub const RECEIVER_TIME: u16 = 5914;
    pub const ATT_EULER: u16 = 5938;
    pub const ATT_COV_EULER: u16 = 5939;

    #[must_use]
    pub fn name(number: u16) -> Option<&'static str> {
        match number {
            PVT_CARTESIAN => Some("PVTCartesian"),
            PVT_GEODETIC => Some("PVTGeodetic"),
            POS_COV_GEODETIC => Some("PosCovGeodetic"),
            VEL_COV_GEODETIC => Some("VelCovGeodetic"),
            RECEIVER_TIME => Some("ReceiverTime"),
            ATT_EULER => Some("AttEuler"),
            ATT_COV_EULER => Some("AttCovEuler"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_number_and_revision() {
        assert_eq!(split_block_identifier(0x2005), (5, 1));
    }

    #[test]
    fn split_extremes() {
        assert_eq!(split_block_identifier(0x0000), (0, 0));
        assert_eq!(split_block_identifier(0xFFFF), (8191, 7));
        assert_eq!(split_block_identifier(0x1FFF), (8191, 0));
        assert_eq!(split_block_identifier(0xE000), (0, 7));
    }

    #[test]
    fn parts_always_in_range() {
        for raw in 0..=u16::MAX {
            let (number, revision) = split_block_identifier(raw);
            assert!(number <= 8191);
            assert!(revision <= 7);
        }
    }

    #[test]
    fn new_masks_and_recombines() {
        let id = BlockId::new(4007, 2);
        assert_eq!(id.number(), 4007);
        assert_eq!(id.revision(), 2);
        assert_eq!(BlockId::from_raw(id.raw()), id);

        let clipped = BlockId::new(0xFFFF, 0xFF);
        assert_eq!(clipped.raw(), 0xFFFF);
    }

    #[test]
    fn known_block_names() {
        assert_eq!(BlockId::new(4007, 0).name(), Some("PVTGeodetic"));
        assert_eq!(BlockId::new(5914, 3).name(), Some("ReceiverTime"));
        assert_eq!(BlockId::new(1, 0).name(), None);
    }
}
