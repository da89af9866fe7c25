#![warn(clippy::pedantic)]

pub mod block_id;
pub mod crc;
pub mod error;
pub mod field;
pub mod header;

pub use block_id::{BlockId, split_block_identifier};
pub use error::WireError;
pub use field::{DecodedValue, FieldKind, RawField};
pub use header::{SbfBlock, SbfHeader, TimeStamp, validate_block};
