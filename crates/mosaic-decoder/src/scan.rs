//! Frame boundary detection shared by the slice splitter and the streaming
//! reader.
//!
//! Both SBF blocks and NMEA sentences begin with `$`. The byte after it
//! decides which one we are looking at:
//!
//! ```text
//!   '$' '@' ...             → SBF block, length from header, CRC-checked
//!   '$' <printable> ... CRLF → NMEA sentence (or command reply)
//!   anything else           → garbage, skipped one byte at a time
//! ```

use mosaic_wire::{SbfBlock, WireError, validate_block};
use tracing::{debug, trace, warn};

use crate::splitter::SplitStats;

/// Longest run scanned for a CRLF before a `$` is declared garbage. NMEA
/// caps sentences at 82 characters; proprietary replies run longer.
pub const MAX_NMEA_LEN: usize = 256;

/// Outcome of one scan over a buffer.
pub(crate) enum Scan<'a> {
    /// A validated block starting `start` bytes into the buffer.
    Sbf { start: usize, block: SbfBlock<'a> },
    /// A sentence (CRLF excluded) starting `start` bytes in. The CRLF
    /// follows it in the buffer.
    Nmea { start: usize, sentence: &'a [u8] },
    /// No complete frame. The first `discard` bytes are garbage and can be
    /// dropped; the rest may still become a frame once more data arrives.
    NeedMore { discard: usize },
}

enum Candidate<'a> {
    Sbf(SbfBlock<'a>),
    Nmea(&'a [u8]),
    Incomplete,
    Invalid,
}

/// Find the next frame in `buf`.
///
/// With `eof` set, the buffer is known to be final: a candidate that would
/// need more bytes is skipped as garbage instead of waited for.
pub(crate) fn scan<'a>(buf: &'a [u8], eof: bool, stats: &mut SplitStats) -> Scan<'a> {
    let mut pos = 0;
    loop {
        let Some(found) = buf[pos..].iter().position(|&b| b == b'$') else {
            stats.skipped_bytes += (buf.len() - pos) as u64;
            return Scan::NeedMore { discard: buf.len() };
        };
        if found > 0 {
            trace!(bytes = found, "skipping bytes before sync");
            stats.skipped_bytes += found as u64;
        }
        pos += found;

        match classify(&buf[pos..], eof, stats) {
            Candidate::Sbf(block) => {
                stats.sbf_blocks += 1;
                return Scan::Sbf { start: pos, block };
            }
            Candidate::Nmea(sentence) => {
                stats.nmea_sentences += 1;
                return Scan::Nmea {
                    start: pos,
                    sentence,
                };
            }
            Candidate::Incomplete => return Scan::NeedMore { discard: pos },
            Candidate::Invalid => {
                stats.skipped_bytes += 1;
                pos += 1;
            }
        }
    }
}

fn classify<'a>(rest: &'a [u8], eof: bool, stats: &mut SplitStats) -> Candidate<'a> {
    if rest.len() < 2 {
        return if eof {
            Candidate::Invalid
        } else {
            Candidate::Incomplete
        };
    }

    if rest[1] == b'@' {
        return match validate_block(rest) {
            Ok(block) => Candidate::Sbf(block),
            Err(WireError::UnexpectedEof { .. } | WireError::Truncated { .. }) if !eof => {
                Candidate::Incomplete
            }
            Err(WireError::CrcMismatch { expected, computed }) => {
                stats.crc_errors += 1;
                warn!(expected, computed, "SBF block failed CRC, resyncing");
                Candidate::Invalid
            }
            Err(err) => {
                debug!(%err, "discarding SBF candidate");
                Candidate::Invalid
            }
        };
    }

    let window = &rest[..rest.len().min(MAX_NMEA_LEN)];
    for (i, &b) in window.iter().enumerate().skip(1) {
        match b {
            b'\r' => {
                return match rest.get(i + 1) {
                    Some(b'\n') => Candidate::Nmea(&rest[..i]),
                    Some(_) => Candidate::Invalid,
                    None if eof => Candidate::Invalid,
                    None => Candidate::Incomplete,
                };
            }
            // A second '$' before the terminator means the first one was noise.
            b'$' => return Candidate::Invalid,
            0x20..=0x7E => {}
            _ => return Candidate::Invalid,
        }
    }

    if window.len() >= MAX_NMEA_LEN || eof {
        Candidate::Invalid
    } else {
        Candidate::Incomplete
    }
}
