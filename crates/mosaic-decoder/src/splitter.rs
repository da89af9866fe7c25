use mosaic_wire::SbfBlock;
use serde::Serialize;

use crate::scan::{Scan, scan};

pub use crate::scan::MAX_NMEA_LEN;

/// One frame cut out of a receiver byte stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A CRC-checked SBF block.
    Sbf(SbfBlock<'a>),
    /// An NMEA sentence or ASCII command reply, without its CRLF.
    Nmea(&'a [u8]),
}

/// Running counters kept while splitting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SplitStats {
    pub sbf_blocks: u64,
    pub nmea_sentences: u64,
    /// SBF candidates whose header parsed but whose CRC did not match.
    pub crc_errors: u64,
    /// Bytes dropped while resynchronising.
    pub skipped_bytes: u64,
}

/// Splits an in-memory byte buffer into [`Frame`]s.
///
/// ```text
///   let mut splitter = FrameSplitter::new(&capture);
///   for frame in &mut splitter {
///       match frame {
///           Frame::Sbf(block) => { /* block.id(), block.field(..) */ }
///           Frame::Nmea(sentence) => { /* raw ASCII */ }
///       }
///   }
///   let stats = splitter.stats();
/// ```
///
/// Corrupt input never stops the splitter: it skips a byte and looks for
/// the next `$`. What counts as "corrupt" at the end of the buffer depends
/// on how the splitter was built:
///
/// - [`FrameSplitter::new`] treats the buffer as the whole stream, so a
///   frame cut off at the end is skipped like any other garbage.
/// - [`FrameSplitter::partial`] treats the buffer as a prefix of a longer
///   stream and stops at an incomplete frame, leaving it in
///   [`remaining`](FrameSplitter::remaining).
#[derive(Debug)]
pub struct FrameSplitter<'a> {
    buf: &'a [u8],
    pos: usize,
    eof: bool,
    stats: SplitStats,
}

impl<'a> FrameSplitter<'a> {
    /// Split a complete capture.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            eof: true,
            stats: SplitStats::default(),
        }
    }

    /// Split a buffer that more data will follow.
    #[must_use]
    pub fn partial(buf: &'a [u8]) -> Self {
        Self {
            eof: false,
            ..Self::new(buf)
        }
    }

    /// Next frame, or `None` once no complete frame is left.
    pub fn next_frame(&mut self) -> Option<Frame<'a>> {
        let buf = self.buf;
        let rest = &buf[self.pos..];
        match scan(rest, self.eof, &mut self.stats) {
            Scan::Sbf { start, block } => {
                self.pos += start + block.bytes().len();
                Some(Frame::Sbf(block))
            }
            Scan::Nmea { start, sentence } => {
                self.pos += start + sentence.len() + 2;
                Some(Frame::Nmea(sentence))
            }
            Scan::NeedMore { discard } => {
                self.pos += discard;
                None
            }
        }
    }

    /// Bytes not consumed yet. Empty after a full pass over a complete
    /// capture; may hold the start of a frame for a partial splitter.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Offset of the next unconsumed byte.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn stats(&self) -> SplitStats {
        self.stats
    }
}

impl<'a> Iterator for FrameSplitter<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_frame()
    }
}
