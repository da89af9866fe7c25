use bytes::{Buf, Bytes, BytesMut};
use mosaic_wire::{SbfBlock, WireError};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::DecodeError;
use crate::scan::{Scan, scan};
use crate::splitter::{Frame, SplitStats};

/// Bytes reserved ahead of each read.
const READ_CHUNK: usize = 4096;

/// A frame copied out of the streaming reader's buffer.
///
/// Holds a cheap `Bytes` handle rather than a borrow, so the frame can
/// outlive the next `next_frame` call or be sent to another task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnedFrame {
    /// A whole SBF block, CRC already checked.
    Sbf(Bytes),
    /// An NMEA sentence without its CRLF.
    Nmea(Bytes),
}

impl OwnedFrame {
    /// Borrow the frame in its parsed form.
    ///
    /// # Errors
    ///
    /// Only if an `Sbf` frame was built by hand from bytes that do not hold
    /// a complete block. Frames from [`StreamingReader`] always parse.
    pub fn as_frame(&self) -> Result<Frame<'_>, WireError> {
        match self {
            Self::Sbf(bytes) => SbfBlock::read_from(bytes).map(Frame::Sbf),
            Self::Nmea(bytes) => Ok(Frame::Nmea(bytes)),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        match self {
            Self::Sbf(bytes) | Self::Nmea(bytes) => bytes,
        }
    }
}

/// Async frame splitter over any `AsyncRead` source: a serial port, a TCP
/// connection, a capture file.
///
/// Uses the same resynchronisation rules as
/// [`FrameSplitter`](crate::FrameSplitter). Bytes are read in chunks into
/// one reusable buffer and frames are split off it without copying.
///
/// ```text
///   let mut reader = StreamingReader::new(tcp_stream);
///   while let Some(frame) = reader.next_frame().await {
///       match frame? {
///           OwnedFrame::Sbf(block) => { ... }
///           OwnedFrame::Nmea(sentence) => { ... }
///       }
///   }
/// ```
pub struct StreamingReader<R> {
    reader: R,
    buf: BytesMut,
    eof: bool,
    stats: SplitStats,
}

enum Cut {
    Sbf { start: usize, len: usize },
    Nmea { start: usize, len: usize },
    Discard(usize),
}

impl<R: AsyncRead + Unpin> StreamingReader<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: BytesMut::with_capacity(READ_CHUNK),
            eof: false,
            stats: SplitStats::default(),
        }
    }

    /// Read until the next complete frame.
    ///
    /// Returns `None` once the source is exhausted. A frame cut off by the
    /// end of the source is dropped and counted in
    /// [`SplitStats::skipped_bytes`].
    pub async fn next_frame(&mut self) -> Option<Result<OwnedFrame, DecodeError>> {
        loop {
            let cut = match scan(&self.buf, self.eof, &mut self.stats) {
                Scan::Sbf { start, block } => Cut::Sbf {
                    start,
                    len: block.bytes().len(),
                },
                Scan::Nmea { start, sentence } => Cut::Nmea {
                    start,
                    len: sentence.len(),
                },
                Scan::NeedMore { discard } => Cut::Discard(discard),
            };

            match cut {
                Cut::Sbf { start, len } => {
                    self.buf.advance(start);
                    return Some(Ok(OwnedFrame::Sbf(self.buf.split_to(len).freeze())));
                }
                Cut::Nmea { start, len } => {
                    self.buf.advance(start);
                    let sentence = self.buf.split_to(len).freeze();
                    // CRLF
                    self.buf.advance(2);
                    return Some(Ok(OwnedFrame::Nmea(sentence)));
                }
                Cut::Discard(discard) => {
                    self.buf.advance(discard);
                    if self.eof {
                        return None;
                    }
                }
            }

            self.buf.reserve(READ_CHUNK);
            match self.reader.read_buf(&mut self.buf).await {
                Ok(0) => self.eof = true,
                Ok(_) => {}
                Err(err) => return Some(Err(DecodeError::Io(err))),
            }
        }
    }

    #[must_use]
    pub fn stats(&self) -> SplitStats {
        self.stats
    }

    /// Bytes read but not yet returned as a frame.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;
    use mosaic_wire::header::encode_block;
    use mosaic_wire::{BlockId, TimeStamp};
    use tokio::io::{AsyncWriteExt, ReadBuf};

    fn block(number: u16) -> Vec<u8> {
        encode_block(
            BlockId::new(number, 1),
            TimeStamp {
                tow_ms: Some(345_600_000),
                wnc: Some(2300),
            },
            b"payload",
        )
    }

    fn capture() -> Vec<u8> {
        let mut stream = b"\xFF\xFE".to_vec();
        stream.extend_from_slice(&block(4007));
        stream.extend_from_slice(b"$GPGGA,1,2,3*4F\r\n");
        stream.extend_from_slice(&block(5914));
        stream
    }

    async fn collect<R: AsyncRead + Unpin>(reader: &mut StreamingReader<R>) -> Vec<OwnedFrame> {
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().await {
            frames.push(frame.unwrap());
        }
        frames
    }

    #[tokio::test]
    async fn reads_frames_from_slice() {
        let stream = capture();
        let mut reader = StreamingReader::new(stream.as_slice());
        let frames = collect(&mut reader).await;

        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0], OwnedFrame::Sbf(Bytes::from(block(4007))));
        assert_eq!(frames[1], OwnedFrame::Nmea(Bytes::from_static(b"$GPGGA,1,2,3*4F")));
        let Frame::Sbf(last) = frames[2].as_frame().unwrap() else {
            panic!("expected an SBF frame");
        };
        assert_eq!(last.id().number(), 5914);
        assert_eq!(last.id().revision(), 1);

        let stats = reader.stats();
        assert_eq!(stats.sbf_blocks, 2);
        assert_eq!(stats.nmea_sentences, 1);
        assert_eq!(stats.skipped_bytes, 2);
        assert_eq!(reader.buffered(), 0);
    }

    #[tokio::test]
    async fn frames_split_across_reads() {
        let stream = capture();
        let (mut tx, rx) = tokio::io::duplex(8);
        let writer = tokio::spawn(async move {
            for chunk in stream.chunks(3) {
                tx.write_all(chunk).await.unwrap();
            }
        });

        let mut reader = StreamingReader::new(rx);
        let frames = collect(&mut reader).await;
        writer.await.unwrap();

        assert_eq!(frames.len(), 3);
        assert!(matches!(frames[1], OwnedFrame::Nmea(_)));
        assert_eq!(reader.stats().skipped_bytes, 2);
    }

    #[tokio::test]
    async fn truncated_tail_is_dropped_at_eof() {
        let mut stream = block(4007);
        stream.extend_from_slice(&block(4006)[..12]);
        let mut reader = StreamingReader::new(stream.as_slice());

        let frames = collect(&mut reader).await;
        assert_eq!(frames.len(), 1);
        assert_eq!(reader.stats().skipped_bytes, 12);
        assert_eq!(reader.buffered(), 0);
    }

    #[tokio::test]
    async fn exhausted_reader_keeps_returning_none() {
        let mut reader = StreamingReader::new(&b"$GPZDA\r\n"[..]);
        assert!(reader.next_frame().await.is_some());
        assert!(reader.next_frame().await.is_none());
        assert!(reader.next_frame().await.is_none());
    }

    struct Failing;

    impl AsyncRead for Failing {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::other("link down")))
        }
    }

    #[tokio::test]
    async fn read_errors_are_reported() {
        let mut reader = StreamingReader::new(Failing);
        let err = reader.next_frame().await.unwrap().unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
        assert_eq!(err.to_string(), "link down");
    }
}
