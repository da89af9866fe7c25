use std::fmt;

use serde::Serialize;

use crate::splitter::{Frame, FrameSplitter, SplitStats};

/// What one frame in a capture was.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameKind {
    Sbf {
        number: u16,
        revision: u8,
        name: Option<&'static str>,
        tow_ms: Option<u32>,
        wnc: Option<u16>,
    },
    Nmea {
        sentence: String,
    },
}

/// Position and identity of one frame in a capture.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub index: usize,
    /// Byte offset of the frame's `$` in the capture.
    pub offset: usize,
    /// Frame length, CRLF excluded for sentences.
    pub len: usize,
    #[serde(flatten)]
    pub kind: FrameKind,
}

/// Every frame in a capture plus the splitter's counters.
///
/// The `Display` form is the text listing printed by `mosaic inspect`:
///
/// ```text
/// #0    0x000002  SBF  4007.2 PVTGeodetic len=96 tow=345600.000 wnc=2300
/// #1    0x000062  NMEA $GPGGA,123519,4807.038,N*47
/// ---
/// 2 frames (1 SBF, 1 NMEA), 0 CRC errors, 2 bytes skipped
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaptureReport {
    pub frames: Vec<FrameSummary>,
    pub stats: SplitStats,
}

impl CaptureReport {
    /// Split `capture` as a complete stream and summarise each frame.
    #[must_use]
    pub fn from_capture(capture: &[u8]) -> Self {
        let mut splitter = FrameSplitter::new(capture);
        let mut frames = Vec::new();

        while let Some(frame) = splitter.next_frame() {
            let end = splitter.position();
            let (len, consumed, kind) = match frame {
                Frame::Sbf(block) => {
                    let id = block.id();
                    let stamp = block.time_stamp();
                    let len = block.bytes().len();
                    let kind = FrameKind::Sbf {
                        number: id.number(),
                        revision: id.revision(),
                        name: id.name(),
                        tow_ms: stamp.tow_ms,
                        wnc: stamp.wnc,
                    };
                    (len, len, kind)
                }
                Frame::Nmea(sentence) => {
                    let kind = FrameKind::Nmea {
                        sentence: String::from_utf8_lossy(sentence).into_owned(),
                    };
                    (sentence.len(), sentence.len() + 2, kind)
                }
            };
            frames.push(FrameSummary {
                index: frames.len(),
                offset: end - consumed,
                len,
                kind,
            });
        }

        Self {
            frames,
            stats: splitter.stats(),
        }
    }

    /// One-line totals, the last line of the listing.
    #[must_use]
    pub fn summary(&self) -> String {
        let s = &self.stats;
        format!(
            "{} frames ({} SBF, {} NMEA), {} CRC errors, {} bytes skipped",
            self.frames.len(),
            s.sbf_blocks,
            s.nmea_sentences,
            s.crc_errors,
            s.skipped_bytes
        )
    }
}

impl fmt::Display for FrameSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:<4} 0x{:06X}  ", self.index, self.offset)?;
        match &self.kind {
            FrameKind::Sbf {
                number,
                revision,
                name,
                tow_ms,
                wnc,
            } => {
                write!(
                    f,
                    "SBF  {number}.{revision} {} len={} tow=",
                    name.unwrap_or("?"),
                    self.len
                )?;
                match tow_ms {
                    Some(ms) => write!(f, "{}.{:03}", ms / 1000, ms % 1000)?,
                    None => f.write_str("-")?,
                }
                match wnc {
                    Some(wnc) => write!(f, " wnc={wnc}"),
                    None => f.write_str(" wnc=-"),
                }
            }
            FrameKind::Nmea { sentence } => write!(f, "NMEA {sentence}"),
        }
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.frames {
            writeln!(f, "{frame}")?;
        }
        writeln!(f, "---")?;
        f.write_str(&self.summary())
    }
}
