//! Frame splitting and message dispatch for Mosaic receiver streams.
//!
//! ```text
//!   bytes ──▶ FrameSplitter / StreamingReader ──▶ Frame
//!                                                   │
//!                                      FrameDispatcher::dispatch
//!                                                   │
//!                                                   ▼
//!                                              DataBuffers
//! ```

#![warn(clippy::pedantic)]

pub mod blocks;
pub mod dispatch;
pub mod error;
pub mod report;
pub mod splitter;
pub mod streaming;

mod scan;

pub use blocks::{PvtGeodetic, PvtMode};
pub use dispatch::FrameDispatcher;
pub use error::DecodeError;
pub use report::{CaptureReport, FrameKind, FrameSummary};
pub use splitter::{Frame, FrameSplitter, MAX_NMEA_LEN, SplitStats};
pub use streaming::{OwnedFrame, StreamingReader};
