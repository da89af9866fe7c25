use mosaic_wire::WireError;

/// Errors surfaced while pulling frames off a byte stream.
///
/// Malformed frames are not errors: the splitter skips them and counts
/// them in [`SplitStats`](crate::SplitStats). What remains is the reader
/// failing underneath, or a frame that cannot be re-viewed after it was
/// copied out of the read buffer.
///
/// ```text
///   DecodeError
///   ├── Io(std::io::Error)   ← from the underlying AsyncRead
///   └── Wire(WireError)      ← from mosaic-wire block/field access
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),
}
