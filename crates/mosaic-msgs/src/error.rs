/// Errors produced while interpreting message-level names and values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MsgError {
    /// A quantity name did not match any published quantity.
    #[error("unknown quantity {name:?} (expected one of: fix, pose, velocity, nmea_sentence, time_reference)")]
    UnknownQuantity { name: String },
}
