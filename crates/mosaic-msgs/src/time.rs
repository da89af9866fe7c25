use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Seconds between the Unix epoch and the GPS epoch (1980-01-06).
pub const GPS_EPOCH_UNIX_SECS: u64 = 315_964_800;

const SECS_PER_WEEK: u64 = 604_800;

/// A point in time as whole seconds plus nanoseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Time {
    pub secs: u64,
    pub nsecs: u32,
}

impl Time {
    /// Receiver time from a continuous week number and time of week.
    ///
    /// The result stays on the GPS time scale: it is offset from the Unix
    /// epoch but not corrected for leap seconds.
    #[must_use]
    pub fn from_gps(wnc: u16, tow_ms: u32) -> Self {
        let secs = GPS_EPOCH_UNIX_SECS
            + u64::from(wnc) * SECS_PER_WEEK
            + u64::from(tow_ms / 1000);
        Self {
            secs,
            nsecs: (tow_ms % 1000) * 1_000_000,
        }
    }

    /// Host wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        // A clock before 1970 is treated as the epoch.
        let since = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: since.as_secs(),
            nsecs: since.subsec_nanos(),
        }
    }
}
