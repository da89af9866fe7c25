use std::fmt;
use std::str::FromStr;

use crate::error::MsgError;

/// The quantities the driver publishes, one mailbox each.
///
/// ```text
/// ┌───────────────┬────────────────┬────────────────────────────────────┐
/// │ Variant       │ Default topic  │ Message type                       │
/// ├───────────────┼────────────────┼────────────────────────────────────┤
/// │ NavSatFix     │ fix            │ NavSatFix                          │
/// │ Pose          │ pose           │ PoseWithCovarianceStamped          │
/// │ Velocity      │ velocity       │ TwistWithCovarianceStamped         │
/// │ NmeaSentence  │ nmea_sentence  │ NmeaSentence                       │
/// │ TimeReference │ time_reference │ TimeReference                      │
/// └───────────────┴────────────────┴────────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantity {
    NavSatFix,
    Pose,
    Velocity,
    NmeaSentence,
    TimeReference,
}

impl Quantity {
    /// Every quantity, in delivery order.
    pub const ALL: [Self; 5] = [
        Self::NavSatFix,
        Self::Pose,
        Self::Velocity,
        Self::NmeaSentence,
        Self::TimeReference,
    ];

    /// Topic name used when the configuration does not override it.
    #[must_use]
    pub fn default_topic(self) -> &'static str {
        match self {
            Self::NavSatFix => "fix",
            Self::Pose => "pose",
            Self::Velocity => "velocity",
            Self::NmeaSentence => "nmea_sentence",
            Self::TimeReference => "time_reference",
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_topic())
    }
}

impl FromStr for Quantity {
    type Err = MsgError;

    /// Parse a quantity from its default topic name. A few longer spellings
    /// are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fix" | "nav_sat_fix" => Ok(Self::NavSatFix),
            "pose" => Ok(Self::Pose),
            "velocity" | "twist" => Ok(Self::Velocity),
            "nmea_sentence" | "nmea" => Ok(Self::NmeaSentence),
            "time_reference" | "time" => Ok(Self::TimeReference),
            _ => Err(MsgError::UnknownQuantity { name: s.to_owned() }),
        }
    }
}
