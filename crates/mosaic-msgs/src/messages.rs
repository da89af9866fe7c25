//! Owned message types for the published quantities.
//!
//! Field names and units follow the ROS message definitions the driver's
//! consumers expect (`sensor_msgs`, `geometry_msgs`, `nmea_msgs`), so an
//! adapter can translate them one-to-one. Every type is `Default` because
//! mailbox storage is allocated lazily with `Box::new(T::default())`.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::quantity::Quantity;
use crate::time::Time;

/// Common header carried by every message.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Header {
    /// Per-topic sequence number, assigned at delivery.
    pub seq: u32,
    pub stamp: Time,
    pub frame_id: String,
}

/// A value type that can travel through a mailbox to a transport.
///
/// Ties each concrete message to the [`Quantity`] it is published as.
pub trait Message: Default + Clone + fmt::Debug + Serialize + Send + 'static {
    const QUANTITY: Quantity;

    fn header(&self) -> &Header;

    fn header_mut(&mut self) -> &mut Header;
}

macro_rules! impl_message {
    ($ty:ty, $quantity:expr) => {
        impl Message for $ty {
            const QUANTITY: Quantity = $quantity;

            fn header(&self) -> &Header {
                &self.header
            }

            fn header_mut(&mut self) -> &mut Header {
                &mut self.header
            }
        }
    };
}

/// Row-major 6x6 covariance matrix.
///
/// A newtype because serde only implements `Serialize` for arrays up to 32
/// elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Covariance6(pub [f64; 36]);

impl Default for Covariance6 {
    fn default() -> Self {
        Self([0.0; 36])
    }
}

impl Serialize for Covariance6 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

// ── NavSatFix ─────────────────────────────────────────────────────────────────

/// Fix status, with the `sensor_msgs/NavSatStatus` constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NavSatStatus {
    pub status: i8,
    pub service: u16,
}

impl NavSatStatus {
    pub const STATUS_NO_FIX: i8 = -1;
    pub const STATUS_FIX: i8 = 0;
    pub const STATUS_SBAS_FIX: i8 = 1;
    pub const STATUS_GBAS_FIX: i8 = 2;

    pub const SERVICE_GPS: u16 = 1;
    pub const SERVICE_GLONASS: u16 = 2;
    pub const SERVICE_COMPASS: u16 = 4;
    pub const SERVICE_GALILEO: u16 = 8;
}

impl Default for NavSatStatus {
    fn default() -> Self {
        Self {
            status: Self::STATUS_NO_FIX,
            service: 0,
        }
    }
}

/// Geodetic position fix.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NavSatFix {
    pub header: Header,
    pub status: NavSatStatus,
    /// Degrees, positive north.
    pub latitude: f64,
    /// Degrees, positive east.
    pub longitude: f64,
    /// Metres above the WGS84 ellipsoid.
    pub altitude: f64,
    /// ENU covariance in m², row-major.
    pub position_covariance: [f64; 9],
    pub position_covariance_type: u8,
}

impl NavSatFix {
    pub const COVARIANCE_TYPE_UNKNOWN: u8 = 0;
    pub const COVARIANCE_TYPE_APPROXIMATED: u8 = 1;
    pub const COVARIANCE_TYPE_DIAGONAL_KNOWN: u8 = 2;
    pub const COVARIANCE_TYPE_KNOWN: u8 = 3;
}

impl_message!(NavSatFix, Quantity::NavSatFix);

// ── Pose / twist ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    /// Identity rotation.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PoseWithCovariance {
    pub pose: Pose,
    pub covariance: Covariance6,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PoseWithCovarianceStamped {
    pub header: Header,
    pub pose: PoseWithCovariance,
}

impl_message!(PoseWithCovarianceStamped, Quantity::Pose);

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Twist {
    pub linear: Vector3,
    pub angular: Vector3,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct TwistWithCovariance {
    pub twist: Twist,
    pub covariance: Covariance6,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TwistWithCovarianceStamped {
    pub header: Header,
    pub twist: TwistWithCovariance,
}

impl_message!(TwistWithCovarianceStamped, Quantity::Velocity);

// ── Sentence / time ───────────────────────────────────────────────────────────

/// One raw NMEA sentence, without the trailing CRLF.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NmeaSentence {
    pub header: Header,
    pub sentence: String,
}

impl_message!(NmeaSentence, Quantity::NmeaSentence);

/// Receiver time paired with the host time it was observed at.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TimeReference {
    /// `stamp` is the host time the block was decoded.
    pub header: Header,
    /// Receiver time carried in the block.
    pub time_ref: Time,
    pub source: String,
}

impl_message!(TimeReference, Quantity::TimeReference);
