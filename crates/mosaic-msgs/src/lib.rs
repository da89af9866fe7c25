#![warn(clippy::pedantic)]

pub mod error;
pub mod messages;
pub mod quantity;
pub mod time;

pub use error::MsgError;
pub use messages::{
    Covariance6, Header, Message, NavSatFix, NavSatStatus, NmeaSentence, Point, Pose,
    PoseWithCovariance, PoseWithCovarianceStamped, Quaternion, TimeReference, Twist,
    TwistWithCovariance, TwistWithCovarianceStamped, Vector3,
};
pub use quantity::Quantity;
pub use time::Time;
