//! Domain layer: value objects, entities, the spin profile and the ports the
//! use cases depend on.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod robot_link;
pub mod session_repository;
pub mod spin;
pub mod value_object;

pub use entity::{ConnectionState, MotionCommand, OperatorSession};
pub use error::{MessagePushError, RepositoryError, TopicError};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use robot_link::RobotLink;
pub use session_repository::SessionRepository;
pub use spin::{
    DEFAULT_FULL_SPEED_RATIO, DEFAULT_SPIN_DURATION_SECS, DEFAULT_SPIN_SPEED, SpinPhase,
    SpinProfile, SpinState,
};
pub use value_object::{
    Odometry, PoseSample, Quaternion, SafetyEnvelope, SessionId, SpeedScalar, Timestamp,
    VelocityCommand, normalize_angle,
};

#[cfg(test)]
pub use robot_link::MockRobotLink;
