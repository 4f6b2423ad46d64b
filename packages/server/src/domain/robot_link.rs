//! Port to the robot runtime.
//!
//! The bridge only needs two topics: a control topic it writes velocity
//! commands to, and an odometry topic it reads poses from. Concrete links
//! live in `infrastructure::robot`.

use async_trait::async_trait;
use tokio::sync::watch;

use super::{
    error::TopicError,
    value_object::{Odometry, VelocityCommand},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RobotLink: Send + Sync {
    /// Hand one velocity command to the control topic.
    ///
    /// Implementations only enqueue; this must never wait on the robot.
    async fn publish_velocity(&self, command: VelocityCommand) -> Result<(), TopicError>;

    /// Subscribe to odometry. `None` until the robot has reported once.
    fn subscribe_odometry(&self) -> watch::Receiver<Option<Odometry>>;

    /// Whether the control topic currently accepts commands
    fn is_connected(&self) -> bool;
}
