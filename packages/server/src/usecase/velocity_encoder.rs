//! Velocity Command Encoder
//!
//! Turns a linear/angular pair into exactly one message on the robot's
//! control topic, clamped to the configured safety envelope.

use std::sync::Arc;

use crate::domain::{RobotLink, SafetyEnvelope, VelocityCommand};

use super::error::EncodeError;

#[derive(Clone)]
pub struct VelocityEncoder {
    link: Arc<dyn RobotLink>,
    envelope: SafetyEnvelope,
}

impl VelocityEncoder {
    pub fn new(link: Arc<dyn RobotLink>, envelope: SafetyEnvelope) -> Self {
        Self { link, envelope }
    }

    pub fn envelope(&self) -> SafetyEnvelope {
        self.envelope
    }

    /// Publish one velocity command.
    ///
    /// Values inside the envelope are published unchanged. Returns the command
    /// that actually went out.
    pub async fn publish(
        &self,
        linear_x: f64,
        angular_z: f64,
    ) -> Result<VelocityCommand, EncodeError> {
        let requested = VelocityCommand::new(linear_x, angular_z);
        let command = self.envelope.clamp(requested);
        if command != requested {
            tracing::warn!(
                "Clamped velocity ({}, {}) to ({}, {})",
                requested.linear_x,
                requested.angular_z,
                command.linear_x,
                command.angular_z
            );
        }

        self.link.publish_velocity(command).await?;
        tracing::debug!(
            "Sent velocity: linear_x={}, angular_z={}",
            command.linear_x,
            command.angular_z
        );
        Ok(command)
    }

    pub async fn stop(&self) -> Result<VelocityCommand, EncodeError> {
        self.publish(0.0, 0.0).await
    }
}
