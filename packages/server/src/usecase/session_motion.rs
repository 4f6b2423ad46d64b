//! Per-session motion owner.
//!
//! A `SessionMotion` is the single writer of one session's intent onto the
//! control topic. Every command cancels the session's active spin before
//! anything else is published, so a spin's ticks and a manual command are
//! never interleaved.

use crate::domain::{MotionCommand, SessionId, SpinState};

use super::{
    error::EncodeError,
    spin_controller::{SpinController, SpinTask},
    velocity_encoder::VelocityEncoder,
};

pub struct SessionMotion {
    session_id: SessionId,
    encoder: VelocityEncoder,
    spin_controller: SpinController,
    active_spin: Option<SpinTask>,
}

impl SessionMotion {
    pub fn new(
        session_id: SessionId,
        encoder: VelocityEncoder,
        spin_controller: SpinController,
    ) -> Self {
        Self {
            session_id,
            encoder,
            spin_controller,
            active_spin: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Apply one operator command, cancel-before-publish.
    pub async fn apply(&mut self, command: MotionCommand) -> Result<(), EncodeError> {
        self.cancel_spin().await;

        match command {
            MotionCommand::Move {
                linear_x,
                angular_z,
                ..
            } => {
                self.encoder.publish(linear_x, angular_z).await?;
            }
            MotionCommand::Stop => {
                self.encoder.stop().await?;
            }
            MotionCommand::Spin {
                angular_speed,
                duration_secs,
            } => {
                let profile = self.spin_controller.profile(angular_speed, duration_secs);
                self.active_spin = Some(self.spin_controller.start(profile));
            }
        }
        Ok(())
    }

    /// State of the most recent spin, `Idle` if none was started.
    pub async fn spin_state(&self) -> SpinState {
        match &self.active_spin {
            Some(task) => task.state().await,
            None => SpinState::Idle,
        }
    }

    /// Cancel the active spin if any. Returns whether a final stop went out.
    async fn cancel_spin(&mut self) -> bool {
        match self.active_spin.take() {
            Some(task) => task.cancel().await,
            None => false,
        }
    }

    /// Fail-safe teardown: the robot must not keep moving once the operator is gone.
    ///
    /// Exactly one `(0, 0)` is published: by the spin's cancellation when a
    /// spin was running, otherwise directly.
    pub async fn shutdown(mut self) -> Result<(), EncodeError> {
        if !self.cancel_spin().await {
            self.encoder.stop().await?;
        }
        tracing::debug!("Motion for session '{}' shut down", self.session_id);
        Ok(())
    }
}
