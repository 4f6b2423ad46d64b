//! UseCase: オペレーターコマンドの適用
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DispatchCommandUseCase::execute() メソッド
//! - move に含まれる speed がセッションに記録されること
//!
//! ### なぜこのテストが必要か
//! - 速度スカラーは表示用であり、publish される速度を変えてはいけない
//!
//! ### どのような状況を想定しているか
//! - 正常系：speed 付き move
//! - エッジケース：登録されていないセッション（publish は継続する）

use std::sync::Arc;

use crate::domain::{MotionCommand, SessionId, SessionRepository};

use super::{
    error::EncodeError, session_motion::SessionMotion, spin_controller::SpinController,
    velocity_encoder::VelocityEncoder,
};

/// コマンド適用のユースケース
pub struct DispatchCommandUseCase {
    /// Repository（セッションレジストリの抽象化）
    repository: Arc<dyn SessionRepository>,
    encoder: VelocityEncoder,
    spin_controller: SpinController,
}

impl DispatchCommandUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        encoder: VelocityEncoder,
        spin_controller: SpinController,
    ) -> Self {
        Self {
            repository,
            encoder,
            spin_controller,
        }
    }

    /// Create the motion owner for a freshly opened session
    pub fn open_motion(&self, session_id: SessionId) -> SessionMotion {
        SessionMotion::new(
            session_id,
            self.encoder.clone(),
            self.spin_controller.clone(),
        )
    }

    /// Apply one command in receipt order.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - command applied
    /// * `Err(EncodeError)` - the control topic rejected the publish
    pub async fn execute(
        &self,
        motion: &mut SessionMotion,
        command: MotionCommand,
    ) -> Result<(), EncodeError> {
        if let MotionCommand::Move {
            speed: Some(speed), ..
        } = command
            && let Err(e) = self.repository.set_speed(motion.session_id(), speed).await
        {
            tracing::warn!("Failed to record speed for '{}': {}", motion.session_id(), e);
        }

        tracing::debug!(
            "Applying '{}' for session '{}'",
            command.kind(),
            motion.session_id()
        );
        motion.apply(command).await
    }

    /// The encoder shared by every session, used for the shutdown stop
    pub fn encoder(&self) -> &VelocityEncoder {
        &self.encoder
    }
}
