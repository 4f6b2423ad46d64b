//! UseCase: オペレーター切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectOperatorUseCase::execute() メソッド
//! - 切断時のフェイルセーフ停止とレジストリからの削除
//!
//! ### なぜこのテストが必要か
//! - オペレーターがいなくなった後にロボットが動き続けてはいけない
//! - spin 中の切断でも停止コマンドはちょうど 1 回であること
//!
//! ### どのような状況を想定しているか
//! - 正常系：spin 中の切断
//! - 異常系：レジストリに存在しないセッションの切断（停止は行う）

use std::sync::Arc;

use crate::domain::{MessagePusher, OperatorSession, SessionId, SessionRepository};

use super::{error::DisconnectError, session_motion::SessionMotion};

/// オペレーター切断のユースケース
pub struct DisconnectOperatorUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectOperatorUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// Tear a session down.
    ///
    /// The motion is shut down first (cancelling any spin and publishing the
    /// final stop), then the outbound channel and the registry entry are released.
    ///
    /// # Returns
    ///
    /// * `Ok(OperatorSession)` - the removed session, in the Closed state
    /// * `Err(DisconnectError)` - the session was not in the registry
    pub async fn execute(
        &self,
        session_id: &SessionId,
        motion: Option<SessionMotion>,
    ) -> Result<OperatorSession, DisconnectError> {
        if let Some(motion) = motion
            && let Err(e) = motion.shutdown().await
        {
            tracing::error!(
                "Fail-safe stop for session '{}' could not be published: {}",
                session_id,
                e
            );
        }

        self.message_pusher.unregister_client(session_id).await;
        let mut session = self
            .repository
            .remove_session(session_id)
            .await
            .map_err(|_| DisconnectError::SessionNotFound(session_id.to_string()))?;
        session.close();
        Ok(session)
    }

    /// 残りのセッション数を取得
    pub async fn count_remaining_sessions(&self) -> usize {
        self.repository.count_sessions().await
    }
}
