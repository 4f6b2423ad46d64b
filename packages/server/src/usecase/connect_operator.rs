//! UseCase: オペレーター接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectOperatorUseCase::execute() / mark_open()
//!
//! ### なぜこのテストが必要か
//! - セッションレジストリへの登録と送信チャネルの登録が対になっていること
//! - 容量超過時に何も登録されないこと
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続して Open になる
//! - 異常系：容量超過、存在しないセッションの Open

use std::sync::Arc;

use teleop_shared::time::Clock;

use crate::domain::{
    MessagePusher, OperatorSession, PusherChannel, RepositoryError, SessionId, SessionRepository,
    Timestamp,
};

use super::error::ConnectError;

/// オペレーター接続のユースケース
pub struct ConnectOperatorUseCase {
    repository: Arc<dyn SessionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectOperatorUseCase {
    pub fn new(
        repository: Arc<dyn SessionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// Register a new session in the Connecting state together with its outbound channel.
    pub async fn execute(&self, sender: PusherChannel) -> Result<SessionId, ConnectError> {
        let session_id = SessionId::generate();
        let session = OperatorSession::new(
            session_id.clone(),
            Timestamp::new(self.clock.now_millis()),
        );

        self.repository
            .add_session(session)
            .await
            .map_err(|e| match e {
                RepositoryError::CapacityExceeded(max) => ConnectError::CapacityExceeded(max),
                RepositoryError::SessionNotFound(id) => ConnectError::SessionNotFound(id),
            })?;
        self.message_pusher
            .register_client(session_id.clone(), sender)
            .await;

        Ok(session_id)
    }

    /// Protocol upgrade finished: queue the greeting, then Connecting -> Open.
    ///
    /// The greeting is queued while the session is still invisible to the pose
    /// relay, so it is the first frame the operator receives.
    pub async fn mark_open(
        &self,
        session_id: &SessionId,
        greeting: Option<&str>,
    ) -> Result<(), ConnectError> {
        if let Some(greeting) = greeting
            && let Err(e) = self.message_pusher.push_to(session_id, greeting).await
        {
            tracing::warn!("Failed to queue greeting for '{}': {}", session_id, e);
        }
        self.repository
            .mark_open(session_id)
            .await
            .map_err(|_| ConnectError::SessionNotFound(session_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ConnectionState,
        infrastructure::{
            message_pusher::WebSocketMessagePusher, repository::InMemorySessionRepository,
        },
    };
    use teleop_shared::time::FixedClock;
    use tokio::sync::mpsc;

    fn create_usecase(
        max_sessions: usize,
    ) -> (
        ConnectOperatorUseCase,
        Arc<InMemorySessionRepository>,
        Arc<WebSocketMessagePusher>,
    ) {
        let repository = Arc::new(InMemorySessionRepository::new(max_sessions));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        let usecase = ConnectOperatorUseCase::new(
            repository.clone(),
            pusher.clone(),
            Arc::new(FixedClock::new(1_700_000_000_000)),
        );
        (usecase, repository, pusher)
    }

    #[tokio::test]
    async fn test_connect_registers_session_and_channel() {
        // テスト項目: 接続でセッションが Connecting として登録され、送信チャネルも登録される
        // given (前提条件):
        let (usecase, repository, pusher) = create_usecase(1);
        let (tx, mut rx) = mpsc::channel(4);

        // when (操作):
        let session_id = usecase.execute(tx).await.unwrap();

        // then (期待する結果):
        let sessions = repository.get_sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, session_id);
        assert_eq!(sessions[0].state, ConnectionState::Connecting);
        assert_eq!(sessions[0].connected_at, Timestamp::new(1_700_000_000_000));

        pusher.push_to(&session_id, "hello").await.unwrap();
        assert_eq!(rx.recv().await, Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_greeting_queued_before_open() {
        // テスト項目: Open への遷移時に挨拶メッセージが送信チャネルの先頭に積まれる
        // given (前提条件):
        let (usecase, repository, pusher) = create_usecase(1);
        let (tx, mut rx) = mpsc::channel(4);
        let session_id = usecase.execute(tx).await.unwrap();

        // when (操作):
        usecase
            .mark_open(&session_id, Some(r#"{"type":"status"}"#))
            .await
            .unwrap();
        pusher.broadcast(vec![session_id.clone()], "pose").await;

        // then (期待する結果):
        assert_eq!(rx.recv().await, Some(r#"{"type":"status"}"#.to_string()));
        assert_eq!(rx.recv().await, Some("pose".to_string()));
        assert_eq!(repository.get_open_session_ids().await, vec![session_id]);
    }

    #[tokio::test]
    async fn test_connect_rejected_when_capacity_exceeded() {
        // テスト項目: 容量超過の接続は拒否され、レジストリは変わらない
        // given (前提条件):
        let (usecase, repository, _pusher) = create_usecase(1);
        let (tx1, _rx1) = mpsc::channel(4);
        let (tx2, _rx2) = mpsc::channel(4);
        usecase.execute(tx1).await.unwrap();

        // when (操作):
        let result = usecase.execute(tx2).await;

        // then (期待する結果):
        assert_eq!(result, Err(ConnectError::CapacityExceeded(1)));
        assert_eq!(repository.count_sessions().await, 1);
    }

    #[tokio::test]
    async fn test_mark_open() {
        // テスト項目: mark_open で Open に遷移し、未登録の ID はエラーになる
        // given (前提条件):
        let (usecase, repository, _pusher) = create_usecase(2);
        let (tx, _rx) = mpsc::channel(4);
        let session_id = usecase.execute(tx).await.unwrap();

        // when (操作):
        let opened = usecase.mark_open(&session_id, None).await;
        let unknown = usecase.mark_open(&SessionId::generate(), None).await;

        // then (期待する結果):
        assert!(opened.is_ok());
        assert!(matches!(unknown, Err(ConnectError::SessionNotFound(_))));
        assert_eq!(repository.get_open_session_ids().await, vec![session_id]);
    }
}
