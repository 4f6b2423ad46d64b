//! InMemory Session Repository 実装
//!
//! ドメイン層が定義する SessionRepository trait の具体的な実装。
//! 挿入順の Vec をレジストリとして使用します（接続順 = 古い順）。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    OperatorSession, RepositoryError, SessionId, SessionRepository, SpeedScalar,
};

/// インメモリ Session Repository 実装
pub struct InMemorySessionRepository {
    sessions: Mutex<Vec<OperatorSession>>,
    max_sessions: usize,
}

impl InMemorySessionRepository {
    /// `max_sessions` 件まで同時に保持するレジストリを作成
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
            max_sessions,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }
}

fn not_found(session_id: &SessionId) -> RepositoryError {
    RepositoryError::SessionNotFound(session_id.as_str().to_string())
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn add_session(&self, session: OperatorSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.len() >= self.max_sessions {
            return Err(RepositoryError::CapacityExceeded(self.max_sessions));
        }
        sessions.push(session);
        Ok(())
    }

    async fn mark_open(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        session.open();
        Ok(())
    }

    async fn set_speed(
        &self,
        session_id: &SessionId,
        speed: SpeedScalar,
    ) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .iter_mut()
            .find(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        session.set_speed(speed);
        Ok(())
    }

    async fn remove_session(
        &self,
        session_id: &SessionId,
    ) -> Result<OperatorSession, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        let index = sessions
            .iter()
            .position(|s| &s.id == session_id)
            .ok_or_else(|| not_found(session_id))?;
        Ok(sessions.remove(index))
    }

    async fn get_sessions(&self) -> Vec<OperatorSession> {
        self.sessions.lock().await.clone()
    }

    async fn get_open_session_ids(&self) -> Vec<SessionId> {
        let sessions = self.sessions.lock().await;
        sessions
            .iter()
            .filter(|s| s.is_open())
            .map(|s| s.id.clone())
            .collect()
    }

    async fn count_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
