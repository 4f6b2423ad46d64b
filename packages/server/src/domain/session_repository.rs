//! Session registry port.

use async_trait::async_trait;

use super::{
    entity::OperatorSession,
    error::RepositoryError,
    value_object::{SessionId, SpeedScalar},
};

/// Explicitly owned registry of operator sessions.
///
/// Sessions are inserted on handshake and removed on teardown; nothing else
/// holds connection state.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Insert a new session, refusing when the registry is at capacity
    async fn add_session(&self, session: OperatorSession) -> Result<(), RepositoryError>;

    async fn mark_open(&self, session_id: &SessionId) -> Result<(), RepositoryError>;

    async fn set_speed(
        &self,
        session_id: &SessionId,
        speed: SpeedScalar,
    ) -> Result<(), RepositoryError>;

    async fn remove_session(
        &self,
        session_id: &SessionId,
    ) -> Result<OperatorSession, RepositoryError>;

    /// All sessions, oldest first
    async fn get_sessions(&self) -> Vec<OperatorSession>;

    /// Ids of sessions in the Open state
    async fn get_open_session_ids(&self) -> Vec<SessionId>;

    async fn count_sessions(&self) -> usize;
}
