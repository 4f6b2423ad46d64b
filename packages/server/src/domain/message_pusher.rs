//! Outbound message port.
//!
//! Each operator session owns a bounded channel whose receiving half is
//! drained by that session's WebSocket writer. Producers (pose relay, status
//! greeting) push serialized JSON through this trait without touching the
//! socket.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::SessionId};

/// Sending half of a session's outbound channel
pub type PusherChannel = mpsc::Sender<String>;

#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel);

    async fn unregister_client(&self, session_id: &SessionId);

    /// Push to one session. Fails if the session is unknown or its channel is full or closed.
    async fn push_to(&self, session_id: &SessionId, content: &str) -> Result<(), MessagePushError>;

    /// Push to every target, tolerating per-session failures.
    ///
    /// Returns how many sessions accepted the message.
    async fn broadcast(&self, targets: Vec<SessionId>, content: &str) -> usize;
}
