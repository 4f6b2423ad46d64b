//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - セッションごとの送信チャネル（bounded `mpsc::Sender`）を管理
//! - セッションへのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された sender を受け取り、メッセージ送信に使用します。
//! 送信は `try_send` で行い、詰まったセッションのために他のセッションや
//! 制御ループが待たされることはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc::error::TrySendError};

use crate::domain::{MessagePushError, MessagePusher, PusherChannel, SessionId};

/// WebSocket を使った MessagePusher 実装
pub struct WebSocketMessagePusher {
    /// Key: session id, Value: 送信チャネル
    clients: Mutex<HashMap<String, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, session_id: SessionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Session '{}' registered to MessagePusher", session_id);
        clients.insert(session_id.into_string(), sender);
    }

    async fn unregister_client(&self, session_id: &SessionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(session_id.as_str());
        tracing::debug!("Session '{}' unregistered from MessagePusher", session_id);
    }

    async fn push_to(&self, session_id: &SessionId, content: &str) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(session_id.as_str())
            .ok_or_else(|| MessagePushError::SessionNotFound(session_id.as_str().to_string()))?;
        sender
            .try_send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to session '{}'", session_id);
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<SessionId>, content: &str) -> usize {
        let clients = self.clients.lock().await;
        let mut delivered = 0;

        for target in targets {
            let Some(sender) = clients.get(target.as_str()) else {
                tracing::warn!("Session '{}' not found during broadcast, skipping", target);
                continue;
            };
            match sender.try_send(content.to_string()) {
                Ok(()) => delivered += 1,
                // slow reader; this update is lost, the next one will replace it
                Err(TrySendError::Full(_)) => {
                    tracing::debug!("Outbound buffer of session '{}' is full, dropping", target);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::warn!("Outbound channel of session '{}' is closed", target);
                }
            }
        }

        delivered
    }
}
