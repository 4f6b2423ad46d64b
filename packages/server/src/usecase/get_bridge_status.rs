//! UseCase: ブリッジ状態の取得

use std::sync::Arc;

use crate::domain::{OperatorSession, RobotLink, SessionRepository};

/// Snapshot reported by the health endpoint and the status greeting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStatus {
    pub robot_connected: bool,
    pub active_sessions: usize,
}

pub struct GetBridgeStatusUseCase {
    link: Arc<dyn RobotLink>,
    repository: Arc<dyn SessionRepository>,
}

impl GetBridgeStatusUseCase {
    pub fn new(link: Arc<dyn RobotLink>, repository: Arc<dyn SessionRepository>) -> Self {
        Self { link, repository }
    }

    pub async fn execute(&self) -> BridgeStatus {
        BridgeStatus {
            robot_connected: self.link.is_connected(),
            active_sessions: self.repository.count_sessions().await,
        }
    }

    pub async fn sessions(&self) -> Vec<OperatorSession> {
        self.repository.get_sessions().await
    }
}
