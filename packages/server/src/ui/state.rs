//! Server state shared by the handlers.

use std::sync::Arc;

use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::usecase::{
    ConnectOperatorUseCase, DisconnectOperatorUseCase, DispatchCommandUseCase,
    GetBridgeStatusUseCase,
};

/// Shared application state
pub struct AppState {
    /// ConnectOperatorUseCase（オペレーター接続のユースケース）
    pub connect_operator_usecase: Arc<ConnectOperatorUseCase>,
    /// DisconnectOperatorUseCase（オペレーター切断のユースケース）
    pub disconnect_operator_usecase: Arc<DisconnectOperatorUseCase>,
    /// DispatchCommandUseCase（コマンド適用のユースケース）
    pub dispatch_command_usecase: Arc<DispatchCommandUseCase>,
    /// GetBridgeStatusUseCase（ブリッジ状態取得のユースケース）
    pub get_bridge_status_usecase: Arc<GetBridgeStatusUseCase>,
    /// Cancelled once the server stops accepting connections
    pub shutdown: CancellationToken,
    /// Open sessions; each holds a token until its teardown has finished
    pub sessions: TaskTracker,
}
