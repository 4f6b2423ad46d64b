//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::{net::TcpListener, time};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tower_http::trace::TraceLayer;

use crate::usecase::{
    ConnectOperatorUseCase, DisconnectOperatorUseCase, DispatchCommandUseCase,
    GetBridgeStatusUseCase, PoseRelay,
};

use super::{
    handler::{get_sessions, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// How long open sessions get to tear down before the final stop
const SESSION_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Teleop bridge server
///
/// Owns the use cases and the pose relay until `serve` hands them to the router.
///
/// # Example
///
/// ```ignore
/// let server = teleop_bridge::app::build_server(&config, link);
/// server.run("0.0.0.0".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectOperatorUseCase（オペレーター接続のユースケース）
    connect_operator_usecase: Arc<ConnectOperatorUseCase>,
    /// DisconnectOperatorUseCase（オペレーター切断のユースケース）
    disconnect_operator_usecase: Arc<DisconnectOperatorUseCase>,
    /// DispatchCommandUseCase（コマンド適用のユースケース）
    dispatch_command_usecase: Arc<DispatchCommandUseCase>,
    /// GetBridgeStatusUseCase（ブリッジ状態取得のユースケース）
    get_bridge_status_usecase: Arc<GetBridgeStatusUseCase>,
    pose_relay: PoseRelay,
}

impl Server {
    pub fn new(
        connect_operator_usecase: Arc<ConnectOperatorUseCase>,
        disconnect_operator_usecase: Arc<DisconnectOperatorUseCase>,
        dispatch_command_usecase: Arc<DispatchCommandUseCase>,
        get_bridge_status_usecase: Arc<GetBridgeStatusUseCase>,
        pose_relay: PoseRelay,
    ) -> Self {
        Self {
            connect_operator_usecase,
            disconnect_operator_usecase,
            dispatch_command_usecase,
            get_bridge_status_usecase,
            pose_relay,
        }
    }

    /// Bind `host:port` and serve until Ctrl+C / SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;
        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// The pose relay runs for the lifetime of the server. On shutdown every
    /// open session is told to close and its teardown is awaited; only then is
    /// the final stop published, so no spin can publish after it.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let relay_task = self.pose_relay.spawn();
        let encoder = self.dispatch_command_usecase.encoder().clone();
        let session_shutdown = CancellationToken::new();
        let sessions = TaskTracker::new();
        let app_state = Arc::new(AppState {
            connect_operator_usecase: self.connect_operator_usecase,
            disconnect_operator_usecase: self.disconnect_operator_usecase,
            dispatch_command_usecase: self.dispatch_command_usecase,
            get_bridge_status_usecase: self.get_bridge_status_usecase,
            shutdown: session_shutdown.clone(),
            sessions: sessions.clone(),
        });

        tracing::info!("Teleop bridge listening on {}", listener.local_addr()?);

        axum::serve(listener, router(app_state))
            .with_graceful_shutdown(shutdown)
            .await?;

        sessions.close();
        session_shutdown.cancel();
        tracing::info!("Waiting for {} open session(s) to close", sessions.len());
        if time::timeout(SESSION_DRAIN_TIMEOUT, sessions.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "Sessions still open after {:?}; stopping the robot anyway",
                SESSION_DRAIN_TIMEOUT
            );
        }

        relay_task.abort();
        if let Err(e) = encoder.stop().await {
            tracing::warn!("Failed to publish stop on shutdown: {}", e);
        }
        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/ws", get(websocket_handler))
        // HTTP エンドポイント
        .route("/health", get(health_check))
        .route("/api/sessions", get(get_sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
