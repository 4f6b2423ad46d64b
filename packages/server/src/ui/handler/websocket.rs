//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::SessionId,
    infrastructure::dto::{decode_command, websocket::StatusMessage},
    ui::state::AppState,
    usecase::{ConnectError, SessionMotion},
};

/// Capacity of each session's outbound channel
pub const OUTBOUND_BUFFER: usize = 32;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    // Create a channel for this session to receive outbound messages
    let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);

    let session_id = match state.connect_operator_usecase.execute(tx).await {
        Ok(session_id) => session_id,
        Err(ConnectError::CapacityExceeded(max)) => {
            tracing::warn!(
                "Session capacity of {} reached. Rejecting operator connection.",
                max
            );
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
        Err(e) => {
            tracing::error!("Failed to register operator session: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };
    tracing::info!("Operator session '{}' connecting", session_id);

    let failed_state = state.clone();
    let failed_id = session_id.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade for '{}' failed: {}", failed_id, e);
            tokio::spawn(async move {
                if let Err(e) = failed_state
                    .disconnect_operator_usecase
                    .execute(&failed_id, None)
                    .await
                {
                    tracing::warn!("Failed to release session '{}': {}", failed_id, e);
                }
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, state, session_id, rx)))
}

/// Spawns a task that drains the session's outbound channel into the WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: SessionId,
    rx: mpsc::Receiver<String>,
) {
    // Counted as open until the fail-safe teardown below has run
    let _session_token = state.sessions.token();
    let (sender, mut receiver) = socket.split();

    // Greet with the robot link state before anything else goes out
    let status = state.get_bridge_status_usecase.execute().await;
    let greeting = serde_json::to_string(&StatusMessage::new(status.robot_connected))
        .inspect_err(|e| tracing::error!("Failed to serialize status: {}", e))
        .ok();
    if let Err(e) = state
        .connect_operator_usecase
        .mark_open(&session_id, greeting.as_deref())
        .await
    {
        tracing::warn!("Failed to open session '{}': {}", session_id, e);
    }
    tracing::info!("Operator session '{}' open", session_id);

    let mut send_task = pusher_loop(rx, sender);
    let mut motion = state.dispatch_command_usecase.open_motion(session_id.clone());
    let shutdown = state.shutdown.clone();

    loop {
        tokio::select! {
            frame = receiver.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_text(&state, &mut motion, &text).await;
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Operator session '{}' requested close", session_id);
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::warn!(
                        "Ignoring {} byte binary frame from '{}'",
                        data.len(),
                        session_id
                    );
                }
                // Ping/pong is handled by the WebSocket protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on session '{}': {}", session_id, e);
                    break;
                }
            },
            _ = &mut send_task => {
                tracing::info!("Outbound stream of session '{}' closed", session_id);
                break;
            }
            _ = shutdown.cancelled() => {
                tracing::info!("Closing operator session '{}' for shutdown", session_id);
                break;
            }
        }
    }
    send_task.abort();

    match state
        .disconnect_operator_usecase
        .execute(&session_id, Some(motion))
        .await
    {
        Ok(_) => {
            let remaining = state
                .disconnect_operator_usecase
                .count_remaining_sessions()
                .await;
            tracing::info!(
                "Operator session '{}' disconnected ({} remaining)",
                session_id,
                remaining
            );
        }
        Err(e) => {
            tracing::warn!("Failed to disconnect session '{}': {}", session_id, e);
        }
    }
}

/// Decode and apply one text frame. Malformed frames are dropped; the session stays up.
async fn handle_text(state: &AppState, motion: &mut SessionMotion, text: &str) {
    let command = match decode_command(text) {
        Ok(command) => command,
        Err(e) => {
            tracing::warn!("Ignoring frame from '{}': {}", motion.session_id(), e);
            return;
        }
    };

    if let Err(e) = state
        .dispatch_command_usecase
        .execute(motion, command)
        .await
    {
        tracing::warn!(
            "Failed to apply '{}' for '{}': {}",
            command.kind(),
            motion.session_id(),
            e
        );
    }
}
