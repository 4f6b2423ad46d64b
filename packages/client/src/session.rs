//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use teleop_bridge::{
    domain::SpeedScalar,
    infrastructure::dto::websocket::{PoseUpdateMessage, StatusMessage},
};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    command::ConsoleCommand,
    error::ClientError,
    formatter::MessageFormatter,
    ui::redisplay_prompt,
};

/// Run one WebSocket session until the operator quits or the connection drops.
///
/// `input` yields the operator's lines; when it closes the session ends
/// normally, as with `quit`.
pub async fn run_client_session(
    url: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Http(response) => {
            ClientError::Rejected(format!("HTTP {}", response.status()))
        }
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    tracing::info!("Connected to bridge!");
    println!("\nType 'help' for commands. Press Ctrl+C to exit.\n");

    let (mut write, mut read) = ws_stream.split();
    let mut speed = SpeedScalar::default();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    print!("{}", format_incoming(&text));
                    redisplay_prompt();
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Bridge closed the connection");
                    return Err(ClientError::ConnectionLost("closed by bridge".to_string()));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionLost(e.to_string()));
                }
            },
            line = input.recv() => {
                let Some(line) = line else {
                    write.send(Message::Close(None)).await.ok();
                    return Ok(());
                };

                let command = match ConsoleCommand::parse(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                match command {
                    ConsoleCommand::Quit => {
                        write.send(Message::Close(None)).await.ok();
                        return Ok(());
                    }
                    ConsoleCommand::Help => print!("{}", MessageFormatter::format_help()),
                    ConsoleCommand::Speed(new_speed) => {
                        speed = new_speed;
                        print!("{}", MessageFormatter::format_speed(speed));
                    }
                    _ => {}
                }

                if let Some(json) = command.to_frame(speed)
                    && let Err(e) = write.send(Message::Text(json.into())).await
                {
                    tracing::warn!("Failed to send command: {}", e);
                    return Err(ClientError::ConnectionLost(e.to_string()));
                }
            }
        }
    }
}

fn format_incoming(text: &str) -> String {
    let kind = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.get("type").and_then(Value::as_str).map(str::to_owned));

    match kind.as_deref() {
        Some("pose_update") => match serde_json::from_str::<PoseUpdateMessage>(text) {
            Ok(pose) => MessageFormatter::format_pose(pose.x, pose.y, pose.yaw),
            Err(_) => MessageFormatter::format_raw_message(text),
        },
        Some("status") => match serde_json::from_str::<StatusMessage>(text) {
            Ok(status) => MessageFormatter::format_status(status.connected),
            Err(_) => MessageFormatter::format_raw_message(text),
        },
        _ => MessageFormatter::format_raw_message(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_incoming_known_and_unknown() {
        // テスト項目: pose_update / status は整形され、それ以外はそのまま表示される
        // given (前提条件):
        let pose = r#"{"type":"pose_update","x":1.0,"y":2.0,"yaw":0.0}"#;
        let status = r#"{"type":"status","connected":false}"#;
        let other = "hello";

        // when (操作):

        // then (期待する結果):
        assert_eq!(
            format_incoming(pose),
            MessageFormatter::format_pose(1.0, 2.0, 0.0)
        );
        assert_eq!(
            format_incoming(status),
            MessageFormatter::format_status(false)
        );
        assert_eq!(format_incoming(other), "\nhello\n");
    }
}
