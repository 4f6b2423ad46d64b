//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    infrastructure::dto::http::{HealthDto, SessionDto},
    ui::state::AppState,
};
use teleop_shared::time::timestamp_to_rfc3339;

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let status = state.get_bridge_status_usecase.execute().await;
    Json(HealthDto {
        status: "ok".to_string(),
        robot_connected: status.robot_connected,
        active_sessions: status.active_sessions,
    })
}

/// List of operator sessions, oldest first
pub async fn get_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionDto>> {
    let sessions = state.get_bridge_status_usecase.sessions().await;

    // Domain Model から DTO への変換
    let sessions = sessions
        .into_iter()
        .map(|session| SessionDto {
            id: session.id.as_str().to_string(),
            state: session.state.as_str().to_string(),
            speed: session.speed.value(),
            connected_at: timestamp_to_rfc3339(session.connected_at.value()),
        })
        .collect();

    Json(sessions)
}
