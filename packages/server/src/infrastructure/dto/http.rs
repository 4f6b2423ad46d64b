//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    pub robot_connected: bool,
    pub active_sessions: usize,
}

/// One entry of `GET /api/sessions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub state: String,
    pub speed: f64,
    /// RFC 3339
    pub connected_at: String,
}
