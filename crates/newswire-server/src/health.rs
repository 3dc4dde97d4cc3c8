//! `/health` endpoint.

use serde::Serialize;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"healthy"` when the server is running.
    pub status: String,
    /// Current WebSocket subscriber count.
    pub connected_clients: usize,
    /// Number of news items in the history buffer.
    pub news_count: usize,
    /// RFC 3339 server time.
    pub timestamp: String,
}

/// Build a health response from live counters.
pub fn health_check(connected_clients: usize, news_count: usize) -> HealthResponse {
    HealthResponse {
        status: "healthy".into(),
        connected_clients,
        news_count,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}
