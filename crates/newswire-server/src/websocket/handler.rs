//! WebSocket message dispatch — parses incoming text and builds the reply.

use newswire_core::{HistoryBuffer, InboundMessage, ServerMessage};
use tracing::{debug, warn};

/// Default number of items returned by `get_history` when no count is given.
const DEFAULT_HISTORY_COUNT: usize = 10;

/// Handle an incoming WebSocket text message.
///
/// Every inbound frame gets exactly one reply; malformed input produces an
/// `error` message and the session stays active.
pub fn handle_client_message(
    message: &str,
    history: &HistoryBuffer,
    max_history: usize,
) -> ServerMessage {
    let inbound: InboundMessage = match serde_json::from_str(message) {
        Ok(m) => m,
        Err(_) => {
            warn!("invalid JSON received");
            return ServerMessage::Error {
                message: "Invalid JSON format".into(),
            };
        }
    };

    match inbound.kind.as_deref() {
        Some("ping") => {
            debug!("ping received");
            ServerMessage::Pong {
                timestamp: chrono::Utc::now().to_rfc3339(),
            }
        }
        Some("get_history") => {
            let count = inbound
                .count
                .unwrap_or(DEFAULT_HISTORY_COUNT)
                .min(max_history);
            debug!(count, "history requested");
            ServerMessage::History {
                data: history.recent(count),
            }
        }
        other => {
            let kind = other.unwrap_or("none");
            warn!(kind, "unknown message type");
            ServerMessage::Error {
                message: format!("Unknown message type: {kind}"),
            }
        }
    }
}
