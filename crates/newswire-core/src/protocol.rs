//! Wire protocol envelopes for the `WebSocket` surface.

use serde::{Deserialize, Serialize};

use crate::news::NewsItem;

/// A message sent from the server to a subscriber.
///
/// Serialized with an internal `type` tag, e.g.
/// `{"type":"news","data":{...}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Replay of recent items, sent on connect and for `get_history`.
    History {
        /// Items in insertion order.
        data: Vec<NewsItem>,
    },
    /// Acknowledgment sent once after connect.
    Connected {
        /// Human-readable greeting.
        message: String,
        /// Unique id assigned to this client.
        client_id: String,
    },
    /// A freshly published item.
    News {
        /// The published item.
        data: NewsItem,
    },
    /// Reply to a client `ping`.
    Pong {
        /// RFC 3339 server time.
        timestamp: String,
    },
    /// Protocol-level error; the session stays open.
    Error {
        /// What went wrong.
        message: String,
    },
}

impl ServerMessage {
    /// Serialize to the wire representation.
    ///
    /// These envelopes contain only strings and numbers, so serialization
    /// cannot realistically fail; the fallback keeps the wire JSON-valid.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

/// A message received from a subscriber.
///
/// Parsed permissively so an unknown `type` can be echoed back in the error
/// reply.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct InboundMessage {
    /// Message type: `"ping"` or `"get_history"`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Requested item count (`get_history` only).
    pub count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_item(id: u64) -> NewsItem {
        NewsItem {
            id,
            title: format!("title {id}"),
            content: format!("content {id}"),
            category: "general".into(),
            timestamp: "2026-08-31T12:00:00+00:00".into(),
        }
    }

    #[test]
    fn news_envelope_shape() {
        let msg = ServerMessage::News { data: make_item(3) };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "news");
        assert_eq!(json["data"]["id"], 3);
    }

    #[test]
    fn history_envelope_shape() {
        let msg = ServerMessage::History {
            data: vec![make_item(1), make_item(2)],
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "history");
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"][1]["id"], 2);
    }

    #[test]
    fn connected_envelope_shape() {
        let msg = ServerMessage::Connected {
            message: "Connected to news server".into(),
            client_id: "client_1".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "connected");
        assert_eq!(json["client_id"], "client_1");
        assert!(json["message"].is_string());
    }

    #[test]
    fn pong_envelope_shape() {
        let msg = ServerMessage::Pong {
            timestamp: "2026-08-31T12:00:00+00:00".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "pong");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn error_envelope_shape() {
        let msg = ServerMessage::Error {
            message: "Invalid JSON format".into(),
        };
        let json: serde_json::Value = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "Invalid JSON format");
    }

    #[test]
    fn server_message_roundtrip() {
        let msg = ServerMessage::News { data: make_item(9) };
        let back: ServerMessage = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn inbound_ping_parses() {
        let msg: InboundMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg.kind.as_deref(), Some("ping"));
        assert!(msg.count.is_none());
    }

    #[test]
    fn inbound_get_history_with_count() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"get_history","count":3}"#).unwrap();
        assert_eq!(msg.kind.as_deref(), Some("get_history"));
        assert_eq!(msg.count, Some(3));
    }

    #[test]
    fn inbound_missing_type() {
        let msg: InboundMessage = serde_json::from_str(r#"{"count":5}"#).unwrap();
        assert!(msg.kind.is_none());
        assert_eq!(msg.count, Some(5));
    }

    #[test]
    fn inbound_rejects_non_object() {
        assert!(serde_json::from_str::<InboundMessage>("[1,2,3]").is_err());
        assert!(serde_json::from_str::<InboundMessage>("\"ping\"").is_err());
    }

    #[test]
    fn inbound_ignores_extra_fields() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"ping","extra":true}"#).unwrap();
        assert_eq!(msg.kind.as_deref(), Some("ping"));
    }
}
