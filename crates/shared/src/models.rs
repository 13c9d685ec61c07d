//! Handshake, routing and WebSocket envelope models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix of the first line a game client sends after connecting.
pub const HANDSHAKE_PREFIX: &str = "SID:";

/// Build the handshake line (newline terminated) carrying a viewer identity.
pub fn handshake_line(viewer_id: &str) -> String {
    format!("{}{}\n", HANDSHAKE_PREFIX, viewer_id)
}

/// Extract the viewer identity from a handshake line.
///
/// Returns `None` when the prefix is missing or the identity is empty.
pub fn parse_handshake(line: &str) -> Option<&str> {
    let id = line
        .trim_end_matches(['\r', '\n'])
        .strip_prefix(HANDSHAKE_PREFIX)?
        .trim();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Fresh opaque viewer identity.
pub fn new_viewer_id() -> String {
    Uuid::new_v4().to_string()
}

/// Where a relayed line is delivered.
///
/// Game session lines are routed by viewer identity, capture traces by the TCP port
/// they were observed on. The two spaces never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RouteKey {
    Viewer(String),
    Port(u16),
}

impl RouteKey {
    pub fn viewer(id: impl Into<String>) -> Self {
        Self::Viewer(id.into())
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Viewer(id) => write!(f, "viewer:{}", id),
            Self::Port(port) => write!(f, "port:{}", port),
        }
    }
}

// --- WebSocket envelope ---

/// WebSocket message envelope (version 1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsEnvelope {
    #[serde(default)]
    pub version: u8,
    pub r#type: String,
    pub payload: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl WsEnvelope {
    /// Version 1 envelope without a timestamp.
    pub fn new(r#type: &str, payload: serde_json::Value) -> Self {
        Self {
            version: 1,
            r#type: r#type.to_string(),
            payload,
            ts: None,
        }
    }
}

/// WebSocket message types.
pub mod ws_types {
    /// Session lifecycle and command log lines from the game server.
    pub const SERVER_LOG: &str = "server_log";
    /// Pre-formatted packet trace lines from the capture subsystem.
    pub const WIRE_LOG: &str = "wire_log";
    /// Raw game output read back on the viewer's own connection.
    pub const CLIENT_LOG: &str = "client_log";
    /// Viewer → host: raw command text for the viewer's game session.
    pub const SEND_COMMAND: &str = "send_command";
    /// Host → viewer, once per socket: the assigned identity.
    pub const HELLO: &str = "hello";
}

/// Payload of every `*_log` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsLogPayload {
    pub data: String,
}

/// send_command payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsSendCommandPayload {
    pub data: String,
}

/// hello payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WsHelloPayload {
    pub viewer_id: String,
    /// Local port of the viewer's game connection; wire traces for it carry this route.
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws_types;

    #[test]
    fn handshake_line_parses_back() {
        let line = handshake_line("v1");
        assert_eq!(line, "SID:v1\n");
        assert_eq!(parse_handshake(&line), Some("v1"));
    }

    #[test]
    fn handshake_accepts_crlf() {
        assert_eq!(parse_handshake("SID:abc\r\n"), Some("abc"));
    }

    #[test]
    fn handshake_rejects_missing_prefix_or_identity() {
        assert_eq!(parse_handshake("roll\n"), None);
        assert_eq!(parse_handshake("sid:v1\n"), None);
        assert_eq!(parse_handshake("SID:\n"), None);
        assert_eq!(parse_handshake("SID:   \r\n"), None);
    }

    #[test]
    fn viewer_ids_are_unique() {
        assert_ne!(new_viewer_id(), new_viewer_id());
    }

    #[test]
    fn route_key_serde_is_tagged() {
        let json = serde_json::to_value(RouteKey::Port(8888)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "port", "value": 8888}));
        let parsed: RouteKey =
            serde_json::from_value(serde_json::json!({"kind": "viewer", "value": "v1"})).unwrap();
        assert_eq!(parsed, RouteKey::viewer("v1"));
    }

    #[test]
    fn ws_envelope_serde_roundtrip() {
        let env = WsEnvelope {
            version: 1,
            r#type: ws_types::SERVER_LOG.to_string(),
            payload: serde_json::to_value(WsLogPayload {
                data: "Closed connection".to_string(),
            })
            .unwrap(),
            ts: Some("2025-01-01T00:00:00Z".to_string()),
        };
        let json = serde_json::to_string(&env).unwrap();
        let parsed: WsEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.r#type, ws_types::SERVER_LOG);
        let payload: WsLogPayload = serde_json::from_value(parsed.payload).unwrap();
        assert_eq!(payload.data, "Closed connection");
    }

    #[test]
    fn envelope_without_version_defaults_to_zero() {
        let parsed: WsEnvelope =
            serde_json::from_str(r#"{"type":"send_command","payload":{"data":"roll"}}"#).unwrap();
        assert_eq!(parsed.version, 0);
        assert!(parsed.ts.is_none());
    }
}
