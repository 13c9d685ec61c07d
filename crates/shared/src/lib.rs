//! Shared wire types for the Yahtzee host and player.

mod models;

// Explicit re-exports (avoids rust-analyzer issues with `pub use models::*`)
pub use models::ws_types;
pub use models::{
    handshake_line, new_viewer_id, parse_handshake, RouteKey, WsEnvelope, WsHelloPayload,
    WsLogPayload, WsSendCommandPayload, HANDSHAKE_PREFIX,
};
