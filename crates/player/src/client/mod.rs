//! Connections to the host: WebSocket viewer and direct TCP.

pub mod tcp;
pub mod ws;
