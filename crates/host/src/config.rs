//! Configuration for the host.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::HostError;

/// Host configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Web transport bind host.
    pub host: String,
    pub port: u16,
    /// Game acceptor bind host.
    pub game_host: String,
    pub game_port: u16,
    pub handshake_timeout_secs: u64,
    /// Per-viewer event queue capacity; a viewer that falls behind drops its overflow.
    pub event_buffer: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PORT").and_then(|v| v.parse().ok()).unwrap_or(5000);
        let game_host = var("GAME_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let game_port = var("GAME_PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8888);
        let handshake_timeout_secs = var("HANDSHAKE_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        let event_buffer = var("EVENT_BUFFER")
            .and_then(|v| v.parse().ok())
            .unwrap_or(256);

        Self {
            host,
            port,
            game_host,
            game_port,
            handshake_timeout_secs,
            event_buffer,
        }
    }

    /// Loopback on ephemeral ports.
    pub fn for_test() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            game_host: "127.0.0.1".to_string(),
            game_port: 0,
            handshake_timeout_secs: 2,
            event_buffer: 256,
        }
    }

    pub fn web_addr(&self) -> Result<SocketAddr, HostError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn game_addr(&self) -> Result<SocketAddr, HostError> {
        Ok(format!("{}:{}", self.game_host, self.game_port).parse()?)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}
