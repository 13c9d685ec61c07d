//! Viewer identity → outbound game connection.
//!
//! Each web viewer gets its own TCP connection to the acceptor, opened with the viewer's
//! handshake. Whatever the game server writes back is published as `client_log` for that
//! viewer only.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use shared::RouteKey;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::error::ViewerError;
use crate::relay::{LogStream, Transport};

struct ViewerConnection {
    writer: Arc<tokio::sync::Mutex<OwnedWriteHalf>>,
    reader: JoinHandle<()>,
}

pub struct ViewerRegistry {
    game_addr: SocketAddr,
    transport: Transport,
    connections: Mutex<HashMap<String, ViewerConnection>>,
}

impl ViewerRegistry {
    pub fn new(game_addr: SocketAddr, transport: Transport) -> Self {
        Self {
            game_addr,
            transport,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Open the viewer's game connection and send its handshake.
    ///
    /// Returns the connection's local port, the route its wire traces are tagged with.
    /// A viewer that is already registered gets a fresh connection.
    pub async fn connect(&self, viewer_id: &str) -> Result<u16, ViewerError> {
        let stream = TcpStream::connect(self.game_addr).await?;
        let port = stream.local_addr()?.port();
        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(shared::handshake_line(viewer_id).as_bytes())
            .await?;

        let reader = tokio::spawn(forward_output(
            read_half,
            RouteKey::viewer(viewer_id),
            self.transport.clone(),
        ));
        let connection = ViewerConnection {
            writer: Arc::new(tokio::sync::Mutex::new(write_half)),
            reader,
        };
        if let Some(previous) = self.lock().insert(viewer_id.to_string(), connection) {
            previous.reader.abort();
        }
        tracing::info!(viewer = %viewer_id, port, "viewer connected to game server");
        Ok(port)
    }

    /// Close and forget the viewer's connection. Returns whether one was registered.
    pub fn disconnect(&self, viewer_id: &str) -> bool {
        let Some(connection) = self.lock().remove(viewer_id) else {
            return false;
        };
        // the write half closes once the last handle to it drops
        connection.reader.abort();
        tracing::info!(viewer = %viewer_id, "viewer disconnected");
        true
    }

    /// Write raw command text to the viewer's session, adding a line end if missing.
    pub async fn send_command(&self, viewer_id: &str, raw: &str) -> Result<(), ViewerError> {
        let writer = self
            .lock()
            .get(viewer_id)
            .map(|c| c.writer.clone())
            .ok_or_else(|| ViewerError::NotConnected(viewer_id.to_string()))?;

        let mut line = raw.to_string();
        if !line.ends_with('\n') {
            line.push('\n');
        }
        let mut writer = writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
        Ok(())
    }

    pub fn contains(&self, viewer_id: &str) -> bool {
        self.lock().contains_key(viewer_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ViewerConnection>> {
        // the map holds no invariants a panicking holder could break
        self.connections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn forward_output(mut reader: OwnedReadHalf, route: RouteKey, transport: Transport) {
    let mut buf = vec![0u8; 4096];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                transport.publish(LogStream::Client, route.clone(), text);
            }
            Err(e) => {
                tracing::warn!(route = %route, err = %e, "game connection read failed");
                transport.publish(LogStream::Client, route.clone(), format!("Error: {}", e));
                break;
            }
        }
    }
    tracing::debug!(route = %route, "game connection closed");
}
