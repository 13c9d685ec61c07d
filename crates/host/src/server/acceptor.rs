//! TCP listener that hands each handshaken connection to its own session task.

use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use shared::RouteKey;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use super::session::{read_line_bounded, Line, Session};
use crate::error::{HostError, ProtocolError};
use crate::relay::RelaySink;

/// Pause after a failed `accept`, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub struct Acceptor {
    listener: TcpListener,
    log: RelaySink,
    handshake_timeout: Duration,
}

impl Acceptor {
    /// Bind the game port. Failure here is fatal for the host.
    pub async fn bind(
        addr: SocketAddr,
        log: RelaySink,
        handshake_timeout: Duration,
    ) -> Result<Self, HostError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| HostError::Bind { addr, source })?;
        Ok(Self {
            listener,
            log,
            handshake_timeout,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, HostError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept forever. Per-connection failures never stop the loop.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!("Game server listening on {}", addr);
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!(peer = %peer, "accepted connection");
                    let log = self.log.clone();
                    let timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer, log, timeout).await {
                            tracing::debug!(peer = %peer, err = %e, "connection not handled");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(err = %e, "accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }
    }
}

/// Read the `SID:` line, then run the session to completion.
///
/// Connections without a valid handshake are dropped without a reply.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    log: RelaySink,
    handshake_timeout: Duration,
) -> Result<(), ProtocolError> {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let read = tokio::time::timeout(handshake_timeout, read_line_bounded(&mut reader)).await;
    let viewer_id = match read {
        Ok(Ok(Line::Text(line))) => shared::parse_handshake(&line).map(str::to_string),
        _ => None,
    }
    .ok_or(ProtocolError::InvalidHandshake)?;

    let session = Session::new(&viewer_id, peer.to_string(), log.clone());
    supervise(
        session.run(reader, write_half),
        peer,
        RouteKey::viewer(viewer_id.as_str()),
        &log,
    )
    .await;
    Ok(())
}

/// Run a session on its own task. A panic inside it drops the connection and is
/// reported on the viewer's route like any other session failure.
async fn supervise<F>(session: F, peer: SocketAddr, route: RouteKey, log: &RelaySink)
where
    F: Future<Output = ()> + Send + 'static,
{
    let Err(e) = tokio::spawn(session).await else {
        return;
    };
    if e.is_panic() {
        tracing::error!(peer = %peer, route = %route, "session panicked");
        log.enqueue(
            format!("Error with client {}: session panicked", peer),
            route.clone(),
        );
        log.enqueue(format!("Closed connection to {}", peer), route);
    }
}
