//! Yahtzee host — game server, event relay and viewer WebSocket in one process.
//!
//! Optional env: HOST, PORT, GAME_HOST, GAME_PORT, HANDSHAKE_TIMEOUT_SECS, EVENT_BUFFER

use std::sync::Arc;

use host::{api, config, relay, server, viewers};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env();
    let game_addr = config.game_addr()?;
    let web_addr = config.web_addr()?;

    let transport = relay::Transport::new(config.event_buffer);
    let relay = relay::EventRelay::start(transport.clone());

    // the host is useless without its game port
    let acceptor =
        server::Acceptor::bind(game_addr, relay.server_sink(), config.handshake_timeout()).await?;
    let game_addr = acceptor.local_addr()?;
    tokio::spawn(acceptor.run());

    let state = api::AppState {
        viewers: Arc::new(viewers::ViewerRegistry::new(game_addr, transport.clone())),
        transport,
    };
    let app = api::router(state);

    tracing::info!("Web transport listening on {}", web_addr);
    let listener = tokio::net::TcpListener::bind(web_addr).await?;
    axum::serve(listener, app).await?;

    relay.shutdown();
    Ok(())
}
