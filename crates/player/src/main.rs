//! Yahtzee player — terminal viewer and raw game client.

use clap::Parser;
use player::{cli, client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // logs go to stderr so they never interleave with game output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command.unwrap_or(cli::Commands::Watch {
        url: cli::DEFAULT_WS_URL.to_string(),
    }) {
        cli::Commands::Watch { url } => {
            client::ws::run_viewer(&url).await?;
        }
        cli::Commands::Play { addr, sid } => {
            let sid = sid.unwrap_or_else(shared::new_viewer_id);
            client::tcp::run_direct(&addr, &sid).await?;
        }
    }

    Ok(())
}
