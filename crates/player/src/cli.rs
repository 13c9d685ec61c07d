//! CLI argument parsing.

use clap::{Parser, Subcommand};

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:5000/ws";
pub const DEFAULT_GAME_ADDR: &str = "127.0.0.1:8888";

#[derive(Parser)]
#[command(name = "player")]
#[command(about = "Yahtzee player — watch and play through the host")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Join as a web viewer: stdin lines become commands, routed logs are printed [default]
    Watch {
        /// Host WebSocket endpoint
        #[arg(long, default_value = DEFAULT_WS_URL)]
        url: String,
    },

    /// Speak the raw TCP game protocol to the game server
    Play {
        /// Game server address
        #[arg(long, default_value = DEFAULT_GAME_ADDR)]
        addr: String,

        /// Identity sent in the SID handshake (random when omitted)
        #[arg(long)]
        sid: Option<String>,
    },
}
