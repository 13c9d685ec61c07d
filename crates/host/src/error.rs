//! Error types for the host.
//!
//! `GameError` and `ProtocolError` render as the exact line shown to the player; they
//! never close a session. `ViewerError` and `HostError` are transport-level.

use std::net::SocketAddr;

use thiserror::Error;

/// Rejected game action. No engine state changes when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("No rolls left! Score your dice to begin the next turn.")]
    NoRollsLeft,
    #[error("Category already scored: {0}")]
    CategoryUsed(&'static str),
    #[error("Game over! Type \"new\" to start a new game.")]
    GameOver,
    #[error("Invalid category index: {0}")]
    InvalidCategory(usize),
}

/// Malformed input from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid handshake: expected SID:<identity>")]
    InvalidHandshake,
    #[error("Invalid Input: Dice must be numbers")]
    DiceNotNumeric,
    #[error("Invalid Input: Dice must be between 1 and 5")]
    DiceOutOfRange,
    #[error("Invalid Input: Not a number")]
    ScoreNotNumeric,
    #[error("Invalid Input: Number outside of bounds")]
    ScoreOutOfRange,
    #[error("Invalid Input: No argument specified")]
    MissingScoreArgument,
    #[error("Invalid Input: Line longer than {0} bytes")]
    LineTooLong(usize),
    #[error("Unknown command: {0}. Type \"help\" for available commands.")]
    UnknownCommand(String),
}

/// Failure on a viewer's outbound game connection.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("viewer {0} is not connected")]
    NotConnected(String),
    #[error("game connection: {0}")]
    Io(#[from] std::io::Error),
}

/// Startup and listener failures.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("cannot bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid address: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
