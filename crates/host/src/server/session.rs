//! One connection driving one game.

use shared::RouteKey;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::command::{tokenize, Command, HELP};
use crate::error::ProtocolError;
use crate::game::{board, GameEngine};
use crate::relay::RelaySink;

pub const WELCOME: &str = "Welcome to Yahtzee!\n";
pub const PROMPT: &str = "Enter command (\"help\" for available commands):\r\n";

/// Longest accepted input line in bytes, terminator included.
pub const MAX_LINE: usize = 1024;

/// Result of one bounded line read.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line {
    Text(String),
    TooLong,
    Eof,
}

/// Read one line of at most [`MAX_LINE`] bytes.
///
/// A longer line is consumed through its terminator and reported as `TooLong`, so memory
/// use stays bounded whatever the peer sends.
pub(crate) async fn read_line_bounded<R>(reader: &mut R) -> std::io::Result<Line>
where
    R: AsyncBufRead + Unpin,
{
    let mut bytes = Vec::new();
    (&mut *reader)
        .take(MAX_LINE as u64)
        .read_until(b'\n', &mut bytes)
        .await?;
    if bytes.is_empty() {
        return Ok(Line::Eof);
    }
    if bytes.len() < MAX_LINE || bytes.ends_with(b"\n") {
        return Ok(Line::Text(String::from_utf8_lossy(&bytes).into_owned()));
    }

    loop {
        let (used, found) = {
            let buf = reader.fill_buf().await?;
            if buf.is_empty() {
                break;
            }
            match buf.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (buf.len(), false),
            }
        };
        reader.consume(used);
        if found {
            break;
        }
    }
    Ok(Line::TooLong)
}

/// Session state: the engine plus where its log lines go.
pub struct Session {
    engine: GameEngine,
    route: RouteKey,
    peer: String,
    log: RelaySink,
}

impl Session {
    pub fn new(viewer_id: &str, peer: impl Into<String>, log: RelaySink) -> Self {
        Self::with_engine(GameEngine::new(), viewer_id, peer, log)
    }

    pub fn with_engine(
        engine: GameEngine,
        viewer_id: &str,
        peer: impl Into<String>,
        log: RelaySink,
    ) -> Self {
        Self {
            engine,
            route: RouteKey::viewer(viewer_id),
            peer: peer.into(),
            log,
        }
    }

    fn log(&self, text: String) {
        self.log.enqueue(text, self.route.clone());
    }

    /// Serve until the peer closes or the connection fails, then shut the writer down.
    pub async fn run<R, W>(mut self, mut reader: R, mut writer: W)
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.log(format!("Started session for {}", self.peer));
        tracing::info!(peer = %self.peer, route = %self.route, "session started");

        if let Err(e) = self.serve(&mut reader, &mut writer).await {
            tracing::warn!(peer = %self.peer, route = %self.route, err = %e, "session failed");
            self.log(format!("Error with client {}: {}", self.peer, e));
        }
        let _ = writer.shutdown().await;

        tracing::info!(peer = %self.peer, route = %self.route, "session closed");
        self.log(format!("Closed connection to {}", self.peer));
    }

    async fn serve<R, W>(&mut self, reader: &mut R, writer: &mut W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer.write_all(WELCOME.as_bytes()).await?;
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let response = match read_line_bounded(reader).await? {
                Line::Eof => return Ok(()),
                Line::Text(line) => self.handle_line(&line),
                Line::TooLong => Some(self.reject_oversized()),
            };
            let Some(response) = response else {
                continue;
            };
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
    }

    /// Run one input line against the engine. Returns the reply, `None` for blank input.
    ///
    /// Replies always end in a newline; input errors become reply text.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let tokens = tokenize(line);
        if tokens.is_empty() {
            return None;
        }
        self.log(format!("Received from client: {:?}", tokens));

        let reply = match Command::from_tokens(&tokens) {
            Ok(Some(command)) => self.execute(command),
            Ok(None) => return None,
            Err(e) => e.to_string(),
        };
        Some(terminated(reply))
    }

    fn reject_oversized(&self) -> String {
        tracing::debug!(peer = %self.peer, route = %self.route, "oversized line discarded");
        self.log(format!("Discarded line over {} bytes", MAX_LINE));
        terminated(ProtocolError::LineTooLong(MAX_LINE).to_string())
    }

    fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Help => HELP.to_string(),
            Command::Roll(mask) => {
                self.engine.set_reroll(mask.unwrap_or([true; 5]));
                match self.engine.roll() {
                    Ok(roll) => roll.to_string(),
                    Err(e) => e.to_string(),
                }
            }
            Command::ScoreOptions => board::available(&self.engine),
            Command::Score(index) => match self.engine.score_category(index) {
                Ok(scored) if scored.game_over => board::final_tally(&self.engine),
                Ok(_) => board::scoreboard(&self.engine),
                Err(e) => e.to_string(),
            },
            Command::New => {
                self.engine.new_game();
                WELCOME.to_string()
            }
        }
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }
}

fn terminated(mut reply: String) -> String {
    if !reply.ends_with('\n') {
        reply.push('\n');
    }
    reply
}
