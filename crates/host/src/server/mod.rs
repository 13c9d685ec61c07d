//! The TCP game service: acceptor, per-connection sessions, command parsing.

mod acceptor;
mod command;
mod session;

pub use acceptor::Acceptor;
pub use command::{Command, HELP};
pub use session::{Session, PROMPT, WELCOME};
