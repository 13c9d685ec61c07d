//! Yahtzee player — terminal clients for the host.

pub mod cli;
pub mod client;
