//! Yahtzee host — TCP game sessions, viewer registry, routed event relay.

pub mod api;
pub mod config;
pub mod error;
pub mod game;
pub mod relay;
pub mod server;
pub mod viewers;
