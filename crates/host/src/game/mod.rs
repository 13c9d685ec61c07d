//! Yahtzee rules: dice, categories, and the per-session game engine.

pub mod board;
mod category;
mod engine;

pub use category::{Category, Dice, LABELS, SCORABLE, SLOTS, YAHTZEE_BONUS};
pub use engine::{GameEngine, Roll, Scored, Tally, ROLLS_PER_TURN};
