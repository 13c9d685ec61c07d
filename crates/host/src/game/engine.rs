//! Turn and scoring state machine for a single game.
//!
//! `TurnStart -> (roll)* -> scored -> TurnStart | GameEnd`. GameEnd holds until
//! [`GameEngine::new_game`]. The engine does no I/O; callers format the results.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::category::{is_yahtzee, Category, Dice, SCORABLE, SLOTS, YAHTZEE_BONUS};
use crate::error::GameError;

pub const ROLLS_PER_TURN: u8 = 3;
pub const UPPER_BONUS_THRESHOLD: u32 = 63;
pub const UPPER_BONUS: u32 = 35;
pub const YAHTZEE_BONUS_POINTS: u16 = 100;

/// Dice after a successful roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roll {
    pub dice: Dice,
    pub rolls_remaining: u8,
}

impl fmt::Display for Roll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dice: {:?}, Rolls Left: {}",
            self.dice, self.rolls_remaining
        )
    }
}

/// Result of committing the dice to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    pub category: Category,
    pub points: u16,
    /// Whether a Yahtzee bonus was added while scoring.
    pub bonus: bool,
    pub game_over: bool,
}

/// Section totals at the end of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub upper: u32,
    pub upper_bonus: u32,
    /// Lower section including the Yahtzee bonus accumulator.
    pub lower: u32,
}

impl Tally {
    pub fn grand_total(&self) -> u32 {
        self.upper + self.upper_bonus + self.lower
    }
}

pub struct GameEngine {
    dice: Dice,
    rolls_remaining: u8,
    reroll: [bool; 5],
    available: [bool; SLOTS],
    scores: [u16; SLOTS],
    rng: StdRng,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GameEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Engine with a fixed dice source, for reproducible games.
    pub fn with_rng(rng: StdRng) -> Self {
        let mut engine = Self {
            dice: [0; 5],
            rolls_remaining: ROLLS_PER_TURN,
            reroll: [true; 5],
            available: [true; SLOTS],
            scores: [0; SLOTS],
            rng,
        };
        engine.new_game();
        engine
    }

    pub fn new_game(&mut self) {
        self.available = [true; SLOTS];
        self.scores = [0; SLOTS];
        self.reset_turn();
    }

    fn reset_turn(&mut self) {
        self.rolls_remaining = ROLLS_PER_TURN;
        self.reroll = [true; 5];
        self.dice = [0; 5];
    }

    /// Mark which dice the next roll may change. Ignored on a turn's first roll.
    pub fn set_reroll(&mut self, mask: [bool; 5]) {
        self.reroll = mask;
    }

    pub fn roll(&mut self) -> Result<Roll, GameError> {
        if self.is_game_end() {
            return Err(GameError::GameOver);
        }
        if self.rolls_remaining == 0 {
            return Err(GameError::NoRollsLeft);
        }
        let first = self.rolls_remaining == ROLLS_PER_TURN;
        for (die, &reroll) in self.dice.iter_mut().zip(self.reroll.iter()) {
            if first || reroll {
                *die = self.rng.gen_range(1..=6);
            }
        }
        self.rolls_remaining -= 1;
        Ok(Roll {
            dice: self.dice,
            rolls_remaining: self.rolls_remaining,
        })
    }

    /// Commit the current dice to the category at `index` (0..13).
    pub fn score_category(&mut self, index: usize) -> Result<Scored, GameError> {
        let category = Category::from_index(index).ok_or(GameError::InvalidCategory(index))?;
        if self.is_game_end() {
            return Err(GameError::GameOver);
        }
        if !self.available[index] {
            return Err(GameError::CategoryUsed(category.label()));
        }

        // a repeat Yahtzee pays out whichever category it is scored in
        let bonus = is_yahtzee(&self.dice) && self.scores[Category::Yahtzee.index()] == 50;
        if bonus {
            self.scores[YAHTZEE_BONUS] += YAHTZEE_BONUS_POINTS;
        }

        let points = category.points(&self.dice);
        self.available[index] = false;
        self.scores[index] = points;

        let game_over = self.is_game_end();
        if !game_over {
            self.reset_turn();
        }
        Ok(Scored {
            category,
            points,
            bonus,
            game_over,
        })
    }

    pub fn is_game_end(&self) -> bool {
        self.available[..SCORABLE].iter().all(|&a| !a)
    }

    pub fn dice(&self) -> Dice {
        self.dice
    }

    pub fn rolls_remaining(&self) -> u8 {
        self.rolls_remaining
    }

    pub fn is_available(&self, index: usize) -> bool {
        self.available.get(index).copied().unwrap_or(false)
    }

    /// Points recorded in a slot; `None` while the slot is open.
    ///
    /// The bonus slot is never scored directly and always reports its accumulator.
    pub fn score(&self, index: usize) -> Option<u16> {
        if index == YAHTZEE_BONUS {
            return Some(self.scores[YAHTZEE_BONUS]);
        }
        match self.available.get(index) {
            Some(false) => Some(self.scores[index]),
            _ => None,
        }
    }

    /// Categories still open, in table order.
    pub fn available_categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|c| self.available[c.index()])
    }

    pub fn tally(&self) -> Tally {
        let upper: u32 = self.scores[..6].iter().map(|&s| u32::from(s)).sum();
        let lower: u32 = self.scores[6..].iter().map(|&s| u32::from(s)).sum();
        let upper_bonus = if upper >= UPPER_BONUS_THRESHOLD {
            UPPER_BONUS
        } else {
            0
        };
        Tally {
            upper,
            upper_bonus,
            lower,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_dice(&mut self, dice: Dice) {
        self.dice = dice;
    }
}
