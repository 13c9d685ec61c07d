//! Command line parsing for the game protocol.

use crate::error::ProtocolError;

pub const HELP: &str = "Commands:
  roll [1-5]...   Roll dice (optionally specify dice to reroll i.e roll 1 2 4)
  score ?         Show available score categories
  score [n]       Score the current dice in category number n
  new             Start a new game
";

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// Roll; `None` rolls every die, otherwise only the masked ones.
    Roll(Option<[bool; 5]>),
    ScoreOptions,
    /// Score in the 0-based category.
    Score(usize),
    New,
}

/// Lowercased, whitespace separated tokens of one input line.
pub fn tokenize(line: &str) -> Vec<String> {
    line.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

impl Command {
    /// Parse a tokenized line. No tokens yields `Ok(None)`.
    pub fn from_tokens(tokens: &[String]) -> Result<Option<Self>, ProtocolError> {
        let Some((command, args)) = tokens.split_first() else {
            return Ok(None);
        };

        let parsed = match command.as_str() {
            "help" | "?" => Self::Help,
            "roll" if args.is_empty() => Self::Roll(None),
            "roll" => Self::Roll(Some(reroll_mask(args)?)),
            "score" => match args.first().map(String::as_str) {
                Some("?") => Self::ScoreOptions,
                Some(arg) => Self::Score(category_index(arg)?),
                None => return Err(ProtocolError::MissingScoreArgument),
            },
            "new" => Self::New,
            other => return Err(ProtocolError::UnknownCommand(other.to_string())),
        };
        Ok(Some(parsed))
    }
}

fn reroll_mask(args: &[String]) -> Result<[bool; 5], ProtocolError> {
    let mut mask = [false; 5];
    for arg in args {
        let die: i64 = arg.parse().map_err(|_| ProtocolError::DiceNotNumeric)?;
        if !(1..=5).contains(&die) {
            return Err(ProtocolError::DiceOutOfRange);
        }
        mask[(die - 1) as usize] = true;
    }
    Ok(mask)
}

fn category_index(arg: &str) -> Result<usize, ProtocolError> {
    let choice: i64 = arg.parse().map_err(|_| ProtocolError::ScoreNotNumeric)?;
    if !(1..=13).contains(&choice) {
        return Err(ProtocolError::ScoreOutOfRange);
    }
    Ok((choice - 1) as usize)
}
