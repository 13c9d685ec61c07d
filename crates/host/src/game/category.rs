//! Scoring categories and their point rules.

/// Five dice; 0 means not rolled yet.
pub type Dice = [u8; 5];

/// Number of categories a player can commit to.
pub const SCORABLE: usize = 13;

/// Slot of the Yahtzee bonus accumulator, after the scorable categories.
pub const YAHTZEE_BONUS: usize = 13;

/// Total slots in the score table.
pub const SLOTS: usize = 14;

/// Display names, indexed by slot.
pub const LABELS: [&str; SLOTS] = [
    "Ones",
    "Twos",
    "Threes",
    "Fours",
    "Fives",
    "Sixes",
    "3 of a Kind",
    "4 of a Kind",
    "Full House",
    "Small Straight",
    "Large Straight",
    "Chance",
    "Yahtzee",
    "Yahtzee Bonus",
];

/// One of the 13 scorable categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Ones,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    ThreeOfAKind,
    FourOfAKind,
    FullHouse,
    SmallStraight,
    LargeStraight,
    Chance,
    Yahtzee,
}

impl Category {
    pub const ALL: [Category; SCORABLE] = [
        Self::Ones,
        Self::Twos,
        Self::Threes,
        Self::Fours,
        Self::Fives,
        Self::Sixes,
        Self::ThreeOfAKind,
        Self::FourOfAKind,
        Self::FullHouse,
        Self::SmallStraight,
        Self::LargeStraight,
        Self::Chance,
        Self::Yahtzee,
    ];

    /// Category at a 0-based slot, `None` past Yahtzee.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        LABELS[self.index()]
    }

    /// Points the dice are worth in this category.
    pub fn points(self, dice: &Dice) -> u16 {
        let counts = face_counts(dice);
        match self {
            Self::Ones | Self::Twos | Self::Threes | Self::Fours | Self::Fives | Self::Sixes => {
                let face = self.index() + 1;
                counts[face - 1] as u16 * face as u16
            }
            Self::ThreeOfAKind if counts.iter().any(|&c| c >= 3) => sum(dice),
            Self::FourOfAKind if counts.iter().any(|&c| c >= 4) => sum(dice),
            Self::FullHouse if counts.contains(&3) && counts.contains(&2) => 25,
            Self::SmallStraight if is_small_straight(&counts) => 30,
            Self::LargeStraight if is_large_straight(&counts) => 40,
            Self::Chance => sum(dice),
            Self::Yahtzee if is_yahtzee(dice) => 50,
            _ => 0,
        }
    }
}

/// How many dice show each face 1..=6. Unrolled dice are not counted.
pub fn face_counts(dice: &Dice) -> [u8; 6] {
    let mut counts = [0u8; 6];
    for &die in dice {
        if (1..=6).contains(&die) {
            counts[usize::from(die) - 1] += 1;
        }
    }
    counts
}

pub fn sum(dice: &Dice) -> u16 {
    dice.iter().map(|&d| u16::from(d)).sum()
}

/// All five dice show the same rolled face.
pub fn is_yahtzee(dice: &Dice) -> bool {
    face_counts(dice).contains(&5)
}

fn has_run(counts: &[u8; 6], start: usize, len: usize) -> bool {
    counts[start..start + len].iter().all(|&c| c > 0)
}

fn is_small_straight(counts: &[u8; 6]) -> bool {
    (0..=2).any(|start| has_run(counts, start, 4))
}

fn is_large_straight(counts: &[u8; 6]) -> bool {
    // five distinct faces among five dice means nothing else is present
    (0..=1).any(|start| has_run(counts, start, 5))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_section_counts_matching_faces() {
        let dice = [3, 3, 1, 3, 6];
        assert_eq!(Category::Ones.points(&dice), 1);
        assert_eq!(Category::Twos.points(&dice), 0);
        assert_eq!(Category::Threes.points(&dice), 9);
        assert_eq!(Category::Sixes.points(&dice), 6);
    }

    #[test]
    fn of_a_kind_scores_total_or_nothing() {
        let three = [4, 4, 4, 2, 1];
        assert_eq!(Category::ThreeOfAKind.points(&three), 15);
        assert_eq!(Category::FourOfAKind.points(&three), 0);

        let four = [5, 5, 5, 5, 2];
        assert_eq!(Category::ThreeOfAKind.points(&four), 22);
        assert_eq!(Category::FourOfAKind.points(&four), 22);
    }

    #[test]
    fn full_house_needs_three_and_two() {
        assert_eq!(Category::FullHouse.points(&[2, 2, 6, 6, 6]), 25);
        assert_eq!(Category::FullHouse.points(&[2, 2, 6, 6, 1]), 0);
        // five of a kind has no pair alongside the triple
        assert_eq!(Category::FullHouse.points(&[6, 6, 6, 6, 6]), 0);
    }

    #[test]
    fn straights() {
        assert_eq!(Category::SmallStraight.points(&[1, 2, 3, 4, 4]), 30);
        assert_eq!(Category::SmallStraight.points(&[6, 3, 5, 4, 1]), 30);
        assert_eq!(Category::SmallStraight.points(&[1, 2, 3, 5, 6]), 0);
        assert_eq!(Category::LargeStraight.points(&[5, 4, 3, 2, 1]), 40);
        assert_eq!(Category::LargeStraight.points(&[2, 3, 4, 5, 6]), 40);
        assert_eq!(Category::LargeStraight.points(&[1, 2, 3, 4, 6]), 0);
        assert_eq!(Category::SmallStraight.points(&[2, 3, 4, 5, 6]), 30);
    }

    #[test]
    fn chance_is_unconditional_sum() {
        assert_eq!(Category::Chance.points(&[1, 6, 2, 5, 3]), 17);
        assert_eq!(Category::Chance.points(&[0; 5]), 0);
    }

    #[test]
    fn yahtzee_requires_five_rolled_dice_alike() {
        assert_eq!(Category::Yahtzee.points(&[4; 5]), 50);
        assert_eq!(Category::Yahtzee.points(&[4, 4, 4, 4, 3]), 0);
        assert_eq!(Category::Yahtzee.points(&[0; 5]), 0);
        assert!(!is_yahtzee(&[0; 5]));
    }

    #[test]
    fn unrolled_dice_score_zero_everywhere() {
        for category in Category::ALL {
            assert_eq!(category.points(&[0; 5]), 0, "{}", category.label());
        }
    }

    #[test]
    fn index_and_label_line_up() {
        assert_eq!(Category::from_index(11), Some(Category::Chance));
        assert_eq!(Category::from_index(13), None);
        assert_eq!(Category::Yahtzee.label(), "Yahtzee");
        assert_eq!(LABELS[YAHTZEE_BONUS], "Yahtzee Bonus");
    }
}
