//! Dice formulas, parsing and roll results.
//!
//! Supports formulas like "1d20+5", "2d6-1", "3d6". Rolling goes through the
//! [`DieRoller`] trait so callers decide the randomness source; the engine
//! wires in a per-tool-call seeded roller.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Source of individual die results.
///
/// Implementations live in the adapter layer (seeded ChaCha stream in
/// production, fixed sequences in tests).
pub trait DieRoller: Send {
    /// Roll a single die with the given number of sides, returning 1..=sides.
    fn roll_die(&mut self, sides: u32) -> i32;
}

/// How a d20 is rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    Normal,
    Advantage,
    Disadvantage,
}

/// A resolved d20 roll, keeping every die that hit the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct D20Roll {
    pub mode: RollMode,
    /// All dice rolled (two under advantage or disadvantage)
    pub rolls: Vec<i32>,
    /// The die that counts
    pub kept: i32,
}

impl D20Roll {
    /// Roll a d20 under the given mode. Advantage keeps the best of two,
    /// disadvantage the worst; the modes never combine.
    pub fn roll(roller: &mut dyn DieRoller, mode: RollMode) -> Self {
        let first = roller.roll_die(20);
        match mode {
            RollMode::Normal => Self {
                mode,
                rolls: vec![first],
                kept: first,
            },
            RollMode::Advantage => {
                let second = roller.roll_die(20);
                Self {
                    mode,
                    rolls: vec![first, second],
                    kept: first.max(second),
                }
            }
            RollMode::Disadvantage => {
                let second = roller.roll_die(20);
                Self {
                    mode,
                    rolls: vec![first, second],
                    kept: first.min(second),
                }
            }
        }
    }

    pub fn is_natural_20(&self) -> bool {
        self.kept == 20
    }

    pub fn is_natural_1(&self) -> bool {
        self.kept == 1
    }
}

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected XdY or XdY+Z
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 2
    #[error("Die size must be at least 2")]
    InvalidDieSize,
}

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u8,
    /// Size of each die (Y in XdY)
    pub die_size: u8,
    /// Modifier to add/subtract after rolling (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    pub fn new(dice_count: u8, die_size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Parse a dice formula string like "1d20+5", "2d6-1", "d100".
    ///
    /// Parsed by hand to keep regex out of the domain layer.
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let d_pos = input.find('d').ok_or_else(|| {
            DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{input}'"))
        })?;

        let dice_count_str = &input[..d_pos];
        let dice_count: u8 = if dice_count_str.is_empty() {
            1 // "d20" means "1d20"
        } else {
            dice_count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{dice_count_str}'"))
            })?
        };
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }

        let after_d = &input[d_pos + 1..];
        let (die_size_str, modifier) = if let Some(plus_pos) = after_d.find('+') {
            let mod_str = &after_d[plus_pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid modifier: '+{mod_str}'"))
            })?;
            (&after_d[..plus_pos], modifier)
        } else if let Some(minus_pos) = after_d.find('-') {
            if minus_pos == 0 {
                return Err(DiceParseError::InvalidFormat(format!(
                    "Invalid die size: '{after_d}'"
                )));
            }
            let mod_str = &after_d[minus_pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid modifier: '-{mod_str}'"))
            })?;
            (&after_d[..minus_pos], -modifier)
        } else {
            (after_d, 0)
        };

        let die_size: u8 = die_size_str.parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{die_size_str}'"))
        })?;
        if die_size < 2 {
            return Err(DiceParseError::InvalidDieSize);
        }

        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// Roll the dice through the given roller.
    pub fn roll(&self, roller: &mut dyn DieRoller) -> DiceRollResult {
        let mut individual_rolls = Vec::with_capacity(self.dice_count as usize);
        for _ in 0..self.dice_count {
            individual_rolls.push(roller.roll_die(self.die_size as u32));
        }
        let dice_total: i32 = individual_rolls.iter().sum();
        DiceRollResult {
            formula: self.clone(),
            individual_rolls,
            dice_total,
            modifier_applied: self.modifier,
            total: dice_total + self.modifier,
        }
    }

    pub fn min_roll(&self) -> i32 {
        self.dice_count as i32 + self.modifier
    }

    pub fn max_roll(&self) -> i32 {
        (self.dice_count as i32 * self.die_size as i32) + self.modifier
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifier == 0 {
            write!(f, "{}d{}", self.dice_count, self.die_size)
        } else if self.modifier > 0 {
            write!(f, "{}d{}+{}", self.dice_count, self.die_size, self.modifier)
        } else {
            write!(f, "{}d{}{}", self.dice_count, self.die_size, self.modifier)
        }
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiceRollResult {
    /// The formula that was rolled
    pub formula: DiceFormula,
    /// Individual die results
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// Modifier that was applied
    pub modifier_applied: i32,
    /// Final total (dice_total + modifier)
    pub total: i32,
}

impl DiceRollResult {
    /// Format as a breakdown string (e.g. "2d6[4, 5] + 3 = 12")
    pub fn breakdown(&self) -> String {
        let rolls: Vec<String> = self.individual_rolls.iter().map(|r| r.to_string()).collect();
        if self.modifier_applied == 0 {
            format!("{}[{}] = {}", self.formula, rolls.join(", "), self.total)
        } else if self.modifier_applied > 0 {
            format!(
                "{}d{}[{}] + {} = {}",
                self.formula.dice_count,
                self.formula.die_size,
                rolls.join(", "),
                self.modifier_applied,
                self.total
            )
        } else {
            format!(
                "{}d{}[{}] - {} = {}",
                self.formula.dice_count,
                self.formula.die_size,
                rolls.join(", "),
                -self.modifier_applied,
                self.total
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::DieRoller;

    /// Replays a fixed sequence of die results, cycling when exhausted.
    pub struct SequenceRoller {
        values: Vec<i32>,
        next: usize,
    }

    impl SequenceRoller {
        pub fn new(values: Vec<i32>) -> Self {
            Self { values, next: 0 }
        }
    }

    impl DieRoller for SequenceRoller {
        fn roll_die(&mut self, _sides: u32) -> i32 {
            let value = self.values[self.next % self.values.len()];
            self.next += 1;
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::SequenceRoller;
    use super::*;

    #[test]
    fn test_parse_simple_d20() {
        let formula = DiceFormula::parse("1d20").unwrap();
        assert_eq!(formula.dice_count, 1);
        assert_eq!(formula.die_size, 20);
        assert_eq!(formula.modifier, 0);
    }

    #[test]
    fn test_parse_shorthand() {
        let formula = DiceFormula::parse("d100").unwrap();
        assert_eq!(formula.dice_count, 1);
        assert_eq!(formula.die_size, 100);
    }

    #[test]
    fn test_parse_with_modifiers() {
        assert_eq!(DiceFormula::parse("1d20+5").unwrap().modifier, 5);
        assert_eq!(DiceFormula::parse("2d6-1").unwrap().modifier, -1);
    }

    #[test]
    fn test_parse_case_and_whitespace() {
        let formula = DiceFormula::parse("  3D6+2 ").unwrap();
        assert_eq!(formula.dice_count, 3);
        assert_eq!(formula.die_size, 6);
        assert_eq!(formula.modifier, 2);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(DiceFormula::parse(""), Err(DiceParseError::Empty)));
        assert!(matches!(
            DiceFormula::parse("20"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            DiceFormula::parse("0d20"),
            Err(DiceParseError::InvalidDiceCount)
        ));
        assert!(matches!(
            DiceFormula::parse("1d1"),
            Err(DiceParseError::InvalidDieSize)
        ));
    }

    #[test]
    fn test_roll_sums_and_applies_modifier() {
        let mut roller = SequenceRoller::new(vec![4, 5]);
        let result = DiceFormula::parse("2d6+3").unwrap().roll(&mut roller);
        assert_eq!(result.individual_rolls, vec![4, 5]);
        assert_eq!(result.dice_total, 9);
        assert_eq!(result.total, 12);
        assert_eq!(result.breakdown(), "2d6[4, 5] + 3 = 12");
    }

    #[test]
    fn test_d20_advantage_keeps_best() {
        let mut roller = SequenceRoller::new(vec![7, 15]);
        let roll = D20Roll::roll(&mut roller, RollMode::Advantage);
        assert_eq!(roll.rolls, vec![7, 15]);
        assert_eq!(roll.kept, 15);
    }

    #[test]
    fn test_d20_disadvantage_keeps_worst() {
        let mut roller = SequenceRoller::new(vec![7, 15]);
        let roll = D20Roll::roll(&mut roller, RollMode::Disadvantage);
        assert_eq!(roll.kept, 7);
    }

    #[test]
    fn test_d20_naturals() {
        let mut roller = SequenceRoller::new(vec![20]);
        assert!(D20Roll::roll(&mut roller, RollMode::Normal).is_natural_20());
        let mut roller = SequenceRoller::new(vec![1]);
        assert!(D20Roll::roll(&mut roller, RollMode::Normal).is_natural_1());
    }

    #[test]
    fn test_min_max_roll() {
        let formula = DiceFormula::parse("2d6+3").unwrap();
        assert_eq!(formula.min_roll(), 5);
        assert_eq!(formula.max_roll(), 15);
    }
}
