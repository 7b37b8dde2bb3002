//! Value objects shared across the domain.

mod dice;
mod duration;
mod heat;
mod stats;

pub use dice::{
    D20Roll, DiceFormula, DiceParseError, DiceRollResult, DieRoller, RollMode,
};
pub use duration::{DurationKind, EffectDuration};
pub use heat::{DetectionRisk, HeatLevel};
pub use stats::{ability_modifier, StatBlock};
