//! Ability score block shared by characters and combat tokens.

use serde::{Deserialize, Serialize};

/// The six core ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub str: i32,
    pub dex: i32,
    pub con: i32,
    pub int: i32,
    pub wis: i32,
    pub cha: i32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            str: 10,
            dex: 10,
            con: 10,
            int: 10,
            wis: 10,
            cha: 10,
        }
    }
}

impl StatBlock {
    /// Look up a score by its short ability name.
    pub fn get(&self, ability: &str) -> Option<i32> {
        match ability.to_ascii_lowercase().as_str() {
            "str" => Some(self.str),
            "dex" => Some(self.dex),
            "con" => Some(self.con),
            "int" => Some(self.int),
            "wis" => Some(self.wis),
            "cha" => Some(self.cha),
            _ => None,
        }
    }

    pub fn modifier_for(&self, ability: &str) -> i32 {
        ability_modifier(self.get(ability).unwrap_or(10))
    }
}

/// Ability modifier: floor((score - 10) / 2).
///
/// Rust's `/` rounds toward zero, so negative differences need the floor
/// adjustment.
pub fn ability_modifier(score: i32) -> i32 {
    let diff = score - 10;
    if diff >= 0 {
        diff / 2
    } else {
        (diff - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_uses_floor_division() {
        assert_eq!(ability_modifier(10), 0);
        assert_eq!(ability_modifier(11), 0);
        assert_eq!(ability_modifier(12), 1);
        assert_eq!(ability_modifier(9), -1);
        assert_eq!(ability_modifier(8), -1);
        assert_eq!(ability_modifier(7), -2);
        assert_eq!(ability_modifier(20), 5);
        assert_eq!(ability_modifier(1), -5);
    }

    #[test]
    fn test_get_by_name() {
        let stats = StatBlock {
            int: 16,
            ..StatBlock::default()
        };
        assert_eq!(stats.get("INT"), Some(16));
        assert_eq!(stats.get("luck"), None);
        assert_eq!(stats.modifier_for("int"), 3);
    }
}
