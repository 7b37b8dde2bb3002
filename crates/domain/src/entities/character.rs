//! Character entity - player characters, NPCs and monsters alike.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::CharacterId;
use crate::value_objects::{ability_modifier, StatBlock};

/// Broad role a character plays in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterType {
    Pc,
    Npc,
    Enemy,
    Ally,
}

impl Default for CharacterType {
    fn default() -> Self {
        Self::Npc
    }
}

/// A character in the world.
///
/// Outside combat `0 <= hp <= max_hp` holds; during an encounter the token
/// snapshot owns the mutable hp and writes it back when the encounter ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub stats: StatBlock,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
    pub character_type: CharacterType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        stats: StatBlock,
        max_hp: i32,
        ac: i32,
        level: u8,
        character_type: CharacterType,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Character name cannot be empty"));
        }
        if max_hp <= 0 {
            return Err(DomainError::validation("max_hp must be positive"));
        }
        if level == 0 {
            return Err(DomainError::validation("level must be at least 1"));
        }
        Ok(Self {
            id: CharacterId::new(),
            name,
            stats,
            hp: max_hp,
            max_hp,
            ac,
            level,
            class_name: None,
            faction_id: None,
            behavior: None,
            character_type,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn con_modifier(&self) -> i32 {
        ability_modifier(self.stats.con)
    }

    /// Heal up to `amount`, never past `max_hp`. Returns the hp actually
    /// restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Set hp directly, clamped into `0..=max_hp`. Used by the encounter
    /// write-back.
    pub fn set_hp_clamped(&mut self, hp: i32) {
        self.hp = hp.clamp(0, self.max_hp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> Character {
        Character::new(
            "Brienne",
            StatBlock::default(),
            20,
            15,
            3,
            CharacterType::Pc,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_starts_at_full_hp() {
        let c = hero();
        assert_eq!(c.hp, 20);
        assert_eq!(c.max_hp, 20);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut c = hero();
        c.hp = 15;
        assert_eq!(c.heal(10), 5);
        assert_eq!(c.hp, 20);
    }

    #[test]
    fn test_set_hp_clamps() {
        let mut c = hero();
        c.set_hp_clamped(-4);
        assert_eq!(c.hp, 0);
        c.set_hp_clamped(99);
        assert_eq!(c.hp, 20);
    }

    #[test]
    fn test_rejects_empty_name_and_zero_hp() {
        assert!(Character::new(
            " ",
            StatBlock::default(),
            10,
            10,
            1,
            CharacterType::Npc,
            Utc::now()
        )
        .is_err());
        assert!(Character::new(
            "Gob",
            StatBlock::default(),
            0,
            10,
            1,
            CharacterType::Enemy,
            Utc::now()
        )
        .is_err());
    }
}
