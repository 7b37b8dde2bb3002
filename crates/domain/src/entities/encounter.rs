//! Encounters and combat tokens.
//!
//! A token is a frozen snapshot of a character's combat-relevant fields; it
//! owns its own hp for the duration of the encounter. When the encounter
//! ends, token hp is written back to any persisted character with the same
//! id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EncounterId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterStatus {
    Active,
    Paused,
    Completed,
}

/// A combat participant.
///
/// `id` is free-form: a persisted character id, or an ad-hoc label like
/// "goblin-2". Only ids that parse as character ids participate in the
/// end-of-encounter write-back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CombatToken {
    pub id: String,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub ac: i32,
    pub initiative_bonus: i32,
    /// Rolled at initialisation: d20 + bonus
    pub initiative: i32,
    pub is_enemy: bool,
}

impl CombatToken {
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }

    /// Apply damage, clamping hp at 0. Returns true if this blow defeated
    /// the token.
    pub fn apply_damage(&mut self, damage: i32) -> bool {
        let was_up = !self.is_defeated();
        self.hp = (self.hp - damage.max(0)).max(0);
        was_up && self.is_defeated()
    }

    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }
}

/// Battlefield annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terrain {
    /// Obstacle cells as "x,y" strings
    pub obstacles: Vec<String>,
}

/// A combat encounter: initiative-ordered tokens plus the turn cursor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    pub id: EncounterId,
    /// Sorted descending by initiative at initialisation
    pub tokens: Vec<CombatToken>,
    pub round: u32,
    pub current_turn_index: usize,
    pub status: EncounterStatus,
    /// Seed string the encounter's dice stream derives from
    pub seed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Terrain>,
    pub created_at: DateTime<Utc>,
}

impl Encounter {
    pub fn active_token(&self) -> Option<&CombatToken> {
        self.tokens.get(self.current_turn_index)
    }

    pub fn active_token_id(&self) -> Option<&str> {
        self.active_token().map(|t| t.id.as_str())
    }

    pub fn token(&self, id: &str) -> Option<&CombatToken> {
        self.tokens.iter().find(|t| t.id == id)
    }

    pub fn token_mut(&mut self, id: &str) -> Option<&mut CombatToken> {
        self.tokens.iter_mut().find(|t| t.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str, hp: i32, is_enemy: bool) -> CombatToken {
        CombatToken {
            id: id.into(),
            name: id.into(),
            hp,
            max_hp: hp.max(1),
            ac: 12,
            initiative_bonus: 0,
            initiative: 10,
            is_enemy,
        }
    }

    #[test]
    fn test_damage_clamps_and_flags_defeat() {
        let mut t = token("goblin", 5, true);
        assert!(!t.apply_damage(3));
        assert_eq!(t.hp, 2);
        assert!(t.apply_damage(10));
        assert_eq!(t.hp, 0);
        // Already down: no second defeat event
        assert!(!t.apply_damage(2));
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut t = token("hero", 10, false);
        t.hp = 4;
        assert_eq!(t.heal(20), 6);
        assert_eq!(t.hp, 10);
    }

    #[test]
    fn test_token_lookup() {
        let encounter = Encounter {
            id: EncounterId::new(),
            tokens: vec![token("hero", 10, false), token("goblin", 0, true)],
            round: 1,
            current_turn_index: 0,
            status: EncounterStatus::Active,
            seed: "battle".into(),
            terrain: None,
            created_at: Utc::now(),
        };
        assert_eq!(encounter.active_token_id(), Some("hero"));
        assert!(encounter.token("goblin").unwrap().is_defeated());
        assert!(encounter.token("ghost").is_none());
    }
}
