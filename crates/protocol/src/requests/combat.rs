//! Combat lifecycle requests.

use serde::{Deserialize, Serialize};

use questwright_domain::entities::Terrain;
use questwright_domain::value_objects::DiceFormula;
use questwright_domain::{DomainError, EncounterId};

/// One participant supplied at encounter creation. `id` defaults to a slug of
/// the name; a persisted character id links the token to the write-back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default = "default_ac")]
    pub ac: i32,
    #[serde(default)]
    pub initiative_bonus: i32,
    /// Caller override for the enemy heuristic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enemy: Option<bool>,
}

fn default_ac() -> i32 {
    10
}

impl ParticipantSpec {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("participant name cannot be empty"));
        }
        if self.max_hp <= 0 {
            return Err(DomainError::validation("participant maxHp must be positive"));
        }
        if self.hp < 0 || self.hp > self.max_hp {
            return Err(DomainError::validation(
                "participant hp must be within 0..=maxHp",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEncounterRequest {
    pub participants: Vec<ParticipantSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Terrain>,
}

impl CreateEncounterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.participants.is_empty() {
            return Err(DomainError::validation(
                "an encounter requires at least one participant",
            ));
        }
        for participant in &self.participants {
            participant.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterRef {
    pub encounter_id: EncounterId,
}

/// The two combat actions multiplexed by `execute_combat_action`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "snake_case")]
pub enum CombatAction {
    Attack {
        #[serde(rename = "actorId")]
        actor_id: String,
        #[serde(rename = "targetId")]
        target_id: String,
        #[serde(rename = "attackBonus", default)]
        attack_bonus: i32,
        dc: i32,
        /// Damage formula, e.g. "1d8+3" or a flat "6"
        damage: String,
    },
    Heal {
        #[serde(rename = "actorId")]
        actor_id: String,
        #[serde(rename = "targetId")]
        target_id: String,
        amount: i32,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteCombatActionRequest {
    pub encounter_id: EncounterId,
    #[serde(flatten)]
    pub action: CombatAction,
}

impl ExecuteCombatActionRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        match &self.action {
            CombatAction::Attack { dc, damage, .. } => {
                if *dc < 1 {
                    return Err(DomainError::validation("attack dc must be positive"));
                }
                // Accept either a dice formula or a flat integer
                if damage.parse::<i32>().is_err() {
                    DiceFormula::parse(damage)?;
                }
                Ok(())
            }
            CombatAction::Heal { amount, .. } => {
                if *amount < 0 {
                    return Err(DomainError::validation("heal amount cannot be negative"));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_participant_bounds() {
        let spec = ParticipantSpec {
            id: None,
            name: "goblin".into(),
            hp: 7,
            max_hp: 7,
            ac: 13,
            initiative_bonus: 1,
            is_enemy: None,
        };
        assert!(spec.validate().is_ok());
        let bad = ParticipantSpec { hp: 9, ..spec };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_combat_action_discriminator() {
        let request: ExecuteCombatActionRequest = serde_json::from_value(json!({
            "encounterId": EncounterId::new(),
            "actionType": "attack",
            "actorId": "hero",
            "targetId": "goblin",
            "attackBonus": 5,
            "dc": 12,
            "damage": "1d6+2"
        }))
        .unwrap();
        assert!(matches!(request.action, CombatAction::Attack { .. }));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_flat_damage_accepted() {
        let request: ExecuteCombatActionRequest = serde_json::from_value(json!({
            "encounterId": EncounterId::new(),
            "actionType": "attack",
            "actorId": "hero",
            "targetId": "goblin",
            "dc": 12,
            "damage": "6"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
