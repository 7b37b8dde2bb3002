//! Improvisation requests: stunts, custom effects, arcane synthesis.

use serde::{Deserialize, Serialize};

use questwright_domain::entities::{EffectCategory, EffectTrigger};
use questwright_domain::value_objects::{DiceFormula, EffectDuration};
use questwright_domain::{CharacterId, DomainError, EffectId, EncounterId};

/// A target caught in a stunt, with an optional saving throw.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StuntTarget {
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saving_throw_dc: Option<i32>,
    /// Passing the save halves damage instead of negating it
    #[serde(default)]
    pub half_on_save: bool,
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StuntRequest {
    pub actor_id: CharacterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<EncounterId>,
    pub skill: String,
    pub dc: i32,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub disadvantage: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_damage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_damage: Option<String>,
    #[serde(default)]
    pub targets: Vec<StuntTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl StuntRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(5..=35).contains(&self.dc) {
            return Err(DomainError::validation(format!(
                "stunt dc must be within 5..=35, got {}",
                self.dc
            )));
        }
        if self.advantage && self.disadvantage {
            return Err(DomainError::validation(
                "a roll cannot have both advantage and disadvantage",
            ));
        }
        for damage in [&self.success_damage, &self.failure_damage]
            .into_iter()
            .flatten()
        {
            DiceFormula::parse(damage)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyEffectRequest {
    pub target_id: String,
    #[serde(default = "default_target_type")]
    pub target_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: EffectCategory,
    pub power_level: u8,
    #[serde(default)]
    pub mechanics: Vec<serde_json::Value>,
    pub duration: EffectDuration,
    #[serde(default)]
    pub triggers: Vec<EffectTrigger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn default_target_type() -> String {
    "character".to_string()
}

impl ApplyEffectRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("effect name cannot be empty"));
        }
        if !(1..=5).contains(&self.power_level) {
            return Err(DomainError::validation(
                "effect powerLevel must be within 1..=5",
            ));
        }
        if self.duration.kind.is_timed() && self.duration.value.is_none() {
            return Err(DomainError::validation(
                "timed effect durations require a value",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEffectsRequest {
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<EffectCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default = "default_true")]
    pub active_only: bool,
}

fn default_true() -> bool {
    true
}

/// Remove by effect id, or by `(target, name)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEffectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<EffectId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RemoveEffectRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.effect_id.is_none() && (self.target_id.is_none() || self.name.is_none()) {
            return Err(DomainError::validation(
                "remove_effect needs effectId, or targetId with name",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTriggersRequest {
    pub target_id: String,
    pub event: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceDurationsRequest {
    pub target_id: String,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
}

fn default_rounds() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeRequest {
    pub caster_id: CharacterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_name: Option<String>,
    pub level: u8,
    pub school: String,
    pub effect_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_dice: Option<String>,
    #[serde(default)]
    pub in_combat: bool,
    #[serde(default)]
    pub has_related_spell: bool,
    /// Gold value of an expended material component
    #[serde(default)]
    pub material_value: i64,
    #[serde(default)]
    pub ley_line: bool,
    #[serde(default)]
    pub blood_moon: bool,
    #[serde(default)]
    pub desperation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl SynthesizeRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=9).contains(&self.level) {
            return Err(DomainError::validation(
                "spell level must be within 1..=9",
            ));
        }
        if self.school.trim().is_empty() {
            return Err(DomainError::validation("school cannot be empty"));
        }
        if let Some(dice) = &self.effect_dice {
            DiceFormula::parse(dice)?;
        }
        Ok(())
    }
}

/// The consolidated improvisation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ImprovisationManageRequest {
    Stunt(StuntRequest),
    ApplyEffect(ApplyEffectRequest),
    GetEffects(GetEffectsRequest),
    RemoveEffect(RemoveEffectRequest),
    ProcessTriggers(ProcessTriggersRequest),
    AdvanceDurations(AdvanceDurationsRequest),
    Synthesize(SynthesizeRequest),
    GetSpellbook {
        #[serde(rename = "characterId")]
        character_id: CharacterId,
    },
}

impl ImprovisationManageRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Stunt(request) => request.validate(),
            Self::ApplyEffect(request) => request.validate(),
            Self::RemoveEffect(request) => request.validate(),
            Self::Synthesize(request) => request.validate(),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stunt_dc_bounds() {
        let mut request: StuntRequest = serde_json::from_value(json!({
            "actorId": CharacterId::new(),
            "skill": "athletics",
            "dc": 15
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        request.dc = 40;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_advantage_disadvantage_exclusive() {
        let request: StuntRequest = serde_json::from_value(json!({
            "actorId": CharacterId::new(),
            "skill": "stealth",
            "dc": 12,
            "advantage": true,
            "disadvantage": true
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_action_tag_dispatch() {
        let request: ImprovisationManageRequest = serde_json::from_value(json!({
            "action": "advance_durations",
            "targetId": "hero"
        }))
        .unwrap();
        match request {
            ImprovisationManageRequest::AdvanceDurations(inner) => {
                assert_eq!(inner.rounds, 1);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_synthesize_level_bounds() {
        let request: SynthesizeRequest = serde_json::from_value(json!({
            "casterId": CharacterId::new(),
            "level": 3,
            "school": "evocation",
            "effectType": "damage",
            "effectDice": "3d6"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }
}
