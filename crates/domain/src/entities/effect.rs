//! Custom effects and synthesized spells.
//!
//! Effect `mechanics` are opaque records evaluated downstream; the domain
//! stores them as JSON without imposing structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, EffectId, SpellId};
use crate::value_objects::{DurationKind, EffectDuration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectCategory {
    Boon,
    Curse,
    Neutral,
    Transformative,
}

/// Condition under which an effect fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectTrigger {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A bespoke effect applied to an actor by the improvisation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEffect {
    pub id: EffectId,
    pub target_id: String,
    pub target_type: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: EffectCategory,
    pub power_level: u8,
    /// Opaque mechanic records, evaluated downstream
    pub mechanics: Vec<serde_json::Value>,
    pub duration: EffectDuration,
    pub triggers: Vec<EffectTrigger>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CustomEffect {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(1..=5).contains(&self.power_level) {
            return Err(DomainError::validation(format!(
                "Effect power_level must be within 1..=5, got {}",
                self.power_level
            )));
        }
        if self.duration.kind.is_timed() && self.duration.value.is_none() {
            return Err(DomainError::validation(
                "Timed effect durations require a value",
            ));
        }
        Ok(())
    }

    /// Decrement a round-based duration by one. Returns true if the effect
    /// expired on this tick.
    pub fn tick_round(&mut self) -> bool {
        if self.duration.kind != DurationKind::Rounds || !self.is_active {
            return false;
        }
        let remaining = self.duration.value.unwrap_or(0).saturating_sub(1);
        self.duration.value = Some(remaining);
        if remaining == 0 {
            self.is_active = false;
            true
        } else {
            false
        }
    }

    /// Whether any trigger matches the given event name.
    pub fn triggers_on(&self, event: &str) -> bool {
        self.is_active && self.triggers.iter().any(|t| t.event == event)
    }
}

/// A spellbook entry earned through synthesis mastery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizedSpell {
    pub id: SpellId,
    pub character_id: CharacterId,
    pub name: String,
    pub school: String,
    pub level: u8,
    pub effect_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_dice: Option<String>,
    pub mastered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect(duration: EffectDuration) -> CustomEffect {
        CustomEffect {
            id: EffectId::new(),
            target_id: "hero".into(),
            target_type: "character".into(),
            name: "Stone Skin".into(),
            description: None,
            category: EffectCategory::Boon,
            power_level: 2,
            mechanics: vec![],
            duration,
            triggers: vec![EffectTrigger {
                event: "turn_start".into(),
                condition: None,
            }],
            is_active: true,
            source: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_power_level_bounds() {
        let mut e = effect(EffectDuration::permanent());
        assert!(e.validate().is_ok());
        e.power_level = 6;
        assert!(e.validate().is_err());
        e.power_level = 0;
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_timed_duration_requires_value() {
        let e = effect(EffectDuration {
            kind: DurationKind::Minutes,
            value: None,
        });
        assert!(e.validate().is_err());
    }

    #[test]
    fn test_tick_round_expires_at_zero() {
        let mut e = effect(EffectDuration::rounds(2));
        assert!(!e.tick_round());
        assert!(e.is_active);
        assert!(e.tick_round());
        assert!(!e.is_active);
        // expired effects don't tick again
        assert!(!e.tick_round());
    }

    #[test]
    fn test_permanent_effects_never_tick() {
        let mut e = effect(EffectDuration::permanent());
        assert!(!e.tick_round());
        assert!(e.is_active);
    }

    #[test]
    fn test_trigger_matching() {
        let e = effect(EffectDuration::rounds(3));
        assert!(e.triggers_on("turn_start"));
        assert!(!e.triggers_on("turn_end"));
    }
}
