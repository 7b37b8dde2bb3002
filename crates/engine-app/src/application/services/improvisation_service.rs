//! Improvisation engine: rule-of-cool stunts, custom effects with durations
//! and triggers, and arcane synthesis with its wild-surge table.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use questwright_domain::entities::{CustomEffect, SynthesizedSpell};
use questwright_domain::rules::{proficiency_bonus, skill_ability, wild_surge_entry};
use questwright_domain::value_objects::{
    ability_modifier, D20Roll, DiceFormula, DieRoller, RollMode,
};
use questwright_domain::{CharacterId, DomainEvent, EffectId, SpellId};
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, EffectQuery, EffectRepositoryPort,
    EventBusPort, RandomPort,
};
use questwright_protocol::requests::improvisation::{
    AdvanceDurationsRequest, ApplyEffectRequest, GetEffectsRequest, RemoveEffectRequest,
    StuntRequest, SynthesizeRequest,
};

use crate::application::error::ToolError;

/// Outcome band of a stunt check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StuntOutcome {
    CriticalSuccess,
    Success,
    Failure,
    CriticalFailure,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_roll: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_dc: Option<i32>,
    pub saved: bool,
    pub damage: i32,
    /// Conditions attach only on failed saves
    pub conditions_applied: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StuntResult {
    pub actor_id: CharacterId,
    pub skill: String,
    pub ability: &'static str,
    pub roll: i32,
    pub all_rolls: Vec<i32>,
    pub modifier: i32,
    pub total: i32,
    pub dc: i32,
    pub outcome: StuntOutcome,
    pub damage_rolled: i32,
    pub self_damage: i32,
    pub targets: Vec<TargetOutcome>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationAdvanceResult {
    pub target_id: String,
    pub advanced: Vec<String>,
    pub expired: Vec<String>,
}

/// Outcome bands of an arcane synthesis attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Mastery,
    Success,
    Fizzle,
    Backfire,
    Catastrophic,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisResult {
    pub caster_id: CharacterId,
    pub spell_name: String,
    pub level: u8,
    pub dc: i32,
    pub roll: i32,
    pub modifier: i32,
    pub total: i32,
    pub margin: i32,
    pub outcome: SynthesisOutcome,
    pub spell_mastered: bool,
    pub spell_slot_consumed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backfire_damage: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wild_surge: Option<String>,
}

pub struct ImprovisationService {
    effects: Arc<dyn EffectRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
    rng: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl ImprovisationService {
    pub fn new(
        effects: Arc<dyn EffectRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        events: Arc<dyn EventBusPort>,
        rng: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            effects,
            characters,
            audit,
            events,
            rng,
            clock,
        }
    }

    fn publish_background(&self, event: DomainEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(err) = events.publish(event).await {
                tracing::warn!(error = %err, "Event publication failed");
            }
        });
    }

    fn roller_for(&self, seed: Option<&str>, prefix: &str, actor: &str) -> Box<dyn DieRoller> {
        match seed {
            Some(seed) => self.rng.seeded(seed),
            None => {
                let derived = format!(
                    "{prefix}-{actor}-{}",
                    self.clock.now().timestamp_millis()
                );
                self.rng.seeded(&derived)
            }
        }
    }

    /// Resolve a rule-of-cool stunt.
    pub async fn stunt(&self, request: StuntRequest) -> Result<StuntResult, ToolError> {
        request.validate()?;
        let actor = self
            .characters
            .find_by_id(request.actor_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Character",
                id: request.actor_id.to_string(),
            })?;

        let mode = match (request.advantage, request.disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            _ => RollMode::Normal,
        };
        let scope = request
            .encounter_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "solo".to_string());
        let mut roller = self.roller_for(
            request.seed.as_deref(),
            &format!("stunt-{scope}"),
            &request.actor_id.to_string(),
        );

        let ability = skill_ability(&request.skill);
        let modifier = actor.stats.modifier_for(ability);
        let d20 = D20Roll::roll(roller.as_mut(), mode);
        let total = d20.kept + modifier;

        let outcome = if d20.is_natural_20() || total >= request.dc + 10 {
            StuntOutcome::CriticalSuccess
        } else if d20.is_natural_1() || total <= request.dc - 10 {
            StuntOutcome::CriticalFailure
        } else if total >= request.dc {
            StuntOutcome::Success
        } else {
            StuntOutcome::Failure
        };

        let succeeded = matches!(
            outcome,
            StuntOutcome::Success | StuntOutcome::CriticalSuccess
        );
        let mut damage_rolled = 0;
        if succeeded {
            if let Some(formula) = &request.success_damage {
                let rolled = DiceFormula::parse(formula)
                    .map_err(questwright_domain::DomainError::from)?
                    .roll(roller.as_mut());
                damage_rolled = rolled.total.max(0);
                if outcome == StuntOutcome::CriticalSuccess {
                    damage_rolled *= 2;
                }
            }
        }

        let mut targets = Vec::with_capacity(request.targets.len());
        if succeeded {
            for target in &request.targets {
                let (save_roll, saved) = match target.saving_throw_dc {
                    Some(dc) => {
                        let roll = roller.as_mut().roll_die(20);
                        (Some(roll), roll >= dc)
                    }
                    None => (None, false),
                };
                let damage = if saved {
                    if target.half_on_save {
                        damage_rolled / 2
                    } else {
                        0
                    }
                } else {
                    damage_rolled
                };
                targets.push(TargetOutcome {
                    target_id: target.target_id.clone(),
                    save_roll,
                    save_dc: target.saving_throw_dc,
                    saved,
                    damage,
                    conditions_applied: if saved {
                        Vec::new()
                    } else {
                        target.conditions.clone()
                    },
                });
            }
        }

        let mut self_damage = 0;
        if outcome == StuntOutcome::CriticalFailure {
            if let Some(formula) = &request.failure_damage {
                let rolled = DiceFormula::parse(formula)
                    .map_err(questwright_domain::DomainError::from)?
                    .roll(roller.as_mut());
                self_damage = rolled.total.max(0);
            }
        }

        let result = StuntResult {
            actor_id: request.actor_id,
            skill: request.skill.clone(),
            ability,
            roll: d20.kept,
            all_rolls: d20.rolls,
            modifier,
            total,
            dc: request.dc,
            outcome,
            damage_rolled,
            self_damage,
            targets,
        };
        self.audit
            .append(
                "improvisation.stunt",
                Some(&request.actor_id.to_string()),
                None,
                serde_json::to_value(&result).unwrap_or_default(),
            )
            .await?;
        debug!(actor = %request.actor_id, skill = %request.skill, total, "Stunt resolved");
        Ok(result)
    }

    pub async fn apply_effect(&self, request: ApplyEffectRequest) -> Result<CustomEffect, ToolError> {
        request.validate()?;
        let effect = CustomEffect {
            id: EffectId::new(),
            target_id: request.target_id,
            target_type: request.target_type,
            name: request.name,
            description: request.description,
            category: request.category,
            power_level: request.power_level,
            mechanics: request.mechanics,
            duration: request.duration,
            triggers: request.triggers,
            is_active: true,
            source: request.source,
            created_at: self.clock.now(),
        };
        effect.validate()?;
        self.effects.insert(&effect).await?;

        self.audit
            .append(
                "improvisation.apply_effect",
                None,
                Some(&effect.target_id),
                json!({"name": effect.name, "category": effect.category, "powerLevel": effect.power_level}),
            )
            .await?;
        self.publish_background(DomainEvent::EffectApplied {
            target_id: effect.target_id.clone(),
            effect_name: effect.name.clone(),
        });
        Ok(effect)
    }

    pub async fn get_effects(
        &self,
        request: GetEffectsRequest,
    ) -> Result<Vec<CustomEffect>, ToolError> {
        let query = EffectQuery {
            category: request.category,
            source_type: request.source_type,
            active_only: request.active_only,
        };
        Ok(self.effects.list_by_target(&request.target_id, &query).await?)
    }

    pub async fn remove_effect(&self, request: RemoveEffectRequest) -> Result<CustomEffect, ToolError> {
        request.validate()?;
        let effect = match request.effect_id {
            Some(id) => self.effects.find_by_id(id).await?,
            None => {
                // validate() guarantees both are present here
                let target_id = request.target_id.as_deref().unwrap_or_default();
                let name = request.name.as_deref().unwrap_or_default();
                self.effects
                    .find_by_target_and_name(target_id, name)
                    .await?
            }
        }
        .ok_or_else(|| ToolError::NotFound {
            entity_type: "Effect",
            id: request
                .effect_id
                .map(|id| id.to_string())
                .or(request.name)
                .unwrap_or_default(),
        })?;
        self.effects.remove(effect.id).await?;

        self.audit
            .append(
                "improvisation.remove_effect",
                None,
                Some(&effect.target_id),
                json!({"name": effect.name}),
            )
            .await?;
        Ok(effect)
    }

    /// Active effects on the target whose trigger list matches the event.
    pub async fn process_triggers(
        &self,
        target_id: &str,
        event: &str,
    ) -> Result<Vec<CustomEffect>, ToolError> {
        let query = EffectQuery {
            active_only: true,
            ..Default::default()
        };
        let triggered = self
            .effects
            .list_by_target(target_id, &query)
            .await?
            .into_iter()
            .filter(|effect| effect.triggers_on(event))
            .collect();
        Ok(triggered)
    }

    /// Tick round counters `rounds` times. Zero rounds is a no-op that
    /// reports current state unchanged.
    pub async fn advance_durations(
        &self,
        request: AdvanceDurationsRequest,
    ) -> Result<DurationAdvanceResult, ToolError> {
        let query = EffectQuery {
            active_only: true,
            ..Default::default()
        };
        let mut advanced = Vec::new();
        let mut expired = Vec::new();
        for mut effect in self.effects.list_by_target(&request.target_id, &query).await? {
            if effect.duration.remaining_rounds().is_none() {
                continue;
            }
            let mut did_expire = false;
            for _ in 0..request.rounds {
                if effect.tick_round() {
                    did_expire = true;
                    break;
                }
            }
            if request.rounds > 0 {
                self.effects.update(&effect).await?;
            }
            if did_expire {
                expired.push(effect.name.clone());
                self.publish_background(DomainEvent::EffectExpired {
                    target_id: request.target_id.clone(),
                    effect_name: effect.name,
                });
            } else {
                advanced.push(effect.name);
            }
        }
        // Expired rows linger flagged-inactive until swept
        if !expired.is_empty() {
            self.effects.sweep_inactive(&request.target_id).await?;
        }
        Ok(DurationAdvanceResult {
            target_id: request.target_id,
            advanced,
            expired,
        })
    }

    /// Attempt to synthesize a brand-new spell on the spot.
    pub async fn synthesize(&self, request: SynthesizeRequest) -> Result<SynthesisResult, ToolError> {
        request.validate()?;
        let caster = self
            .characters
            .find_by_id(request.caster_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Character",
                id: request.caster_id.to_string(),
            })?;

        let mut dc = 10 + 2 * request.level as i32;
        if request.in_combat {
            dc += 2;
        }
        dc += if request.has_related_spell { -2 } else { 3 };
        dc -= (request.material_value / 100).min(5) as i32;
        if request.ley_line {
            dc -= 3;
        }
        if request.blood_moon {
            dc -= 2;
        }
        if request.desperation {
            dc += 2;
        }

        let modifier = ability_modifier(caster.stats.int) + proficiency_bonus(caster.level);
        let mut roller = self.roller_for(
            request.seed.as_deref(),
            "synthesize",
            &request.caster_id.to_string(),
        );
        let d20 = D20Roll::roll(roller.as_mut(), RollMode::Normal);
        let total = d20.kept + modifier;
        let margin = total - dc;

        let outcome = if d20.is_natural_1() || margin <= -10 {
            SynthesisOutcome::Catastrophic
        } else if d20.is_natural_20() || margin >= 10 {
            SynthesisOutcome::Mastery
        } else if margin >= 0 {
            SynthesisOutcome::Success
        } else if margin >= -5 {
            SynthesisOutcome::Fizzle
        } else {
            SynthesisOutcome::Backfire
        };

        let spell_name = request
            .spell_name
            .clone()
            .unwrap_or_else(|| format!("{} improvisation", request.school));

        let mut backfire_damage = None;
        let mut wild_surge = None;
        let mut spell_mastered = false;
        match outcome {
            SynthesisOutcome::Mastery => {
                let spell = SynthesizedSpell {
                    id: SpellId::new(),
                    character_id: request.caster_id,
                    name: spell_name.clone(),
                    school: request.school.clone(),
                    level: request.level,
                    effect_type: request.effect_type.clone(),
                    effect_dice: request.effect_dice.clone(),
                    mastered_at: self.clock.now(),
                };
                self.effects.insert_spell(&spell).await?;
                spell_mastered = true;
            }
            SynthesisOutcome::Backfire => {
                let formula = DiceFormula::new(request.level, 6, 0)
                    .map_err(questwright_domain::DomainError::from)?;
                backfire_damage = Some(formula.roll(roller.as_mut()).total);
            }
            SynthesisOutcome::Catastrophic => {
                let surge_roll = roller.as_mut().roll_die(20);
                wild_surge = Some(wild_surge_entry(surge_roll).to_string());
            }
            _ => {}
        }

        let result = SynthesisResult {
            caster_id: request.caster_id,
            spell_name,
            level: request.level,
            dc,
            roll: d20.kept,
            modifier,
            total,
            margin,
            outcome,
            spell_mastered,
            spell_slot_consumed: matches!(
                outcome,
                SynthesisOutcome::Success | SynthesisOutcome::Fizzle
            ),
            backfire_damage,
            wild_surge,
        };
        self.audit
            .append(
                "improvisation.synthesize",
                Some(&request.caster_id.to_string()),
                None,
                serde_json::to_value(&result).unwrap_or_default(),
            )
            .await?;
        self.publish_background(DomainEvent::SpellSynthesized {
            character_id: request.caster_id,
            spell_name: result.spell_name.clone(),
            outcome: format!("{:?}", result.outcome).to_lowercase(),
        });
        info!(caster = %request.caster_id, outcome = ?result.outcome, "Synthesis resolved");
        Ok(result)
    }

    pub async fn spellbook(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<SynthesizedSpell>, ToolError> {
        Ok(self.effects.spellbook(character_id).await?)
    }
}
