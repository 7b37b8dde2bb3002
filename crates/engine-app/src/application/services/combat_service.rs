//! Combat engine: encounter lifecycle, initiative, attack and heal
//! resolution, turn advance and the end-of-encounter hp write-back.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info};

use questwright_domain::entities::{
    CombatToken, Encounter, EncounterStatus, Terrain,
};
use questwright_domain::rules::is_enemy_name;
use questwright_domain::value_objects::{D20Roll, DiceFormula, RollMode};
use questwright_domain::{CharacterId, DomainEvent, EncounterId};
use questwright_engine_ports::inbound::SessionContext;
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, EffectRepositoryPort,
    EncounterRepositoryPort, EventBusPort, RandomPort,
};
use questwright_protocol::requests::combat::{CreateEncounterRequest, ParticipantSpec};

use crate::application::error::ToolError;

/// Snapshot returned by every combat operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncounterView {
    pub id: EncounterId,
    pub status: EncounterStatus,
    pub round: u32,
    pub active_token_id: Option<String>,
    pub tokens: Vec<CombatToken>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Terrain>,
}

impl EncounterView {
    fn of(encounter: &Encounter) -> Self {
        Self {
            id: encounter.id,
            status: encounter.status,
            round: encounter.round,
            active_token_id: encounter.active_token_id().map(str::to_string),
            tokens: encounter.tokens.clone(),
            terrain: encounter.terrain.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackResult {
    pub encounter_id: EncounterId,
    pub actor_id: String,
    pub target_id: String,
    pub roll: i32,
    pub attack_bonus: i32,
    pub total: i32,
    pub dc: i32,
    pub hit: bool,
    pub critical: bool,
    pub fumble: bool,
    pub damage_applied: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage_rolls: Option<Vec<i32>>,
    pub target_hp: i32,
    pub target_defeated: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealResult {
    pub encounter_id: EncounterId,
    pub actor_id: String,
    pub target_id: String,
    pub amount_restored: i32,
    pub target_hp: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnAdvanceResult {
    pub encounter_id: EncounterId,
    pub round: u32,
    pub active_token_id: Option<String>,
    pub skipped_defeated: Vec<String>,
    pub effects_advanced: Vec<String>,
    pub effects_expired: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndEncounterResult {
    pub encounter_id: EncounterId,
    pub status: EncounterStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub victor: Option<String>,
    /// Characters whose stored hp now equals their token's final hp
    pub characters_written_back: Vec<CharacterId>,
    /// Ad-hoc tokens with no persisted character behind them
    pub ad_hoc_skipped: Vec<String>,
}

pub struct CombatService {
    encounters: Arc<dyn EncounterRepositoryPort>,
    characters: Arc<dyn CharacterRepositoryPort>,
    effects: Arc<dyn EffectRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
    rng: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    /// Runtime cache keyed `session_id:encounter_id`; reconstructible from
    /// the store at any time.
    active: RwLock<HashMap<String, Encounter>>,
}

impl CombatService {
    pub fn new(
        encounters: Arc<dyn EncounterRepositoryPort>,
        characters: Arc<dyn CharacterRepositoryPort>,
        effects: Arc<dyn EffectRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        events: Arc<dyn EventBusPort>,
        rng: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            encounters,
            characters,
            effects,
            audit,
            events,
            rng,
            clock,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Publish without coupling the handler's fate to the bus.
    fn publish_background(&self, event: DomainEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(err) = events.publish(event).await {
                tracing::warn!(error = %err, "Event publication failed");
            }
        });
    }

    pub async fn create_encounter(
        &self,
        request: CreateEncounterRequest,
        session: &SessionContext,
    ) -> Result<EncounterView, ToolError> {
        request.validate()?;

        let id = EncounterId::new();
        let seed = request
            .seed
            .clone()
            .unwrap_or_else(|| format!("encounter-{id}"));
        let mut roller = self.rng.seeded(&seed);

        let mut tokens: Vec<CombatToken> = request
            .participants
            .iter()
            .map(|spec| {
                let token_id = token_id_for(spec);
                let initiative = roller.roll_die(20) + spec.initiative_bonus;
                CombatToken {
                    is_enemy: spec
                        .is_enemy
                        .unwrap_or_else(|| is_enemy_name(&token_id) || is_enemy_name(&spec.name)),
                    id: token_id,
                    name: spec.name.clone(),
                    hp: spec.hp,
                    max_hp: spec.max_hp,
                    ac: spec.ac,
                    initiative_bonus: spec.initiative_bonus,
                    initiative,
                }
            })
            .collect();
        // Stable sort: ties keep insertion order
        tokens.sort_by(|a, b| b.initiative.cmp(&a.initiative));

        let encounter = Encounter {
            id,
            tokens,
            round: 1,
            current_turn_index: 0,
            status: EncounterStatus::Active,
            seed,
            terrain: request.terrain,
            created_at: self.clock.now(),
        };
        self.encounters.save(&encounter).await?;

        self.audit
            .append(
                "combat.create_encounter",
                None,
                Some(&id.to_string()),
                json!({
                    "participants": encounter.tokens.iter().map(|t| &t.id).collect::<Vec<_>>(),
                    "seed": encounter.seed,
                }),
            )
            .await?;
        self.publish_background(DomainEvent::EncounterStarted {
            encounter_id: id,
            participants: encounter.tokens.iter().map(|t| t.id.clone()).collect(),
        });

        info!(encounter = %id, tokens = encounter.tokens.len(), "Encounter created");
        let view = EncounterView::of(&encounter);
        self.active
            .write()
            .await
            .insert(session.scoped_key(id), encounter);
        Ok(view)
    }

    /// Fetch from the session cache, falling back to the store.
    async fn load(
        &self,
        encounter_id: EncounterId,
        session: &SessionContext,
    ) -> Result<Encounter, ToolError> {
        let key = session.scoped_key(encounter_id);
        if let Some(encounter) = self.active.read().await.get(&key) {
            return Ok(encounter.clone());
        }
        let encounter = self
            .encounters
            .find_by_id(encounter_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Encounter",
                id: encounter_id.to_string(),
            })?;
        Ok(encounter)
    }

    async fn store(&self, encounter: Encounter, session: &SessionContext) -> Result<(), ToolError> {
        self.encounters.save(&encounter).await?;
        self.active
            .write()
            .await
            .insert(session.scoped_key(encounter.id), encounter);
        Ok(())
    }

    pub async fn get_state(
        &self,
        encounter_id: EncounterId,
        session: &SessionContext,
    ) -> Result<EncounterView, ToolError> {
        Ok(EncounterView::of(&self.load(encounter_id, session).await?))
    }

    /// Reconstruct a paused or restarted encounter from its snapshot. Dice
    /// are not replayed; play resumes from the saved round and turn.
    pub async fn load_encounter(
        &self,
        encounter_id: EncounterId,
        session: &SessionContext,
    ) -> Result<EncounterView, ToolError> {
        let encounter = self
            .encounters
            .find_by_id(encounter_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Encounter",
                id: encounter_id.to_string(),
            })?;
        let view = EncounterView::of(&encounter);
        self.active
            .write()
            .await
            .insert(session.scoped_key(encounter_id), encounter);
        Ok(view)
    }

    pub async fn attack(
        &self,
        encounter_id: EncounterId,
        actor_id: &str,
        target_id: &str,
        attack_bonus: i32,
        dc: i32,
        damage: &str,
        session: &SessionContext,
    ) -> Result<AttackResult, ToolError> {
        let mut encounter = self.load(encounter_id, session).await?;
        if encounter.status != EncounterStatus::Active {
            return Err(ToolError::Conflict(format!(
                "Encounter {encounter_id} is not active"
            )));
        }
        if encounter.token(actor_id).is_none() {
            return Err(ToolError::NotFound {
                entity_type: "Combat token",
                id: actor_id.to_string(),
            });
        }

        let seed = format!(
            "{}-attack-{}-{}-{}",
            encounter.seed,
            actor_id,
            target_id,
            self.clock.now().timestamp_millis()
        );
        let mut roller = self.rng.seeded(&seed);
        let d20 = D20Roll::roll(roller.as_mut(), RollMode::Normal);

        let fumble = d20.is_natural_1();
        let critical = d20.is_natural_20();
        let total = d20.kept + attack_bonus;
        let hit = !fumble && (critical || total >= dc);

        let (damage_applied, damage_rolls) = if hit {
            let (mut amount, rolls) = roll_damage(damage, roller.as_mut())?;
            if critical {
                amount *= 2;
            }
            (amount, rolls)
        } else {
            (0, None)
        };

        let target = encounter
            .token_mut(target_id)
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Combat token",
                id: target_id.to_string(),
            })?;
        let target_defeated = hit && target.apply_damage(damage_applied);
        let target_hp = target.hp;

        let result = AttackResult {
            encounter_id,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            roll: d20.kept,
            attack_bonus,
            total,
            dc,
            hit,
            critical,
            fumble,
            damage_applied,
            damage_rolls,
            target_hp,
            target_defeated,
        };
        self.store(encounter, session).await?;

        self.audit
            .append(
                "combat.attack",
                Some(actor_id),
                Some(target_id),
                serde_json::to_value(&result).unwrap_or_default(),
            )
            .await?;
        self.publish_background(DomainEvent::AttackResolved {
            encounter_id,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            roll: result.roll,
            hit,
            critical,
            damage: damage_applied,
            target_defeated,
        });

        debug!(
            encounter = %encounter_id,
            actor = %actor_id,
            target = %target_id,
            roll = result.roll,
            hit,
            "Attack resolved"
        );
        Ok(result)
    }

    pub async fn heal(
        &self,
        encounter_id: EncounterId,
        actor_id: &str,
        target_id: &str,
        amount: i32,
        session: &SessionContext,
    ) -> Result<HealResult, ToolError> {
        let mut encounter = self.load(encounter_id, session).await?;
        if encounter.status != EncounterStatus::Active {
            return Err(ToolError::Conflict(format!(
                "Encounter {encounter_id} is not active"
            )));
        }
        let target = encounter
            .token_mut(target_id)
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Combat token",
                id: target_id.to_string(),
            })?;
        let amount_restored = target.heal(amount);
        let target_hp = target.hp;
        self.store(encounter, session).await?;

        self.audit
            .append(
                "combat.heal",
                Some(actor_id),
                Some(target_id),
                json!({"amount": amount, "restored": amount_restored, "hp": target_hp}),
            )
            .await?;
        self.publish_background(DomainEvent::HealingApplied {
            encounter_id,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            amount: amount_restored,
        });

        Ok(HealResult {
            encounter_id,
            actor_id: actor_id.to_string(),
            target_id: target_id.to_string(),
            amount_restored,
            target_hp,
        })
    }

    pub async fn advance_turn(
        &self,
        encounter_id: EncounterId,
        session: &SessionContext,
    ) -> Result<TurnAdvanceResult, ToolError> {
        let mut encounter = self.load(encounter_id, session).await?;
        if encounter.status != EncounterStatus::Active {
            return Err(ToolError::Conflict(format!(
                "Encounter {encounter_id} is not active"
            )));
        }

        // Round-based effects on the outgoing participant tick now
        let (effects_advanced, effects_expired) = match encounter.active_token_id() {
            Some(outgoing) => self.tick_round_effects(outgoing).await?,
            None => (Vec::new(), Vec::new()),
        };

        let mut skipped_defeated = Vec::new();
        if encounter.tokens.iter().any(|t| !t.is_defeated()) {
            loop {
                encounter.current_turn_index += 1;
                if encounter.current_turn_index >= encounter.tokens.len() {
                    encounter.current_turn_index = 0;
                    encounter.round += 1;
                }
                let token = &encounter.tokens[encounter.current_turn_index];
                if token.is_defeated() {
                    skipped_defeated.push(token.id.clone());
                } else {
                    break;
                }
            }
        }

        let result = TurnAdvanceResult {
            encounter_id,
            round: encounter.round,
            active_token_id: encounter.active_token_id().map(str::to_string),
            skipped_defeated,
            effects_advanced,
            effects_expired,
        };
        self.store(encounter, session).await?;

        self.audit
            .append(
                "combat.advance_turn",
                None,
                Some(&encounter_id.to_string()),
                json!({"round": result.round, "activeTokenId": result.active_token_id}),
            )
            .await?;
        self.publish_background(DomainEvent::TurnAdvanced {
            encounter_id,
            round: result.round,
            active_token_id: result.active_token_id.clone(),
        });
        Ok(result)
    }

    async fn tick_round_effects(
        &self,
        target_id: &str,
    ) -> Result<(Vec<String>, Vec<String>), ToolError> {
        let query = questwright_engine_ports::outbound::EffectQuery {
            active_only: true,
            ..Default::default()
        };
        let mut advanced = Vec::new();
        let mut expired = Vec::new();
        for mut effect in self.effects.list_by_target(target_id, &query).await? {
            if effect.duration.remaining_rounds().is_none() {
                continue;
            }
            let did_expire = effect.tick_round();
            self.effects.update(&effect).await?;
            if did_expire {
                expired.push(effect.name.clone());
                self.publish_background(DomainEvent::EffectExpired {
                    target_id: target_id.to_string(),
                    effect_name: effect.name,
                });
            } else {
                advanced.push(effect.name);
            }
        }
        Ok((advanced, expired))
    }

    /// End the encounter and write token hp back into persisted characters.
    /// Ad-hoc participants are skipped silently.
    pub async fn end_encounter(
        &self,
        encounter_id: EncounterId,
        session: &SessionContext,
    ) -> Result<EndEncounterResult, ToolError> {
        let mut encounter = self.load(encounter_id, session).await?;
        if encounter.status == EncounterStatus::Completed {
            return Err(ToolError::Conflict(format!(
                "Encounter {encounter_id} is already completed"
            )));
        }

        let mut updates: Vec<(CharacterId, i32)> = Vec::new();
        let mut ad_hoc_skipped = Vec::new();
        for token in &encounter.tokens {
            match CharacterId::parse(&token.id) {
                Ok(character_id) => updates.push((character_id, token.hp)),
                Err(_) => ad_hoc_skipped.push(token.id.clone()),
            }
        }
        let characters_written_back = self.characters.write_back_hp(&updates).await?;

        let enemies_up = encounter
            .tokens
            .iter()
            .any(|t| t.is_enemy && !t.is_defeated());
        let allies_up = encounter
            .tokens
            .iter()
            .any(|t| !t.is_enemy && !t.is_defeated());
        let victor = match (allies_up, enemies_up) {
            (true, false) => Some("allies".to_string()),
            (false, true) => Some("enemies".to_string()),
            _ => None,
        };

        encounter.status = EncounterStatus::Completed;
        self.encounters.save(&encounter).await?;
        self.active
            .write()
            .await
            .remove(&session.scoped_key(encounter_id));

        self.audit
            .append(
                "combat.end_encounter",
                None,
                Some(&encounter_id.to_string()),
                json!({
                    "writtenBack": characters_written_back,
                    "adHocSkipped": ad_hoc_skipped,
                    "victor": victor,
                }),
            )
            .await?;
        self.publish_background(DomainEvent::EncounterEnded {
            encounter_id,
            characters_written_back: characters_written_back.clone(),
        });

        info!(
            encounter = %encounter_id,
            written_back = characters_written_back.len(),
            "Encounter ended"
        );
        Ok(EndEncounterResult {
            encounter_id,
            status: EncounterStatus::Completed,
            victor,
            characters_written_back,
            ad_hoc_skipped,
        })
    }
}

fn token_id_for(spec: &ParticipantSpec) -> String {
    spec.id.clone().unwrap_or_else(|| {
        spec.name
            .trim()
            .to_lowercase()
            .replace(char::is_whitespace, "-")
    })
}

/// Damage strings accept a flat integer or a dice formula.
fn roll_damage(
    damage: &str,
    roller: &mut dyn questwright_domain::value_objects::DieRoller,
) -> Result<(i32, Option<Vec<i32>>), ToolError> {
    if let Ok(flat) = damage.trim().parse::<i32>() {
        if flat < 0 {
            return Err(ToolError::validation("damage cannot be negative"));
        }
        return Ok((flat, None));
    }
    let formula = DiceFormula::parse(damage).map_err(questwright_domain::DomainError::from)?;
    let rolled = formula.roll(roller);
    Ok((rolled.total.max(0), Some(rolled.individual_rolls)))
}
