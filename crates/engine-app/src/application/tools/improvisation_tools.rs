//! The consolidated improvisation tool.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::improvisation::ImprovisationManageRequest;
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::router::{ActionRouter, ActionSpec};
use crate::application::services::{ImprovisationService, StuntOutcome, SynthesisOutcome};

fn router() -> ActionRouter {
    ActionRouter::new(
        "improvisation_manage",
        vec![
            ActionSpec::new("stunt", &["rule_of_cool", "improvise"], "Resolve a skill-check stunt"),
            ActionSpec::new("apply_effect", &["add_effect", "effect"], "Apply a custom effect"),
            ActionSpec::new("get_effects", &["list_effects", "effects"], "Query effects on a target"),
            ActionSpec::new("remove_effect", &["clear_effect"], "Remove an effect"),
            ActionSpec::new("process_triggers", &["triggers"], "Effects triggered by an event"),
            ActionSpec::new("advance_durations", &["tick", "tick_durations"], "Tick round-based durations"),
            ActionSpec::new("synthesize", &["synthesise", "create_spell"], "Attempt arcane synthesis"),
            ActionSpec::new("get_spellbook", &["spellbook"], "A character's synthesized spells"),
        ],
    )
}

pub fn register(
    registry: &mut ToolRegistry,
    improvisation: Arc<ImprovisationService>,
) -> Result<(), ToolError> {
    let action_router = Arc::new(router());
    let actions = action_router.action_names();

    registry.register(ToolDefinition::new(
        "improvisation_manage",
        "Rule-of-cool engine: stunt, apply_effect, get_effects, remove_effect, process_triggers, advance_durations, synthesize, get_spellbook.",
        schema::object(
            &[
                ("action", schema::string_enum("Operation to perform", &actions)),
                ("actorId", schema::string("Acting character id (stunt)")),
                ("skill", schema::string("Skill used for the stunt")),
                ("dc", schema::integer_bounded("Stunt difficulty", 5, 35)),
                ("advantage", schema::boolean("Roll twice keep best")),
                ("disadvantage", schema::boolean("Roll twice keep worst")),
                ("successDamage", schema::string("Damage formula on success")),
                ("failureDamage", schema::string("Self-damage formula on critical failure")),
                ("targets", schema::array("Stunt targets with optional saving throws", schema::any_object("target"))),
                ("targetId", schema::string("Effect target id")),
                ("name", schema::string("Effect name")),
                ("category", schema::string_enum("Effect category", &["boon", "curse", "neutral", "transformative"])),
                ("powerLevel", schema::integer_bounded("Effect power", 1, 5)),
                ("duration", schema::any_object("{type, value} duration")),
                ("triggers", schema::array("Trigger list", schema::any_object("{event, condition}"))),
                ("effectId", schema::string("Effect id (remove)")),
                ("event", schema::string("Event name (process_triggers)")),
                ("rounds", schema::integer("Rounds to tick, default 1")),
                ("casterId", schema::string("Caster character id (synthesize)")),
                ("level", schema::integer_bounded("Spell level", 1, 9)),
                ("school", schema::string("School of magic")),
                ("effectType", schema::string("What the spell does")),
                ("effectDice", schema::string("Spell effect dice, e.g. 3d6")),
                ("characterId", schema::string("Character id (get_spellbook)")),
                ("seed", schema::string("Pin the dice stream for reproducibility")),
            ],
            &["action"],
        ),
        move |args, _session| {
            let action_router = action_router.clone();
            let svc = improvisation.clone();
            Box::pin(async move {
                let normalized = action_router.normalize(args)?;
                let request: ImprovisationManageRequest = parse_args(normalized)?;
                request.validate()?;
                match request {
                    ImprovisationManageRequest::Stunt(stunt) => {
                        let result = svc.stunt(stunt).await?;
                        let narrative = match result.outcome {
                            StuntOutcome::CriticalSuccess => format!(
                                "Spectacular! {} vs DC {} is a critical success.",
                                result.total, result.dc
                            ),
                            StuntOutcome::Success => {
                                format!("{} vs DC {}: the stunt works.", result.total, result.dc)
                            }
                            StuntOutcome::Failure => {
                                format!("{} vs DC {}: the stunt fails.", result.total, result.dc)
                            }
                            StuntOutcome::CriticalFailure => format!(
                                "Disaster. {} vs DC {} is a critical failure.",
                                result.total, result.dc
                            ),
                        };
                        Ok(ToolResponse::with_state(narrative, &result))
                    }
                    ImprovisationManageRequest::ApplyEffect(apply) => {
                        let effect = svc.apply_effect(apply).await?;
                        Ok(ToolResponse::with_state(
                            format!("Effect '{}' now active on {}.", effect.name, effect.target_id),
                            &effect,
                        ))
                    }
                    ImprovisationManageRequest::GetEffects(get) => {
                        let effects = svc.get_effects(get).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} effect(s).", effects.len()),
                            &effects,
                        ))
                    }
                    ImprovisationManageRequest::RemoveEffect(remove) => {
                        let effect = svc.remove_effect(remove).await?;
                        Ok(ToolResponse::with_state(
                            format!("Effect '{}' removed.", effect.name),
                            &effect,
                        ))
                    }
                    ImprovisationManageRequest::ProcessTriggers(process) => {
                        let triggered = svc
                            .process_triggers(&process.target_id, &process.event)
                            .await?;
                        Ok(ToolResponse::with_state(
                            format!("{} effect(s) trigger on '{}'.", triggered.len(), process.event),
                            &triggered,
                        ))
                    }
                    ImprovisationManageRequest::AdvanceDurations(advance) => {
                        let result = svc.advance_durations(advance).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "{} effect(s) ticked, {} expired.",
                                result.advanced.len(),
                                result.expired.len()
                            ),
                            &result,
                        ))
                    }
                    ImprovisationManageRequest::Synthesize(synthesize) => {
                        let result = svc.synthesize(synthesize).await?;
                        let narrative = match result.outcome {
                            SynthesisOutcome::Mastery => format!(
                                "Mastery! '{}' is permanently inscribed in the caster's spellbook.",
                                result.spell_name
                            ),
                            SynthesisOutcome::Success => {
                                format!("'{}' takes shape and resolves.", result.spell_name)
                            }
                            SynthesisOutcome::Fizzle => {
                                "The weave slips; the spell fizzles out.".to_string()
                            }
                            SynthesisOutcome::Backfire => format!(
                                "The magic backfires for {} damage.",
                                result.backfire_damage.unwrap_or(0)
                            ),
                            SynthesisOutcome::Catastrophic => format!(
                                "Catastrophe! Wild surge: {}",
                                result.wild_surge.as_deref().unwrap_or("reality shudders")
                            ),
                        };
                        Ok(ToolResponse::with_state(narrative, &result))
                    }
                    ImprovisationManageRequest::GetSpellbook { character_id } => {
                        let spells = svc.spellbook(character_id).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} synthesized spell(s).", spells.len()),
                            &spells,
                        ))
                    }
                }
            })
        },
    ))?;
    Ok(())
}
