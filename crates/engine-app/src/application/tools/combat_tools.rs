//! Combat lifecycle tools.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::combat::{
    CombatAction, CreateEncounterRequest, EncounterRef, ExecuteCombatActionRequest,
};
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::services::CombatService;

pub fn register(
    registry: &mut ToolRegistry,
    combat: Arc<CombatService>,
) -> Result<(), ToolError> {
    let participant_schema = schema::object(
        &[
            ("id", schema::string("Token id; a character id links the token to write-back")),
            ("name", schema::string("Display name")),
            ("hp", schema::integer("Current hit points")),
            ("maxHp", schema::integer("Maximum hit points")),
            ("ac", schema::integer("Armor class, default 10")),
            ("initiativeBonus", schema::integer("Added to the initiative d20")),
            ("isEnemy", schema::boolean("Overrides the name-based enemy heuristic")),
        ],
        &["name", "hp", "maxHp"],
    );

    let svc = combat.clone();
    registry.register(ToolDefinition::new(
        "create_encounter",
        "Start a combat encounter: rolls initiative for every participant and opens round 1.",
        schema::object(
            &[
                ("participants", schema::array("Combat participants", participant_schema)),
                ("seed", schema::string("Seed for the encounter's dice stream")),
                ("terrain", schema::any_object("Battlefield annotations")),
            ],
            &["participants"],
        ),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CreateEncounterRequest = parse_args(args)?;
                let view = svc.create_encounter(request, &session).await?;
                let order: Vec<String> = view
                    .tokens
                    .iter()
                    .map(|t| format!("{} ({})", t.name, t.initiative))
                    .collect();
                Ok(ToolResponse::with_state(
                    format!("Encounter started. Initiative order: {}.", order.join(", ")),
                    &view,
                ))
            })
        },
    ))?;

    let svc = combat.clone();
    registry.register(ToolDefinition::new(
        "get_encounter_state",
        "Read the current round, turn and per-token state of an encounter.",
        schema::object(&[("encounterId", schema::string("Encounter id"))], &["encounterId"]),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: EncounterRef = parse_args(args)?;
                let view = svc.get_state(request.encounter_id, &session).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Round {}, {} to act.",
                        view.round,
                        view.active_token_id.as_deref().unwrap_or("nobody")
                    ),
                    &view,
                ))
            })
        },
    ))?;

    let svc = combat.clone();
    registry.register(ToolDefinition::new(
        "execute_combat_action",
        "Resolve an attack (d20 vs DC, crits double damage) or a heal inside an encounter.",
        schema::object(
            &[
                ("encounterId", schema::string("Encounter id")),
                ("actionType", schema::string_enum("What to do", &["attack", "heal"])),
                ("actorId", schema::string("Acting token id")),
                ("targetId", schema::string("Target token id")),
                ("attackBonus", schema::integer("Added to the attack roll")),
                ("dc", schema::integer("Difficulty the total must meet")),
                ("damage", schema::string("Damage on hit: dice formula or flat amount")),
                ("amount", schema::integer("Hit points restored when healing")),
            ],
            &["encounterId", "actionType", "actorId", "targetId"],
        ),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: ExecuteCombatActionRequest = parse_args(args)?;
                request.validate()?;
                match request.action {
                    CombatAction::Attack {
                        actor_id,
                        target_id,
                        attack_bonus,
                        dc,
                        damage,
                    } => {
                        let result = svc
                            .attack(
                                request.encounter_id,
                                &actor_id,
                                &target_id,
                                attack_bonus,
                                dc,
                                &damage,
                                &session,
                            )
                            .await?;
                        let narrative = if result.fumble {
                            format!("{actor_id} fumbles the attack (natural 1).")
                        } else if result.critical {
                            format!(
                                "{actor_id} crits {target_id} for {} damage!",
                                result.damage_applied
                            )
                        } else if result.hit {
                            format!(
                                "{actor_id} hits {target_id} for {} damage ({} vs DC {}).",
                                result.damage_applied, result.total, result.dc
                            )
                        } else {
                            format!(
                                "{actor_id} misses {target_id} ({} vs DC {}).",
                                result.total, result.dc
                            )
                        };
                        Ok(ToolResponse::with_state(narrative, &result))
                    }
                    CombatAction::Heal {
                        actor_id,
                        target_id,
                        amount,
                    } => {
                        let result = svc
                            .heal(request.encounter_id, &actor_id, &target_id, amount, &session)
                            .await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "{actor_id} restores {} hp to {target_id}.",
                                result.amount_restored
                            ),
                            &result,
                        ))
                    }
                }
            })
        },
    ))?;

    let svc = combat.clone();
    registry.register(ToolDefinition::new(
        "advance_turn",
        "Move to the next living participant, ticking round-based effects; wraps increment the round.",
        schema::object(&[("encounterId", schema::string("Encounter id"))], &["encounterId"]),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: EncounterRef = parse_args(args)?;
                let result = svc.advance_turn(request.encounter_id, &session).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Round {}: {} acts next.",
                        result.round,
                        result.active_token_id.as_deref().unwrap_or("nobody")
                    ),
                    &result,
                ))
            })
        },
    ))?;

    let svc = combat.clone();
    registry.register(ToolDefinition::new(
        "end_encounter",
        "Close the encounter and write every persisted character's final hp back to the store.",
        schema::object(&[("encounterId", schema::string("Encounter id"))], &["encounterId"]),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: EncounterRef = parse_args(args)?;
                let result = svc.end_encounter(request.encounter_id, &session).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Encounter over. {} character(s) written back.",
                        result.characters_written_back.len()
                    ),
                    &result,
                ))
            })
        },
    ))?;

    let svc = combat;
    registry.register(ToolDefinition::new(
        "load_encounter",
        "Reload a saved encounter into this session and resume from its snapshot.",
        schema::object(&[("encounterId", schema::string("Encounter id"))], &["encounterId"]),
        move |args, session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: EncounterRef = parse_args(args)?;
                let view = svc.load_encounter(request.encounter_id, &session).await?;
                Ok(ToolResponse::with_state(
                    format!("Encounter resumed at round {}.", view.round),
                    &view,
                ))
            })
        },
    ))?;

    Ok(())
}
