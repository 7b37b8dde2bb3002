//! Rest tools.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::rest::{TakeLongRestRequest, TakeShortRestRequest};
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::services::RestService;

pub fn register(registry: &mut ToolRegistry, rest: Arc<RestService>) -> Result<(), ToolError> {
    let svc = rest.clone();
    registry.register(ToolDefinition::new(
        "take_long_rest",
        "A full night's rest: hit points return to maximum.",
        schema::object(&[("characterId", schema::string("Character id"))], &["characterId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: TakeLongRestRequest = parse_args(args)?;
                let result = svc.long_rest(request.character_id).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "Fully rested: {} hp restored ({}/{}).",
                        result.hp_restored, result.hp, result.max_hp
                    ),
                    &result,
                ))
            })
        },
    ))?;

    let svc = rest;
    registry.register(ToolDefinition::new(
        "take_short_rest",
        "Spend hit dice over a breather; each die heals max(1, roll + CON modifier).",
        schema::object(
            &[
                ("characterId", schema::string("Character id")),
                ("hitDice", schema::integer("Hit dice to spend; negatives clamp to zero")),
            ],
            &["characterId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: TakeShortRestRequest = parse_args(args)?;
                let result = svc
                    .short_rest(request.character_id, request.dice_to_spend())
                    .await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "{} d{} spent, {} hp restored ({}/{}).",
                        result.dice_spent, result.die_size, result.hp_restored, result.hp, result.max_hp
                    ),
                    &result,
                ))
            })
        },
    ))?;

    Ok(())
}
