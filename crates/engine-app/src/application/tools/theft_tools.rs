//! The consolidated theft tool.

use std::sync::Arc;

use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::theft::TheftManageRequest;
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::router::{ActionRouter, ActionSpec};
use crate::application::services::TheftService;

fn router() -> ActionRouter {
    ActionRouter::new(
        "theft_manage",
        vec![
            ActionSpec::new("steal", &["take", "pilfer", "rob"], "Record a theft"),
            ActionSpec::new("check", &["lookup", "is_stolen"], "Check an item's provenance"),
            ActionSpec::new("search", &["frisk", "search_character"], "Search a character for stolen goods"),
            ActionSpec::new("recognize", &["identify", "spot"], "Does an NPC recognise the item as stolen?"),
            ActionSpec::new("sell", &["fence", "sell_item"], "Sell a stolen item to a fence"),
            ActionSpec::new("register_fence", &["add_fence"], "Register an NPC as a fence"),
            ActionSpec::new("report", &["report_theft"], "Report the theft to the guards"),
            ActionSpec::new("decay", &["advance_days", "cool"], "Advance days, cooling heat"),
            ActionSpec::new("get_fence", &["fence_info"], "Fetch one fence"),
            ActionSpec::new("list_fences", &["fences"], "List registered fences"),
        ],
    )
}

pub fn register(registry: &mut ToolRegistry, theft: Arc<TheftService>) -> Result<(), ToolError> {
    let action_router = Arc::new(router());
    let actions = action_router.action_names();

    registry.register(ToolDefinition::new(
        "theft_manage",
        "Stolen-property engine: steal, check, search, recognize, sell, register_fence, report, decay, get_fence, list_fences.",
        schema::object(
            &[
                ("action", schema::string_enum("Operation to perform", &actions)),
                ("thiefId", schema::string("Thief character id (steal)")),
                ("victimId", schema::string("Victim character id (steal)")),
                ("itemId", schema::string("Item id")),
                ("witnesses", schema::array("Witness character ids", schema::string("Character id"))),
                ("characterId", schema::string("Character to search")),
                ("npcId", schema::string("NPC id (recognize, fences)")),
                ("sellerId", schema::string("Seller character id (sell)")),
                ("fenceId", schema::string("Fence NPC id (sell)")),
                ("itemValue", schema::integer("Base value override (sell)")),
                ("buyRate", schema::number("Fence buy rate in 0.1..=1.0")),
                ("maxHeatLevel", schema::string_enum("Hottest goods the fence touches", &["burning", "hot", "warm", "cool", "cold"])),
                ("dailyHeatCapacity", schema::integer("Fence daily heat budget")),
                ("bountyOffered", schema::integer("Bounty added when reporting")),
                ("daysAdvanced", schema::integer("Days to advance (decay)")),
            ],
            &["action"],
        ),
        move |args, _session| {
            let action_router = action_router.clone();
            let svc = theft.clone();
            Box::pin(async move {
                let normalized = action_router.normalize(args)?;
                let request: TheftManageRequest = parse_args(normalized)?;
                request.validate()?;
                match request {
                    TheftManageRequest::Steal(steal) => {
                        let record = svc.steal(steal).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "Theft recorded: the goods are {} hot, {} witness(es).",
                                record.heat_level,
                                record.witnesses.len()
                            ),
                            &record,
                        ))
                    }
                    TheftManageRequest::Check(item) => {
                        let record = svc.check(item.item_id).await?;
                        let narrative = match &record {
                            Some(record) => format!("Stolen goods: heat {}.", record.heat_level),
                            None => "No theft record for this item.".to_string(),
                        };
                        Ok(ToolResponse::with_state(narrative, &record))
                    }
                    TheftManageRequest::Search(search) => {
                        let result = svc.search_character(search.character_id).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "{} stolen item(s) found; detection risk {}.",
                                result.stolen_items.len(),
                                result.detection_risk
                            ),
                            &result,
                        ))
                    }
                    TheftManageRequest::Recognize(recognize) => {
                        let result = svc
                            .recognize(recognize.npc_id, recognize.item_id, recognize.seed.as_deref())
                            .await?;
                        let narrative = if result.recognized {
                            format!(
                                "The NPC recognises the item ({}).",
                                result.reaction.as_deref().unwrap_or("wary")
                            )
                        } else {
                            "The NPC doesn't give the item a second glance.".to_string()
                        };
                        Ok(ToolResponse::with_state(narrative, &result))
                    }
                    TheftManageRequest::Sell(sell) => {
                        let result = svc
                            .sell(sell.seller_id, sell.fence_id, sell.item_id, sell.item_value)
                            .await?;
                        Ok(ToolResponse::with_state(
                            format!("The fence pays {} gold.", result.price),
                            &result,
                        ))
                    }
                    TheftManageRequest::RegisterFence(register) => {
                        let fence = svc.register_fence(register).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "Fence registered at {:.0}% buy rate.",
                                fence.buy_rate * 100.0
                            ),
                            &fence,
                        ))
                    }
                    TheftManageRequest::Report(report) => {
                        let record = svc.report(report.item_id, report.bounty_offered).await?;
                        Ok(ToolResponse::with_state(
                            format!("Theft reported; bounty now {} gold.", record.bounty),
                            &record,
                        ))
                    }
                    TheftManageRequest::Decay(decay) => {
                        let cooled = svc.decay(decay.days_advanced).await?;
                        Ok(ToolResponse::with_state(
                            format!(
                                "{} day(s) pass; {} record(s) cooled.",
                                decay.days_advanced, cooled
                            ),
                            &serde_json::json!({
                                "daysAdvanced": decay.days_advanced,
                                "recordsCooled": cooled,
                            }),
                        ))
                    }
                    TheftManageRequest::GetFence(fence_ref) => {
                        let fence = svc.get_fence(fence_ref.npc_id).await?;
                        let narrative = match &fence {
                            Some(_) => "Fence found.".to_string(),
                            None => "No fence registered under that NPC.".to_string(),
                        };
                        Ok(ToolResponse::with_state(narrative, &fence))
                    }
                    TheftManageRequest::ListFences {} => {
                        let fences = svc.list_fences().await?;
                        Ok(ToolResponse::with_state(
                            format!("{} fence(s) registered.", fences.len()),
                            &fences,
                        ))
                    }
                }
            })
        },
    ))?;
    Ok(())
}
