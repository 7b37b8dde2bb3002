//! Character tools: standalone CRUD plus the consolidated manage surface.

use std::sync::Arc;

use questwright_domain::entities::Item;
use questwright_protocol::envelope::ToolResponse;
use questwright_protocol::requests::character::{
    CharacterManageRequest, CharacterRef, CreateCharacterRequest, CreateItemRequest, ItemRef,
    UpdateCharacterRequest,
};
use questwright_protocol::schema;

use crate::application::error::ToolError;
use crate::application::registry::{parse_args, ToolDefinition, ToolRegistry};
use crate::application::router::{ActionRouter, ActionSpec};
use crate::application::services::CharacterService;

fn router() -> ActionRouter {
    ActionRouter::new(
        "character_manage",
        vec![
            ActionSpec::new("create", &["new", "add"], "Create a character"),
            ActionSpec::new("get", &["fetch", "info"], "Fetch a character"),
            ActionSpec::new("update", &["edit", "modify"], "Update character fields"),
            ActionSpec::new("delete", &["remove"], "Delete a character and their belongings"),
            ActionSpec::new("give_item", &["grant_item", "give"], "Put an item in an inventory"),
            ActionSpec::new("equip_item", &["equip"], "Equip an item into a slot"),
            ActionSpec::new("unequip_item", &["unequip"], "Unequip an item"),
            ActionSpec::new("transfer_item", &["transfer", "trade"], "Move items between characters"),
            ActionSpec::new("get_inventory", &["inventory"], "List a character's inventory"),
        ],
    )
}

pub fn register(
    registry: &mut ToolRegistry,
    characters: Arc<CharacterService>,
) -> Result<(), ToolError> {
    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "create_character",
        "Create a character with stats, hit points and a role.",
        schema::object(
            &[
                ("name", schema::string("Character name")),
                ("stats", schema::any_object("{str, dex, con, int, wis, cha}")),
                ("maxHp", schema::integer("Maximum hit points")),
                ("ac", schema::integer("Armor class, default 10")),
                ("level", schema::integer_bounded("Level", 1, 20)),
                ("className", schema::string("Class, sizes the hit die")),
                ("characterType", schema::string_enum("Role", &["pc", "npc", "enemy", "ally"])),
                ("factionId", schema::string("Faction tag")),
                ("behavior", schema::string("Behaviour notes")),
            ],
            &["name", "maxHp"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CreateCharacterRequest = parse_args(args)?;
                let character = svc.create(request).await?;
                Ok(ToolResponse::with_state(
                    format!("{} joins the world.", character.name),
                    &character,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "get_character",
        "Fetch a character's full record.",
        schema::object(&[("characterId", schema::string("Character id"))], &["characterId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CharacterRef = parse_args(args)?;
                let character = svc.get(request.character_id).await?;
                Ok(ToolResponse::with_state(
                    format!(
                        "{}: {}/{} hp, AC {}.",
                        character.name, character.hp, character.max_hp, character.ac
                    ),
                    &character,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "update_character",
        "Update character fields; absent fields stay untouched, hp clamps to maxHp.",
        schema::object(
            &[
                ("characterId", schema::string("Character id")),
                ("name", schema::string("New name")),
                ("stats", schema::any_object("Replacement stat block")),
                ("hp", schema::integer("Current hit points")),
                ("maxHp", schema::integer("Maximum hit points")),
                ("ac", schema::integer("Armor class")),
                ("level", schema::integer_bounded("Level", 1, 20)),
                ("factionId", schema::string("Faction tag")),
                ("behavior", schema::string("Behaviour notes")),
            ],
            &["characterId"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: UpdateCharacterRequest = parse_args(args)?;
                let character = svc.update(request).await?;
                Ok(ToolResponse::with_state(
                    format!("{} updated.", character.name),
                    &character,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "list_characters",
        "List every character in the world.",
        schema::object(&[], &[]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let _: serde_json::Value = args;
                let characters = svc.list().await?;
                Ok(ToolResponse::with_state(
                    format!("{} character(s).", characters.len()),
                    &characters,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "create_item",
        "Create an item; items are world-unique by identity.",
        schema::object(
            &[
                ("name", schema::string("Item name")),
                ("itemType", schema::string_enum("Kind", &["weapon", "armor", "consumable", "quest", "misc"])),
                ("weight", schema::number("Weight, default 0")),
                ("value", schema::integer("Base value in gold, default 0")),
                ("properties", schema::any_object("Free-form properties, passed through opaquely")),
            ],
            &["name", "itemType"],
        ),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: CreateItemRequest = parse_args(args)?;
                request.validate()?;
                let mut item =
                    Item::new(request.name, request.item_type, request.weight, request.value)?;
                item.properties = request.properties;
                svc.create_item(&item).await?;
                Ok(ToolResponse::with_state(
                    format!("Item '{}' created.", item.name),
                    &item,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "get_item",
        "Fetch an item's record.",
        schema::object(&[("itemId", schema::string("Item id"))], &["itemId"]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let request: ItemRef = parse_args(args)?;
                let item = svc.get_item(request.item_id).await?;
                Ok(ToolResponse::with_state(
                    format!("Item '{}'.", item.name),
                    &item,
                ))
            })
        },
    ))?;

    let svc = characters.clone();
    registry.register(ToolDefinition::new(
        "list_items",
        "List every item in the world.",
        schema::object(&[], &[]),
        move |args, _session| {
            let svc = svc.clone();
            Box::pin(async move {
                let _: serde_json::Value = args;
                let items = svc.list_items().await?;
                Ok(ToolResponse::with_state(
                    format!("{} item(s).", items.len()),
                    &items,
                ))
            })
        },
    ))?;

    let action_router = Arc::new(router());
    let actions = action_router.action_names();
    let svc = characters;
    registry.register(ToolDefinition::new(
        "character_manage",
        "Consolidated character surface: create, get, update, delete, give_item, equip_item, unequip_item, transfer_item, get_inventory.",
        schema::object(
            &[
                ("action", schema::string_enum("Operation to perform", &actions)),
                ("characterId", schema::string("Character id")),
                ("name", schema::string("Character name (create/update)")),
                ("maxHp", schema::integer("Maximum hit points (create/update)")),
                ("itemId", schema::string("Item id (inventory actions)")),
                ("quantity", schema::integer("Stack size, default 1")),
                ("slot", schema::string("Equipment slot (equip_item)")),
                ("fromCharacterId", schema::string("Source character (transfer_item)")),
                ("toCharacterId", schema::string("Destination character (transfer_item)")),
            ],
            &["action"],
        ),
        move |args, _session| {
            let action_router = action_router.clone();
            let svc = svc.clone();
            Box::pin(async move {
                let normalized = action_router.normalize(args)?;
                let request: CharacterManageRequest = parse_args(normalized)?;
                request.validate()?;
                match request {
                    CharacterManageRequest::Create(create) => {
                        let character = svc.create(create).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} joins the world.", character.name),
                            &character,
                        ))
                    }
                    CharacterManageRequest::Get(get) => {
                        let character = svc.get(get.character_id).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} found.", character.name),
                            &character,
                        ))
                    }
                    CharacterManageRequest::Update(update) => {
                        let character = svc.update(update).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} updated.", character.name),
                            &character,
                        ))
                    }
                    CharacterManageRequest::Delete(delete) => {
                        svc.delete(delete.character_id).await?;
                        Ok(ToolResponse::with_state(
                            "Character deleted.",
                            &serde_json::json!({
                                "characterId": delete.character_id,
                                "deleted": true,
                            }),
                        ))
                    }
                    CharacterManageRequest::GiveItem {
                        character_id,
                        item_id,
                        quantity,
                    } => {
                        svc.give_item(character_id, item_id, quantity).await?;
                        Ok(ToolResponse::with_state(
                            format!("{quantity} item(s) granted."),
                            &serde_json::json!({
                                "characterId": character_id,
                                "itemId": item_id,
                                "quantity": quantity,
                            }),
                        ))
                    }
                    CharacterManageRequest::EquipItem {
                        character_id,
                        item_id,
                        slot,
                    } => {
                        svc.equip(character_id, item_id, slot.clone()).await?;
                        Ok(ToolResponse::with_state(
                            format!("Item equipped in the {slot} slot."),
                            &serde_json::json!({
                                "characterId": character_id,
                                "itemId": item_id,
                                "slot": slot,
                                "equipped": true,
                            }),
                        ))
                    }
                    CharacterManageRequest::UnequipItem {
                        character_id,
                        item_id,
                    } => {
                        svc.unequip(character_id, item_id).await?;
                        Ok(ToolResponse::with_state(
                            "Item unequipped.",
                            &serde_json::json!({
                                "characterId": character_id,
                                "itemId": item_id,
                                "equipped": false,
                            }),
                        ))
                    }
                    CharacterManageRequest::TransferItem {
                        from_character_id,
                        to_character_id,
                        item_id,
                        quantity,
                    } => {
                        svc.transfer(from_character_id, to_character_id, item_id, quantity)
                            .await?;
                        Ok(ToolResponse::with_state(
                            format!("{quantity} item(s) change hands."),
                            &serde_json::json!({
                                "fromCharacterId": from_character_id,
                                "toCharacterId": to_character_id,
                                "itemId": item_id,
                                "quantity": quantity,
                            }),
                        ))
                    }
                    CharacterManageRequest::GetInventory(get) => {
                        let inventory = svc.inventory(get.character_id).await?;
                        Ok(ToolResponse::with_state(
                            format!("{} inventory line(s).", inventory.entries.len()),
                            &inventory,
                        ))
                    }
                }
            })
        },
    ))?;

    Ok(())
}
