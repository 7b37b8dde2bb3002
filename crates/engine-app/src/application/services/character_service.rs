//! Character CRUD and the inventory operations (grant, equip, transfer).

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::info;

use questwright_domain::entities::{Character, InventoryEntry, Item};
use questwright_domain::{CharacterId, ItemId};
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, ItemRepositoryPort,
};
use questwright_protocol::requests::character::{CreateCharacterRequest, UpdateCharacterRequest};

use crate::application::error::ToolError;

/// Inventory entries hydrated with their items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryView {
    pub character_id: CharacterId,
    pub entries: Vec<InventoryLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLine {
    pub entry: InventoryEntry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
}

pub struct CharacterService {
    characters: Arc<dyn CharacterRepositoryPort>,
    items: Arc<dyn ItemRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    clock: Arc<dyn ClockPort>,
}

impl CharacterService {
    pub fn new(
        characters: Arc<dyn CharacterRepositoryPort>,
        items: Arc<dyn ItemRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            characters,
            items,
            audit,
            clock,
        }
    }

    pub async fn create(&self, request: CreateCharacterRequest) -> Result<Character, ToolError> {
        request.validate()?;
        let mut character = Character::new(
            request.name,
            request.stats,
            request.max_hp,
            request.ac,
            request.level,
            request.character_type,
            self.clock.now(),
        )?;
        character.class_name = request.class_name;
        character.faction_id = request.faction_id;
        character.behavior = request.behavior;
        self.characters.create(&character).await?;

        self.audit
            .append(
                "character.create",
                None,
                Some(&character.id.to_string()),
                json!({"name": character.name, "type": character.character_type}),
            )
            .await?;
        info!(character = %character.id, name = %character.name, "Character created");
        Ok(character)
    }

    pub async fn get(&self, id: CharacterId) -> Result<Character, ToolError> {
        self.characters
            .find_by_id(id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Character",
                id: id.to_string(),
            })
    }

    pub async fn update(&self, request: UpdateCharacterRequest) -> Result<Character, ToolError> {
        request.validate()?;
        let mut character = self.get(request.character_id).await?;
        if let Some(name) = request.name {
            character.name = name;
        }
        if let Some(stats) = request.stats {
            character.stats = stats;
        }
        if let Some(max_hp) = request.max_hp {
            character.max_hp = max_hp;
        }
        if let Some(hp) = request.hp {
            character.set_hp_clamped(hp);
        }
        if let Some(ac) = request.ac {
            character.ac = ac;
        }
        if let Some(level) = request.level {
            character.level = level;
        }
        if let Some(faction_id) = request.faction_id {
            character.faction_id = Some(faction_id);
        }
        if let Some(behavior) = request.behavior {
            character.behavior = Some(behavior);
        }
        // Shrinking max_hp re-clamps current hp
        character.set_hp_clamped(character.hp);
        character.updated_at = self.clock.now();
        self.characters.update(&character).await?;

        self.audit
            .append(
                "character.update",
                None,
                Some(&character.id.to_string()),
                json!({"hp": character.hp, "maxHp": character.max_hp}),
            )
            .await?;
        Ok(character)
    }

    pub async fn create_item(&self, item: &Item) -> Result<(), ToolError> {
        self.items.create(item).await?;
        self.audit
            .append(
                "item.create",
                None,
                Some(&item.id.to_string()),
                json!({"name": item.name, "type": item.item_type}),
            )
            .await?;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Character>, ToolError> {
        Ok(self.characters.list().await?)
    }

    /// Deleting a character cascades its inventory rows and quest log.
    pub async fn delete(&self, id: CharacterId) -> Result<(), ToolError> {
        let character = self.get(id).await?;
        self.characters.delete(id).await?;
        self.audit
            .append(
                "character.delete",
                None,
                Some(&id.to_string()),
                json!({"name": character.name}),
            )
            .await?;
        Ok(())
    }

    pub async fn get_item(&self, item_id: ItemId) -> Result<Item, ToolError> {
        self.items
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Item",
                id: item_id.to_string(),
            })
    }

    pub async fn list_items(&self) -> Result<Vec<Item>, ToolError> {
        Ok(self.items.list().await?)
    }

    pub async fn give_item(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), ToolError> {
        self.get(character_id).await?;
        if self.items.find_by_id(item_id).await?.is_none() {
            return Err(ToolError::NotFound {
                entity_type: "Item",
                id: item_id.to_string(),
            });
        }
        self.items.grant(character_id, item_id, quantity).await?;
        self.audit
            .append(
                "inventory.grant",
                None,
                Some(&character_id.to_string()),
                json!({"itemId": item_id, "quantity": quantity}),
            )
            .await?;
        Ok(())
    }

    pub async fn equip(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        slot: String,
    ) -> Result<(), ToolError> {
        self.items
            .set_equipped(character_id, item_id, true, Some(slot.clone()))
            .await?;
        self.audit
            .append(
                "inventory.equip",
                None,
                Some(&character_id.to_string()),
                json!({"itemId": item_id, "slot": slot}),
            )
            .await?;
        Ok(())
    }

    pub async fn unequip(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
    ) -> Result<(), ToolError> {
        self.items
            .set_equipped(character_id, item_id, false, None)
            .await?;
        self.audit
            .append(
                "inventory.unequip",
                None,
                Some(&character_id.to_string()),
                json!({"itemId": item_id}),
            )
            .await?;
        Ok(())
    }

    /// Atomic transfer between characters. Equip locks and quantity checks
    /// are enforced by the repository transaction.
    pub async fn transfer(
        &self,
        from: CharacterId,
        to: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), ToolError> {
        if from == to {
            return Err(ToolError::validation(
                "source and destination characters are the same",
            ));
        }
        self.get(to).await?;
        self.items.transfer(from, to, item_id, quantity).await?;
        self.audit
            .append(
                "inventory.transfer",
                Some(&from.to_string()),
                Some(&to.to_string()),
                json!({"itemId": item_id, "quantity": quantity}),
            )
            .await?;
        Ok(())
    }

    pub async fn inventory(&self, character_id: CharacterId) -> Result<InventoryView, ToolError> {
        self.get(character_id).await?;
        let mut entries = Vec::new();
        for entry in self.items.inventory_of(character_id).await? {
            let item = self.items.find_by_id(entry.item_id).await?;
            entries.push(InventoryLine { entry, item });
        }
        Ok(InventoryView {
            character_id,
            entries,
        })
    }

    pub async fn holders_of(&self, item_id: ItemId) -> Result<Vec<CharacterId>, ToolError> {
        Ok(self.items.holders_of(item_id).await?)
    }
}
