//! Character and inventory requests.

use serde::{Deserialize, Serialize};

use questwright_domain::entities::CharacterType;
use questwright_domain::value_objects::StatBlock;
use questwright_domain::{CharacterId, DomainError, ItemId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCharacterRequest {
    pub name: String,
    #[serde(default)]
    pub stats: StatBlock,
    pub max_hp: i32,
    #[serde(default = "default_ac")]
    pub ac: i32,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub character_type: CharacterType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
}

fn default_ac() -> i32 {
    10
}

fn default_level() -> u8 {
    1
}

impl CreateCharacterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.max_hp <= 0 {
            return Err(DomainError::validation("maxHp must be positive"));
        }
        if self.level == 0 {
            return Err(DomainError::validation("level must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRef {
    pub character_id: CharacterId,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    pub character_id: CharacterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hp: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ac: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<String>,
}

impl UpdateCharacterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if matches!(self.max_hp, Some(hp) if hp <= 0) {
            return Err(DomainError::validation("maxHp must be positive"));
        }
        if matches!(self.level, Some(0)) {
            return Err(DomainError::validation("level must be at least 1"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    pub item_type: questwright_domain::entities::ItemType,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if self.weight < 0.0 {
            return Err(DomainError::validation("weight cannot be negative"));
        }
        if self.value < 0 {
            return Err(DomainError::validation("value cannot be negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub item_id: ItemId,
}

/// Consolidated character surface: CRUD plus the inventory operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CharacterManageRequest {
    Create(CreateCharacterRequest),
    Get(CharacterRef),
    Update(UpdateCharacterRequest),
    Delete(CharacterRef),
    GiveItem {
        #[serde(rename = "characterId")]
        character_id: CharacterId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    EquipItem {
        #[serde(rename = "characterId")]
        character_id: CharacterId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
        slot: String,
    },
    UnequipItem {
        #[serde(rename = "characterId")]
        character_id: CharacterId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
    },
    TransferItem {
        #[serde(rename = "fromCharacterId")]
        from_character_id: CharacterId,
        #[serde(rename = "toCharacterId")]
        to_character_id: CharacterId,
        #[serde(rename = "itemId")]
        item_id: ItemId,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    GetInventory(CharacterRef),
}

fn default_quantity() -> u32 {
    1
}

impl CharacterManageRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            Self::Create(request) => request.validate(),
            Self::Update(request) => request.validate(),
            Self::GiveItem { quantity, .. } | Self::TransferItem { quantity, .. } => {
                if *quantity == 0 {
                    return Err(DomainError::validation("quantity must be at least 1"));
                }
                Ok(())
            }
            Self::EquipItem { slot, .. } => {
                if slot.trim().is_empty() {
                    return Err(DomainError::validation("slot cannot be empty"));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manage_action_tag() {
        let request: CharacterManageRequest = serde_json::from_value(json!({
            "action": "equip_item",
            "characterId": CharacterId::new(),
            "itemId": ItemId::new(),
            "slot": "main_hand"
        }))
        .unwrap();
        assert!(matches!(request, CharacterManageRequest::EquipItem { .. }));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_defaults() {
        let request: CreateCharacterRequest =
            serde_json::from_value(json!({"name": "Wren", "maxHp": 12})).unwrap();
        assert_eq!(request.ac, 10);
        assert_eq!(request.level, 1);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_transfer_quantity_bound() {
        let request: CharacterManageRequest = serde_json::from_value(json!({
            "action": "transfer_item",
            "fromCharacterId": CharacterId::new(),
            "toCharacterId": CharacterId::new(),
            "itemId": ItemId::new(),
            "quantity": 0
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
