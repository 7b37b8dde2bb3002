//! Items and inventory entries.
//!
//! Items are world-unique by identity; possession is a row keyed by
//! `(character_id, item_id)`, so the inventory layer can answer "who holds
//! item X" directly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::ids::{CharacterId, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Armor,
    Consumable,
    Quest,
    Misc,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Consumable => "consumable",
            Self::Quest => "quest",
            Self::Misc => "misc",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weapon" => Ok(Self::Weapon),
            "armor" => Ok(Self::Armor),
            "consumable" => Ok(Self::Consumable),
            "quest" => Ok(Self::Quest),
            "misc" => Ok(Self::Misc),
            other => Err(DomainError::parse(format!("Unknown item type: {other}"))),
        }
    }
}

/// An object that can be possessed, stolen, or granted as a quest reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub weight: f64,
    pub value: i64,
    /// Item-specific properties, passed through opaquely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
}

impl Item {
    pub fn new(
        name: impl Into<String>,
        item_type: ItemType,
        weight: f64,
        value: i64,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("Item name cannot be empty"));
        }
        if weight < 0.0 {
            return Err(DomainError::validation("Item weight cannot be negative"));
        }
        if value < 0 {
            return Err(DomainError::validation("Item value cannot be negative"));
        }
        Ok(Self {
            id: ItemId::new(),
            name,
            item_type,
            weight,
            value,
            properties: None,
        })
    }
}

/// Possession row for the `(character, item)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub character_id: CharacterId,
    pub item_id: ItemId,
    pub quantity: u32,
    pub equipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
}

impl InventoryEntry {
    pub fn new(character_id: CharacterId, item_id: ItemId, quantity: u32) -> Self {
        Self {
            character_id,
            item_id,
            quantity: quantity.max(1),
            equipped: false,
            slot: None,
        }
    }

    /// Check the equip invariant: an equipped entry must name its slot.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.quantity == 0 {
            return Err(DomainError::validation("Inventory quantity must be >= 1"));
        }
        if self.equipped && self.slot.is_none() {
            return Err(DomainError::invariant(
                "An equipped item must occupy a named slot",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_bounds() {
        assert!(Item::new("Sword", ItemType::Weapon, 3.0, 15).is_ok());
        assert!(Item::new("", ItemType::Weapon, 3.0, 15).is_err());
        assert!(Item::new("Sword", ItemType::Weapon, -1.0, 15).is_err());
        assert!(Item::new("Sword", ItemType::Weapon, 3.0, -5).is_err());
    }

    #[test]
    fn test_equipped_requires_slot() {
        let mut entry = InventoryEntry::new(CharacterId::new(), ItemId::new(), 1);
        assert!(entry.validate().is_ok());
        entry.equipped = true;
        assert!(entry.validate().is_err());
        entry.slot = Some("main_hand".into());
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_item_type_round_trip() {
        for t in [
            ItemType::Weapon,
            ItemType::Armor,
            ItemType::Consumable,
            ItemType::Quest,
            ItemType::Misc,
        ] {
            assert_eq!(t.to_string().parse::<ItemType>().unwrap(), t);
        }
    }
}
