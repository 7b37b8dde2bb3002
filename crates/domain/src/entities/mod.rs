//! Persistent entity types.

mod audit;
mod character;
mod effect;
mod encounter;
mod item;
mod quest;
mod theft;
mod world;

pub use audit::{AuditEntry, EventEntry};
pub use character::{Character, CharacterType};
pub use effect::{CustomEffect, EffectCategory, EffectTrigger, SynthesizedSpell};
pub use encounter::{CombatToken, Encounter, EncounterStatus, Terrain};
pub use item::{InventoryEntry, Item, ItemType};
pub use quest::{Objective, Quest, QuestLog, QuestRewards, QuestStatus};
pub use theft::{Fence, TheftRecord};
pub use world::{
    MapPatch, PatchOp, Region, River, Structure, Tile, TileGrid, World, MAX_WORLD_DIMENSION,
    MIN_WORLD_DIMENSION,
};
