//! Domain layer for the QuestWright simulation engine.
//!
//! Pure types and rules: no I/O, no async, no transport concerns. Everything
//! the engine persists or rolls dice over is defined here.

pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod rules;
pub mod value_objects;

pub use error::DomainError;
pub use events::DomainEvent;
pub use ids::{
    CharacterId, EffectId, EncounterId, ItemId, ObjectiveId, PatchId, QuestId, RegionId, RiverId,
    SpellId, StructureId, WorldId,
};
