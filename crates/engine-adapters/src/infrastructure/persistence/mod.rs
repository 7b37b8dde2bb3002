//! SQLite persistence adapters.
//!
//! Repositories are the only sanctioned writers. Rows parse back through the
//! entity schemas on read, and multi-row mutations run inside transactions.

mod audit_repository;
mod character_repository;
mod connection;
pub(crate) mod converters;
mod effect_repository;
mod encounter_repository;
mod item_repository;
mod quest_repository;
mod theft_repository;
mod world_repository;

pub use audit_repository::SqliteAuditLog;
pub use character_repository::SqliteCharacterRepository;
pub use connection::{connect, run_migrations};
pub use effect_repository::SqliteEffectRepository;
pub use encounter_repository::SqliteEncounterRepository;
pub use item_repository::SqliteItemRepository;
pub use quest_repository::SqliteQuestRepository;
pub use theft_repository::SqliteTheftRepository;
pub use world_repository::SqliteWorldRepository;
