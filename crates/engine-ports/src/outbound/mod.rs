//! Outbound ports: everything the application layer asks the outside world
//! to do.

mod audit_log_port;
mod character_repository_port;
mod clock_port;
mod effect_repository_port;
mod encounter_repository_port;
mod event_bus_port;
mod item_repository_port;
mod quest_repository_port;
mod random_port;
mod repository_error;
mod theft_repository_port;
mod tile_cache_port;
mod world_generator_port;
mod world_repository_port;

pub use audit_log_port::AuditLogPort;
pub use character_repository_port::CharacterRepositoryPort;
pub use clock_port::ClockPort;
pub use effect_repository_port::{EffectQuery, EffectRepositoryPort};
pub use encounter_repository_port::EncounterRepositoryPort;
pub use event_bus_port::{EventBusError, EventBusPort};
pub use item_repository_port::ItemRepositoryPort;
pub use quest_repository_port::QuestRepositoryPort;
pub use random_port::RandomPort;
pub use repository_error::RepositoryError;
pub use theft_repository_port::TheftRepositoryPort;
pub use tile_cache_port::{TileCacheError, TileCachePort};
pub use world_generator_port::{GeneratedWorld, WorldGeneratorPort};
pub use world_repository_port::WorldRepositoryPort;
