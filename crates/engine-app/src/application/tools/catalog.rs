//! Assembles the full tool registry from the services.

use std::sync::Arc;

use questwright_engine_ports::outbound::{AuditLogPort, EventBusPort};

use crate::application::error::ToolError;
use crate::application::registry::ToolRegistry;
use crate::application::services::{
    BatchService, CharacterService, CombatService, ImprovisationService, QuestService,
    RestService, TheftService, WorldService,
};

use super::{
    batch_tools, character_tools, combat_tools, improvisation_tools, log_tools, quest_tools,
    rest_tools, theft_tools, world_tools,
};

/// Everything the catalogue needs to wire the tools.
pub struct Services {
    pub world: Arc<WorldService>,
    pub combat: Arc<CombatService>,
    pub quests: Arc<QuestService>,
    pub theft: Arc<TheftService>,
    pub improvisation: Arc<ImprovisationService>,
    pub characters: Arc<CharacterService>,
    pub rest: Arc<RestService>,
    pub batch: Arc<BatchService>,
    pub audit: Arc<dyn AuditLogPort>,
    pub events: Arc<dyn EventBusPort>,
}

/// Register the complete tool catalogue. Called once at composition time;
/// a duplicate name here is a programming error surfaced to the caller.
pub fn register_all(registry: &mut ToolRegistry, services: &Services) -> Result<(), ToolError> {
    world_tools::register(registry, services.world.clone())?;
    combat_tools::register(registry, services.combat.clone())?;
    quest_tools::register(registry, services.quests.clone())?;
    theft_tools::register(registry, services.theft.clone())?;
    improvisation_tools::register(registry, services.improvisation.clone())?;
    character_tools::register(registry, services.characters.clone())?;
    rest_tools::register(registry, services.rest.clone())?;
    batch_tools::register(registry, services.batch.clone())?;
    log_tools::register(registry, services.audit.clone(), services.events.clone())?;
    Ok(())
}
