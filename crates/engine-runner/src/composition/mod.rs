//! Wires adapters to ports and builds the tool registry.

use std::sync::Arc;

use questwright_engine_adapters::infrastructure::clock::SystemClock;
use questwright_engine_adapters::infrastructure::config::AppConfig;
use questwright_engine_adapters::infrastructure::event_bus::InProcessEventBus;
use questwright_engine_adapters::infrastructure::persistence::{
    connect, SqliteAuditLog, SqliteCharacterRepository, SqliteEffectRepository,
    SqliteEncounterRepository, SqliteItemRepository, SqliteQuestRepository,
    SqliteTheftRepository, SqliteWorldRepository,
};
use questwright_engine_adapters::infrastructure::random_adapter::SeededRandom;
use questwright_engine_adapters::infrastructure::tile_cache::GzipTileCache;
use questwright_engine_adapters::infrastructure::worldgen::SeededWorldGenerator;
use questwright_engine_app::application::services::{
    BatchService, CharacterService, CombatService, ImprovisationService, QuestService,
    RestService, TheftConfig, TheftService, WorldService,
};
use questwright_engine_app::application::tools::{catalog, Services};
use questwright_engine_app::application::ToolRegistry;
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, EffectRepositoryPort,
    EncounterRepositoryPort, EventBusPort, ItemRepositoryPort, QuestRepositoryPort, RandomPort,
    TheftRepositoryPort, TileCachePort, WorldGeneratorPort, WorldRepositoryPort,
};

/// Everything the transport needs to serve tool calls.
pub struct AppState {
    pub registry: ToolRegistry,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = connect(config).await?;

        let characters: Arc<dyn CharacterRepositoryPort> =
            Arc::new(SqliteCharacterRepository::new(pool.clone()));
        let items: Arc<dyn ItemRepositoryPort> = Arc::new(SqliteItemRepository::new(pool.clone()));
        let encounters: Arc<dyn EncounterRepositoryPort> =
            Arc::new(SqliteEncounterRepository::new(pool.clone()));
        let quests: Arc<dyn QuestRepositoryPort> =
            Arc::new(SqliteQuestRepository::new(pool.clone()));
        let thefts: Arc<dyn TheftRepositoryPort> =
            Arc::new(SqliteTheftRepository::new(pool.clone()));
        let effects: Arc<dyn EffectRepositoryPort> =
            Arc::new(SqliteEffectRepository::new(pool.clone()));
        let worlds: Arc<dyn WorldRepositoryPort> =
            Arc::new(SqliteWorldRepository::new(pool.clone()));
        let audit: Arc<dyn AuditLogPort> = Arc::new(SqliteAuditLog::new(pool.clone()));
        let events: Arc<dyn EventBusPort> = Arc::new(InProcessEventBus::new(pool));

        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let rng: Arc<dyn RandomPort> = Arc::new(SeededRandom::new());
        let generator: Arc<dyn WorldGeneratorPort> = Arc::new(SeededWorldGenerator::new());
        let tile_codec: Arc<dyn TileCachePort> = Arc::new(GzipTileCache::new());

        let world_service = Arc::new(WorldService::new(
            worlds,
            generator,
            tile_codec,
            audit.clone(),
            events.clone(),
            clock.clone(),
        ));
        let combat_service = Arc::new(CombatService::new(
            encounters,
            characters.clone(),
            effects.clone(),
            audit.clone(),
            events.clone(),
            rng.clone(),
            clock.clone(),
        ));
        let quest_service = Arc::new(QuestService::new(
            quests,
            characters.clone(),
            items.clone(),
            audit.clone(),
            events.clone(),
        ));
        let theft_service = Arc::new(TheftService::new(
            thefts,
            items.clone(),
            audit.clone(),
            events.clone(),
            rng.clone(),
            clock.clone(),
            TheftConfig::default(),
        ));
        let improvisation_service = Arc::new(ImprovisationService::new(
            effects,
            characters.clone(),
            audit.clone(),
            events.clone(),
            rng.clone(),
            clock.clone(),
        ));
        let character_service = Arc::new(CharacterService::new(
            characters.clone(),
            items,
            audit.clone(),
            clock.clone(),
        ));
        let rest_service = Arc::new(RestService::new(characters, audit.clone(), rng, clock));
        let batch_service = Arc::new(BatchService::new(
            character_service.clone(),
            combat_service.clone(),
            audit.clone(),
        ));

        let services = Services {
            world: world_service,
            combat: combat_service,
            quests: quest_service,
            theft: theft_service,
            improvisation: improvisation_service,
            characters: character_service,
            rest: rest_service,
            batch: batch_service,
            audit,
            events,
        };

        let mut registry = ToolRegistry::new();
        catalog::register_all(&mut registry, &services)?;
        tracing::info!(tools = registry.list().len(), "Tool registry assembled");
        Ok(Self { registry })
    }
}
