//! End-to-end scenarios over the full service stack and an in-memory store.

use std::sync::Arc;

use serde_json::json;

use questwright_domain::entities::{CharacterType, EncounterStatus, ItemType};
use questwright_domain::value_objects::{HeatLevel, StatBlock};
use questwright_domain::CharacterId;
use questwright_engine_adapters::infrastructure::clock::SystemClock;
use questwright_engine_adapters::infrastructure::config::AppConfig;
use questwright_engine_adapters::infrastructure::event_bus::InProcessEventBus;
use questwright_engine_adapters::infrastructure::persistence::{
    connect, SqliteAuditLog, SqliteCharacterRepository, SqliteEffectRepository,
    SqliteEncounterRepository, SqliteItemRepository, SqliteQuestRepository,
    SqliteTheftRepository, SqliteWorldRepository,
};
use questwright_engine_adapters::infrastructure::random_adapter::SeededRandom;
use questwright_engine_adapters::infrastructure::testing::{FixedClock, FixedRandom};
use questwright_engine_adapters::infrastructure::tile_cache::GzipTileCache;
use questwright_engine_adapters::infrastructure::worldgen::SeededWorldGenerator;
use questwright_engine_app::application::services::{
    BatchService, CharacterService, CombatService, ImprovisationService, QuestService,
    RestService, SynthesisOutcome, TheftConfig, TheftService, WorldService,
};
use questwright_engine_app::application::tools::{catalog, Services};
use questwright_engine_app::application::{ToolError, ToolRegistry};
use questwright_engine_ports::inbound::SessionContext;
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, EventBusPort, ItemRepositoryPort,
    RandomPort,
};
use questwright_protocol::requests::character::CreateCharacterRequest;
use questwright_protocol::requests::combat::{CreateEncounterRequest, ParticipantSpec};
use questwright_protocol::requests::improvisation::SynthesizeRequest;
use questwright_protocol::requests::quest::{
    CreateQuestRequest, ObjectiveSpec, RewardsSpec,
};
use questwright_protocol::requests::theft::StealRequest;
use questwright_protocol::requests::world::{GenerateWorldRequest, MapPatchRequest};

struct Harness {
    services: Services,
    registry: ToolRegistry,
    characters: Arc<dyn CharacterRepositoryPort>,
    items: Arc<dyn ItemRepositoryPort>,
}

/// Build the full stack over an in-memory store with injectable time and
/// dice.
async fn harness(rng: Arc<dyn RandomPort>, clock: Arc<dyn ClockPort>) -> Harness {
    let pool = connect(&AppConfig::in_memory()).await.unwrap();

    let characters: Arc<dyn CharacterRepositoryPort> =
        Arc::new(SqliteCharacterRepository::new(pool.clone()));
    let items: Arc<dyn ItemRepositoryPort> = Arc::new(SqliteItemRepository::new(pool.clone()));
    let audit: Arc<dyn AuditLogPort> = Arc::new(SqliteAuditLog::new(pool.clone()));
    let events: Arc<dyn EventBusPort> = Arc::new(InProcessEventBus::new(pool.clone()));

    let world = Arc::new(WorldService::new(
        Arc::new(SqliteWorldRepository::new(pool.clone())),
        Arc::new(SeededWorldGenerator::new()),
        Arc::new(GzipTileCache::new()),
        audit.clone(),
        events.clone(),
        clock.clone(),
    ));
    let combat = Arc::new(CombatService::new(
        Arc::new(SqliteEncounterRepository::new(pool.clone())),
        characters.clone(),
        Arc::new(SqliteEffectRepository::new(pool.clone())),
        audit.clone(),
        events.clone(),
        rng.clone(),
        clock.clone(),
    ));
    let quests = Arc::new(QuestService::new(
        Arc::new(SqliteQuestRepository::new(pool.clone())),
        characters.clone(),
        items.clone(),
        audit.clone(),
        events.clone(),
    ));
    let theft = Arc::new(TheftService::new(
        Arc::new(SqliteTheftRepository::new(pool.clone())),
        items.clone(),
        audit.clone(),
        events.clone(),
        rng.clone(),
        clock.clone(),
        TheftConfig::default(),
    ));
    let improvisation = Arc::new(ImprovisationService::new(
        Arc::new(SqliteEffectRepository::new(pool.clone())),
        characters.clone(),
        audit.clone(),
        events.clone(),
        rng.clone(),
        clock.clone(),
    ));
    let character_service = Arc::new(CharacterService::new(
        characters.clone(),
        items.clone(),
        audit.clone(),
        clock.clone(),
    ));
    let rest = Arc::new(RestService::new(
        characters.clone(),
        audit.clone(),
        rng.clone(),
        clock.clone(),
    ));
    let batch = Arc::new(BatchService::new(
        character_service.clone(),
        combat.clone(),
        audit.clone(),
    ));

    let services = Services {
        world,
        combat,
        quests,
        theft,
        improvisation,
        characters: character_service,
        rest,
        batch,
        audit,
        events,
    };
    let mut registry = ToolRegistry::new();
    catalog::register_all(&mut registry, &services).unwrap();

    Harness {
        services,
        registry,
        characters,
        items,
    }
}

async fn fixed_harness(rolls: Vec<i32>) -> Harness {
    harness(
        Arc::new(FixedRandom::new(rolls)),
        Arc::new(FixedClock::at_epoch()),
    )
    .await
}

async fn make_character(harness: &Harness, name: &str, max_hp: i32) -> CharacterId {
    harness
        .services
        .characters
        .create(CreateCharacterRequest {
            name: name.to_string(),
            stats: StatBlock::default(),
            max_hp,
            ac: 12,
            level: 3,
            class_name: None,
            character_type: CharacterType::Pc,
            faction_id: None,
            behavior: None,
        })
        .await
        .unwrap()
        .id
}

fn participant(id: Option<String>, name: &str, hp: i32, bonus: i32) -> ParticipantSpec {
    ParticipantSpec {
        id,
        name: name.to_string(),
        hp,
        max_hp: hp,
        ac: 12,
        initiative_bonus: bonus,
        is_enemy: None,
    }
}

#[tokio::test]
async fn test_combat_with_write_back() {
    // init rolls: hero 15+2=17, goblin 12+1=13; attack rolls 18 (hit) and 10
    let harness = fixed_harness(vec![15, 12, 18, 10]).await;
    let session = SessionContext::default();
    let hero = make_character(&harness, "Hero", 20).await;

    let encounter = harness
        .services
        .combat
        .create_encounter(
            CreateEncounterRequest {
                participants: vec![
                    participant(Some(hero.to_string()), "Hero", 20, 2),
                    participant(Some("goblin".to_string()), "Goblin", 7, 1),
                ],
                seed: Some("battle-1".to_string()),
                terrain: None,
            },
            &session,
        )
        .await
        .unwrap();
    assert_eq!(encounter.tokens[0].id, hero.to_string());
    assert_eq!(encounter.tokens[0].initiative, 17);
    assert!(encounter.tokens[1].is_enemy, "goblin classified by name");

    // Hero hits the goblin for flat 6
    let attack = harness
        .services
        .combat
        .attack(encounter.id, &hero.to_string(), "goblin", 5, 12, "6", &session)
        .await
        .unwrap();
    assert!(attack.hit);
    assert_eq!(attack.damage_applied, 6);
    assert_eq!(attack.target_hp, 1);

    // Goblin swings back: 10 + 3 = 13 vs DC 13 hits for 3
    let counter = harness
        .services
        .combat
        .attack(encounter.id, "goblin", &hero.to_string(), 3, 13, "3", &session)
        .await
        .unwrap();
    assert!(counter.hit);
    assert_eq!(counter.target_hp, 17);

    let ended = harness
        .services
        .combat
        .end_encounter(encounter.id, &session)
        .await
        .unwrap();
    assert_eq!(ended.characters_written_back, vec![hero]);
    assert_eq!(ended.ad_hoc_skipped, vec!["goblin".to_string()]);

    // The canonical HP-desync failure mode: stored hp equals token hp
    let stored = harness.characters.find_by_id(hero).await.unwrap().unwrap();
    assert_eq!(stored.hp, 17);

    // Completing twice is rejected
    let again = harness
        .services
        .combat
        .end_encounter(encounter.id, &session)
        .await;
    assert!(matches!(again, Err(ToolError::Conflict(_))));
}

#[tokio::test]
async fn test_initiative_stable_tie_break_and_turn_skip() {
    // Both roll 10; defeat the second and advance past it
    let harness = fixed_harness(vec![10, 10, 20]).await;
    let session = SessionContext::default();

    let encounter = harness
        .services
        .combat
        .create_encounter(
            CreateEncounterRequest {
                participants: vec![
                    participant(Some("a".into()), "Alys", 10, 0),
                    participant(Some("b".into()), "Bandit", 5, 0),
                ],
                seed: Some("ties".to_string()),
                terrain: None,
            },
            &session,
        )
        .await
        .unwrap();
    // Equal initiative keeps insertion order
    assert_eq!(encounter.tokens[0].id, "a");
    assert_eq!(encounter.tokens[1].id, "b");

    // Nat 20 crit: 6 doubled to 12 flattens the bandit
    let attack = harness
        .services
        .combat
        .attack(encounter.id, "a", "b", 0, 15, "6", &session)
        .await
        .unwrap();
    assert!(attack.critical);
    assert_eq!(attack.damage_applied, 12);
    assert!(attack.target_defeated);

    // Advancing skips the defeated bandit and wraps into round 2
    let advanced = harness
        .services
        .combat
        .advance_turn(encounter.id, &session)
        .await
        .unwrap();
    assert_eq!(advanced.active_token_id.as_deref(), Some("a"));
    assert_eq!(advanced.round, 2);
    assert_eq!(advanced.skipped_defeated, vec!["b".to_string()]);
}

#[tokio::test]
async fn test_encounter_save_then_load_resumes_identically() {
    let harness = fixed_harness(vec![15, 12, 18]).await;
    let session = SessionContext::default();

    let encounter = harness
        .services
        .combat
        .create_encounter(
            CreateEncounterRequest {
                participants: vec![
                    participant(Some("a".into()), "Alys", 10, 2),
                    participant(Some("goblin-1".into()), "Goblin", 7, 1),
                ],
                seed: Some("resume".to_string()),
                terrain: None,
            },
            &session,
        )
        .await
        .unwrap();
    harness
        .services
        .combat
        .attack(encounter.id, "a", "goblin-1", 5, 10, "4", &session)
        .await
        .unwrap();
    let before = harness
        .services
        .combat
        .get_state(encounter.id, &session)
        .await
        .unwrap();

    // A fresh session restores from the snapshot without replaying dice
    let other_session = SessionContext::new("other");
    let restored = harness
        .services
        .combat
        .load_encounter(encounter.id, &other_session)
        .await
        .unwrap();
    assert_eq!(restored.round, before.round);
    assert_eq!(restored.active_token_id, before.active_token_id);
    assert_eq!(
        restored.tokens.iter().map(|t| t.hp).collect::<Vec<_>>(),
        before.tokens.iter().map(|t| t.hp).collect::<Vec<_>>()
    );
    assert_eq!(restored.status, EncounterStatus::Active);
}

#[tokio::test]
async fn test_self_theft_rejected() {
    let harness = fixed_harness(vec![10]).await;
    let thief = make_character(&harness, "Sly", 10).await;
    let dagger = questwright_domain::entities::Item::new("Dagger", ItemType::Weapon, 1.0, 10)
        .unwrap();
    harness.items.create(&dagger).await.unwrap();

    let err = harness
        .services
        .theft
        .steal(StealRequest {
            thief_id: thief,
            victim_id: thief,
            item_id: dagger.id,
            location: None,
            witnesses: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Invariant(_)));
}

#[tokio::test]
async fn test_fuzzy_action_dispatch_through_registry() {
    let harness = fixed_harness(vec![10]).await;
    let session = SessionContext::default();

    let seller = make_character(&harness, "Sly", 10).await;
    let victim = make_character(&harness, "Merchant", 10).await;
    let fence_npc = make_character(&harness, "Vex", 10).await;
    let goods = questwright_domain::entities::Item::new("Goblet", ItemType::Misc, 1.0, 100)
        .unwrap();
    harness.items.create(&goods).await.unwrap();

    harness
        .services
        .theft
        .steal(StealRequest {
            thief_id: seller,
            victim_id: victim,
            item_id: goods.id,
            location: None,
            witnesses: vec![],
        })
        .await
        .unwrap();
    // Cool the goods so the default fence can take them
    harness.services.theft.decay(4).await.unwrap();
    let fence_args = json!({
        "action": "register_fence",
        "npcId": fence_npc,
        "buyRate": 0.5,
        "maxHeatLevel": "cold",
        "dailyHeatCapacity": 500,
    });
    let response = harness
        .registry
        .invoke("theft_manage", fence_args, session.clone())
        .await
        .unwrap();
    assert!(response.extract_state().unwrap().get("error").is_none());

    // Exact alias: "fence" resolves to sell
    let response = harness
        .registry
        .invoke(
            "theft_manage",
            json!({
                "action": "fence",
                "sellerId": seller,
                "fenceId": fence_npc,
                "itemId": goods.id,
                "itemValue": 100,
            }),
            session.clone(),
        )
        .await
        .unwrap();
    let state = response.extract_state().unwrap();
    assert_eq!(state["price"], 50, "cold goods at 0.5 buy rate");

    // Fuzzy: "sel" is within threshold of sell; cold goods barely dent the
    // fence's daily capacity, so a second sale still fits
    let response = harness
        .registry
        .invoke(
            "theft_manage",
            json!({
                "action": "sel",
                "sellerId": seller,
                "fenceId": fence_npc,
                "itemId": goods.id,
                "itemValue": 100,
            }),
            session.clone(),
        )
        .await
        .unwrap();
    let state = response.extract_state().unwrap();
    assert_eq!(state["price"], 50);

    // Garbage gets guidance, never a guess
    let response = harness
        .registry
        .invoke(
            "theft_manage",
            json!({"action": "xyz", "itemId": goods.id}),
            session,
        )
        .await
        .unwrap();
    let state = response.extract_state().unwrap();
    assert_eq!(state["error"], true);
    assert_eq!(state["kind"], "unknown_action");
    assert!(state["details"]["availableActions"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v == "steal"));
    assert!(state["details"]["suggestions"].is_array());
}

#[tokio::test]
async fn test_quest_prerequisite_chain() {
    let harness = fixed_harness(vec![10]).await;
    let adventurer = make_character(&harness, "Wren", 10).await;
    let world = harness
        .services
        .world
        .generate(GenerateWorldRequest {
            name: "Aria".into(),
            seed: Some(7),
            width: 10,
            height: 10,
        })
        .await
        .unwrap()
        .world;

    let q1 = harness
        .services
        .quests
        .create(CreateQuestRequest {
            world_id: world.id,
            name: "Rats".into(),
            description: "Clear the cellar".into(),
            objectives: vec![ObjectiveSpec {
                description: "Slay rats".into(),
                objective_type: "kill".into(),
                target: Some("rat".into()),
                required: 1,
            }],
            rewards: RewardsSpec::default(),
            prerequisites: vec![],
            giver: None,
        })
        .await
        .unwrap();
    let q2 = harness
        .services
        .quests
        .create(CreateQuestRequest {
            world_id: world.id,
            name: "Bigger Rats".into(),
            description: "The sequel".into(),
            objectives: vec![ObjectiveSpec {
                description: "Slay dire rats".into(),
                objective_type: "kill".into(),
                target: Some("dire rat".into()),
                required: 1,
            }],
            rewards: RewardsSpec {
                experience: 100,
                gold: 10,
                items: vec![],
            },
            prerequisites: vec![q1.id],
            giver: None,
        })
        .await
        .unwrap();

    // Q1 not completed yet: the rejection names it
    let err = harness
        .services
        .quests
        .assign(q2.id, adventurer)
        .await
        .unwrap_err();
    match err {
        ToolError::Invariant(message) => assert!(message.contains("Rats")),
        other => panic!("wrong error: {other:?}"),
    }

    // Run Q1 to completion, then Q2 assigns cleanly
    harness.services.quests.assign(q1.id, adventurer).await.unwrap();
    let objective_id = q1.objectives[0].id;
    harness
        .services
        .quests
        .update_objective(q1.id, objective_id, 1)
        .await
        .unwrap();
    let completion = harness
        .services
        .quests
        .complete(q1.id, adventurer)
        .await
        .unwrap();
    assert!(completion.items_missing.is_empty());
    harness.services.quests.assign(q2.id, adventurer).await.unwrap();

    // Completing an already-completed quest never double-grants
    let err = harness
        .services
        .quests
        .complete(q1.id, adventurer)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Conflict(_)));

    let log = harness.services.quests.quest_log(adventurer).await.unwrap();
    assert_eq!(log.completed.len(), 1);
    assert_eq!(log.active.len(), 1);
}

#[tokio::test]
async fn test_arcane_synthesis_mastery() {
    let harness = fixed_harness(vec![20]).await;
    let caster = make_character(&harness, "Imre", 12).await;

    let result = harness
        .services
        .improvisation
        .synthesize(SynthesizeRequest {
            caster_id: caster,
            spell_name: Some("Imre's Cascade".into()),
            level: 3,
            school: "evocation".into(),
            effect_type: "damage".into(),
            effect_dice: Some("3d6".into()),
            in_combat: false,
            has_related_spell: false,
            material_value: 0,
            ley_line: false,
            blood_moon: false,
            desperation: false,
            seed: Some("pinned".into()),
        })
        .await
        .unwrap();

    assert_eq!(result.outcome, SynthesisOutcome::Mastery);
    assert!(result.spell_mastered);
    assert!(!result.spell_slot_consumed);

    let spellbook = harness
        .services
        .improvisation
        .spellbook(caster)
        .await
        .unwrap();
    assert_eq!(spellbook.len(), 1);
    assert_eq!(spellbook[0].name, "Imre's Cascade");
}

#[tokio::test]
async fn test_heat_decay_to_cold() {
    let harness = fixed_harness(vec![50]).await;
    let thief = make_character(&harness, "Sly", 10).await;
    let victim = make_character(&harness, "Merchant", 10).await;
    let bystander = make_character(&harness, "Passerby", 10).await;
    let goods =
        questwright_domain::entities::Item::new("Ring", ItemType::Misc, 0.1, 50).unwrap();
    harness.items.create(&goods).await.unwrap();

    let record = harness
        .services
        .theft
        .steal(StealRequest {
            thief_id: thief,
            victim_id: victim,
            item_id: goods.id,
            location: Some("market".into()),
            witnesses: vec![],
        })
        .await
        .unwrap();
    assert_eq!(record.heat_level, HeatLevel::Burning);

    let cooled = harness.services.theft.decay(4).await.unwrap();
    assert_eq!(cooled, 1);
    let record = harness
        .services
        .theft
        .check(goods.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.heat_level, HeatLevel::Cold);

    // A neutral NPC with no bounty now rolls against the cold threshold
    let recognition = harness
        .services
        .theft
        .recognize(bystander, goods.id, None)
        .await
        .unwrap();
    assert_eq!(recognition.threshold, 5);
    assert!(!recognition.recognized, "roll of 50 is not below 5");
}

#[tokio::test]
async fn test_victim_cannot_fence_and_victim_always_recognizes() {
    let harness = fixed_harness(vec![99]).await;
    let thief = make_character(&harness, "Sly", 10).await;
    let victim = make_character(&harness, "Merchant", 10).await;
    let witness = make_character(&harness, "Watcher", 10).await;
    let goods =
        questwright_domain::entities::Item::new("Idol", ItemType::Misc, 2.0, 200).unwrap();
    harness.items.create(&goods).await.unwrap();

    harness
        .services
        .theft
        .steal(StealRequest {
            thief_id: thief,
            victim_id: victim,
            item_id: goods.id,
            location: None,
            witnesses: vec![witness],
        })
        .await
        .unwrap();

    let err = harness
        .services
        .theft
        .register_fence(questwright_protocol::requests::theft::RegisterFenceRequest {
            npc_id: victim,
            buy_rate: 0.5,
            max_heat_level: HeatLevel::Burning,
            daily_heat_capacity: 500,
            faction_id: None,
            specializations: vec![],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Invariant(_)));

    let by_victim = harness
        .services
        .theft
        .recognize(victim, goods.id, None)
        .await
        .unwrap();
    assert!(by_victim.recognized);
    assert_eq!(by_victim.reaction.as_deref(), Some("hostile"));

    let by_witness = harness
        .services
        .theft
        .recognize(witness, goods.id, None)
        .await
        .unwrap();
    assert!(by_witness.recognized);
    assert_eq!(by_witness.reaction.as_deref(), Some("suspicious"));
}

#[tokio::test]
async fn test_inventory_equip_lock_and_transfer() {
    let harness = fixed_harness(vec![10]).await;
    let alys = make_character(&harness, "Alys", 10).await;
    let brin = make_character(&harness, "Brin", 10).await;
    let sword =
        questwright_domain::entities::Item::new("Sword", ItemType::Weapon, 3.0, 15).unwrap();
    let shield =
        questwright_domain::entities::Item::new("Shield", ItemType::Armor, 6.0, 10).unwrap();
    harness.items.create(&sword).await.unwrap();
    harness.items.create(&shield).await.unwrap();

    harness
        .services
        .characters
        .give_item(alys, sword.id, 2)
        .await
        .unwrap();
    harness
        .services
        .characters
        .give_item(alys, shield.id, 1)
        .await
        .unwrap();

    harness
        .services
        .characters
        .equip(alys, sword.id, "main_hand".into())
        .await
        .unwrap();
    // Only one equipped item per slot
    let err = harness
        .services
        .characters
        .equip(alys, shield.id, "main_hand".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Invariant(_)));

    // An equipped stack cannot be transferred
    let err = harness
        .services
        .characters
        .transfer(alys, brin, sword.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Invariant(_)));

    // Unequip, then transfer one of two
    harness
        .services
        .characters
        .unequip(alys, sword.id)
        .await
        .unwrap();
    harness
        .services
        .characters
        .transfer(alys, brin, sword.id, 1)
        .await
        .unwrap();
    let holders = harness.services.characters.holders_of(sword.id).await.unwrap();
    assert_eq!(holders.len(), 2);

    let remaining = harness.items.entry(alys, sword.id).await.unwrap().unwrap();
    assert_eq!(remaining.quantity, 1);

    // Transferring more than held is refused
    let err = harness
        .services
        .characters
        .transfer(alys, brin, sword.id, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::Invariant(_)));
}

#[tokio::test]
async fn test_rest_mechanics() {
    // Short rest rolls 6 then 2 on the hit die
    let harness = fixed_harness(vec![6, 2]).await;
    let wren = make_character(&harness, "Wren", 20).await;

    // Knock them down via update
    harness
        .services
        .characters
        .update(questwright_protocol::requests::character::UpdateCharacterRequest {
            character_id: wren,
            name: None,
            stats: None,
            hp: Some(5),
            max_hp: None,
            ac: None,
            level: None,
            faction_id: None,
            behavior: None,
        })
        .await
        .unwrap();

    let short = harness.services.rest.short_rest(wren, 2).await.unwrap();
    // CON 10: rolls heal 6 and 2, both at least 1
    assert_eq!(short.rolls, vec![6, 2]);
    assert_eq!(short.hp_restored, 8);
    assert_eq!(short.hp, 13);

    let long = harness.services.rest.long_rest(wren).await.unwrap();
    assert_eq!(long.hp, 20);
    assert_eq!(long.hp_restored, 7);
}

#[tokio::test]
async fn test_effect_durations_and_zero_tick_noop() {
    let harness = fixed_harness(vec![10]).await;
    let _ = make_character(&harness, "Alys", 10).await;

    let apply = |rounds: u32, name: &str| questwright_protocol::requests::improvisation::ApplyEffectRequest {
        target_id: "alys".into(),
        target_type: "character".into(),
        name: name.into(),
        description: None,
        category: questwright_domain::entities::EffectCategory::Boon,
        power_level: 2,
        mechanics: vec![json!({"acBonus": 2})],
        duration: questwright_domain::value_objects::EffectDuration::rounds(rounds),
        triggers: vec![questwright_domain::entities::EffectTrigger {
            event: "turn_start".into(),
            condition: None,
        }],
        source: None,
    };
    harness
        .services
        .improvisation
        .apply_effect(apply(1, "Shield of Faith"))
        .await
        .unwrap();
    harness
        .services
        .improvisation
        .apply_effect(apply(3, "Stoneskin"))
        .await
        .unwrap();

    // Zero rounds changes nothing
    let noop = harness
        .services
        .improvisation
        .advance_durations(questwright_protocol::requests::improvisation::AdvanceDurationsRequest {
            target_id: "alys".into(),
            rounds: 0,
        })
        .await
        .unwrap();
    assert_eq!(noop.advanced.len(), 2);
    assert!(noop.expired.is_empty());

    let triggered = harness
        .services
        .improvisation
        .process_triggers("alys", "turn_start")
        .await
        .unwrap();
    assert_eq!(triggered.len(), 2);

    let ticked = harness
        .services
        .improvisation
        .advance_durations(questwright_protocol::requests::improvisation::AdvanceDurationsRequest {
            target_id: "alys".into(),
            rounds: 1,
        })
        .await
        .unwrap();
    assert_eq!(ticked.expired, vec!["Shield of Faith".to_string()]);
    assert_eq!(ticked.advanced, vec!["Stoneskin".to_string()]);
}

#[tokio::test]
async fn test_world_patch_invalidates_and_rebuilds_tile_cache() {
    let harness = harness(
        Arc::new(SeededRandom::new()),
        Arc::new(SystemClock::new()),
    )
    .await;

    let world = harness
        .services
        .world
        .generate(GenerateWorldRequest {
            name: "Patchwork".into(),
            seed: Some(11),
            width: 12,
            height: 12,
        })
        .await
        .unwrap()
        .world;

    let patch = MapPatchRequest {
        world_id: world.id,
        ops: vec![questwright_domain::entities::PatchOp::SetTile {
            x: 3,
            y: 4,
            terrain: "obsidian".into(),
        }],
    };
    let preview = harness.services.world.preview_patch(&patch).await.unwrap();
    assert_eq!(preview.tiles_changed, 1);
    assert!(preview.rejected.is_empty());

    harness.services.world.apply_patch(patch).await.unwrap();
    let grid = harness.services.world.grid(world.id).await.unwrap();
    assert_eq!(grid.tile_at(3, 4).unwrap().terrain, "obsidian");

    // Out-of-bounds ops fail an apply outright
    let bad = MapPatchRequest {
        world_id: world.id,
        ops: vec![questwright_domain::entities::PatchOp::SetTile {
            x: 99,
            y: 0,
            terrain: "void".into(),
        }],
    };
    let err = harness.services.world.apply_patch(bad).await.unwrap_err();
    assert!(matches!(err, ToolError::Validation { .. }));
}

#[tokio::test]
async fn test_create_then_fetch_round_trip() {
    let harness = fixed_harness(vec![10]).await;
    let id = make_character(&harness, "Roundtrip", 14).await;
    let fetched = harness.services.characters.get(id).await.unwrap();
    assert_eq!(fetched.name, "Roundtrip");
    assert_eq!(fetched.max_hp, 14);
    assert_eq!(fetched.hp, 14);
    assert_eq!(fetched.stats, StatBlock::default());
}

#[tokio::test]
async fn test_registry_lists_and_rejects_unknown_tool() {
    let harness = fixed_harness(vec![10]).await;
    let tools = harness.registry.list();
    for expected in [
        "generate_world",
        "create_encounter",
        "execute_combat_action",
        "end_encounter",
        "theft_manage",
        "improvisation_manage",
        "batch_manage",
        "character_manage",
        "take_long_rest",
        "get_quest_log",
        "get_audit_log",
    ] {
        assert!(
            tools.iter().any(|tool| tool["name"] == expected),
            "missing {expected}"
        );
    }

    let err = harness
        .registry
        .invoke("no_such_tool", json!({}), SessionContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::UnknownTool(_)));
}

#[tokio::test]
async fn test_batch_workflow_creates_npcs_and_encounter() {
    let harness = fixed_harness(vec![10, 12, 14, 16, 18, 9]).await;
    let session = SessionContext::default();

    let result = harness
        .services
        .batch
        .execute_workflow(
            questwright_protocol::requests::batch::ExecuteWorkflowRequest {
                workflow: "goblin_ambush".into(),
            },
            &session,
        )
        .await
        .unwrap();
    assert_eq!(result.characters_created.len(), 4);
    let encounter = result.encounter.expect("combat workflow opens an encounter");
    assert_eq!(encounter.tokens.len(), 4);
    assert!(encounter.tokens.iter().all(|token| token.is_enemy));

    // The write-back path sees these as persisted characters
    for character in &result.characters_created {
        assert!(harness
            .characters
            .find_by_id(character.id)
            .await
            .unwrap()
            .is_some());
    }
}

#[tokio::test]
async fn test_audit_log_tail_is_monotonic() {
    let harness = fixed_harness(vec![10]).await;
    make_character(&harness, "One", 10).await;
    make_character(&harness, "Two", 10).await;

    let entries = harness.services.audit.tail(10).await.unwrap();
    assert!(entries.len() >= 2);
    for pair in entries.windows(2) {
        assert!(pair[0].id > pair[1].id, "tail is newest first");
    }
}
