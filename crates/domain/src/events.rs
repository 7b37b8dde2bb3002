//! Domain events published to the bus and mirrored into the event log.
//!
//! Distinct from the audit log: audit entries record every mutation for
//! forensics, events notify live observers.

use serde::{Deserialize, Serialize};

use crate::ids::{CharacterId, EncounterId, ItemId, QuestId, WorldId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    WorldGenerated {
        world_id: WorldId,
        name: String,
        seed: i64,
    },
    MapPatchApplied {
        world_id: WorldId,
        op_count: usize,
    },
    EncounterStarted {
        encounter_id: EncounterId,
        participants: Vec<String>,
    },
    AttackResolved {
        encounter_id: EncounterId,
        actor_id: String,
        target_id: String,
        roll: i32,
        hit: bool,
        critical: bool,
        damage: i32,
        target_defeated: bool,
    },
    HealingApplied {
        encounter_id: EncounterId,
        actor_id: String,
        target_id: String,
        amount: i32,
    },
    TurnAdvanced {
        encounter_id: EncounterId,
        round: u32,
        active_token_id: Option<String>,
    },
    EncounterEnded {
        encounter_id: EncounterId,
        characters_written_back: Vec<CharacterId>,
    },
    TheftRecorded {
        item_id: ItemId,
        thief_id: CharacterId,
        victim_id: CharacterId,
    },
    StolenItemSold {
        item_id: ItemId,
        fence_id: CharacterId,
        price: i64,
    },
    HeatDecayed {
        days_advanced: u32,
        records_cooled: usize,
    },
    QuestAssigned {
        quest_id: QuestId,
        character_id: CharacterId,
    },
    ObjectiveUpdated {
        quest_id: QuestId,
        objective_progress: String,
        completed: bool,
    },
    QuestCompleted {
        quest_id: QuestId,
        character_id: CharacterId,
    },
    EffectApplied {
        target_id: String,
        effect_name: String,
    },
    EffectExpired {
        target_id: String,
        effect_name: String,
    },
    SpellSynthesized {
        character_id: CharacterId,
        spell_name: String,
        outcome: String,
    },
}

impl DomainEvent {
    /// Stable name used as the `event_logs.event_type` column.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::WorldGenerated { .. } => "world_generated",
            Self::MapPatchApplied { .. } => "map_patch_applied",
            Self::EncounterStarted { .. } => "encounter_started",
            Self::AttackResolved { .. } => "attack_resolved",
            Self::HealingApplied { .. } => "healing_applied",
            Self::TurnAdvanced { .. } => "turn_advanced",
            Self::EncounterEnded { .. } => "encounter_ended",
            Self::TheftRecorded { .. } => "theft_recorded",
            Self::StolenItemSold { .. } => "stolen_item_sold",
            Self::HeatDecayed { .. } => "heat_decayed",
            Self::QuestAssigned { .. } => "quest_assigned",
            Self::ObjectiveUpdated { .. } => "objective_updated",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::EffectApplied { .. } => "effect_applied",
            Self::EffectExpired { .. } => "effect_expired",
            Self::SpellSynthesized { .. } => "spell_synthesized",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_matches_serde_tag() {
        let event = DomainEvent::HeatDecayed {
            days_advanced: 2,
            records_cooled: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }
}
