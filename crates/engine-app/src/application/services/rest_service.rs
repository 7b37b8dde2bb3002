//! Rest mechanics: long rests restore everything, short rests spend hit
//! dice.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use questwright_domain::rules::hit_die_for_class;
use questwright_domain::CharacterId;
use questwright_engine_ports::outbound::{
    AuditLogPort, CharacterRepositoryPort, ClockPort, RandomPort,
};

use crate::application::error::ToolError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LongRestResult {
    pub character_id: CharacterId,
    pub hp_restored: i32,
    pub hp: i32,
    pub max_hp: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortRestResult {
    pub character_id: CharacterId,
    pub dice_spent: u32,
    pub die_size: u8,
    pub rolls: Vec<i32>,
    pub hp_restored: i32,
    pub hp: i32,
    pub max_hp: i32,
}

pub struct RestService {
    characters: Arc<dyn CharacterRepositoryPort>,
    audit: Arc<dyn AuditLogPort>,
    rng: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl RestService {
    pub fn new(
        characters: Arc<dyn CharacterRepositoryPort>,
        audit: Arc<dyn AuditLogPort>,
        rng: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            characters,
            audit,
            rng,
            clock,
        }
    }

    pub async fn long_rest(&self, character_id: CharacterId) -> Result<LongRestResult, ToolError> {
        let mut character = self
            .characters
            .find_by_id(character_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Character",
                id: character_id.to_string(),
            })?;

        let hp_restored = character.max_hp - character.hp;
        character.hp = character.max_hp;
        character.updated_at = self.clock.now();
        self.characters.update(&character).await?;

        self.audit
            .append(
                "rest.long",
                Some(&character_id.to_string()),
                None,
                json!({"hpRestored": hp_restored, "hp": character.hp}),
            )
            .await?;
        Ok(LongRestResult {
            character_id,
            hp_restored,
            hp: character.hp,
            max_hp: character.max_hp,
        })
    }

    /// Spend hit dice: each die heals `max(1, roll + CON modifier)`, capped
    /// at the missing hp.
    pub async fn short_rest(
        &self,
        character_id: CharacterId,
        dice: u32,
    ) -> Result<ShortRestResult, ToolError> {
        let mut character = self
            .characters
            .find_by_id(character_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Character",
                id: character_id.to_string(),
            })?;

        let die_size = hit_die_for_class(character.class_name.as_deref().unwrap_or_default());
        let con_mod = character.con_modifier();
        let seed = format!(
            "short-rest-{character_id}-{}",
            self.clock.now().timestamp_millis()
        );
        let mut roller = self.rng.seeded(&seed);

        let mut rolls = Vec::with_capacity(dice as usize);
        let mut healed_total = 0;
        for _ in 0..dice {
            let roll = roller.roll_die(die_size as u32);
            rolls.push(roll);
            healed_total += (roll + con_mod).max(1);
        }
        let hp_restored = healed_total.min(character.max_hp - character.hp);
        character.hp += hp_restored;
        character.updated_at = self.clock.now();
        self.characters.update(&character).await?;

        self.audit
            .append(
                "rest.short",
                Some(&character_id.to_string()),
                None,
                json!({"diceSpent": dice, "rolls": rolls, "hpRestored": hp_restored}),
            )
            .await?;
        debug!(character = %character_id, dice, hp_restored, "Short rest");
        Ok(ShortRestResult {
            character_id,
            dice_spent: dice,
            die_size,
            rolls,
            hp_restored,
            hp: character.hp,
            max_hp: character.max_hp,
        })
    }
}
