//! SQLite custom-effect and spellbook repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::{CustomEffect, SynthesizedSpell};
use questwright_domain::{CharacterId, EffectId};
use questwright_engine_ports::outbound::{EffectQuery, EffectRepositoryPort, RepositoryError};

use super::converters::{
    decode_enum, decode_id, decode_timestamp, encode_enum, encode_timestamp, json_decode,
    json_encode, map_sqlx,
};

pub struct SqliteEffectRepository {
    pool: SqlitePool,
}

impl SqliteEffectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_effect(row: &SqliteRow) -> Result<CustomEffect, RepositoryError> {
    Ok(CustomEffect {
        id: decode_id(row.get("id"))?,
        target_id: row.get("target_id"),
        target_type: row.get("target_type"),
        name: row.get("name"),
        description: row.get("description"),
        category: decode_enum(row.get("category"))?,
        power_level: row.get::<i64, _>("power_level") as u8,
        mechanics: json_decode(row.get("mechanics"))?,
        duration: json_decode(row.get("duration"))?,
        triggers: json_decode(row.get("triggers"))?,
        is_active: row.get::<i64, _>("is_active") != 0,
        source: row.get("source"),
        created_at: decode_timestamp(row.get("created_at"))?,
    })
}

fn row_to_spell(row: &SqliteRow) -> Result<SynthesizedSpell, RepositoryError> {
    Ok(SynthesizedSpell {
        id: decode_id(row.get("id"))?,
        character_id: decode_id(row.get("character_id"))?,
        name: row.get("name"),
        school: row.get("school"),
        level: row.get::<i64, _>("level") as u8,
        effect_type: row.get("effect_type"),
        effect_dice: row.get("effect_dice"),
        mastered_at: decode_timestamp(row.get("mastered_at"))?,
    })
}

#[async_trait]
impl EffectRepositoryPort for SqliteEffectRepository {
    async fn insert(&self, effect: &CustomEffect) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO custom_effects
                (id, target_id, target_type, name, description, category, power_level,
                 mechanics, duration, triggers, is_active, source, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(effect.id.to_string())
        .bind(&effect.target_id)
        .bind(&effect.target_type)
        .bind(&effect.name)
        .bind(&effect.description)
        .bind(encode_enum(&effect.category)?)
        .bind(effect.power_level as i64)
        .bind(json_encode(&effect.mechanics)?)
        .bind(json_encode(&effect.duration)?)
        .bind(json_encode(&effect.triggers)?)
        .bind(effect.is_active as i64)
        .bind(&effect.source)
        .bind(encode_timestamp(effect.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: EffectId) -> Result<Option<CustomEffect>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM custom_effects WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_effect).transpose()
    }

    async fn find_by_target_and_name(
        &self,
        target_id: &str,
        name: &str,
    ) -> Result<Option<CustomEffect>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM custom_effects WHERE target_id = ? AND name = ? ORDER BY created_at DESC LIMIT 1",
        )
        .bind(target_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        row.as_ref().map(row_to_effect).transpose()
    }

    async fn list_by_target(
        &self,
        target_id: &str,
        query: &EffectQuery,
    ) -> Result<Vec<CustomEffect>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM custom_effects WHERE target_id = ? ORDER BY created_at")
            .bind(target_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;

        let mut effects = Vec::new();
        for row in &rows {
            let effect = row_to_effect(row)?;
            if query.active_only && !effect.is_active {
                continue;
            }
            if let Some(category) = query.category {
                if effect.category != category {
                    continue;
                }
            }
            if let Some(source_type) = &query.source_type {
                if effect.source.as_deref() != Some(source_type.as_str()) {
                    continue;
                }
            }
            effects.push(effect);
        }
        Ok(effects)
    }

    async fn update(&self, effect: &CustomEffect) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE custom_effects
            SET duration = ?, triggers = ?, mechanics = ?, is_active = ?
            WHERE id = ?
            "#,
        )
        .bind(json_encode(&effect.duration)?)
        .bind(json_encode(&effect.triggers)?)
        .bind(json_encode(&effect.mechanics)?)
        .bind(effect.is_active as i64)
        .bind(effect.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Effect", effect.id.to_string()));
        }
        Ok(())
    }

    async fn remove(&self, id: EffectId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM custom_effects WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn sweep_inactive(&self, target_id: &str) -> Result<usize, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM custom_effects WHERE target_id = ? AND is_active = 0")
                .bind(target_id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx)?;
        Ok(result.rows_affected() as usize)
    }

    async fn insert_spell(&self, spell: &SynthesizedSpell) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO synthesized_spells
                (id, character_id, name, school, level, effect_type, effect_dice, mastered_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(spell.id.to_string())
        .bind(spell.character_id.to_string())
        .bind(&spell.name)
        .bind(&spell.school)
        .bind(spell.level as i64)
        .bind(&spell.effect_type)
        .bind(&spell.effect_dice)
        .bind(encode_timestamp(spell.mastered_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn spellbook(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<SynthesizedSpell>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM synthesized_spells WHERE character_id = ? ORDER BY mastered_at")
                .bind(character_id.to_string())
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx)?;
        rows.iter().map(row_to_spell).collect()
    }
}
