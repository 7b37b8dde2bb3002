//! SQLite character repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::Character;
use questwright_domain::CharacterId;
use questwright_engine_ports::outbound::{CharacterRepositoryPort, RepositoryError};

use super::converters::{
    decode_enum, decode_id, decode_timestamp, encode_enum, encode_timestamp, json_decode,
    json_encode, map_sqlx,
};

pub struct SqliteCharacterRepository {
    pool: SqlitePool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_character(row: &SqliteRow) -> Result<Character, RepositoryError> {
    Ok(Character {
        id: decode_id(row.get("id"))?,
        name: row.get("name"),
        stats: json_decode(row.get("stats"))?,
        hp: row.get("hp"),
        max_hp: row.get("max_hp"),
        ac: row.get("ac"),
        level: row.get::<i64, _>("level") as u8,
        class_name: row.get("class_name"),
        faction_id: row.get("faction_id"),
        behavior: row.get("behavior"),
        character_type: decode_enum(row.get("character_type"))?,
        created_at: decode_timestamp(row.get("created_at"))?,
        updated_at: decode_timestamp(row.get("updated_at"))?,
    })
}

#[async_trait]
impl CharacterRepositoryPort for SqliteCharacterRepository {
    async fn create(&self, character: &Character) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO characters
                (id, name, stats, hp, max_hp, ac, level, class_name, faction_id, behavior,
                 character_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(character.id.to_string())
        .bind(&character.name)
        .bind(json_encode(&character.stats)?)
        .bind(character.hp)
        .bind(character.max_hp)
        .bind(character.ac)
        .bind(character.level as i64)
        .bind(&character.class_name)
        .bind(&character.faction_id)
        .bind(&character.behavior)
        .bind(encode_enum(&character.character_type)?)
        .bind(encode_timestamp(character.created_at))
        .bind(encode_timestamp(character.updated_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: CharacterId) -> Result<Option<Character>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_character).transpose()
    }

    async fn update(&self, character: &Character) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE characters
            SET name = ?, stats = ?, hp = ?, max_hp = ?, ac = ?, level = ?,
                class_name = ?, faction_id = ?, behavior = ?, character_type = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&character.name)
        .bind(json_encode(&character.stats)?)
        .bind(character.hp)
        .bind(character.max_hp)
        .bind(character.ac)
        .bind(character.level as i64)
        .bind(&character.class_name)
        .bind(&character.faction_id)
        .bind(&character.behavior)
        .bind(encode_enum(&character.character_type)?)
        .bind(encode_timestamp(character.updated_at))
        .bind(character.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(
                "Character",
                character.id.to_string(),
            ));
        }
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Character>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM characters ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_character).collect()
    }

    async fn write_back_hp(
        &self,
        updates: &[(CharacterId, i32)],
    ) -> Result<Vec<CharacterId>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let mut written = Vec::new();
        for (character_id, hp) in updates {
            let result = sqlx::query(
                "UPDATE characters SET hp = MAX(0, MIN(?, max_hp)) WHERE id = ?",
            )
            .bind(hp)
            .bind(character_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
            if result.rows_affected() > 0 {
                written.push(*character_id);
            }
        }
        tx.commit().await.map_err(map_sqlx)?;
        Ok(written)
    }
}
