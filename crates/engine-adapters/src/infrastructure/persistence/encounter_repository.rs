//! SQLite encounter repository. Tokens travel as a JSON blob on the row.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::Encounter;
use questwright_domain::EncounterId;
use questwright_engine_ports::outbound::{EncounterRepositoryPort, RepositoryError};

use super::converters::{
    decode_enum, decode_id, decode_timestamp, encode_enum, encode_timestamp, json_decode,
    json_encode, map_sqlx,
};

pub struct SqliteEncounterRepository {
    pool: SqlitePool,
}

impl SqliteEncounterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_encounter(row: &SqliteRow) -> Result<Encounter, RepositoryError> {
    let terrain: Option<String> = row.get("terrain");
    Ok(Encounter {
        id: decode_id(row.get("id"))?,
        tokens: json_decode(row.get("tokens"))?,
        round: row.get::<i64, _>("round") as u32,
        current_turn_index: row.get::<i64, _>("current_turn_index") as usize,
        status: decode_enum(row.get("status"))?,
        seed: row.get("seed"),
        terrain: terrain.as_deref().map(json_decode).transpose()?,
        created_at: decode_timestamp(row.get("created_at"))?,
    })
}

#[async_trait]
impl EncounterRepositoryPort for SqliteEncounterRepository {
    async fn save(&self, encounter: &Encounter) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO encounters
                (id, tokens, round, current_turn_index, status, seed, terrain, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                tokens = excluded.tokens,
                round = excluded.round,
                current_turn_index = excluded.current_turn_index,
                status = excluded.status,
                terrain = excluded.terrain
            "#,
        )
        .bind(encounter.id.to_string())
        .bind(json_encode(&encounter.tokens)?)
        .bind(encounter.round as i64)
        .bind(encounter.current_turn_index as i64)
        .bind(encode_enum(&encounter.status)?)
        .bind(&encounter.seed)
        .bind(encounter.terrain.as_ref().map(json_encode).transpose()?)
        .bind(encode_timestamp(encounter.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: EncounterId) -> Result<Option<Encounter>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM encounters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_encounter).transpose()
    }
}
