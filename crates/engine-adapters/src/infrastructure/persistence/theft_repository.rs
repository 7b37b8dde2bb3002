//! SQLite theft-record and fence repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::{Fence, TheftRecord};
use questwright_domain::value_objects::HeatLevel;
use questwright_domain::{CharacterId, ItemId};
use questwright_engine_ports::outbound::{RepositoryError, TheftRepositoryPort};

use super::converters::{
    decode_enum, decode_id, decode_timestamp, encode_enum, encode_timestamp, json_decode,
    json_encode, map_sqlx,
};

pub struct SqliteTheftRepository {
    pool: SqlitePool,
}

impl SqliteTheftRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_record(row: &SqliteRow) -> Result<TheftRecord, RepositoryError> {
    Ok(TheftRecord {
        item_id: decode_id(row.get("item_id"))?,
        stolen_from: decode_id(row.get("stolen_from"))?,
        stolen_by: decode_id(row.get("stolen_by"))?,
        stolen_location: row.get("stolen_location"),
        witnesses: json_decode(row.get("witnesses"))?,
        heat_level: decode_enum(row.get("heat_level"))?,
        reported_to_guards: row.get::<i64, _>("reported_to_guards") != 0,
        bounty: row.get("bounty"),
        created_at: decode_timestamp(row.get("created_at"))?,
    })
}

fn row_to_fence(row: &SqliteRow) -> Result<Fence, RepositoryError> {
    Ok(Fence {
        npc_id: decode_id(row.get("npc_id"))?,
        faction_id: row.get("faction_id"),
        buy_rate: row.get("buy_rate"),
        max_heat_level: decode_enum(row.get("max_heat_level"))?,
        daily_heat_capacity: row.get::<i64, _>("daily_heat_capacity") as u32,
        daily_heat_used: row.get::<i64, _>("daily_heat_used") as u32,
        specializations: json_decode(row.get("specializations"))?,
        cooldown_days: row.get::<i64, _>("cooldown_days") as u32,
    })
}

#[async_trait]
impl TheftRepositoryPort for SqliteTheftRepository {
    async fn create_record(&self, record: &TheftRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO theft_records
                (item_id, stolen_from, stolen_by, stolen_location, witnesses, heat_level,
                 reported_to_guards, bounty, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.item_id.to_string())
        .bind(record.stolen_from.to_string())
        .bind(record.stolen_by.to_string())
        .bind(&record.stolen_location)
        .bind(json_encode(&record.witnesses)?)
        .bind(encode_enum(&record.heat_level)?)
        .bind(record.reported_to_guards as i64)
        .bind(record.bounty)
        .bind(encode_timestamp(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_record(&self, item_id: ItemId) -> Result<Option<TheftRecord>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM theft_records WHERE item_id = ?")
            .bind(item_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_record).transpose()
    }

    async fn update_record(&self, record: &TheftRecord) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE theft_records
            SET witnesses = ?, heat_level = ?, reported_to_guards = ?, bounty = ?
            WHERE item_id = ?
            "#,
        )
        .bind(json_encode(&record.witnesses)?)
        .bind(encode_enum(&record.heat_level)?)
        .bind(record.reported_to_guards as i64)
        .bind(record.bounty)
        .bind(record.item_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(
                "Theft record",
                record.item_id.to_string(),
            ));
        }
        Ok(())
    }

    async fn records_by_victim(
        &self,
        victim_id: CharacterId,
    ) -> Result<Vec<TheftRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM theft_records WHERE stolen_from = ?")
            .bind(victim_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_record).collect()
    }

    async fn create_fence(&self, fence: &Fence) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO fences
                (npc_id, faction_id, buy_rate, max_heat_level, daily_heat_capacity,
                 daily_heat_used, specializations, cooldown_days)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fence.npc_id.to_string())
        .bind(&fence.faction_id)
        .bind(fence.buy_rate)
        .bind(encode_enum(&fence.max_heat_level)?)
        .bind(fence.daily_heat_capacity as i64)
        .bind(fence.daily_heat_used as i64)
        .bind(json_encode(&fence.specializations)?)
        .bind(fence.cooldown_days as i64)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_fence(&self, npc_id: CharacterId) -> Result<Option<Fence>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM fences WHERE npc_id = ?")
            .bind(npc_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_fence).transpose()
    }

    async fn update_fence(&self, fence: &Fence) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE fences
            SET faction_id = ?, buy_rate = ?, max_heat_level = ?, daily_heat_capacity = ?,
                daily_heat_used = ?, specializations = ?, cooldown_days = ?
            WHERE npc_id = ?
            "#,
        )
        .bind(&fence.faction_id)
        .bind(fence.buy_rate)
        .bind(encode_enum(&fence.max_heat_level)?)
        .bind(fence.daily_heat_capacity as i64)
        .bind(fence.daily_heat_used as i64)
        .bind(json_encode(&fence.specializations)?)
        .bind(fence.cooldown_days as i64)
        .bind(fence.npc_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(
                "Fence",
                fence.npc_id.to_string(),
            ));
        }
        Ok(())
    }

    async fn list_fences(&self) -> Result<Vec<Fence>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM fences")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_fence).collect()
    }

    async fn decay(&self, steps: u32) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let rows = sqlx::query("SELECT * FROM theft_records")
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        let mut cooled = 0usize;
        for row in &rows {
            let record = row_to_record(row)?;
            let new_level = record.heat_level.cooled_by(steps);
            if new_level != record.heat_level {
                sqlx::query("UPDATE theft_records SET heat_level = ? WHERE item_id = ?")
                    .bind(encode_enum::<HeatLevel>(&new_level)?)
                    .bind(record.item_id.to_string())
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx)?;
                cooled += 1;
            }
        }

        // Days passing also reopen every fence's daily budget and tick
        // cooldowns toward zero
        if steps > 0 {
            sqlx::query(
                "UPDATE fences SET daily_heat_used = 0, cooldown_days = MAX(0, cooldown_days - ?)",
            )
            .bind(steps as i64)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(cooled)
    }
}
