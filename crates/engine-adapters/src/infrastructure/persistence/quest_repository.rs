//! SQLite quest and quest-log repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::{Quest, QuestLog};
use questwright_domain::{CharacterId, ItemId, QuestId, WorldId};
use questwright_engine_ports::outbound::{QuestRepositoryPort, RepositoryError};

use super::converters::{decode_enum, decode_id, encode_enum, json_decode, json_encode, map_sqlx};

pub struct SqliteQuestRepository {
    pool: SqlitePool,
}

impl SqliteQuestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_quest(row: &SqliteRow) -> Result<Quest, RepositoryError> {
    let giver: Option<String> = row.get("giver");
    Ok(Quest {
        id: decode_id(row.get("id"))?,
        world_id: decode_id(row.get("world_id"))?,
        name: row.get("name"),
        description: row.get("description"),
        status: decode_enum(row.get("status"))?,
        objectives: json_decode(row.get("objectives"))?,
        rewards: json_decode(row.get("rewards"))?,
        prerequisites: json_decode(row.get("prerequisites"))?,
        giver: giver.as_deref().map(decode_id).transpose()?,
    })
}

fn row_to_log(row: &SqliteRow) -> Result<QuestLog, RepositoryError> {
    Ok(QuestLog {
        character_id: decode_id(row.get("character_id"))?,
        active_quests: json_decode(row.get("active_quests"))?,
        completed_quests: json_decode(row.get("completed_quests"))?,
        failed_quests: json_decode(row.get("failed_quests"))?,
    })
}

#[async_trait]
impl QuestRepositoryPort for SqliteQuestRepository {
    async fn create(&self, quest: &Quest) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO quests
                (id, world_id, name, description, status, objectives, rewards, prerequisites, giver)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(quest.id.to_string())
        .bind(quest.world_id.to_string())
        .bind(&quest.name)
        .bind(&quest.description)
        .bind(encode_enum(&quest.status)?)
        .bind(json_encode(&quest.objectives)?)
        .bind(json_encode(&quest.rewards)?)
        .bind(json_encode(&quest.prerequisites)?)
        .bind(quest.giver.map(|id| id.to_string()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: QuestId) -> Result<Option<Quest>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM quests WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_quest).transpose()
    }

    async fn update(&self, quest: &Quest) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE quests
            SET name = ?, description = ?, status = ?, objectives = ?, rewards = ?,
                prerequisites = ?, giver = ?
            WHERE id = ?
            "#,
        )
        .bind(&quest.name)
        .bind(&quest.description)
        .bind(encode_enum(&quest.status)?)
        .bind(json_encode(&quest.objectives)?)
        .bind(json_encode(&quest.rewards)?)
        .bind(json_encode(&quest.prerequisites)?)
        .bind(quest.giver.map(|id| id.to_string()))
        .bind(quest.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found("Quest", quest.id.to_string()));
        }
        Ok(())
    }

    async fn list(&self, world_id: Option<WorldId>) -> Result<Vec<Quest>, RepositoryError> {
        let rows = match world_id {
            Some(world_id) => {
                sqlx::query("SELECT * FROM quests WHERE world_id = ? ORDER BY name")
                    .bind(world_id.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                sqlx::query("SELECT * FROM quests ORDER BY name")
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(map_sqlx)?;
        rows.iter().map(row_to_quest).collect()
    }

    async fn quest_log(&self, character_id: CharacterId) -> Result<QuestLog, RepositoryError> {
        let row = sqlx::query("SELECT * FROM quest_logs WHERE character_id = ?")
            .bind(character_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        match row {
            Some(row) => row_to_log(&row),
            None => Ok(QuestLog::empty(character_id)),
        }
    }

    async fn save_quest_log(&self, log: &QuestLog) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO quest_logs (character_id, active_quests, completed_quests, failed_quests)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (character_id) DO UPDATE SET
                active_quests = excluded.active_quests,
                completed_quests = excluded.completed_quests,
                failed_quests = excluded.failed_quests
            "#,
        )
        .bind(log.character_id.to_string())
        .bind(json_encode(&log.active_quests)?)
        .bind(json_encode(&log.completed_quests)?)
        .bind(json_encode(&log.failed_quests)?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn complete_quest(
        &self,
        quest: &Quest,
        log: &QuestLog,
        grant_items: &[ItemId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query("UPDATE quests SET status = ?, objectives = ? WHERE id = ?")
            .bind(encode_enum(&quest.status)?)
            .bind(json_encode(&quest.objectives)?)
            .bind(quest.id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO quest_logs (character_id, active_quests, completed_quests, failed_quests)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (character_id) DO UPDATE SET
                active_quests = excluded.active_quests,
                completed_quests = excluded.completed_quests,
                failed_quests = excluded.failed_quests
            "#,
        )
        .bind(log.character_id.to_string())
        .bind(json_encode(&log.active_quests)?)
        .bind(json_encode(&log.completed_quests)?)
        .bind(json_encode(&log.failed_quests)?)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for item_id in grant_items {
            sqlx::query(
                r#"
                INSERT INTO inventory_items (character_id, item_id, quantity, equipped, slot)
                VALUES (?, ?, 1, 0, NULL)
                ON CONFLICT (character_id, item_id)
                DO UPDATE SET quantity = quantity + 1
                "#,
            )
            .bind(log.character_id.to_string())
            .bind(item_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }
}
