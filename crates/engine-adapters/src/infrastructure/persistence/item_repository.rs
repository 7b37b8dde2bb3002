//! SQLite item and inventory repository.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::{InventoryEntry, Item};
use questwright_domain::{CharacterId, ItemId};
use questwright_engine_ports::outbound::{ItemRepositoryPort, RepositoryError};

use super::converters::{decode_enum, decode_id, encode_enum, json_decode, json_encode, map_sqlx};

pub struct SqliteItemRepository {
    pool: SqlitePool,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_item(row: &SqliteRow) -> Result<Item, RepositoryError> {
    let properties: Option<String> = row.get("properties");
    Ok(Item {
        id: decode_id(row.get("id"))?,
        name: row.get("name"),
        item_type: decode_enum(row.get("item_type"))?,
        weight: row.get("weight"),
        value: row.get("value"),
        properties: properties.as_deref().map(json_decode).transpose()?,
    })
}

fn row_to_entry(row: &SqliteRow) -> Result<InventoryEntry, RepositoryError> {
    Ok(InventoryEntry {
        character_id: decode_id(row.get("character_id"))?,
        item_id: decode_id(row.get("item_id"))?,
        quantity: row.get::<i64, _>("quantity") as u32,
        equipped: row.get::<i64, _>("equipped") != 0,
        slot: row.get("slot"),
    })
}

#[async_trait]
impl ItemRepositoryPort for SqliteItemRepository {
    async fn create(&self, item: &Item) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO items (id, name, item_type, weight, value, properties) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(&item.name)
        .bind(encode_enum(&item.item_type)?)
        .bind(item.weight)
        .bind(item.value)
        .bind(item.properties.as_ref().map(json_encode).transpose()?)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM items WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_item).transpose()
    }

    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM items ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_item).collect()
    }

    async fn inventory_of(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM inventory_items WHERE character_id = ?")
            .bind(character_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn entry(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
    ) -> Result<Option<InventoryEntry>, RepositoryError> {
        let row =
            sqlx::query("SELECT * FROM inventory_items WHERE character_id = ? AND item_id = ?")
                .bind(character_id.to_string())
                .bind(item_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx)?;
        row.as_ref().map(row_to_entry).transpose()
    }

    async fn holders_of(&self, item_id: ItemId) -> Result<Vec<CharacterId>, RepositoryError> {
        let rows = sqlx::query("SELECT character_id FROM inventory_items WHERE item_id = ?")
            .bind(item_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter()
            .map(|row| decode_id(row.get("character_id")))
            .collect()
    }

    async fn grant(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (character_id, item_id, quantity, equipped, slot)
            VALUES (?, ?, ?, 0, NULL)
            ON CONFLICT (character_id, item_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(character_id.to_string())
        .bind(item_id.to_string())
        .bind(quantity as i64)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn set_equipped(
        &self,
        character_id: CharacterId,
        item_id: ItemId,
        equipped: bool,
        slot: Option<String>,
    ) -> Result<(), RepositoryError> {
        if equipped && slot.is_none() {
            return Err(RepositoryError::Constraint(
                "An equipped item must occupy a named slot".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;
        let existing =
            sqlx::query("SELECT * FROM inventory_items WHERE character_id = ? AND item_id = ?")
                .bind(character_id.to_string())
                .bind(item_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        if existing.is_none() {
            return Err(RepositoryError::not_found(
                "Inventory entry",
                format!("{character_id}/{item_id}"),
            ));
        }

        if equipped {
            // One equipped item per slot per character
            let slot_name = slot.clone().unwrap_or_default();
            let occupied = sqlx::query(
                "SELECT item_id FROM inventory_items WHERE character_id = ? AND equipped = 1 AND slot = ? AND item_id != ?",
            )
            .bind(character_id.to_string())
            .bind(&slot_name)
            .bind(item_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx)?;
            if occupied.is_some() {
                return Err(RepositoryError::Constraint(format!(
                    "The {slot_name} slot is already occupied"
                )));
            }
        }

        sqlx::query(
            "UPDATE inventory_items SET equipped = ?, slot = ? WHERE character_id = ? AND item_id = ?",
        )
        .bind(equipped as i64)
        .bind(if equipped { slot } else { None })
        .bind(character_id.to_string())
        .bind(item_id.to_string())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;
        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn transfer(
        &self,
        from: CharacterId,
        to: CharacterId,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        let source =
            sqlx::query("SELECT * FROM inventory_items WHERE character_id = ? AND item_id = ?")
                .bind(from.to_string())
                .bind(item_id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        let source = match source {
            Some(row) => row_to_entry(&row)?,
            None => {
                return Err(RepositoryError::not_found(
                    "Inventory entry",
                    format!("{from}/{item_id}"),
                ))
            }
        };

        if source.equipped {
            return Err(RepositoryError::Constraint(
                "An equipped item cannot be transferred".to_string(),
            ));
        }
        if source.quantity < quantity {
            return Err(RepositoryError::Constraint(format!(
                "Not enough to transfer: have {}, need {quantity}",
                source.quantity
            )));
        }

        if source.quantity == quantity {
            sqlx::query("DELETE FROM inventory_items WHERE character_id = ? AND item_id = ?")
                .bind(from.to_string())
                .bind(item_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        } else {
            sqlx::query(
                "UPDATE inventory_items SET quantity = quantity - ? WHERE character_id = ? AND item_id = ?",
            )
            .bind(quantity as i64)
            .bind(from.to_string())
            .bind(item_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        sqlx::query(
            r#"
            INSERT INTO inventory_items (character_id, item_id, quantity, equipped, slot)
            VALUES (?, ?, ?, 0, NULL)
            ON CONFLICT (character_id, item_id)
            DO UPDATE SET quantity = quantity + excluded.quantity
            "#,
        )
        .bind(to.to_string())
        .bind(item_id.to_string())
        .bind(quantity as i64)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }
}
