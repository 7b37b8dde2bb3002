//! SQLite world repository.
//!
//! Mutations clear the `tile_cache` column inside their own transaction;
//! the read path stores a rebuilt cache back through `store_tile_cache`.

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use questwright_domain::entities::{MapPatch, Region, River, Structure, World};
use questwright_domain::{RegionId, StructureId, WorldId};
use questwright_engine_ports::outbound::{RepositoryError, WorldRepositoryPort};

use super::converters::{
    decode_id, decode_timestamp, encode_timestamp, json_decode, json_encode, map_sqlx,
};

pub struct SqliteWorldRepository {
    pool: SqlitePool,
}

impl SqliteWorldRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_world(row: &SqliteRow) -> Result<World, RepositoryError> {
    Ok(World {
        id: decode_id(row.get("id"))?,
        name: row.get("name"),
        seed: row.get("seed"),
        width: row.get::<i64, _>("width") as u32,
        height: row.get::<i64, _>("height") as u32,
        created_at: decode_timestamp(row.get("created_at"))?,
        updated_at: decode_timestamp(row.get("updated_at"))?,
    })
}

fn row_to_region(row: &SqliteRow) -> Result<Region, RepositoryError> {
    Ok(Region {
        id: decode_id(row.get("id"))?,
        world_id: decode_id(row.get("world_id"))?,
        name: row.get("name"),
        biome: row.get("biome"),
        x: row.get::<i64, _>("x") as u32,
        y: row.get::<i64, _>("y") as u32,
        width: row.get::<i64, _>("width") as u32,
        height: row.get::<i64, _>("height") as u32,
    })
}

fn row_to_structure(row: &SqliteRow) -> Result<Structure, RepositoryError> {
    Ok(Structure {
        id: decode_id(row.get("id"))?,
        world_id: decode_id(row.get("world_id"))?,
        x: row.get::<i64, _>("x") as u32,
        y: row.get::<i64, _>("y") as u32,
        kind: row.get("kind"),
        name: row.get("name"),
    })
}

fn row_to_river(row: &SqliteRow) -> Result<River, RepositoryError> {
    Ok(River {
        id: decode_id(row.get("id"))?,
        world_id: decode_id(row.get("world_id"))?,
        path: json_decode(row.get("path"))?,
    })
}

fn row_to_patch(row: &SqliteRow) -> Result<MapPatch, RepositoryError> {
    Ok(MapPatch {
        id: decode_id(row.get("id"))?,
        world_id: decode_id(row.get("world_id"))?,
        ops: json_decode(row.get("ops"))?,
        applied_at: decode_timestamp(row.get("applied_at"))?,
    })
}

#[async_trait]
impl WorldRepositoryPort for SqliteWorldRepository {
    async fn create(
        &self,
        world: &World,
        regions: &[Region],
        structures: &[Structure],
        rivers: &[River],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query(
            r#"
            INSERT INTO worlds (id, name, seed, width, height, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(world.id.to_string())
        .bind(&world.name)
        .bind(world.seed)
        .bind(world.width as i64)
        .bind(world.height as i64)
        .bind(encode_timestamp(world.created_at))
        .bind(encode_timestamp(world.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx)?;

        for region in regions {
            sqlx::query(
                "INSERT INTO regions (id, world_id, name, biome, x, y, width, height) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(region.id.to_string())
            .bind(region.world_id.to_string())
            .bind(&region.name)
            .bind(&region.biome)
            .bind(region.x as i64)
            .bind(region.y as i64)
            .bind(region.width as i64)
            .bind(region.height as i64)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        for structure in structures {
            sqlx::query(
                "INSERT INTO structures (id, world_id, x, y, kind, name) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(structure.id.to_string())
            .bind(structure.world_id.to_string())
            .bind(structure.x as i64)
            .bind(structure.y as i64)
            .bind(&structure.kind)
            .bind(&structure.name)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }

        for river in rivers {
            sqlx::query("INSERT INTO rivers (id, world_id, path) VALUES (?, ?, ?)")
                .bind(river.id.to_string())
                .bind(river.world_id.to_string())
                .bind(json_encode(&river.path)?)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        }

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn find_by_id(&self, id: WorldId) -> Result<Option<World>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM worlds WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_world).transpose()
    }

    async fn list(&self) -> Result<Vec<World>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM worlds ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_world).collect()
    }

    async fn delete(&self, id: WorldId) -> Result<(), RepositoryError> {
        // Quests cascade via their world_id foreign key, as do regions,
        // tiles, structures, rivers and patches
        sqlx::query("DELETE FROM worlds WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    async fn regions_of(&self, world_id: WorldId) -> Result<Vec<Region>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM regions WHERE world_id = ? ORDER BY name")
            .bind(world_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_region).collect()
    }

    async fn find_region(&self, id: RegionId) -> Result<Option<Region>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM regions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.as_ref().map(row_to_region).transpose()
    }

    async fn structures_of(&self, world_id: WorldId) -> Result<Vec<Structure>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM structures WHERE world_id = ?")
            .bind(world_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_structure).collect()
    }

    async fn rivers_of(&self, world_id: WorldId) -> Result<Vec<River>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM rivers WHERE world_id = ?")
            .bind(world_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_river).collect()
    }

    async fn apply_patch(
        &self,
        patch: &MapPatch,
        upserts: &[Structure],
        removals: &[StructureId],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx)?;

        sqlx::query("INSERT INTO patches (id, world_id, ops, applied_at) VALUES (?, ?, ?, ?)")
            .bind(patch.id.to_string())
            .bind(patch.world_id.to_string())
            .bind(json_encode(&patch.ops)?)
            .bind(encode_timestamp(patch.applied_at))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        for structure in upserts {
            sqlx::query(
                "INSERT INTO structures (id, world_id, x, y, kind, name) VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(structure.id.to_string())
            .bind(structure.world_id.to_string())
            .bind(structure.x as i64)
            .bind(structure.y as i64)
            .bind(&structure.kind)
            .bind(&structure.name)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;
        }
        for structure_id in removals {
            sqlx::query("DELETE FROM structures WHERE id = ?")
                .bind(structure_id.to_string())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx)?;
        }

        // Any world mutation invalidates the derived tile cache
        sqlx::query("UPDATE worlds SET tile_cache = NULL, updated_at = ? WHERE id = ?")
            .bind(encode_timestamp(patch.applied_at))
            .bind(patch.world_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx)?;

        tx.commit().await.map_err(map_sqlx)?;
        Ok(())
    }

    async fn patches_of(&self, world_id: WorldId) -> Result<Vec<MapPatch>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM patches WHERE world_id = ? ORDER BY applied_at, id")
            .bind(world_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.iter().map(row_to_patch).collect()
    }

    async fn tile_cache(&self, world_id: WorldId) -> Result<Option<Vec<u8>>, RepositoryError> {
        let row = sqlx::query("SELECT tile_cache FROM worlds WHERE id = ?")
            .bind(world_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.and_then(|row| row.get::<Option<Vec<u8>>, _>("tile_cache")))
    }

    async fn store_tile_cache(
        &self,
        world_id: WorldId,
        blob: &[u8],
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE worlds SET tile_cache = ? WHERE id = ?")
            .bind(blob)
            .bind(world_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }
}
