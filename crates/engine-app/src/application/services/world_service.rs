//! World lifecycle: generation through the opaque generator port, tile-cache
//! maintenance, and the map-patch DSL.
//!
//! The tile cache is derived state. Reads decode it when present; otherwise
//! the grid is rebuilt from the generator plus the replayed patch history and
//! cached again. Every mutation clears it.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use questwright_domain::entities::{
    MapPatch, PatchOp, Region, Structure, Tile, TileGrid, World,
};
use questwright_domain::{DomainEvent, PatchId, RegionId, StructureId, WorldId};
use questwright_engine_ports::outbound::{
    AuditLogPort, ClockPort, EventBusPort, TileCachePort, WorldGeneratorPort, WorldRepositoryPort,
};
use questwright_protocol::requests::world::{GenerateWorldRequest, MapPatchRequest};

use crate::application::error::ToolError;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldView {
    pub world: World,
    pub regions: Vec<Region>,
    pub structure_count: usize,
    pub river_count: usize,
}

/// Dry-run result of a map patch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPatchPreview {
    pub world_id: WorldId,
    pub tiles_changed: usize,
    pub structures_placed: usize,
    pub structures_removed: usize,
    /// Ops rejected with the reason; a non-empty list fails an apply
    pub rejected: Vec<String>,
}

pub struct WorldService {
    worlds: Arc<dyn WorldRepositoryPort>,
    generator: Arc<dyn WorldGeneratorPort>,
    tile_codec: Arc<dyn TileCachePort>,
    audit: Arc<dyn AuditLogPort>,
    events: Arc<dyn EventBusPort>,
    clock: Arc<dyn ClockPort>,
}

impl WorldService {
    pub fn new(
        worlds: Arc<dyn WorldRepositoryPort>,
        generator: Arc<dyn WorldGeneratorPort>,
        tile_codec: Arc<dyn TileCachePort>,
        audit: Arc<dyn AuditLogPort>,
        events: Arc<dyn EventBusPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            worlds,
            generator,
            tile_codec,
            audit,
            events,
            clock,
        }
    }

    fn publish_background(&self, event: DomainEvent) {
        let events = self.events.clone();
        tokio::spawn(async move {
            if let Err(err) = events.publish(event).await {
                tracing::warn!(error = %err, "Event publication failed");
            }
        });
    }

    pub async fn generate(&self, request: GenerateWorldRequest) -> Result<WorldView, ToolError> {
        request.validate()?;
        let seed = request.seed.unwrap_or(0);
        let world = World::new(
            request.name,
            seed,
            request.width,
            request.height,
            self.clock.now(),
        )?;

        let generated = self
            .generator
            .generate(world.id, seed, world.width, world.height);
        self.worlds
            .create(
                &world,
                &generated.regions,
                &generated.structures,
                &generated.rivers,
            )
            .await?;

        let blob = self
            .tile_codec
            .encode(&generated.grid)
            .map_err(|err| ToolError::Storage(err.to_string()))?;
        self.worlds.store_tile_cache(world.id, &blob).await?;

        self.audit
            .append(
                "world.generate",
                None,
                Some(&world.id.to_string()),
                json!({"name": world.name, "seed": seed, "width": world.width, "height": world.height}),
            )
            .await?;
        self.publish_background(DomainEvent::WorldGenerated {
            world_id: world.id,
            name: world.name.clone(),
            seed,
        });

        info!(world = %world.id, name = %world.name, "World generated");
        Ok(WorldView {
            regions: generated.regions,
            structure_count: generated.structures.len(),
            river_count: generated.rivers.len(),
            world,
        })
    }

    async fn world(&self, world_id: WorldId) -> Result<World, ToolError> {
        self.worlds
            .find_by_id(world_id)
            .await?
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "World",
                id: world_id.to_string(),
            })
    }

    pub async fn list(&self) -> Result<Vec<World>, ToolError> {
        Ok(self.worlds.list().await?)
    }

    /// Deleting a world cascades its regions, tiles, structures, rivers and
    /// quests.
    pub async fn delete(&self, world_id: WorldId) -> Result<(), ToolError> {
        let world = self.world(world_id).await?;
        self.worlds.delete(world_id).await?;
        self.audit
            .append(
                "world.delete",
                None,
                Some(&world_id.to_string()),
                json!({"name": world.name}),
            )
            .await?;
        Ok(())
    }

    pub async fn state(&self, world_id: WorldId) -> Result<WorldView, ToolError> {
        let world = self.world(world_id).await?;
        let regions = self.worlds.regions_of(world_id).await?;
        let structure_count = self.worlds.structures_of(world_id).await?.len();
        let river_count = self.worlds.rivers_of(world_id).await?.len();
        Ok(WorldView {
            world,
            regions,
            structure_count,
            river_count,
        })
    }

    /// The derived tile grid: cache hit, or rebuild-and-store.
    pub async fn grid(&self, world_id: WorldId) -> Result<TileGrid, ToolError> {
        let world = self.world(world_id).await?;
        if let Some(blob) = self.worlds.tile_cache(world_id).await? {
            match self.tile_codec.decode(&blob) {
                Ok(grid) => return Ok(grid),
                Err(err) => {
                    // A stale or corrupt cache falls through to a rebuild
                    debug!(world = %world_id, error = %err, "Tile cache decode failed");
                }
            }
        }

        let mut grid = self
            .generator
            .generate(world.id, world.seed, world.width, world.height)
            .grid;
        for patch in self.worlds.patches_of(world_id).await? {
            for op in &patch.ops {
                if let PatchOp::SetTile { x, y, terrain } = op {
                    if let Some(tile) = grid.tile_at_mut(*x, *y) {
                        tile.terrain = terrain.clone();
                    }
                }
            }
        }

        let blob = self
            .tile_codec
            .encode(&grid)
            .map_err(|err| ToolError::Storage(err.to_string()))?;
        self.worlds.store_tile_cache(world_id, &blob).await?;
        debug!(world = %world_id, "Tile cache rebuilt");
        Ok(grid)
    }

    pub async fn tiles(
        &self,
        world_id: WorldId,
        x: u32,
        y: u32,
        width: Option<u32>,
        height: Option<u32>,
    ) -> Result<Vec<Tile>, ToolError> {
        let grid = self.grid(world_id).await?;
        let x_end = width.map_or(grid.width, |w| (x + w).min(grid.width));
        let y_end = height.map_or(grid.height, |h| (y + h).min(grid.height));
        let mut tiles = Vec::new();
        for ty in y..y_end {
            for tx in x..x_end {
                if let Some(tile) = grid.tile_at(tx, ty) {
                    tiles.push(tile.clone());
                }
            }
        }
        Ok(tiles)
    }

    /// Terrain histogram plus the region list, cheap enough to hand an LLM.
    pub async fn map_overview(&self, world_id: WorldId) -> Result<serde_json::Value, ToolError> {
        let grid = self.grid(world_id).await?;
        let regions = self.worlds.regions_of(world_id).await?;
        let structures = self.worlds.structures_of(world_id).await?;

        let mut terrain_counts = std::collections::BTreeMap::new();
        for tile in &grid.tiles {
            *terrain_counts.entry(tile.terrain.clone()).or_insert(0u32) += 1;
        }
        Ok(json!({
            "worldId": world_id,
            "width": grid.width,
            "height": grid.height,
            "terrainCounts": terrain_counts,
            "regions": regions,
            "structures": structures.len(),
        }))
    }

    pub async fn region_map(
        &self,
        world_id: WorldId,
        region_id: RegionId,
    ) -> Result<serde_json::Value, ToolError> {
        let region = self
            .worlds
            .find_region(region_id)
            .await?
            .filter(|region| region.world_id == world_id)
            .ok_or_else(|| ToolError::NotFound {
                entity_type: "Region",
                id: region_id.to_string(),
            })?;
        let tiles = self
            .tiles(
                world_id,
                region.x,
                region.y,
                Some(region.width),
                Some(region.height),
            )
            .await?;
        Ok(json!({"region": region, "tiles": tiles}))
    }

    /// Validate ops against world bounds without writing anything.
    pub async fn preview_patch(
        &self,
        request: &MapPatchRequest,
    ) -> Result<MapPatchPreview, ToolError> {
        request.validate()?;
        let world = self.world(request.world_id).await?;
        let structures = self.worlds.structures_of(request.world_id).await?;

        let mut preview = MapPatchPreview {
            world_id: request.world_id,
            tiles_changed: 0,
            structures_placed: 0,
            structures_removed: 0,
            rejected: Vec::new(),
        };
        for op in &request.ops {
            let (x, y) = op.coordinates();
            if !world.contains(x, y) {
                preview
                    .rejected
                    .push(format!("({x},{y}) is outside the {}x{} world", world.width, world.height));
                continue;
            }
            match op {
                PatchOp::SetTile { .. } => preview.tiles_changed += 1,
                PatchOp::PlaceStructure { .. } => preview.structures_placed += 1,
                PatchOp::RemoveStructure { x, y } => {
                    if structures.iter().any(|s| s.x == *x && s.y == *y) {
                        preview.structures_removed += 1;
                    } else {
                        preview.rejected.push(format!("no structure at ({x},{y})"));
                    }
                }
            }
        }
        Ok(preview)
    }

    /// Apply a patch: structure rows change, the patch is recorded for grid
    /// rebuilds, and the tile cache is invalidated in the same transaction.
    pub async fn apply_patch(
        &self,
        request: MapPatchRequest,
    ) -> Result<MapPatchPreview, ToolError> {
        let preview = self.preview_patch(&request).await?;
        if !preview.rejected.is_empty() {
            return Err(ToolError::Validation {
                message: "Patch contains invalid ops".to_string(),
                details: Some(json!({"rejected": preview.rejected})),
            });
        }

        let structures = self.worlds.structures_of(request.world_id).await?;
        let mut upserts: Vec<Structure> = Vec::new();
        let mut removals: Vec<StructureId> = Vec::new();
        for op in &request.ops {
            match op {
                PatchOp::PlaceStructure { x, y, kind, name } => upserts.push(Structure {
                    id: StructureId::new(),
                    world_id: request.world_id,
                    x: *x,
                    y: *y,
                    kind: kind.clone(),
                    name: name.clone(),
                }),
                PatchOp::RemoveStructure { x, y } => {
                    removals.extend(
                        structures
                            .iter()
                            .filter(|s| s.x == *x && s.y == *y)
                            .map(|s| s.id),
                    );
                }
                PatchOp::SetTile { .. } => {}
            }
        }

        let patch = MapPatch {
            id: PatchId::new(),
            world_id: request.world_id,
            ops: request.ops.clone(),
            applied_at: self.clock.now(),
        };
        self.worlds.apply_patch(&patch, &upserts, &removals).await?;

        self.audit
            .append(
                "world.apply_patch",
                None,
                Some(&request.world_id.to_string()),
                json!({"ops": patch.ops.len(), "patchId": patch.id}),
            )
            .await?;
        self.publish_background(DomainEvent::MapPatchApplied {
            world_id: request.world_id,
            op_count: patch.ops.len(),
        });
        info!(world = %request.world_id, ops = patch.ops.len(), "Map patch applied");
        Ok(preview)
    }
}
