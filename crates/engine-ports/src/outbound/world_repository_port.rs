//! World repository port.
//!
//! Any mutation through this port clears the world's tile cache in the same
//! transaction; read paths that miss the cache rebuild it via the generator
//! and store it back.

use async_trait::async_trait;

use questwright_domain::entities::{MapPatch, Region, River, Structure, World};
use questwright_domain::{RegionId, WorldId};

use super::RepositoryError;

#[async_trait]
pub trait WorldRepositoryPort: Send + Sync {
    /// Persist a freshly generated world with its regions, structures and
    /// rivers in one transaction.
    async fn create(
        &self,
        world: &World,
        regions: &[Region],
        structures: &[Structure],
        rivers: &[River],
    ) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: WorldId) -> Result<Option<World>, RepositoryError>;

    async fn list(&self) -> Result<Vec<World>, RepositoryError>;

    /// Cascades regions, tiles, structures, rivers and quests.
    async fn delete(&self, id: WorldId) -> Result<(), RepositoryError>;

    async fn regions_of(&self, world_id: WorldId) -> Result<Vec<Region>, RepositoryError>;

    async fn find_region(&self, id: RegionId) -> Result<Option<Region>, RepositoryError>;

    async fn structures_of(&self, world_id: WorldId) -> Result<Vec<Structure>, RepositoryError>;

    async fn rivers_of(&self, world_id: WorldId) -> Result<Vec<River>, RepositoryError>;

    /// Apply patch structure changes and record the patch row; clears the
    /// tile cache in the same transaction.
    async fn apply_patch(
        &self,
        patch: &MapPatch,
        upserts: &[Structure],
        removals: &[questwright_domain::StructureId],
    ) -> Result<(), RepositoryError>;

    /// Applied patches in application order, for grid rebuilds.
    async fn patches_of(&self, world_id: WorldId) -> Result<Vec<MapPatch>, RepositoryError>;

    async fn tile_cache(&self, world_id: WorldId) -> Result<Option<Vec<u8>>, RepositoryError>;

    async fn store_tile_cache(
        &self,
        world_id: WorldId,
        blob: &[u8],
    ) -> Result<(), RepositoryError>;
}
