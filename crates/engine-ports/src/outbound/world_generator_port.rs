//! World generator port.
//!
//! Generation math is outside the core: the engine hands over
//! `(seed, width, height)` and consumes whatever comes back. The output must
//! be deterministic in the seed.

use questwright_domain::entities::{Region, River, Structure, TileGrid};
use questwright_domain::WorldId;

/// Everything a generator derives for a new world.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    pub grid: TileGrid,
    pub regions: Vec<Region>,
    pub structures: Vec<Structure>,
    pub rivers: Vec<River>,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait WorldGeneratorPort: Send + Sync {
    /// Derive the tile grid and map features for a world. `world_id` is
    /// stamped onto the generated rows.
    fn generate(&self, world_id: WorldId, seed: i64, width: u32, height: u32) -> GeneratedWorld;
}
