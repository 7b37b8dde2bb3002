//! Default world generator.
//!
//! The engine treats generation as opaque; this adapter derives a plausible
//! terrain layout from a ChaCha8 stream over the seed, deterministic by
//! construction. Anything fancier (noise octaves, climate) plugs in behind
//! the same port.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use questwright_domain::entities::{Region, River, Structure, Tile, TileGrid};
use questwright_domain::{RegionId, RiverId, StructureId, WorldId};
use questwright_engine_ports::outbound::{GeneratedWorld, WorldGeneratorPort};

const TERRAINS: [&str; 6] = ["plains", "forest", "hills", "mountains", "swamp", "desert"];
const BIOMES: [&str; 4] = ["temperate", "boreal", "arid", "coastal"];
const STRUCTURE_KINDS: [&str; 4] = ["village", "tower", "ruin", "shrine"];

#[derive(Debug, Clone, Copy, Default)]
pub struct SeededWorldGenerator;

impl SeededWorldGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl WorldGeneratorPort for SeededWorldGenerator {
    fn generate(&self, world_id: WorldId, seed: i64, width: u32, height: u32) -> GeneratedWorld {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);

        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let terrain = TERRAINS[rng.gen_range(0..TERRAINS.len())];
                tiles.push(Tile {
                    x,
                    y,
                    terrain: terrain.to_string(),
                    elevation: rng.gen_range(0.0..1.0),
                });
            }
        }
        let grid = TileGrid {
            width,
            height,
            tiles,
        };

        // Quarter the map into regions
        let half_w = (width / 2).max(1);
        let half_h = (height / 2).max(1);
        let regions = (0..4u32)
            .map(|quadrant| Region {
                id: RegionId::new(),
                world_id,
                name: format!("Region {}", quadrant + 1),
                biome: BIOMES[rng.gen_range(0..BIOMES.len())].to_string(),
                x: (quadrant % 2) * half_w,
                y: (quadrant / 2) * half_h,
                width: half_w,
                height: half_h,
            })
            .collect();

        let structure_count = ((width * height) / 2500).clamp(1, 12);
        let structures = (0..structure_count)
            .map(|_| Structure {
                id: StructureId::new(),
                world_id,
                x: rng.gen_range(0..width),
                y: rng.gen_range(0..height),
                kind: STRUCTURE_KINDS[rng.gen_range(0..STRUCTURE_KINDS.len())].to_string(),
                name: None,
            })
            .collect();

        // One river wandering top to bottom
        let mut path = Vec::with_capacity(height as usize);
        let mut river_x = rng.gen_range(0..width);
        for y in 0..height {
            path.push((river_x, y));
            let drift = rng.gen_range(-1i64..=1);
            river_x = (river_x as i64 + drift).clamp(0, width as i64 - 1) as u32;
        }
        let rivers = vec![River {
            id: RiverId::new(),
            world_id,
            path,
        }];

        GeneratedWorld {
            grid,
            regions,
            structures,
            rivers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terrain_is_deterministic_in_seed() {
        let generator = SeededWorldGenerator::new();
        let world_id = WorldId::new();
        let a = generator.generate(world_id, 42, 20, 20);
        let b = generator.generate(world_id, 42, 20, 20);
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_grid_covers_dimensions() {
        let generator = SeededWorldGenerator::new();
        let generated = generator.generate(WorldId::new(), 7, 15, 10);
        assert_eq!(generated.grid.tiles.len(), 150);
        assert_eq!(generated.grid.tile_at(14, 9).map(|t| (t.x, t.y)), Some((14, 9)));
        assert!(!generated.regions.is_empty());
        assert_eq!(generated.rivers[0].path.len(), 10);
    }
}
