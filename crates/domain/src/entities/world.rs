//! World entity and the map structures hanging off it.
//!
//! The engine treats world generation as opaque: a generator produces a
//! [`TileGrid`] from `(seed, width, height)` and the repository caches a
//! compressed snapshot of it. The cache is derived state, invalidated on any
//! world mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{PatchId, RegionId, RiverId, StructureId, WorldId};

pub const MIN_WORLD_DIMENSION: u32 = 10;
pub const MAX_WORLD_DIMENSION: u32 = 1000;

/// A generated world. Owns regions, tiles, structures and rivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    pub id: WorldId,
    pub name: String,
    pub seed: i64,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl World {
    pub fn new(
        name: impl Into<String>,
        seed: i64,
        width: u32,
        height: u32,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("World name cannot be empty"));
        }
        for (label, value) in [("width", width), ("height", height)] {
            if !(MIN_WORLD_DIMENSION..=MAX_WORLD_DIMENSION).contains(&value) {
                return Err(DomainError::validation(format!(
                    "World {label} must be between {MIN_WORLD_DIMENSION} and {MAX_WORLD_DIMENSION}, got {value}"
                )));
            }
        }
        Ok(Self {
            id: WorldId::new(),
            name,
            seed,
            width,
            height,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

/// A named area of the world map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: RegionId,
    pub world_id: WorldId,
    pub name: String,
    pub biome: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One cell of the derived tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub x: u32,
    pub y: u32,
    pub terrain: String,
    pub elevation: f32,
}

/// The full derived tile grid, the payload of the world's tile cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Tile>,
}

impl TileGrid {
    pub fn tile_at(&self, x: u32, y: u32) -> Option<&Tile> {
        if x >= self.width {
            return None;
        }
        self.tiles
            .get((y as usize) * (self.width as usize) + x as usize)
    }

    pub fn tile_at_mut(&mut self, x: u32, y: u32) -> Option<&mut Tile> {
        if x >= self.width {
            return None;
        }
        self.tiles
            .get_mut((y as usize) * (self.width as usize) + x as usize)
    }
}

/// A placed structure (building, ruin, landmark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    pub id: StructureId,
    pub world_id: WorldId,
    pub x: u32,
    pub y: u32,
    pub kind: String,
    pub name: Option<String>,
}

/// A river as an ordered list of tile coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct River {
    pub id: RiverId,
    pub world_id: WorldId,
    pub path: Vec<(u32, u32)>,
}

/// A single map-patch operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PatchOp {
    SetTile { x: u32, y: u32, terrain: String },
    PlaceStructure {
        x: u32,
        y: u32,
        kind: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
    RemoveStructure { x: u32, y: u32 },
}

impl PatchOp {
    pub fn coordinates(&self) -> (u32, u32) {
        match self {
            Self::SetTile { x, y, .. }
            | Self::PlaceStructure { x, y, .. }
            | Self::RemoveStructure { x, y } => (*x, *y),
        }
    }
}

/// An applied (or previewed) batch of patch operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPatch {
    pub id: PatchId,
    pub world_id: WorldId,
    pub ops: Vec<PatchOp>,
    pub applied_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_world_dimension_bounds() {
        assert!(World::new("Aria", 7, 100, 100, now()).is_ok());
        assert!(World::new("Aria", 7, 9, 100, now()).is_err());
        assert!(World::new("Aria", 7, 100, 1001, now()).is_err());
        assert!(World::new("  ", 7, 100, 100, now()).is_err());
    }

    #[test]
    fn test_tile_grid_indexing() {
        let tiles = (0..6)
            .map(|i| Tile {
                x: i % 3,
                y: i / 3,
                terrain: "plains".into(),
                elevation: 0.0,
            })
            .collect();
        let grid = TileGrid {
            width: 3,
            height: 2,
            tiles,
        };
        assert_eq!(grid.tile_at(2, 1).map(|t| (t.x, t.y)), Some((2, 1)));
        assert!(grid.tile_at(0, 2).is_none());
    }

    #[test]
    fn test_patch_op_serde_tag() {
        let op = PatchOp::SetTile {
            x: 1,
            y: 2,
            terrain: "forest".into(),
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["op"], "set_tile");
    }
}
