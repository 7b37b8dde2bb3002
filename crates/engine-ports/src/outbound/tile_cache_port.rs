//! Tile cache codec port.

use questwright_domain::entities::TileGrid;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TileCacheError {
    #[error("Tile cache encode failed: {0}")]
    Encode(String),
    #[error("Tile cache decode failed: {0}")]
    Decode(String),
}

/// Compresses the derived tile grid into the `tile_cache` column and back.
/// `decode(encode(grid))` must reproduce the grid exactly.
pub trait TileCachePort: Send + Sync {
    fn encode(&self, grid: &TileGrid) -> Result<Vec<u8>, TileCacheError>;

    fn decode(&self, blob: &[u8]) -> Result<TileGrid, TileCacheError>;
}
