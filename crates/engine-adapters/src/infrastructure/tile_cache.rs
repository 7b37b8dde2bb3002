//! Gzip tile-cache codec.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use questwright_domain::entities::TileGrid;
use questwright_engine_ports::outbound::{TileCacheError, TileCachePort};

#[derive(Debug, Clone, Copy, Default)]
pub struct GzipTileCache;

impl GzipTileCache {
    pub fn new() -> Self {
        Self
    }
}

impl TileCachePort for GzipTileCache {
    fn encode(&self, grid: &TileGrid) -> Result<Vec<u8>, TileCacheError> {
        let json =
            serde_json::to_vec(grid).map_err(|err| TileCacheError::Encode(err.to_string()))?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|err| TileCacheError::Encode(err.to_string()))?;
        encoder
            .finish()
            .map_err(|err| TileCacheError::Encode(err.to_string()))
    }

    fn decode(&self, blob: &[u8]) -> Result<TileGrid, TileCacheError> {
        let mut decoder = GzDecoder::new(blob);
        let mut json = Vec::new();
        decoder
            .read_to_end(&mut json)
            .map_err(|err| TileCacheError::Decode(err.to_string()))?;
        serde_json::from_slice(&json).map_err(|err| TileCacheError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use questwright_domain::entities::Tile;

    fn sample_grid() -> TileGrid {
        let tiles = (0..12)
            .map(|i| Tile {
                x: i % 4,
                y: i / 4,
                terrain: if i % 3 == 0 { "forest" } else { "plains" }.to_string(),
                elevation: (i as f32) / 10.0,
            })
            .collect();
        TileGrid {
            width: 4,
            height: 3,
            tiles,
        }
    }

    #[test]
    fn test_round_trip_identity() {
        let codec = GzipTileCache::new();
        let grid = sample_grid();
        let blob = codec.encode(&grid).unwrap();
        let decoded = codec.decode(&blob).unwrap();
        assert_eq!(decoded, grid);
    }

    #[test]
    fn test_compression_shrinks_repetitive_grids() {
        let codec = GzipTileCache::new();
        let grid = sample_grid();
        let blob = codec.encode(&grid).unwrap();
        let raw = serde_json::to_vec(&grid).unwrap();
        assert!(blob.len() < raw.len());
    }

    #[test]
    fn test_garbage_decode_fails() {
        let codec = GzipTileCache::new();
        assert!(codec.decode(b"not gzip at all").is_err());
    }
}
