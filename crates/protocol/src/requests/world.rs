//! World lifecycle and map-patch requests.

use serde::{Deserialize, Serialize};

use questwright_domain::entities::{PatchOp, MAX_WORLD_DIMENSION, MIN_WORLD_DIMENSION};
use questwright_domain::{DomainError, RegionId, WorldId};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWorldRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    pub width: u32,
    pub height: u32,
}

impl GenerateWorldRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        for (label, value) in [("width", self.width), ("height", self.height)] {
            if !(MIN_WORLD_DIMENSION..=MAX_WORLD_DIMENSION).contains(&value) {
                return Err(DomainError::validation(format!(
                    "{label} must be within {MIN_WORLD_DIMENSION}..={MAX_WORLD_DIMENSION}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorldStateRequest {
    pub world_id: WorldId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPatchRequest {
    pub world_id: WorldId,
    pub ops: Vec<PatchOp>,
}

impl MapPatchRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.ops.is_empty() {
            return Err(DomainError::validation("patch must contain at least one op"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorldMapOverviewRequest {
    pub world_id: WorldId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRegionMapRequest {
    pub world_id: WorldId,
    pub region_id: RegionId,
}

/// Viewport into the tile grid; omitted bounds mean the whole grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWorldTilesRequest {
    pub world_id: WorldId,
    #[serde(default)]
    pub x: u32,
    #[serde(default)]
    pub y: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_world_bounds() {
        let mut request = GenerateWorldRequest {
            name: "Aria".into(),
            seed: None,
            width: 100,
            height: 100,
        };
        assert!(request.validate().is_ok());
        request.width = 5;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_patch_request_rejects_empty_ops() {
        let request = MapPatchRequest {
            world_id: WorldId::new(),
            ops: vec![],
        };
        assert!(request.validate().is_err());
    }
}
