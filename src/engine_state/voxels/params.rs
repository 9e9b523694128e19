//! # Generation Parameters
//!
//! The immutable bundle every chunk is generated from. A world is fully described by
//! its `ChunkSize` and `GenerationParams`; nothing else feeds generation, which is what
//! makes chunks independently regenerable.

use serde::{Deserialize, Serialize};

use crate::engine_state::config::ConfigError;

use super::block::block_type::BlockType;

/// Dimensions of every chunk in the world, in blocks.
///
/// `width` applies to both horizontal axes. Chunks do not tile vertically.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSize {
    /// Extent along X and Z.
    pub width: usize,
    /// Extent along Y.
    pub height: usize,
}

impl Default for ChunkSize {
    fn default() -> Self {
        ChunkSize {
            width: 32,
            height: 32,
        }
    }
}

impl ChunkSize {
    /// Total number of cells in a chunk of this size.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.width
    }
}

/// Shape of the 2D height field.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Horizontal distance, in blocks, over which the noise varies.
    pub scale: f64,
    /// Multiplier applied to the raw noise value.
    pub magnitude: f64,
    /// Constant added after scaling, as a fraction of chunk height.
    pub offset: f64,
}

impl Default for TerrainParams {
    fn default() -> Self {
        TerrainParams {
            scale: 30.0,
            magnitude: 0.5,
            offset: 0.2,
        }
    }
}

/// One resource vein layer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceParams {
    /// Block placed where the noise exceeds `scarcity`.
    pub block: BlockType,
    /// Per-axis noise scale (x, y, z).
    pub scale: [f64; 3],
    /// Noise threshold in `[0, 1]`; higher is rarer.
    pub scarcity: f64,
}

/// Everything needed to deterministically generate any chunk of a world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    /// World seed; feeds the PRNG that seeds all noise fields.
    pub seed: i64,
    /// Height field parameters.
    pub terrain: TerrainParams,
    /// Resource layers in application order. Later entries overwrite earlier ones.
    pub resources: Vec<ResourceParams>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            seed: 0,
            terrain: TerrainParams::default(),
            resources: vec![
                ResourceParams {
                    block: BlockType::STONE,
                    scale: [30.0, 30.0, 30.0],
                    scarcity: 0.5,
                },
                ResourceParams {
                    block: BlockType::COAL,
                    scale: [20.0, 20.0, 20.0],
                    scarcity: 0.8,
                },
                ResourceParams {
                    block: BlockType::IRON,
                    scale: [40.0, 40.0, 40.0],
                    scarcity: 0.9,
                },
            ],
        }
    }
}

impl GenerationParams {
    /// Rejects parameter combinations that would divide by zero or place air as a resource.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.terrain.scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "terrain scale must be positive, got {}",
                self.terrain.scale
            )));
        }
        for resource in &self.resources {
            if resource.block == BlockType::EMPTY {
                return Err(ConfigError::Invalid(
                    "a resource layer cannot place empty blocks".to_string(),
                ));
            }
            if resource.scale.iter().any(|axis| !(*axis > 0.0)) {
                return Err(ConfigError::Invalid(format!(
                    "resource {:?} has a non-positive scale {:?}",
                    resource.block, resource.scale
                )));
            }
        }
        Ok(())
    }
}

impl ChunkSize {
    /// Rejects zero-sized chunks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "chunk dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GenerationParams::default().validate().is_ok());
        assert!(ChunkSize::default().validate().is_ok());
    }

    #[test]
    fn zero_terrain_scale_is_rejected() {
        let mut params = GenerationParams::default();
        params.terrain.scale = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn empty_resource_is_rejected() {
        let mut params = GenerationParams::default();
        params.resources[0].block = BlockType::EMPTY;
        assert!(params.validate().is_err());
    }

    #[test]
    fn nan_resource_scale_is_rejected() {
        let mut params = GenerationParams::default();
        params.resources[1].scale[2] = f64::NAN;
        assert!(params.validate().is_err());
    }

    #[test]
    fn volume_uses_width_twice() {
        let size = ChunkSize {
            width: 4,
            height: 10,
        };
        assert_eq!(size.volume(), 160);
    }
}
