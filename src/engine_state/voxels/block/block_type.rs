//! # Block Type Module
//!
//! This module defines the different types of blocks in the voxel world
//! and the conversion from the compact stored id back to the rich enum.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use super::BlockTypeSize;

/// Enumerates all possible block types in the voxel world.
///
/// The discriminant is the id stored in every chunk cell. `EMPTY` is the reserved
/// sentinel for air and is the only non-solid type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Air. Never rendered, never collided with.
    EMPTY = 0,

    /// The surface block placed at the top of every terrain column.
    GRASS = 1,

    /// Fill placed below the surface wherever no resource was generated.
    DIRT = 2,

    /// The most common resource, generated in large veins.
    STONE = 3,

    /// Coal ore, rarer than stone.
    COAL = 4,

    /// Iron ore, the rarest resource.
    IRON = 5,
}

impl BlockType {
    /// Converts a stored id to a `BlockType`, returning `None` for unknown ids.
    pub fn from_id(id: BlockTypeSize) -> Option<Self> {
        FromPrimitive::from_u8(id)
    }

    /// The compact id stored in chunk cells.
    pub fn id(self) -> BlockTypeSize {
        self as BlockTypeSize
    }

    /// Every block type in id order.
    pub fn all() -> [BlockType; 6] {
        [
            BlockType::EMPTY,
            BlockType::GRASS,
            BlockType::DIRT,
            BlockType::STONE,
            BlockType::COAL,
            BlockType::IRON,
        ]
    }
}
