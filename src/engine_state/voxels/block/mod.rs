//! # Block Module
//!
//! This module provides the core block-related functionality for the voxel world.
//! It includes block type definitions, the static block catalog, block face handling,
//! and the per-cell data stored by chunks.

use block_type::BlockType;
use phf::phf_map;

pub mod block_side;
pub mod block_type;

/// The underlying integer type used to represent block types in memory.
pub type BlockTypeSize = u8;

/// Static material and physical properties of one block type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlockProperties {
    /// Human readable name, also used in log output.
    pub name: &'static str,
    /// Base color handed to the renderer, as 0xRRGGBB.
    pub color: u32,
    /// Whether the block occupies space for collision and occlusion.
    pub solid: bool,
}

/// Maps each block id to its properties.
pub static BLOCK_CATALOG: phf::Map<u8, BlockProperties> = phf_map! {
    0u8 => BlockProperties { name: "empty", color: 0x000000, solid: false },
    1u8 => BlockProperties { name: "grass", color: 0x559020, solid: true },
    2u8 => BlockProperties { name: "dirt", color: 0x807020, solid: true },
    3u8 => BlockProperties { name: "stone", color: 0x808080, solid: true },
    4u8 => BlockProperties { name: "coal_ore", color: 0x202020, solid: true },
    5u8 => BlockProperties { name: "iron_ore", color: 0x806060, solid: true },
};

/// One cell of a chunk.
///
/// `instance_index` is the slot of this cell's render instance inside the batch for its
/// block type. It is `None` for empty cells and for cells hidden on all six sides.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The type of this block, encoded as a `BlockTypeSize` for compact storage.
    pub block_type: BlockTypeSize,
    /// Slot in the block type's instance batch, if rendered.
    pub instance_index: Option<u32>,
}

impl Default for Block {
    fn default() -> Self {
        Block::new(BlockType::EMPTY)
    }
}

impl Block {
    /// Creates a new, unrendered block of the specified type.
    pub fn new(block_type: BlockType) -> Self {
        Block {
            block_type: block_type as BlockTypeSize,
            instance_index: None,
        }
    }

    /// Returns `true` for the air sentinel.
    pub fn is_empty(&self) -> bool {
        self.block_type == BlockType::EMPTY as BlockTypeSize
    }

    /// Looks up this block's catalog entry.
    pub fn properties(&self) -> Option<&'static BlockProperties> {
        BLOCK_CATALOG.get(&self.block_type)
    }

    /// Returns `true` if the block takes part in collision. Unknown ids count as solid.
    pub fn is_solid(&self) -> bool {
        self.properties().map_or(!self.is_empty(), |properties| properties.solid)
    }
}
