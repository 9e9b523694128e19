//! # Chunk Module
//!
//! This module provides the `Chunk` struct: a fixed-size `width x height x width` grid of
//! cells, the per block type instance batches derived from it, and single block removal.
//!
//! ## Lifecycle
//!
//! 1. `Chunk::new` allocates an all-empty grid at a world offset
//! 2. `generate` fills it from noise (see `chunk_generation`)
//! 3. `generate_meshes` derives the visible instance batches (see `chunk_meshing`)
//! 4. `remove_block` edits a single cell and patches the batches in O(1)
//! 5. `dispose` releases the batches and the grid when the chunk is streamed out
//!
//! ## Storage
//!
//! Cells are stored in one flat vector, X fastest, then Y, then Z. The grid is never
//! resized after construction. Every coordinate-taking method accepts signed
//! coordinates and treats anything outside the grid as absent rather than panicking.

use std::collections::BTreeMap;

use cgmath::{Point3, Vector3};

use super::block::block_side::BlockSide;
use super::block::block_type::BlockType;
use super::block::{Block, BlockTypeSize};
use super::params::ChunkSize;
use instance_batch::{InstanceBatch, InstanceRaw};

pub mod chunk_generation;
pub mod chunk_meshing;
pub mod instance_batch;

/// Spatial placement of a chunk, handed to the renderer by reference.
///
/// Instance transforms are chunk-local; the renderer composes them with this node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpatialNode {
    /// World-space translation of the chunk's origin corner.
    pub translation: Vector3<f32>,
}

/// A change to a chunk's instance batches that the renderer has to mirror.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderEvent {
    /// Every batch was rebuilt from scratch.
    BatchesRebuilt,
    /// A new instance was appended at `slot`.
    InstanceAdded {
        /// Batch the instance belongs to.
        block_type: BlockType,
        /// Slot the instance was written to.
        slot: u32,
    },
    /// The instance in slot `from` was copied into slot `to`.
    InstanceMoved {
        /// Batch the move happened in.
        block_type: BlockType,
        /// Previous slot, now inactive.
        from: u32,
        /// New slot.
        to: u32,
    },
    /// The batch shrank by one; `slot` is no longer active.
    InstanceRemoved {
        /// Batch that shrank.
        block_type: BlockType,
        /// The slot that fell out of the active range.
        slot: u32,
    },
}

/// Represents a `width x height x width` collection of voxel blocks in the world.
pub struct Chunk {
    /// World-space block coordinates of this chunk's origin corner.
    pub position: Point3<i32>,
    size: ChunkSize,
    blocks: Vec<Block>,
    batches: BTreeMap<BlockTypeSize, InstanceBatch>,
    render_events: Vec<RenderEvent>,
}

impl Chunk {
    /// Creates a new, completely empty chunk (all blocks are air) with no batches.
    ///
    /// # Arguments
    /// * `size` - The chunk dimensions
    /// * `position` - World-space origin of the chunk
    pub fn new(size: ChunkSize, position: Point3<i32>) -> Self {
        Chunk {
            position,
            size,
            blocks: vec![Block::default(); size.volume()],
            batches: BTreeMap::new(),
            render_events: Vec::new(),
        }
    }

    /// Builds a chunk whose cells are given by `block_at(x, y, z)`, then meshes it.
    ///
    /// This is the authoring path for hand-built chunks (tests, prefabs); procedural
    /// chunks go through [`Chunk::generate`].
    pub fn from_fn<F>(size: ChunkSize, position: Point3<i32>, mut block_at: F) -> Self
    where
        F: FnMut(usize, usize, usize) -> BlockType,
    {
        let mut chunk = Chunk::new(size, position);
        for z in 0..size.width {
            for y in 0..size.height {
                for x in 0..size.width {
                    let index = chunk.linear_index(x, y, z);
                    chunk.blocks[index] = Block::new(block_at(x, y, z));
                }
            }
        }
        chunk.generate_meshes();
        chunk
    }

    /// The chunk dimensions.
    pub fn size(&self) -> ChunkSize {
        self.size
    }

    /// Placement for the renderer.
    pub fn spatial_node(&self) -> SpatialNode {
        SpatialNode {
            translation: Vector3::new(
                self.position.x as f32,
                self.position.y as f32,
                self.position.z as f32,
            ),
        }
    }

    /// Checks the coordinates are inside the grid.
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.size.width
            && (y as usize) < self.size.height
            && (z as usize) < self.size.width
    }

    /// Gets the block at the specified chunk-relative coordinates.
    ///
    /// # Returns
    /// `None` if the coordinates are outside the chunk.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        self.index_of(x, y, z).map(|index| &self.blocks[index])
    }

    /// Returns `true` if every one of the six neighbors is non-empty.
    ///
    /// Neighbors outside the chunk count as empty, so boundary blocks are never obscured.
    pub fn is_block_obscured(&self, x: i32, y: i32, z: i32) -> bool {
        BlockSide::all().iter().all(|side| {
            let offset = side.neighbor_offset();
            self.get_block(x + offset.x, y + offset.y, z + offset.z)
                .is_some_and(|neighbor| !neighbor.is_empty())
        })
    }

    /// The batch for `block_type`, if any instance of it was ever meshed.
    pub fn batch(&self, block_type: BlockType) -> Option<&InstanceBatch> {
        self.batches.get(&block_type.id())
    }

    /// All batches, in block id order.
    pub fn batches(&self) -> impl Iterator<Item = &InstanceBatch> {
        self.batches.values()
    }

    /// Total number of active instances across every batch.
    pub fn instance_count(&self) -> usize {
        self.batches.values().map(InstanceBatch::len).sum()
    }

    /// Takes every render event recorded since the last call.
    pub fn drain_render_events(&mut self) -> Vec<RenderEvent> {
        std::mem::take(&mut self.render_events)
    }

    /// Removes the block at the specified chunk-relative coordinates.
    ///
    /// The block's render instance is removed by moving the batch's last instance into
    /// its slot, so the batch stays dense. Neighbors that were hidden behind the removed
    /// block become visible and are appended to their batches.
    ///
    /// # Returns
    /// The type of the removed block, or `None` if the cell was empty or out of bounds.
    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        let index = self.index_of(x, y, z)?;
        let block = self.blocks[index];
        if block.is_empty() {
            return None;
        }

        if let Some(slot) = block.instance_index {
            self.release_instance(block.block_type, slot);
        }
        self.blocks[index] = Block::default();

        for side in BlockSide::all() {
            let offset = side.neighbor_offset();
            self.expose_block(x + offset.x, y + offset.y, z + offset.z);
        }

        BlockType::from_id(block.block_type)
    }

    /// Releases the batches and the cell grid.
    ///
    /// # Returns
    /// The number of render instances that were released.
    pub fn dispose(mut self) -> usize {
        let released = self.instance_count();
        for batch in self.batches.values_mut() {
            batch.clear();
        }
        self.batches.clear();
        self.blocks = Vec::new();
        released
    }

    /// Overwrites a cell's type without touching the batches.
    ///
    /// Only used by generation, which always re-meshes afterwards.
    fn set_block_type(&mut self, x: usize, y: usize, z: usize, block_type: BlockType) {
        let index = self.linear_index(x, y, z);
        self.blocks[index] = Block::new(block_type);
    }

    fn block_at(&self, x: usize, y: usize, z: usize) -> &Block {
        &self.blocks[self.linear_index(x, y, z)]
    }

    fn linear_index(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.size.width * (y + self.size.height * z)
    }

    fn index_of(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        if self.in_bounds(x, y, z) {
            Some(self.linear_index(x as usize, y as usize, z as usize))
        } else {
            None
        }
    }

    fn position_of(&self, index: usize) -> Point3<usize> {
        let x = index % self.size.width;
        let y = (index / self.size.width) % self.size.height;
        let z = index / (self.size.width * self.size.height);
        Point3::new(x, y, z)
    }

    /// Appends a render instance for the cell at `index` and records its slot.
    fn add_instance(&mut self, index: usize) {
        let block_type = self.blocks[index].block_type;
        let Some(kind) = BlockType::from_id(block_type) else {
            return;
        };
        let instance = InstanceRaw::at_cell(self.position_of(index));
        let slot = self
            .batches
            .entry(block_type)
            .or_insert_with(|| InstanceBatch::new(kind))
            .push(index, instance);
        self.blocks[index].instance_index = Some(slot);
        self.render_events.push(RenderEvent::InstanceAdded {
            block_type: kind,
            slot,
        });
    }

    /// Swap-removes `slot` from the batch of `block_type` and re-points the moved cell.
    fn release_instance(&mut self, block_type: BlockTypeSize, slot: u32) {
        let Some(batch) = self.batches.get_mut(&block_type) else {
            return;
        };
        if batch.is_empty() {
            return;
        }
        let kind = batch.block_type();
        let last = batch.len() as u32 - 1;
        let Some(moved) = batch.swap_remove(slot) else {
            return;
        };

        if let Some(owner) = moved {
            self.blocks[owner].instance_index = Some(slot);
            self.render_events.push(RenderEvent::InstanceMoved {
                block_type: kind,
                from: last,
                to: slot,
            });
        }
        self.render_events.push(RenderEvent::InstanceRemoved {
            block_type: kind,
            slot: last,
        });
    }

    /// Gives a hidden, occupied cell a render instance once it is no longer obscured.
    fn expose_block(&mut self, x: i32, y: i32, z: i32) {
        let Some(index) = self.index_of(x, y, z) else {
            return;
        };
        let block = self.blocks[index];
        if block.is_empty() || block.instance_index.is_some() || self.is_block_obscured(x, y, z)
        {
            return;
        }
        self.add_instance(index);
    }
}
