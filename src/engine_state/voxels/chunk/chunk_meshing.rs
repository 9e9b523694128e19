//! # Chunk Meshing Module
//!
//! Derives the per block type instance batches from a chunk's cells.
//!
//! ## Occupancy Mask
//!
//! Meshing first packs the grid into an `OccupancyMask`: one bit per cell, padded by an
//! empty layer on every side. With the padding every neighbor lookup is an unchecked bit
//! read, and neighbors outside the chunk read as empty for free, so faces on a chunk
//! boundary are always treated as exposed.

use bitvec::prelude::BitVec;

use crate::engine_state::voxels::block::block_side::BlockSide;

use super::{Chunk, RenderEvent};

/// One bit per cell, `true` for non-empty, with a one-cell empty border.
pub struct OccupancyMask {
    bits: BitVec,
    width_wrapped: usize,
    plane_wrapped: usize,
}

impl OccupancyMask {
    /// Packs the occupancy of `chunk` into a padded bit vector.
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let size = chunk.size();
        let width_wrapped = size.width + 2;
        let height_wrapped = size.height + 2;
        let plane_wrapped = width_wrapped * height_wrapped;

        let mut bits = BitVec::repeat(false, plane_wrapped * width_wrapped);
        for z in 0..size.width {
            for y in 0..size.height {
                for x in 0..size.width {
                    if !chunk.block_at(x, y, z).is_empty() {
                        let i = (x + 1) + width_wrapped * (y + 1) + plane_wrapped * (z + 1);
                        bits.set(i, true);
                    }
                }
            }
        }

        OccupancyMask {
            bits,
            width_wrapped,
            plane_wrapped,
        }
    }

    /// Checks the cell at chunk-local `(x, y, z)`. Accepts -1 and the size on every axis.
    pub fn is_occupied(&self, x: i32, y: i32, z: i32) -> bool {
        let i = (x + 1) as usize
            + self.width_wrapped * (y + 1) as usize
            + self.plane_wrapped * (z + 1) as usize;
        self.bits[i]
    }

    /// Returns `true` if all six neighbors of `(x, y, z)` are occupied.
    pub fn is_obscured(&self, x: usize, y: usize, z: usize) -> bool {
        let (x, y, z) = (x as i32, y as i32, z as i32);
        BlockSide::all().iter().all(|side| {
            let offset = side.neighbor_offset();
            self.is_occupied(x + offset.x, y + offset.y, z + offset.z)
        })
    }
}

impl Chunk {
    /// Rebuilds every instance batch from scratch.
    ///
    /// Only non-empty, non-obscured cells get an instance. Slots are handed out in
    /// scan order (X outermost, then Y, then Z) within each block type.
    pub fn generate_meshes(&mut self) {
        let mask = OccupancyMask::from_chunk(self);

        for batch in self.batches.values_mut() {
            batch.clear();
        }
        for block in self.blocks.iter_mut() {
            block.instance_index = None;
        }

        let size = self.size;
        for x in 0..size.width {
            for y in 0..size.height {
                for z in 0..size.width {
                    let index = self.linear_index(x, y, z);
                    if self.blocks[index].is_empty() || mask.is_obscured(x, y, z) {
                        continue;
                    }
                    self.add_instance(index);
                }
            }
        }

        self.batches.retain(|_, batch| !batch.is_empty());
        // a full rebuild supersedes any incremental events
        self.render_events.clear();
        self.render_events.push(RenderEvent::BatchesRebuilt);

        log::debug!(
            "Meshed chunk at {:?}: {} visible instances in {} batches",
            self.position,
            self.instance_count(),
            self.batches.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Point3;

    use super::*;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::params::ChunkSize;

    fn size() -> ChunkSize {
        ChunkSize {
            width: 3,
            height: 3,
        }
    }

    #[test]
    fn mask_pads_with_empty_cells() {
        let chunk = Chunk::from_fn(size(), Point3::new(0, 0, 0), |_, _, _| BlockType::STONE);
        let mask = OccupancyMask::from_chunk(&chunk);
        assert!(mask.is_occupied(0, 0, 0));
        assert!(!mask.is_occupied(-1, 0, 0));
        assert!(!mask.is_occupied(3, 2, 2));
        assert!(mask.is_obscured(1, 1, 1));
        assert!(!mask.is_obscured(0, 1, 1));
    }

    #[test]
    fn mask_agrees_with_direct_lookup() {
        let chunk = Chunk::from_fn(size(), Point3::new(0, 0, 0), |x, y, z| {
            if (x + y + z) % 2 == 0 {
                BlockType::DIRT
            } else {
                BlockType::EMPTY
            }
        });
        let mask = OccupancyMask::from_chunk(&chunk);
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    assert_eq!(
                        mask.is_obscured(x, y, z),
                        chunk.is_block_obscured(x as i32, y as i32, z as i32)
                    );
                }
            }
        }
    }

    #[test]
    fn slots_follow_scan_order_per_type() {
        let mut chunk = Chunk::from_fn(size(), Point3::new(0, 0, 0), |x, y, z| {
            match (x, y, z) {
                (0, 0, 0) | (2, 0, 0) => BlockType::GRASS,
                (1, 0, 0) => BlockType::STONE,
                _ => BlockType::EMPTY,
            }
        });
        assert_eq!(chunk.get_block(0, 0, 0).and_then(|b| b.instance_index), Some(0));
        assert_eq!(chunk.get_block(2, 0, 0).and_then(|b| b.instance_index), Some(1));
        assert_eq!(chunk.get_block(1, 0, 0).and_then(|b| b.instance_index), Some(0));
        assert_eq!(chunk.drain_render_events(), vec![RenderEvent::BatchesRebuilt]);
    }

    #[test]
    fn remeshing_drops_empty_batches() {
        let mut chunk = Chunk::from_fn(size(), Point3::new(0, 0, 0), |x, y, z| {
            if (x, y, z) == (1, 1, 1) {
                BlockType::COAL
            } else {
                BlockType::EMPTY
            }
        });
        chunk.remove_block(1, 1, 1);
        assert_eq!(chunk.batch(BlockType::COAL).map(|b| b.len()), Some(0));

        chunk.generate_meshes();
        assert!(chunk.batch(BlockType::COAL).is_none());
    }
}
