//! # Instance Batch Module
//!
//! Per block type render batches and the index bookkeeping that keeps them dense.
//!
//! A batch is the renderer-facing list of instance transforms for one block type in one
//! chunk. Alongside the transforms the batch stores which cell owns each slot
//! (`slot -> cell`); the reverse direction (`cell -> slot`) lives in
//! [`Block::instance_index`](crate::engine_state::voxels::block::Block). Together the two
//! tables allow O(1) removal by swapping the last instance into the freed slot, without
//! ever reading a transform back to find its owner.

use cgmath::{Matrix4, Point3, Vector3};

use crate::engine_state::voxels::block::block_type::BlockType;

/// A single render instance, laid out for direct upload to the GPU.
///
/// # Memory Layout
/// A column-major 4x4 model matrix translating a unit cube to the cell's center in
/// chunk-local space. Total size: 64 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// Builds the instance for the cell at `local` (chunk-local block coordinates).
    pub fn at_cell(local: Point3<usize>) -> Self {
        let center = Vector3::new(
            local.x as f32 + 0.5,
            local.y as f32 + 0.5,
            local.z as f32 + 0.5,
        );
        InstanceRaw {
            model: Matrix4::from_translation(center).into(),
        }
    }

    /// The translation component of the model matrix.
    pub fn translation(&self) -> Vector3<f32> {
        Vector3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

/// The visible instances of one block type within a chunk.
///
/// The active range `0..len()` never has gaps: every slot in it belongs to exactly one
/// cell, and every cell pointing into the batch points at a slot in it.
#[derive(Clone, Debug)]
pub struct InstanceBatch {
    block_type: BlockType,
    instances: Vec<InstanceRaw>,
    owners: Vec<usize>,
}

impl InstanceBatch {
    /// Creates an empty batch for `block_type`.
    pub fn new(block_type: BlockType) -> Self {
        InstanceBatch {
            block_type,
            instances: Vec::new(),
            owners: Vec::new(),
        }
    }

    /// The block type rendered by this batch.
    pub fn block_type(&self) -> BlockType {
        self.block_type
    }

    /// Number of active instances.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if the batch has no active instances.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The active instance transforms, ready for upload.
    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    /// Linear index of the cell owning `slot`, if the slot is active.
    pub fn owner(&self, slot: u32) -> Option<usize> {
        self.owners.get(slot as usize).copied()
    }

    /// Appends an instance owned by `cell_index` and returns its slot.
    pub fn push(&mut self, cell_index: usize, instance: InstanceRaw) -> u32 {
        let slot = self.instances.len() as u32;
        self.instances.push(instance);
        self.owners.push(cell_index);
        slot
    }

    /// Removes the instance in `slot` by moving the last instance into it.
    ///
    /// Returns `None` if `slot` is not active. Otherwise returns the cell index whose
    /// instance now lives in `slot`, or `Some(None)` if `slot` was the last one and
    /// nothing had to move.
    pub fn swap_remove(&mut self, slot: u32) -> Option<Option<usize>> {
        let slot = slot as usize;
        if slot >= self.instances.len() {
            return None;
        }

        self.instances.swap_remove(slot);
        self.owners.swap_remove(slot);

        Some(self.owners.get(slot).copied())
    }

    /// Drops every instance, keeping the allocation.
    pub fn clear(&mut self) {
        self.instances.clear();
        self.owners.clear();
    }
}
