//! # Chunk Generation Module
//!
//! Deterministic terrain and resource generation for a single chunk.
//!
//! Generation runs three ordered passes over the same grid:
//! 1. **Initialize**: every cell becomes empty
//! 2. **Resources**: each resource layer samples 3D noise and claims cells above its
//!    scarcity threshold; later layers overwrite earlier ones
//! 3. **Terrain**: each column samples 2D noise for a surface height, fills empty cells
//!    below it with dirt, places grass on it and clears everything above it
//!
//! Resources are therefore buried: they survive below the surface and are cut off above it.
//! All sampling uses world-space coordinates, so neighboring chunks line up exactly.

use cgmath::Point3;
use noise::{NoiseFn, Simplex};
use web_time::Instant;

use crate::engine_state::voxels::block::block_type::BlockType;
use crate::engine_state::voxels::params::{GenerationParams, ResourceParams, TerrainParams};
use crate::engine_state::voxels::rng::WorldRng;

use super::Chunk;

/// The noise fields shared by every chunk of a world.
///
/// Built once per seed and passed by reference to each chunk, so chunks never
/// reconstruct permutation tables or share mutable generator state.
#[derive(Clone, Debug)]
pub struct ChunkNoise {
    resources: Simplex,
    terrain: Simplex,
}

impl ChunkNoise {
    /// Seeds both noise fields from the world PRNG: resources first, then terrain.
    pub fn new(seed: i64) -> Self {
        let mut rng = WorldRng::new(seed);
        let resources = Simplex::new(rng.next_u32());
        let terrain = Simplex::new(rng.next_u32());
        ChunkNoise { resources, terrain }
    }

    /// Samples the 3D resource field at a world-space block position.
    pub fn resource_value(&self, resource: &ResourceParams, world: Point3<i32>) -> f64 {
        self.resources.get([
            world.x as f64 / resource.scale[0],
            world.y as f64 / resource.scale[1],
            world.z as f64 / resource.scale[2],
        ])
    }

    /// Surface height of the column at world-space `(x, z)`.
    ///
    /// The noise is scaled by `offset + magnitude * noise`, multiplied by the chunk
    /// height, floored, and clamped to `[0, chunk_height - 1]`.
    pub fn column_height(
        &self,
        terrain: &TerrainParams,
        world_x: i32,
        world_z: i32,
        chunk_height: usize,
    ) -> usize {
        let value = self
            .terrain
            .get([world_x as f64 / terrain.scale, world_z as f64 / terrain.scale]);
        let scaled = terrain.offset + terrain.magnitude * value;
        let height = (chunk_height as f64 * scaled).floor();
        height.clamp(0.0, chunk_height.saturating_sub(1) as f64) as usize
    }
}

impl Chunk {
    /// Generates a chunk's terrain and resources, then meshes it.
    ///
    /// # Arguments
    /// * `params` - The world's generation parameters
    /// * `noise` - The world's shared noise fields, built from `params.seed`
    pub fn generate(&mut self, params: &GenerationParams, noise: &ChunkNoise) {
        let start = Instant::now();

        self.initialize_terrain();
        self.generate_resources(params, noise);
        self.generate_terrain(&params.terrain, noise);
        self.generate_meshes();

        log::debug!(
            "Generated chunk at {:?} in {:?} ({} instances)",
            self.position,
            start.elapsed(),
            self.instance_count()
        );
    }

    /// Resets every cell to empty.
    fn initialize_terrain(&mut self) {
        let size = self.size;
        for z in 0..size.width {
            for y in 0..size.height {
                for x in 0..size.width {
                    self.set_block_type(x, y, z, BlockType::EMPTY);
                }
            }
        }
    }

    /// Places every resource layer in declaration order.
    fn generate_resources(&mut self, params: &GenerationParams, noise: &ChunkNoise) {
        let size = self.size;
        for resource in &params.resources {
            for x in 0..size.width {
                for y in 0..size.height {
                    for z in 0..size.width {
                        let world = self.world_position(x, y, z);
                        if noise.resource_value(resource, world) > resource.scarcity {
                            self.set_block_type(x, y, z, resource.block);
                        }
                    }
                }
            }
        }
    }

    /// Shapes the surface: dirt fill below, grass on top, air above.
    fn generate_terrain(&mut self, terrain: &TerrainParams, noise: &ChunkNoise) {
        let size = self.size;
        for x in 0..size.width {
            for z in 0..size.width {
                let world = self.world_position(x, 0, z);
                let height = noise.column_height(terrain, world.x, world.z, size.height);

                for y in 0..size.height {
                    if y < height {
                        if self.block_at(x, y, z).is_empty() {
                            self.set_block_type(x, y, z, BlockType::DIRT);
                        }
                    } else if y == height {
                        self.set_block_type(x, y, z, BlockType::GRASS);
                    } else {
                        self.set_block_type(x, y, z, BlockType::EMPTY);
                    }
                }
            }
        }
    }

    fn world_position(&self, x: usize, y: usize, z: usize) -> Point3<i32> {
        Point3::new(
            self.position.x + x as i32,
            self.position.y + y as i32,
            self.position.z + z as i32,
        )
    }
}
