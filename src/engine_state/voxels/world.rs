//! # World Module
//!
//! This module provides the `World` struct which owns every loaded chunk and streams
//! chunks in and out around a moving viewpoint.
//!
//! ## Chunk Grid
//!
//! Chunks tile the horizontal plane only. A chunk key `(cx, cz)` covers world blocks
//! `cx * width .. (cx + 1) * width` on X (likewise Z) and the full chunk height on Y.
//! World to chunk mapping uses floored division, so negative coordinates land in the
//! chunk to their left rather than being truncated towards zero.
//!
//! ## Streaming
//!
//! The loaded set is kept equal to the square of chunks within `draw_distance`
//! (Chebyshev distance) of the last viewpoint chunk. `update` only does work when the
//! viewpoint crosses into a different chunk or the draw distance changed.
//!
//! ## Render Events
//!
//! Every batch change is queued until [`World::drain_render_events`] takes it. A renderer
//! must drain once per frame. Without a renderer, turn recording off with
//! [`World::set_render_events`] so the queues stay empty.
//!
//! ## Ownership
//!
//! The world is the only owner of chunks. Everything else reads through [`BlockQuery`]
//! and mutates only through [`World::remove_block`].

use std::collections::{HashMap, HashSet};

use cgmath::{Point2, Point3};
use log::{debug, info, warn};
use thiserror::Error;
use web_time::Instant;

use crate::engine_state::config::WorldConfig;

use super::block::block_type::BlockType;
use super::block::Block;
use super::chunk::chunk_generation::ChunkNoise;
use super::chunk::{Chunk, RenderEvent};
use super::params::{ChunkSize, GenerationParams};

/// Identifies a chunk by its position in the chunk grid.
pub type ChunkKey = Point2<i32>;

/// Read access to block occupancy in world coordinates.
pub trait BlockQuery {
    /// The block in the world cell `(x, y, z)`, or `None` if nothing is loaded there.
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<Block>;

    /// Returns `true` if the cell holds a solid block. Absent cells are not solid.
    fn is_solid_at(&self, x: i32, y: i32, z: i32) -> bool {
        self.block_at(x, y, z).is_some_and(|block| block.is_solid())
    }
}

/// A change the renderer has to mirror, tagged with the chunk it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorldRenderEvent {
    /// A change inside one loaded chunk.
    Chunk {
        /// The chunk's key.
        key: ChunkKey,
        /// What changed.
        event: RenderEvent,
    },
    /// The chunk was disposed and its batches must be dropped.
    ChunkUnloaded(ChunkKey),
}

/// The chunks a streaming pass loaded and unloaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamingReport {
    /// Newly generated chunks.
    pub loaded: Vec<ChunkKey>,
    /// Disposed chunks.
    pub unloaded: Vec<ChunkKey>,
}

impl StreamingReport {
    /// Returns `true` if the pass did nothing.
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.unloaded.is_empty()
    }
}

/// Errors from handing chunks to the world.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// The chunk's dimensions differ from the world's.
    #[error("chunk size {found:?} does not match the world's chunk size {expected:?}")]
    ChunkSizeMismatch {
        /// The world's chunk size
        expected: ChunkSize,
        /// The rejected chunk's size
        found: ChunkSize,
    },
}

/// Represents a voxel world composed of streamed chunks.
pub struct World {
    chunks: HashMap<ChunkKey, Chunk>,
    chunk_size: ChunkSize,
    params: GenerationParams,
    noise: ChunkNoise,
    draw_distance: u32,
    viewpoint: Option<ChunkKey>,
    /// Set when the draw distance changed since the last streaming pass.
    stale: bool,
    record_render_events: bool,
    unloaded: Vec<ChunkKey>,
}

impl World {
    /// Creates a new world with no chunks loaded.
    ///
    /// An invalid chunk size is kept but degenerates to chunks with no cells, so every
    /// block query answers `None` instead of dividing by zero.
    pub fn new(config: &WorldConfig) -> Self {
        if let Err(err) = config.chunk_size.validate() {
            warn!("World created with an unusable chunk size: {}", err);
        }
        World {
            chunks: HashMap::new(),
            chunk_size: config.chunk_size,
            noise: ChunkNoise::new(config.params.seed),
            params: config.params.clone(),
            draw_distance: config.draw_distance,
            viewpoint: None,
            stale: false,
            record_render_events: true,
            unloaded: Vec::new(),
        }
    }

    /// The size of every chunk.
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk_size
    }

    /// The generation parameters new chunks are built from.
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// The streaming radius, in chunks.
    pub fn draw_distance(&self) -> u32 {
        self.draw_distance
    }

    /// The chunk the last streaming pass was centered on.
    pub fn viewpoint(&self) -> Option<ChunkKey> {
        self.viewpoint
    }

    /// Replaces the generation parameters.
    ///
    /// Loaded chunks keep their blocks; [`World::generate`] rebuilds them, and chunks
    /// streamed in later use the new parameters.
    pub fn set_params(&mut self, params: GenerationParams) {
        self.noise = ChunkNoise::new(params.seed);
        self.params = params;
    }

    /// Changes the streaming radius. Takes effect on the next [`World::update`], even if
    /// the viewpoint stays in the same chunk.
    pub fn set_draw_distance(&mut self, draw_distance: u32) {
        if draw_distance != self.draw_distance {
            self.draw_distance = draw_distance;
            self.stale = true;
        }
    }

    /// Turns render event recording on or off. Turning it off drops every pending event.
    pub fn set_render_events(&mut self, enabled: bool) {
        self.record_render_events = enabled;
        if !enabled {
            self.drain_render_events();
        }
    }

    /// Returns `true` if batch changes are queued for a renderer.
    pub fn records_render_events(&self) -> bool {
        self.record_render_events
    }

    /// Disposes every loaded chunk and regenerates the region around the viewpoint.
    ///
    /// Before the first [`World::update`] the viewpoint is the origin chunk.
    pub fn generate(&mut self) -> StreamingReport {
        let start = Instant::now();
        let center = self.viewpoint.unwrap_or(Point2::new(0, 0));

        let mut report = StreamingReport::default();
        let mut loaded: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        loaded.sort_by_key(|key| (key.x, key.y));
        for key in loaded {
            self.unload_chunk(key);
            report.unloaded.push(key);
        }

        for key in self.keys_around(center) {
            self.generate_chunk(key);
            report.loaded.push(key);
        }
        self.viewpoint = Some(center);
        self.stale = false;

        info!(
            "Generated world around chunk ({}, {}): {} chunks, seed {}, in {:?}",
            center.x,
            center.y,
            self.chunks.len(),
            self.params.seed,
            start.elapsed()
        );
        report
    }

    /// Streams chunks so the loaded set matches the region around `viewpoint`.
    ///
    /// Does nothing if the viewpoint is still in the same chunk as last time and the draw
    /// distance has not changed since.
    pub fn update(&mut self, viewpoint: Point3<f32>) -> StreamingReport {
        let key = self.chunk_key_for(viewpoint);
        if self.viewpoint == Some(key) && !self.stale {
            return StreamingReport::default();
        }

        let target: HashSet<ChunkKey> = self.keys_around(key).into_iter().collect();
        let mut to_remove: Vec<ChunkKey> = self
            .chunks
            .keys()
            .filter(|loaded| !target.contains(loaded))
            .copied()
            .collect();
        let mut to_add: Vec<ChunkKey> = target
            .iter()
            .filter(|wanted| !self.chunks.contains_key(wanted))
            .copied()
            .collect();
        to_remove.sort_by_key(|key| (key.x, key.y));
        to_add.sort_by_key(|key| (key.x, key.y));

        for removed in &to_remove {
            self.unload_chunk(*removed);
        }
        for added in &to_add {
            self.generate_chunk(*added);
        }
        self.viewpoint = Some(key);
        self.stale = false;

        if !to_add.is_empty() || !to_remove.is_empty() {
            info!(
                "Streamed around chunk ({}, {}): +{} -{} ({} loaded)",
                key.x,
                key.y,
                to_add.len(),
                to_remove.len(),
                self.chunks.len()
            );
        }

        StreamingReport {
            loaded: to_add,
            unloaded: to_remove,
        }
    }

    /// Maps world block coordinates to the owning chunk key and chunk-local coordinates.
    ///
    /// Y passes through unchanged because chunks do not tile vertically.
    pub fn world_to_chunk_coords(&self, x: i32, y: i32, z: i32) -> (ChunkKey, Point3<i32>) {
        let width = self.grid_width();
        let chunk_x = x.div_euclid(width);
        let chunk_z = z.div_euclid(width);
        (
            Point2::new(chunk_x, chunk_z),
            Point3::new(x - width * chunk_x, y, z - width * chunk_z),
        )
    }

    /// The key of the chunk containing the world-space point `position`.
    pub fn chunk_key_for(&self, position: Point3<f32>) -> ChunkKey {
        let (key, _) = self.world_to_chunk_coords(
            position.x.floor() as i32,
            position.y.floor() as i32,
            position.z.floor() as i32,
        );
        key
    }

    /// Gets the block at world coordinates, or `None` if its chunk is not loaded or the
    /// coordinate is outside the chunk's vertical range.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<&Block> {
        let (key, local) = self.world_to_chunk_coords(x, y, z);
        self.chunks
            .get(&key)
            .and_then(|chunk| chunk.get_block(local.x, local.y, local.z))
    }

    /// Removes the block at world coordinates.
    ///
    /// # Returns
    /// The removed block's type, or `None` if nothing was removed.
    pub fn remove_block(&mut self, x: i32, y: i32, z: i32) -> Option<BlockType> {
        let (key, local) = self.world_to_chunk_coords(x, y, z);
        let record = self.record_render_events;
        let removed = self.chunks.get_mut(&key).and_then(|chunk| {
            let removed = chunk.remove_block(local.x, local.y, local.z);
            if !record {
                chunk.drain_render_events();
            }
            removed
        });
        if let Some(block_type) = removed {
            debug!("Removed {:?} at ({}, {}, {})", block_type, x, y, z);
        }
        removed
    }

    /// Retrieves the chunk loaded at `key`.
    pub fn get_chunk_at(&self, key: ChunkKey) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Iterates over every loaded chunk.
    pub fn chunks(&self) -> impl Iterator<Item = (&ChunkKey, &Chunk)> {
        self.chunks.iter()
    }

    /// Number of loaded chunks.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Hands a chunk built elsewhere (another thread, a test) to the world.
    ///
    /// Any chunk already loaded at `key` is disposed first. The chunk is moved to the
    /// origin of `key` so the world-to-local mapping stays exact.
    ///
    /// # Errors
    /// [`WorldError::ChunkSizeMismatch`] if the chunk's size differs from the world's; the
    /// world is left unchanged.
    pub fn load_chunk(&mut self, key: ChunkKey, mut chunk: Chunk) -> Result<(), WorldError> {
        if chunk.size() != self.chunk_size {
            return Err(WorldError::ChunkSizeMismatch {
                expected: self.chunk_size,
                found: chunk.size(),
            });
        }
        if self.chunks.contains_key(&key) {
            self.unload_chunk(key);
        }
        chunk.position = self.chunk_origin(key);
        self.insert_chunk(key, chunk);
        Ok(())
    }

    /// Takes every pending render event, grouped by chunk.
    pub fn drain_render_events(&mut self) -> Vec<WorldRenderEvent> {
        let mut events: Vec<WorldRenderEvent> = self
            .unloaded
            .drain(..)
            .map(WorldRenderEvent::ChunkUnloaded)
            .collect();

        let mut keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        keys.sort_by_key(|key| (key.x, key.y));
        for key in keys {
            if let Some(chunk) = self.chunks.get_mut(&key) {
                events.extend(
                    chunk
                        .drain_render_events()
                        .into_iter()
                        .map(|event| WorldRenderEvent::Chunk { key, event }),
                );
            }
        }
        events
    }

    /// World-space origin of the chunk at `key`.
    pub fn chunk_origin(&self, key: ChunkKey) -> Point3<i32> {
        let width = self.grid_width();
        Point3::new(key.x * width, 0, key.y * width)
    }

    /// Chunk pitch on the grid. A zero width still tiles with pitch 1 over empty chunks.
    fn grid_width(&self) -> i32 {
        self.chunk_size.width.max(1) as i32
    }

    fn keys_around(&self, center: ChunkKey) -> Vec<ChunkKey> {
        let radius = self.draw_distance as i32;
        let mut keys = Vec::new();
        for x in -radius..=radius {
            for z in -radius..=radius {
                keys.push(Point2::new(center.x + x, center.y + z));
            }
        }
        keys
    }

    fn generate_chunk(&mut self, key: ChunkKey) {
        let mut chunk = Chunk::new(self.chunk_size, self.chunk_origin(key));
        chunk.generate(&self.params, &self.noise);
        self.insert_chunk(key, chunk);
    }

    fn insert_chunk(&mut self, key: ChunkKey, mut chunk: Chunk) {
        if !self.record_render_events {
            chunk.drain_render_events();
        }
        self.chunks.insert(key, chunk);
    }

    fn unload_chunk(&mut self, key: ChunkKey) {
        if let Some(chunk) = self.chunks.remove(&key) {
            let released = chunk.dispose();
            debug!(
                "Unloaded chunk ({}, {}), released {} instances",
                key.x, key.y, released
            );
            if self.record_render_events {
                self.unloaded.push(key);
            }
        }
    }
}

impl BlockQuery for World {
    fn block_at(&self, x: i32, y: i32, z: i32) -> Option<Block> {
        self.get_block(x, y, z).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(draw_distance: u32) -> WorldConfig {
        WorldConfig {
            chunk_size: ChunkSize {
                width: 8,
                height: 16,
            },
            draw_distance,
            params: GenerationParams::default(),
        }
    }

    #[test]
    fn negative_coordinates_floor_into_the_previous_chunk() {
        let world = World::new(&config(0));
        assert_eq!(
            world.world_to_chunk_coords(-1, 5, -8),
            (Point2::new(-1, -1), Point3::new(7, 5, 0))
        );
        assert_eq!(
            world.world_to_chunk_coords(-9, 0, 8),
            (Point2::new(-2, 1), Point3::new(7, 0, 0))
        );
        assert_eq!(
            world.world_to_chunk_coords(0, 0, 7),
            (Point2::new(0, 0), Point3::new(0, 0, 7))
        );
    }

    #[test]
    fn coordinate_mapping_round_trips() {
        let world = World::new(&config(0));
        for x in -40..40 {
            for z in [-17, -8, -1, 0, 1, 8, 23] {
                let (key, local) = world.world_to_chunk_coords(x, 3, z);
                let origin = world.chunk_origin(key);
                assert_eq!((origin.x + local.x, local.y, origin.z + local.z), (x, 3, z));
                assert!((0..8).contains(&local.x) && (0..8).contains(&local.z));
            }
        }
    }

    #[test]
    fn generate_loads_the_square_around_the_origin() {
        let mut world = World::new(&config(1));
        let report = world.generate();
        assert_eq!(report.loaded.len(), 9);
        assert!(report.unloaded.is_empty());
        assert_eq!(world.loaded_chunk_count(), 9);
        let chunk = world.get_chunk_at(Point2::new(-1, 1)).expect("chunk loaded");
        assert_eq!(chunk.position, Point3::new(-8, 0, 8));
    }

    #[test]
    fn regenerate_disposes_everything_first() {
        let mut world = World::new(&config(1));
        world.generate();
        world.drain_render_events();

        let report = world.generate();
        assert_eq!(report.unloaded.len(), 9);
        assert_eq!(report.loaded.len(), 9);
        let unloaded = world
            .drain_render_events()
            .into_iter()
            .filter(|event| matches!(event, WorldRenderEvent::ChunkUnloaded(_)))
            .count();
        assert_eq!(unloaded, 9);
    }

    #[test]
    fn update_moves_the_loaded_window() {
        let mut world = World::new(&config(1));
        world.generate();

        // one chunk to the right: the left column goes, a new right column arrives
        let report = world.update(Point3::new(8.5, 4.0, 0.5));
        assert_eq!(report.loaded.len(), 3);
        assert_eq!(report.unloaded.len(), 3);
        assert!(report.loaded.iter().all(|key| key.x == 2));
        assert!(report.unloaded.iter().all(|key| key.x == -1));
        assert_eq!(world.loaded_chunk_count(), 9);
    }

    #[test]
    fn update_within_the_same_chunk_is_free() {
        let mut world = World::new(&config(1));
        assert_eq!(world.update(Point3::new(1.0, 0.0, 1.0)).loaded.len(), 9);
        assert!(world.update(Point3::new(7.9, 30.0, 0.1)).is_empty());
    }

    #[test]
    fn changing_draw_distance_restreams_in_place() {
        let mut world = World::new(&config(1));
        assert_eq!(world.update(Point3::new(1.0, 0.0, 1.0)).loaded.len(), 9);

        world.set_draw_distance(2);
        let report = world.update(Point3::new(2.0, 0.0, 2.0));
        assert_eq!(report.loaded.len(), 16);
        assert_eq!(world.loaded_chunk_count(), 25);
        assert!(world.update(Point3::new(2.0, 0.0, 2.0)).is_empty());

        world.set_draw_distance(0);
        let report = world.update(Point3::new(2.0, 0.0, 2.0));
        assert_eq!(report.unloaded.len(), 24);
        assert_eq!(world.loaded_chunk_count(), 1);
        assert!(world.get_chunk_at(Point2::new(0, 0)).is_some());
    }

    #[test]
    fn zero_width_world_answers_none() {
        let mut config = config(1);
        config.chunk_size.width = 0;
        let mut world = World::new(&config);

        world.update(Point3::new(3.0, 2.0, -5.0));
        assert!(world.get_block(0, 0, 0).is_none());
        assert!(world.get_block(-7, 3, 12).is_none());
        assert_eq!(world.remove_block(0, 0, 0), None);
    }

    #[test]
    fn load_chunk_rejects_a_foreign_size() {
        let mut world = World::new(&config(0));
        let wide = ChunkSize {
            width: 16,
            height: 16,
        };
        let chunk = Chunk::from_fn(wide, Point3::new(0, 0, 0), |_, _, _| BlockType::STONE);

        assert_eq!(
            world.load_chunk(Point2::new(0, 0), chunk),
            Err(WorldError::ChunkSizeMismatch {
                expected: world.chunk_size(),
                found: wide,
            })
        );
        assert_eq!(world.loaded_chunk_count(), 0);
    }

    #[test]
    fn headless_worlds_queue_no_render_events() {
        let mut world = World::new(&config(1));
        world.generate();
        world.set_render_events(false);
        assert!(world.drain_render_events().is_empty());

        world.update(Point3::new(40.0, 0.0, 0.0));
        let top = (0..16).rev().find(|y| world.is_solid_at(40, *y, 0));
        if let Some(y) = top {
            assert!(world.remove_block(40, y, 0).is_some());
        }
        assert!(world.drain_render_events().is_empty());

        world.set_render_events(true);
        world.update(Point3::new(80.0, 0.0, 0.0));
        assert!(!world.drain_render_events().is_empty());
    }

    #[test]
    fn get_block_outside_loaded_chunks_is_none() {
        let mut world = World::new(&config(0));
        world.generate();
        assert!(world.get_block(0, 0, 0).is_some());
        assert!(world.get_block(8, 0, 0).is_none());
        assert!(world.get_block(0, -1, 0).is_none());
        assert!(world.get_block(0, 16, 0).is_none());
    }

    #[test]
    fn load_chunk_places_the_chunk_at_its_key() {
        let mut world = World::new(&config(0));
        let size = world.chunk_size();
        let chunk = Chunk::from_fn(size, Point3::new(0, 0, 0), |_, y, _| {
            if y == 0 {
                BlockType::STONE
            } else {
                BlockType::EMPTY
            }
        });
        world
            .load_chunk(Point2::new(-1, 0), chunk)
            .expect("chunk size matches");
        assert!(world.is_solid_at(-8, 0, 0));
        assert!(world.is_solid_at(-1, 0, 7));
        assert!(!world.is_solid_at(-1, 1, 7));
        assert!(!world.is_solid_at(0, 0, 0));
    }

    #[test]
    fn remove_block_goes_through_the_owning_chunk() {
        let mut world = World::new(&config(0));
        let size = world.chunk_size();
        world
            .load_chunk(
                Point2::new(-1, -1),
                Chunk::from_fn(size, Point3::new(0, 0, 0), |_, _, _| BlockType::DIRT),
            )
            .expect("chunk size matches");
        assert_eq!(world.remove_block(-1, 3, -1), Some(BlockType::DIRT));
        assert_eq!(world.remove_block(-1, 3, -1), None);
        assert!(world.get_block(-1, 3, -1).is_some_and(Block::is_empty));
    }
}
