//! # Voxel World Core
//!
//! This module contains the voxel data side of the engine: representing, generating,
//! editing and streaming a block world.
//!
//! ## Architecture
//!
//! * **Rng**: The deterministic generator every noise field is seeded from
//! * **Params**: Chunk dimensions and the generation parameter bundle
//! * **Block**: Block type definitions, the static catalog, and per-cell data
//! * **Chunk**: Fixed-size 3D grids of blocks with their visible instance batches
//! * **World**: Owns the loaded chunks and streams them around a viewpoint
//!
//! ## Data Flow
//!
//! 1. The world receives a viewpoint and works out which chunks should be loaded
//! 2. New chunks are generated from `(seed, params, offset)` and meshed
//! 3. Block edits go through the world to the owning chunk, which patches its batches
//! 4. The renderer drains the resulting events and mirrors the batches
//!
//! ## Thread Safety
//!
//! Chunks have no cross-chunk dependencies during generation, so a chunk can be built on
//! any thread and handed over with `World::load_chunk`. The loaded set itself is only
//! ever mutated by the world's owner.

pub mod block;
pub mod chunk;
pub mod params;
pub mod rng;
pub mod world;
