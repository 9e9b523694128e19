//! # Physics Module
//!
//! Fixed-timestep player simulation against the voxel world.
//!
//! ## Stepping
//!
//! Frame time is fed into an accumulator and consumed in whole steps of `1 / rate`
//! seconds, so gravity, movement and collision always advance by the same amount no
//! matter how long a frame took. Leftover time carries over to the next frame.
//!
//! ## One Step
//!
//! 1. Gravity is applied to vertical velocity
//! 2. The player moves by its input and velocity
//! 3. Collisions are detected (`collision::broad_phase`, then `collision::narrow_phase`)
//! 4. Contacts are resolved, shallowest first, each one re-checked against the player's
//!    already corrected position
//!
//! `on_ground` is cleared at the start of detection and set again only by resolving a
//! contact that pushes the player up.

use cgmath::{InnerSpace, Point3};
use log::trace;

use crate::engine_state::config::PhysicsConfig;
use crate::engine_state::player_state::player::Player;
use crate::engine_state::voxels::world::BlockQuery;
use collision::{broad_phase, narrow_phase, point_in_player_cylinder, Collision};

pub mod collision;
pub mod raycast;

/// What the last simulated step saw, kept for debug overlays and tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollisionDebug {
    /// Broad phase candidates
    pub candidates: Vec<Point3<i32>>,
    /// Narrow phase contacts, in the order they were resolved
    pub collisions: Vec<Collision>,
}

/// The fixed-step simulation.
#[derive(Clone, Debug)]
pub struct Physics {
    step_dt: f32,
    gravity: f32,
    accumulator: f32,
    debug: CollisionDebug,
}

impl Physics {
    /// Creates a simulation with an empty accumulator.
    pub fn new(config: &PhysicsConfig) -> Self {
        Physics {
            step_dt: config.step_dt(),
            gravity: config.gravity,
            accumulator: 0.0,
            debug: CollisionDebug::default(),
        }
    }

    /// Duration of one step, in seconds.
    pub fn step_dt(&self) -> f32 {
        self.step_dt
    }

    /// Frame time not yet consumed by a step.
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Candidates and contacts of the most recent step.
    pub fn last_step(&self) -> &CollisionDebug {
        &self.debug
    }

    /// Advances the simulation by `dt` seconds of frame time.
    ///
    /// # Arguments
    /// * `dt` - Frame time, in seconds
    /// * `player` - The body to move
    /// * `world` - Block occupancy to collide against
    ///
    /// # Returns
    /// The number of whole steps simulated.
    pub fn update<W: BlockQuery + ?Sized>(&mut self, dt: f32, player: &mut Player, world: &W) -> u32 {
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.step_dt {
            self.step(player, world);
            self.accumulator -= self.step_dt;
            steps += 1;
        }
        steps
    }

    /// Simulates exactly one step.
    pub fn step<W: BlockQuery + ?Sized>(&mut self, player: &mut Player, world: &W) {
        debug_assert!(player.is_finite(), "non-finite player state: {player:?}");

        player.velocity.y -= self.gravity * self.step_dt;
        player.apply_input(self.step_dt);

        self.detect_collisions(player, world);
    }

    fn detect_collisions<W: BlockQuery + ?Sized>(&mut self, player: &mut Player, world: &W) {
        player.on_ground = false;

        let candidates = broad_phase(player, world);
        let collisions = narrow_phase(&candidates, player);
        trace!(
            "broad phase: {} candidates, narrow phase: {} collisions",
            candidates.len(),
            collisions.len()
        );

        let collisions = resolve_collisions(collisions, player);
        self.debug = CollisionDebug {
            candidates,
            collisions,
        };
    }
}

/// Pushes the player out of every still-valid contact, shallowest first.
///
/// Each applied contact moves the player along its normal by its overlap and removes the
/// velocity component along the normal. Returns the contacts sorted in resolution order.
pub fn resolve_collisions(mut collisions: Vec<Collision>, player: &mut Player) -> Vec<Collision> {
    collisions.sort_by(|a, b| a.overlap.total_cmp(&b.overlap));

    for collision in &collisions {
        // an earlier correction may already have cleared this one
        if !point_in_player_cylinder(collision.contact_point, player) {
            continue;
        }

        player.position += collision.normal * collision.overlap;

        let magnitude = player.world_velocity().dot(collision.normal);
        player.apply_world_delta_velocity(-(collision.normal * magnitude));

        if collision.normal.y > 0.0 {
            player.on_ground = true;
        }
    }
    collisions
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cgmath::Vector3;

    use super::*;
    use crate::engine_state::config::PlayerConfig;
    use crate::engine_state::voxels::block::block_type::BlockType;
    use crate::engine_state::voxels::block::Block;

    struct Cells(HashSet<(i32, i32, i32)>);

    impl BlockQuery for Cells {
        fn block_at(&self, x: i32, y: i32, z: i32) -> Option<Block> {
            self.0.contains(&(x, y, z)).then(|| Block::new(BlockType::GRASS))
        }
    }

    fn floor(y: i32, half_extent: i32) -> Cells {
        let mut cells = HashSet::new();
        for x in -half_extent..=half_extent {
            for z in -half_extent..=half_extent {
                cells.insert((x, y, z));
            }
        }
        Cells(cells)
    }

    fn player_at(x: f32, y: f32, z: f32) -> Player {
        let mut player = Player::new(&PlayerConfig::default());
        player.position = Point3::new(x, y, z);
        player
    }

    #[test]
    fn accumulator_runs_whole_steps_only() {
        let mut physics = Physics::new(&PhysicsConfig::default());
        let world = Cells(HashSet::new());
        let mut player = player_at(0.5, 100.0, 0.5);

        assert_eq!(physics.update(0.0049, &mut player, &world), 0);
        assert_eq!(player.position.y, 100.0);
        assert_eq!(physics.update(0.0131, &mut player, &world), 3);
        assert!(physics.accumulator() < physics.step_dt());
    }

    #[test]
    fn free_fall_accelerates() {
        let mut physics = Physics::new(&PhysicsConfig::default());
        let world = Cells(HashSet::new());
        let mut player = player_at(0.5, 100.0, 0.5);

        // 100 whole steps, with half a step left over
        assert_eq!(physics.update(0.5025, &mut player, &world), 100);
        assert!((player.velocity.y + 16.0).abs() < 1e-2);
        assert!(player.position.y < 96.5);
        assert!(!player.on_ground);
    }

    #[test]
    fn standing_on_a_block_stays_put() {
        let mut physics = Physics::new(&PhysicsConfig::default());
        let world = floor(9, 0);
        let mut player = player_at(0.5, 10.0, 0.5);

        physics.step(&mut player, &world);
        assert!((player.position.y - 10.0).abs() < 1e-4);
        assert!(player.on_ground);
        assert!(player.velocity.y.abs() < 1e-5);

        let debug = physics.last_step();
        assert_eq!(debug.candidates, vec![Point3::new(0, 9, 0)]);
        assert_eq!(debug.collisions.len(), 1);
    }

    #[test]
    fn landing_keeps_the_feet_on_the_surface() {
        let mut physics = Physics::new(&PhysicsConfig::default());
        let world = floor(4, 3);
        let mut player = player_at(0.3, 7.0, -0.6);

        physics.update(2.0, &mut player, &world);
        assert!(player.on_ground);
        assert!((player.position.y - 5.0).abs() < 1e-3);
    }

    #[test]
    fn jumping_leaves_the_ground() {
        let mut physics = Physics::new(&PhysicsConfig::default());
        let world = floor(9, 2);
        let mut player = player_at(0.5, 10.0, 0.5);

        physics.update(0.1, &mut player, &world);
        assert!(player.jump());
        physics.update(0.1, &mut player, &world);
        assert!(player.position.y > 10.5);
        assert!(!player.on_ground);
    }

    #[test]
    fn ceiling_contact_does_not_ground() {
        let mut player = player_at(0.5, 10.0, 0.5);
        player.velocity.y = 5.0;
        let collisions = narrow_phase(&[Point3::new(0, 11, 0)], &player);
        resolve_collisions(collisions, &mut player);

        assert!(!player.on_ground);
        assert!((player.position.y - 9.25).abs() < 1e-4);
        assert!(player.velocity.y.abs() < 1e-5);
    }

    #[test]
    fn shallow_contacts_resolve_first() {
        let mut player = player_at(0.7, 9.95, 0.5);
        let candidates = [Point3::new(1, 10, 0), Point3::new(0, 9, 0)];
        let collisions = narrow_phase(&candidates, &player);
        assert_eq!(collisions.len(), 2);

        let resolved = resolve_collisions(collisions, &mut player);
        assert_eq!(resolved[0].block, Point3::new(0, 9, 0));
        assert!(player.on_ground);
        assert!((player.position.y - 10.0).abs() < 1e-4);
        assert!((player.position.x - 0.5).abs() < 1e-4);
    }

    #[test]
    fn resolution_removes_velocity_into_the_wall() {
        let mut player = player_at(0.7, 10.0, 0.5);
        player.velocity = Vector3::new(0.0, 0.0, 10.0);
        let collisions = narrow_phase(&[Point3::new(1, 10, 0)], &player);
        resolve_collisions(collisions, &mut player);

        // facing +X, so local forward is world +X
        assert!(player.world_velocity().x.abs() < 1e-4);
        assert!((player.position.x - 0.5).abs() < 1e-5);
    }
}
