//! # Player Implementation
//!
//! The player's kinematic state: where the feet are, how fast the body moves, and which
//! way it faces.
//!
//! ## Frames
//!
//! Velocity is stored in the player's local frame, rotated by yaw only:
//! - X is strafe right
//! - Y is up (identical to world Y)
//! - Z is forward
//!
//! With yaw `θ`, forward is `(cos θ, 0, sin θ)` and right is `(-sin θ, 0, cos θ)` in world
//! space. Collision response works in world space, so every crossing between the two
//! frames goes through `local_to_world` / `world_to_local`.

use cgmath::*;
use std::f32::consts::FRAC_PI_2;

use crate::engine_state::config::PlayerConfig;

/// Safe limit for pitch to prevent gimbal lock
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// A first-person body modeled as an upright cylinder standing on its feet.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Position of the feet (bottom center of the cylinder) in world space
    pub position: Point3<f32>,
    /// Velocity in the local frame
    pub velocity: Vector3<f32>,
    /// Requested horizontal velocity in the local frame; `y` is unused
    pub input: Vector3<f32>,
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical look rotation in radians; does not affect movement
    pub pitch: Rad<f32>,
    /// Cylinder radius
    pub radius: f32,
    /// Cylinder height; the eye sits at the top
    pub height: f32,
    /// Horizontal speed while a direction is held
    pub max_speed: f32,
    /// Upward velocity added by a jump
    pub jump_speed: f32,
    /// Feet height the reset action teleports to
    pub reset_height: f32,
    /// Radians per unit of look delta
    pub look_sensitivity: f32,
    /// Set when the last physics step resolved a contact from below
    pub on_ground: bool,
}

impl Player {
    /// Creates a player at the configured spawn point, at rest and facing +X.
    pub fn new(config: &PlayerConfig) -> Self {
        Player {
            position: config.spawn_point(),
            velocity: Vector3::zero(),
            input: Vector3::zero(),
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            radius: config.radius,
            height: config.height,
            max_speed: config.max_speed,
            jump_speed: config.jump_speed,
            reset_height: config.reset_height,
            look_sensitivity: config.look_sensitivity,
            on_ground: false,
        }
    }

    /// The camera position, `height` above the feet.
    pub fn eye_position(&self) -> Point3<f32> {
        self.position + Vector3::unit_y() * self.height
    }

    /// The center of the collision cylinder.
    pub fn center(&self) -> Point3<f32> {
        self.position + Vector3::unit_y() * (self.height / 2.0)
    }

    /// Unit vector of the horizontal facing direction.
    pub fn forward(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(yaw_cos, 0.0, yaw_sin)
    }

    /// Unit vector pointing to the player's right.
    pub fn right(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        Vector3::new(-yaw_sin, 0.0, yaw_cos)
    }

    /// Unit vector the eye looks along, including pitch.
    pub fn look_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.0.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.0.sin_cos();
        Vector3::new(pitch_cos * yaw_cos, pitch_sin, pitch_cos * yaw_sin).normalize()
    }

    /// Rotates a local-frame vector into the world frame.
    pub fn local_to_world(&self, local: Vector3<f32>) -> Vector3<f32> {
        self.right() * local.x + Vector3::unit_y() * local.y + self.forward() * local.z
    }

    /// Rotates a world-frame vector into the local frame.
    pub fn world_to_local(&self, world: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(world.dot(self.right()), world.y, world.dot(self.forward()))
    }

    /// The current velocity expressed in the world frame.
    pub fn world_velocity(&self) -> Vector3<f32> {
        self.local_to_world(self.velocity)
    }

    /// Adds a velocity change given in the world frame.
    pub fn apply_world_delta_velocity(&mut self, delta: Vector3<f32>) {
        self.velocity += self.world_to_local(delta);
    }

    /// Moves the player for one step.
    ///
    /// Horizontal velocity snaps to the requested input (no acceleration ramp) and is
    /// applied along the current facing; vertical velocity carries over.
    pub fn apply_input(&mut self, dt: f32) {
        self.velocity.x = self.input.x;
        self.velocity.z = self.input.z;

        let horizontal = self.local_to_world(Vector3::new(self.velocity.x, 0.0, self.velocity.z));
        self.position += horizontal * dt;
        self.position.y += self.velocity.y * dt;
    }

    /// Sets the requested horizontal velocity from a direction in `[-1, 1]` per axis.
    ///
    /// `x` is right, `z` is forward. Each held axis moves at `max_speed`.
    pub fn set_move_intent(&mut self, right: f32, forward: f32) {
        self.input = Vector3::new(right * self.max_speed, 0.0, forward * self.max_speed);
    }

    /// Adds the jump impulse if the player is standing on something.
    ///
    /// # Returns
    /// `true` if the jump happened.
    pub fn jump(&mut self) -> bool {
        if self.on_ground {
            self.velocity.y += self.jump_speed;
            true
        } else {
            false
        }
    }

    /// Lifts the player to the reset height and stops all motion.
    pub fn reset(&mut self) {
        self.position.y = self.reset_height;
        self.velocity = Vector3::zero();
    }

    /// Turns the view by a look delta, clamping pitch just short of straight up or down.
    pub fn look(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += Rad(delta_x * self.look_sensitivity);
        self.pitch += Rad(-delta_y * self.look_sensitivity);

        if self.pitch < -Rad(SAFE_FRAC_PI_2) {
            self.pitch = -Rad(SAFE_FRAC_PI_2);
        } else if self.pitch > Rad(SAFE_FRAC_PI_2) {
            self.pitch = Rad(SAFE_FRAC_PI_2);
        }
    }

    /// Returns `true` if position and velocity hold no NaN or infinity.
    pub fn is_finite(&self) -> bool {
        let position: [f32; 3] = self.position.into();
        let velocity: [f32; 3] = self.velocity.into();
        position.iter().chain(velocity.iter()).all(|c| c.is_finite())
    }
}
