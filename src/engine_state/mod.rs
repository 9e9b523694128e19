//! # Engine State Module
//!
//! The core engine module that owns the simulation and advances it frame by frame.
//!
//! ## Key Components
//!
//! * `EngineState` - The main state container for the engine
//! * `config` - Startup configuration for every subsystem
//! * `physics` - Fixed-step player simulation and block picking
//! * `player_state` - The player body and its controller
//! * `voxels` - Voxel data, chunk generation, meshing and streaming
//!
//! ## Frame Flow
//!
//! 1. `set_input_commands` turns the frame's input snapshot into `PlayerAction`s
//! 2. `update` applies look and movement intents to the player
//! 3. Physics consumes the frame time in fixed steps against the world
//! 4. The world streams chunks around the player's new position
//! 5. An interact request removes the block under the crosshair
//!
//! The renderer then reads the player pose and drains the world's render events.

use cgmath::Point3;
use web_time::Duration;

use config::EngineConfig;
use physics::{raycast::raycast, Physics};
use player_state::{player::Player, PlayerController};
use voxels::{
    block::block_type::BlockType,
    params::GenerationParams,
    world::{StreamingReport, World, WorldRenderEvent},
};

use crate::application_state::input_state::{InputAction, ProcessedInputState};

pub mod config;
pub mod physics;
pub mod player_state;
pub mod voxels;

/// Farthest distance, in blocks, at which the player can interact with a block.
pub const INTERACT_REACH: f32 = 5.0;

/// What one call to [`EngineState::update`] did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// Physics steps simulated
    pub steps: u32,
    /// Chunks streamed in and out
    pub streaming: StreamingReport,
    /// The block removed by an interact request, with its world position
    pub removed_block: Option<(Point3<i32>, BlockType)>,
}

/// The main state container for the voxel engine
///
/// Owns the world, the player and the simulation, and coordinates them once per frame.
///
/// # Examples
///
/// ```
/// use voxel_world::{EngineConfig, EngineState};
/// use web_time::Duration;
///
/// let mut config = EngineConfig::default();
/// config.world.draw_distance = 0;
/// let mut engine_state = EngineState::new(&config);
///
/// engine_state.update(Duration::from_millis(16));
/// assert!(engine_state.world().loaded_chunk_count() > 0);
/// ```
pub struct EngineState {
    world: World,
    player: Player,
    controller: PlayerController,
    physics: Physics,
    /// Current player actions derived from input
    pub player_actions: PlayerAction,
}

impl EngineState {
    /// Creates the engine with the world generated around the player's spawn point
    pub fn new(config: &EngineConfig) -> Self {
        let mut world = World::new(&config.world);
        let player = Player::new(&config.player);
        let physics = Physics::new(&config.physics);

        let report = world.update(player.position);
        log::info!(
            "Engine ready: {} chunks around spawn {:?}",
            report.loaded.len(),
            player.position
        );

        Self {
            world,
            player,
            controller: PlayerController::default(),
            physics,
            player_actions: PlayerAction::default(),
        }
    }

    /// The voxel world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the voxel world, for edits outside the frame flow
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player's current pose and motion
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player, e.g. to teleport it
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    /// The physics simulation, including the last step's debug data
    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Regenerates the whole world from new parameters around the current viewpoint
    pub fn regenerate(&mut self, params: GenerationParams) -> StreamingReport {
        self.world.set_params(params);
        self.world.generate()
    }

    /// Takes every pending render event from the world.
    ///
    /// Call once per frame when a renderer is attached; otherwise switch recording off
    /// with [`World::set_render_events`].
    pub fn drain_render_events(&mut self) -> Vec<WorldRenderEvent> {
        self.world.drain_render_events()
    }

    /// Advances the simulation by one frame.
    ///
    /// # Arguments
    ///
    /// * `wait_duration` - The time elapsed since the last frame
    pub fn update(&mut self, wait_duration: Duration) -> FrameReport {
        self.controller.intake_actions(&self.player_actions);
        self.controller.apply_to(&mut self.player);

        let steps = self
            .physics
            .update(wait_duration.as_secs_f32(), &mut self.player, &self.world);

        let streaming = self.world.update(self.player.position);

        let removed_block = if self.player_actions.interact {
            self.interact()
        } else {
            None
        };

        self.player_actions.clear_one_shots();

        FrameReport {
            steps,
            streaming,
            removed_block,
        }
    }

    /// Removes the first solid block along the player's line of sight, if within reach
    pub fn interact(&mut self) -> Option<(Point3<i32>, BlockType)> {
        let hit = raycast(
            &self.world,
            self.player.eye_position(),
            self.player.look_direction(),
            INTERACT_REACH,
        )?;
        let block = hit.block;
        let removed = self.world.remove_block(block.x, block.y, block.z)?;
        log::info!("Removed {:?} at {:?}", removed, block);
        Some((block, removed))
    }

    /// Sets the input commands for the engine state.
    ///
    /// # Arguments
    /// * `input` - The processed input state to use for setting commands
    pub fn set_input_commands(&mut self, input: ProcessedInputState) {
        self.player_actions = Self::translate_processed_input(&input);
    }

    /// Translates the processed input state into player actions.
    ///
    /// # Arguments
    /// * `input` - The processed input state to translate
    ///
    /// # Returns
    /// A PlayerAction struct with the appropriate actions set
    fn translate_processed_input(input: &ProcessedInputState) -> PlayerAction {
        PlayerAction {
            // Movement actions - active if pressed or held
            move_forward: input.get_action_state(InputAction::MoveForward).is_active(),
            move_backward: input.get_action_state(InputAction::MoveBackward).is_active(),
            move_left: input.get_action_state(InputAction::MoveLeft).is_active(),
            move_right: input.get_action_state(InputAction::MoveRight).is_active(),

            rotate_view: input.get_look_delta(),

            // Discrete actions - only trigger on press, not hold
            jump: input.get_action_state(InputAction::Jump).is_just_pressed(),
            reset: input.get_action_state(InputAction::Reset).is_just_pressed(),
            interact: input.get_action_state(InputAction::Interact).is_just_pressed(),
        }
    }
}

/// Represents player actions derived from input
///
/// This struct contains flags for the actions the player can trigger in one frame.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerAction {
    /// Walk forward - true if pressed or held
    pub move_forward: bool,
    /// Walk backward - true if pressed or held
    pub move_backward: bool,
    /// Strafe left - true if pressed or held
    pub move_left: bool,
    /// Strafe right - true if pressed or held
    pub move_right: bool,

    /// View rotation - Some if the look input moved
    pub rotate_view: Option<(f64, f64)>,

    /// Jump - only on the frame it was pressed
    pub jump: bool,
    /// Reset to the reset height - only on the frame it was pressed
    pub reset: bool,
    /// Remove the targeted block - only on the frame it was pressed
    pub interact: bool,
}

impl PlayerAction {
    /// Drops everything that must only act once, keeping held movement.
    fn clear_one_shots(&mut self) {
        self.rotate_view = None;
        self.jump = false;
        self.reset = false;
        self.interact = false;
    }
}
