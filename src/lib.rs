#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A procedurally generated, chunked voxel world with a first-person player that walks,
//! falls, jumps and mines blocks.
//!
//! The crate is the simulation core; it does no rendering itself. A renderer reads the
//! player pose and the per-chunk instance batches, and mirrors batch changes by draining
//! [`World::drain_render_events`].
//!
//! ## Key Modules
//!
//! * `application_state` - Input snapshots and the per-frame driver
//! * `engine_state` - World generation and streaming, player, physics, configuration
//!
//! ## Architecture
//!
//! * Chunks are generated deterministically from `(seed, params, offset)` and tile seamlessly
//! * The world streams chunks in a square around the player
//! * Physics runs on a fixed timestep decoupled from the frame rate
//! * Block edits patch the instance batches in O(1) instead of re-meshing
//!
//! ## Usage
//!
//! ```rust
//! use voxel_world::{EngineConfig, EngineState};
//! use web_time::Duration;
//!
//! let mut config = EngineConfig::default();
//! config.world.draw_distance = 0;
//!
//! let mut engine = EngineState::new(&config);
//! for _ in 0..10 {
//!     engine.update(Duration::from_millis(16));
//! }
//! println!("player at {:?}", engine.player().position);
//! ```

use std::env;

use anyhow::Context;
use log::info;
use web_time::{Duration, Instant};

pub mod application_state;
pub mod engine_state;

pub use application_state::input_manager::InputManager;
pub use application_state::input_state::{InputAction, ProcessedInputState, RawInputState};
pub use application_state::ApplicationState;
pub use engine_state::config::{ConfigError, EngineConfig, PhysicsConfig, PlayerConfig, WorldConfig};
pub use engine_state::physics::collision::Collision;
pub use engine_state::physics::Physics;
pub use engine_state::player_state::player::Player;
pub use engine_state::voxels::block::block_type::BlockType;
pub use engine_state::voxels::block::Block;
pub use engine_state::voxels::chunk::Chunk;
pub use engine_state::voxels::params::{ChunkSize, GenerationParams};
pub use engine_state::voxels::rng::WorldRng;
pub use engine_state::voxels::world::{BlockQuery, ChunkKey, World, WorldError};
pub use engine_state::{EngineState, FrameReport, PlayerAction};

/// Environment variable naming the config file when no path is given on the command line.
pub const CONFIG_ENV_VAR: &str = "VOXEL_WORLD_CONFIG";

/// Frame length of the headless demo.
const DEMO_FRAME: Duration = Duration::from_micros(16_667);

/// Number of frames the headless demo runs.
const DEMO_FRAMES: u32 = 300;

/// Runs the headless demo: builds the world, then walks the player forward for a few
/// seconds of simulated time, jumping once a second.
pub fn run() -> anyhow::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = load_config()?;

    let start = Instant::now();
    let mut app = ApplicationState::new(&config, start);
    // nothing renders, so nothing would ever drain the queues
    app.engine_state.world_mut().set_render_events(false);
    info!("World built in {:?}", start.elapsed());

    app.input_manager.intake_action(InputAction::MoveForward, true);

    let mut now = start;
    for frame in 1..=DEMO_FRAMES {
        let jump = frame % 60 == 0;
        app.input_manager.intake_action(InputAction::Jump, jump);

        now += DEMO_FRAME;
        let report = app.about_to_wait(now);

        if !report.streaming.is_empty() || jump {
            let player = app.engine_state.player();
            info!(
                "frame {}: feet {:?}, on ground {}, +{} -{} chunks",
                frame,
                player.position,
                player.on_ground,
                report.streaming.loaded.len(),
                report.streaming.unloaded.len()
            );
        }
    }

    let engine = &app.engine_state;
    let instances: usize = engine
        .world()
        .chunks()
        .map(|(_, chunk)| chunk.instance_count())
        .sum();
    info!(
        "Finished: player at {:?}, {} chunks loaded, {} visible instances",
        engine.player().position,
        engine.world().loaded_chunk_count(),
        instances
    );

    Ok(())
}

/// Loads the config named on the command line or in the environment, or the defaults.
fn load_config() -> anyhow::Result<EngineConfig> {
    let path = env::args().nth(1).or_else(|| env::var(CONFIG_ENV_VAR).ok());
    match path {
        Some(path) => EngineConfig::load(&path)
            .with_context(|| format!("could not load config from {path}")),
        None => {
            info!("No config given, using defaults");
            Ok(EngineConfig::default())
        }
    }
}
