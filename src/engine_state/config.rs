//! # Engine Configuration
//!
//! Every tunable the simulation reads at startup, grouped by subsystem and loaded from
//! JSON. Each struct defaults its missing fields, so a config file only has to name
//! what it changes:
//!
//! ```json
//! { "world": { "draw_distance": 2, "params": { "seed": 7 } } }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cgmath::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::voxels::params::{ChunkSize, GenerationParams};

/// Reasons a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}")]
    Io {
        /// The path that was read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The text is not valid JSON for an `EngineConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// The values parsed but describe an unusable world.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// World layout and generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Dimensions of every chunk.
    pub chunk_size: ChunkSize,
    /// Streaming radius around the player, in chunks.
    pub draw_distance: u32,
    /// Seed and noise parameters.
    pub params: GenerationParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            chunk_size: ChunkSize::default(),
            draw_distance: 1,
            params: GenerationParams::default(),
        }
    }
}

/// Player body and controls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Radius of the collision cylinder.
    pub radius: f32,
    /// Height of the collision cylinder; the eye sits at the top.
    pub height: f32,
    /// Horizontal speed while a direction is held, in blocks per second.
    pub max_speed: f32,
    /// Upward velocity added by a jump.
    pub jump_speed: f32,
    /// Feet position on startup.
    pub spawn: [f32; 3],
    /// Feet height the reset action teleports to.
    pub reset_height: f32,
    /// Radians of rotation per unit of look delta.
    pub look_sensitivity: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            radius: 0.5,
            height: 1.75,
            max_speed: 10.0,
            jump_speed: 10.0,
            spawn: [32.0, 32.0, 32.0],
            reset_height: 32.0,
            look_sensitivity: 0.002,
        }
    }
}

impl PlayerConfig {
    /// The spawn position as a point.
    pub fn spawn_point(&self) -> Point3<f32> {
        Point3::from(self.spawn)
    }
}

/// Fixed-step simulation settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Simulation steps per second.
    pub simulation_rate: f32,
    /// Downward acceleration, in blocks per second squared.
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            simulation_rate: 200.0,
            gravity: 32.0,
        }
    }
}

impl PhysicsConfig {
    /// Duration of one simulation step, in seconds.
    pub fn step_dt(&self) -> f32 {
        1.0 / self.simulation_rate
    }
}

/// The complete engine configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// World layout and generation.
    pub world: WorldConfig,
    /// Player body and controls.
    pub player: PlayerConfig,
    /// Simulation settings.
    pub physics: PhysicsConfig,
}

impl EngineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Checks every value the simulation divides by or builds geometry from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.params.validate()?;
        self.world.chunk_size.validate()?;

        let player = &self.player;
        if !(player.radius > 0.0 && player.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "player radius and height must be positive, got {} and {}",
                player.radius, player.height
            )));
        }
        if !player.spawn.iter().all(|c| c.is_finite()) {
            return Err(ConfigError::Invalid("player spawn must be finite".to_string()));
        }

        if !(self.physics.simulation_rate > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "simulation rate must be positive, got {}",
                self.physics.simulation_rate
            )));
        }
        if !self.physics.gravity.is_finite() {
            return Err(ConfigError::Invalid("gravity must be finite".to_string()));
        }

        Ok(())
    }
}
