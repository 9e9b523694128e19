//! # Application State Management
//!
//! This module drives the engine from the outside:
//! - Input handling (`input_manager`, `input_state`)
//! - Frame timing between consecutive frames
//!
//! A windowing or scripting front end feeds input events into the `InputManager` and
//! calls `about_to_wait` once per frame; everything else happens in the engine.

pub mod input_manager;
pub mod input_state;

use input_manager::InputManager;
use web_time::Instant;

use crate::engine_state::{config::EngineConfig, EngineState, FrameReport};

/// The running application: the engine, its input, and the frame clock.
pub struct ApplicationState {
    /// The core engine state and logic
    pub engine_state: EngineState,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Timestamp of the last frame for delta time calculations
    pub last_wait_time: Instant,
}

impl ApplicationState {
    /// Builds the engine from `config` and starts the frame clock at `now`.
    pub fn new(config: &EngineConfig, now: Instant) -> Self {
        Self {
            engine_state: EngineState::new(config),
            input_manager: InputManager::new(),
            last_wait_time: now,
        }
    }

    /// Runs one frame: snapshots input, hands it to the engine, and advances the
    /// simulation by the time since the previous frame.
    ///
    /// # Arguments
    /// * `now` - The timestamp of this frame
    pub fn about_to_wait(&mut self, now: Instant) -> FrameReport {
        let wait_dt = now.saturating_duration_since(self.last_wait_time);

        let processed_input = self.input_manager.get_and_reset_processed_input();
        self.engine_state.set_input_commands(processed_input);

        let report = self.engine_state.update(wait_dt);
        self.last_wait_time = now;
        report
    }

    /// Releases every held action so nothing stays stuck while unfocused.
    pub fn focus_lost(&mut self) {
        self.input_manager.release_all();
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::input_state::InputAction;
    use super::*;

    fn config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.world.chunk_size.width = 8;
        config.world.chunk_size.height = 8;
        config.world.draw_distance = 0;
        config.player.spawn = [4.5, 40.0, 4.5];
        config
    }

    #[test]
    fn frame_time_drives_physics_steps() {
        let start = Instant::now();
        let mut app = ApplicationState::new(&config(), start);

        let report = app.about_to_wait(start + Duration::from_millis(22));
        assert_eq!(report.steps, 4);
        assert!(app.engine_state.player().velocity.y < 0.0);
    }

    #[test]
    fn held_movement_moves_the_player() {
        let start = Instant::now();
        let mut app = ApplicationState::new(&config(), start);

        app.input_manager.intake_action(InputAction::MoveForward, true);
        app.about_to_wait(start + Duration::from_millis(101));

        // facing +X at 10 blocks per second
        let player = app.engine_state.player();
        assert!(player.position.x > 5.4);
        assert!((player.position.z - 4.5).abs() < 1e-4);
    }

    #[test]
    fn focus_loss_stops_movement() {
        let start = Instant::now();
        let mut app = ApplicationState::new(&config(), start);
        app.input_manager.intake_action(InputAction::MoveRight, true);
        app.about_to_wait(start + Duration::from_millis(16));

        app.focus_lost();
        app.about_to_wait(start + Duration::from_millis(32));
        assert!(!app.engine_state.player_actions.move_right);
    }
}
