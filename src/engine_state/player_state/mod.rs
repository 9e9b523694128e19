//! # Player State Management
//!
//! This module handles everything the player controls directly:
//! - The kinematic body (`Player`): feet position, local velocity, facing
//! - Turning per-frame `PlayerAction`s into movement intents, look rotation, jumps and resets
//!
//! Physics owns the integration step; this module only prepares the inputs to it.

use player::Player;

use super::PlayerAction;

pub mod player;

/// Collects one frame's player actions and applies them to the body.
///
/// Movement intents persist until the next intake; jump and reset are one-shot and
/// cleared once applied.
#[derive(Debug, Default, Clone)]
pub struct PlayerController {
    // Direction intents, each in [-1, 1]
    strafe: f32,
    advance: f32,

    // Look delta, in input units
    rotate_horizontal: f32,
    rotate_vertical: f32,

    jump_requested: bool,
    reset_requested: bool,
}

impl PlayerController {
    /// Processes player actions and updates controller state accordingly.
    ///
    /// # Arguments
    /// * `actions` - The player's input actions to process
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        self.advance = axis(actions.move_forward, actions.move_backward);
        self.strafe = axis(actions.move_right, actions.move_left);

        if let Some((delta_x, delta_y)) = actions.rotate_view {
            self.rotate_horizontal += delta_x as f32;
            self.rotate_vertical += delta_y as f32;
        }

        self.jump_requested |= actions.jump;
        self.reset_requested |= actions.reset;
    }

    /// Applies the collected intents to `player` and clears the one-shot requests.
    pub fn apply_to(&mut self, player: &mut Player) {
        if self.rotate_horizontal != 0.0 || self.rotate_vertical != 0.0 {
            player.look(self.rotate_horizontal, self.rotate_vertical);
            self.rotate_horizontal = 0.0;
            self.rotate_vertical = 0.0;
        }

        player.set_move_intent(self.strafe, self.advance);

        if std::mem::take(&mut self.reset_requested) {
            player.reset();
            log::info!("Player reset to y = {}", player.reset_height);
        }
        if std::mem::take(&mut self.jump_requested) && player.jump() {
            log::debug!("Jumped from {:?}", player.position);
        }
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Rad;

    use super::*;
    use crate::engine_state::config::PlayerConfig;

    #[test]
    fn opposite_directions_cancel() {
        let mut controller = PlayerController::default();
        let mut player = Player::new(&PlayerConfig::default());
        controller.intake_actions(&PlayerAction {
            move_forward: true,
            move_backward: true,
            move_left: true,
            ..PlayerAction::default()
        });
        controller.apply_to(&mut player);
        assert_eq!(player.input.z, 0.0);
        assert_eq!(player.input.x, -10.0);
    }

    #[test]
    fn jump_is_consumed_once() {
        let mut controller = PlayerController::default();
        let mut player = Player::new(&PlayerConfig::default());
        player.on_ground = true;

        controller.intake_actions(&PlayerAction {
            jump: true,
            ..PlayerAction::default()
        });
        controller.apply_to(&mut player);
        assert_eq!(player.velocity.y, 10.0);

        controller.apply_to(&mut player);
        assert_eq!(player.velocity.y, 10.0);
    }

    #[test]
    fn look_delta_turns_the_player() {
        let mut controller = PlayerController::default();
        let mut player = Player::new(&PlayerConfig::default());
        controller.intake_actions(&PlayerAction {
            rotate_view: Some((100.0, 0.0)),
            ..PlayerAction::default()
        });
        controller.apply_to(&mut player);
        assert!((player.yaw - Rad(0.2)).0.abs() < 1e-6);
    }
}
