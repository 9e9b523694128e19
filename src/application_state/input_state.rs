//! # Input State
//!
//! This module defines the input state types handed from the input layer to the engine.
//! Devices are abstracted away: the platform layer maps its keys and buttons onto
//! `InputAction`s, and the engine only ever sees per-action transitions plus a look delta.

use std::collections::HashMap;

/// Every discrete intent the simulation responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Walk along the facing direction.
    MoveForward,
    /// Walk against the facing direction.
    MoveBackward,
    /// Strafe left.
    MoveLeft,
    /// Strafe right.
    MoveRight,
    /// Jump if standing on something.
    Jump,
    /// Teleport back up to the reset height.
    Reset,
    /// Remove the block under the crosshair.
    Interact,
}

impl InputAction {
    /// Every action, in declaration order.
    pub const ALL: [InputAction; 7] = [
        InputAction::MoveForward,
        InputAction::MoveBackward,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Jump,
        InputAction::Reset,
        InputAction::Interact,
    ];
}

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed this frame
    Pressed,
    /// Key/button has been held down for multiple frames
    Held,
    /// Key/button was just released this frame
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this frame
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Determines if the input was just released this frame
    pub fn is_just_released(&self) -> bool {
        matches!(self, RawInputState::Released)
    }

    /// Derives the transition from the previous and current down states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of the processed input states with state transitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedInputState {
    /// Current state of every tracked action
    pub action_states: HashMap<InputAction, RawInputState>,

    /// Look delta accumulated since the last snapshot (x, y)
    pub look_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of an action. Untracked actions read as not pressed.
    pub fn get_action_state(&self, action: InputAction) -> RawInputState {
        self.action_states.get(&action).copied().unwrap_or_default()
    }

    /// Gets the look delta since the last snapshot
    pub fn get_look_delta(&self) -> Option<(f64, f64)> {
        self.look_delta
    }

    /// Builds a snapshot where exactly `held` are down and were already down last frame.
    pub fn holding(held: &[InputAction]) -> Self {
        let action_states = held
            .iter()
            .map(|action| (*action, RawInputState::Held))
            .collect();
        ProcessedInputState {
            action_states,
            look_delta: None,
        }
    }
}
