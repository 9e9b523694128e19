//! # Input Manager
//!
//! This module turns a stream of press/release and look events into one
//! `ProcessedInputState` snapshot per frame, including the pressed/held/released
//! transitions that jump, reset and interact rely on.

use std::collections::HashMap;

use super::input_state::{InputAction, ProcessedInputState, RawInputState};

/// Tracks the down state of every action across two frames and the pending look delta.
#[derive(Debug, Clone)]
pub struct InputManager {
    /// Down state of each action at the previous snapshot
    pub action_inputs_old: HashMap<InputAction, bool>,
    /// Down state of each action now
    pub action_inputs_new: HashMap<InputAction, bool>,

    /// Look delta accumulated since the last snapshot (x, y)
    pub look_delta: Option<(f64, f64)>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every action released.
    pub fn new() -> Self {
        let mut action_inputs_old = HashMap::new();
        let mut action_inputs_new = HashMap::new();
        for action in InputAction::ALL {
            action_inputs_old.insert(action, false);
            action_inputs_new.insert(action, false);
        }

        Self {
            action_inputs_old,
            action_inputs_new,
            look_delta: None,
        }
    }

    /// Copies the current down states into the previous ones.
    pub fn move_old_states(&mut self) {
        for (action, new_state) in self.action_inputs_new.iter() {
            if let Some(old_state) = self.action_inputs_old.get_mut(action) {
                *old_state = *new_state;
            }
        }
    }

    /// Records that `action` went down (`true`) or up (`false`).
    pub fn intake_action(&mut self, action: InputAction, down: bool) {
        if let Some(state) = self.action_inputs_new.get_mut(&action) {
            *state = down;
        }
    }

    /// Adds a look delta. Several deltas within one frame are summed.
    pub fn intake_look_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.look_delta.unwrap_or((0.0, 0.0));
        self.look_delta = Some((x + delta.0, y + delta.1));
    }

    /// Creates a processed input state from the current raw boolean states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let action_states = self
            .action_inputs_new
            .iter()
            .map(|(action, &new_state)| {
                let old_state = self.action_inputs_old.get(action).copied().unwrap_or(false);
                (*action, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            action_states,
            look_delta: self.look_delta,
        }
    }

    /// Returns this frame's snapshot and prepares for the next frame.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Rolls the down states over and drops the pending look delta.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.look_delta = None;
    }

    /// Releases every action, e.g. when focus is lost, so nothing stays stuck down.
    pub fn release_all(&mut self) {
        for state in self.action_inputs_new.values_mut() {
            *state = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_hold_release_sequence() {
        let mut manager = InputManager::new();

        manager.intake_action(InputAction::Jump, true);
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_action_state(InputAction::Jump), RawInputState::Pressed);

        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_action_state(InputAction::Jump), RawInputState::Held);

        manager.intake_action(InputAction::Jump, false);
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_action_state(InputAction::Jump), RawInputState::Released);

        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_action_state(InputAction::Jump), RawInputState::NotPressed);
    }

    #[test]
    fn look_deltas_accumulate_until_the_snapshot() {
        let mut manager = InputManager::new();
        manager.intake_look_motion((1.0, -2.0));
        manager.intake_look_motion((3.0, 0.5));
        let frame = manager.get_and_reset_processed_input();
        assert_eq!(frame.get_look_delta(), Some((4.0, -1.5)));
        assert_eq!(manager.get_and_reset_processed_input().get_look_delta(), None);
    }

    #[test]
    fn release_all_reports_a_release() {
        let mut manager = InputManager::new();
        manager.intake_action(InputAction::MoveForward, true);
        manager.get_and_reset_processed_input();
        manager.release_all();
        let frame = manager.get_and_reset_processed_input();
        assert!(frame
            .get_action_state(InputAction::MoveForward)
            .is_just_released());
    }
}
