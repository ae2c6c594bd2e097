//! # Input State
//!
//! This module defines the input state types used by the input manager.
//! It provides enums and structs for representing the state of input devices
//! and the ordered commands they produce.

use cgmath::Vector2;

use crate::puzzle_state::PuzzleAction;

/// Represents the state of a key or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key/button is not pressed
    #[default]
    NotPressed,
    /// Key/button was just pressed
    Pressed,
    /// Key/button has been held down (includes key repeat)
    Held,
    /// Key/button was just released
    Released,
}

impl RawInputState {
    /// Determines if the input was just pressed
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Updates the input state based on the previous and current raw states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// One thing the puzzle should react to, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputCommand {
    /// The pointer moved; position in normalised device coordinates.
    PointerMoved(Vector2<f32>),
    /// The pointer left the window.
    PointerLeft,
    /// A discrete puzzle action.
    Action(PuzzleAction),
    /// Drag the camera orbit by `(dx, dy)` pixels.
    Orbit((f64, f64)),
}

/// The commands gathered since the last time input was processed.
///
/// Commands are kept in arrival order so that, for example, a pointer move
/// followed by a click hovers before it selects.
#[derive(Debug, Default)]
pub struct ProcessedInputState {
    /// Commands in arrival order
    pub commands: Vec<InputCommand>,
}

impl ProcessedInputState {
    /// Whether nothing happened.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
