//! # Input Manager
//!
//! This module turns raw window events into puzzle input, including:
//! - Key and mouse button press tracking
//! - Pointer position in normalised device coordinates
//! - Scroll-wheel rotation
//! - Right-button orbit dragging

use std::collections::HashMap;

use cgmath::Vector2;
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{InputCommand, ProcessedInputState, RawInputState};
use crate::puzzle_state::PuzzleAction;

const KEY_CODES: [KeyCode; 5] = [
    KeyCode::KeyQ,
    KeyCode::KeyE,
    KeyCode::KeyF,
    KeyCode::Enter,
    KeyCode::NumpadEnter,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// The action bound to a tracked key.
fn key_action(key: KeyCode) -> Option<PuzzleAction> {
    match key {
        KeyCode::KeyQ => Some(PuzzleAction::RotateCounterClockwise),
        KeyCode::KeyE => Some(PuzzleAction::RotateClockwise),
        KeyCode::KeyF => Some(PuzzleAction::ToggleFlip),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(PuzzleAction::Commit),
        _ => None,
    }
}

/// The rotation for one wheel event. Scrolling up turns clockwise.
fn scroll_action(delta: MouseScrollDelta) -> Option<PuzzleAction> {
    let amount = match delta {
        MouseScrollDelta::LineDelta(_, y) => y as f64,
        MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y,
    };
    if amount > 0.0 {
        Some(PuzzleAction::RotateClockwise)
    } else if amount < 0.0 {
        Some(PuzzleAction::RotateCounterClockwise)
    } else {
        None
    }
}

/// Converts a pixel position to normalised device coordinates (y up).
fn to_ndc(position: PhysicalPosition<f64>, size: PhysicalSize<u32>) -> Vector2<f32> {
    let width = size.width.max(1) as f64;
    let height = size.height.max(1) as f64;
    Vector2::new(
        (2.0 * position.x / width - 1.0) as f32,
        (1.0 - 2.0 * position.y / height) as f32,
    )
}

/// Tracks input devices and queues the commands they produce.
///
/// Presses are detected by comparing each key's previous state with the new one,
/// so held keys and key repeat fire an action once.
pub struct InputManager {
    /// Last known state of all tracked keyboard keys
    pub keyboard_inputs: HashMap<KeyCode, bool>,
    /// Last known state of all tracked mouse buttons
    pub mouse_button_inputs: HashMap<MouseButton, bool>,
    /// Size of the window the pointer moves in
    window_size: PhysicalSize<u32>,
    /// Commands not yet handed out
    pending: Vec<InputCommand>,
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    ///
    /// # Arguments
    /// * `window_size` - Current inner size of the window, for pointer conversion
    pub fn new(window_size: PhysicalSize<u32>) -> Self {
        Self {
            keyboard_inputs: KEY_CODES.into_iter().map(|key| (key, false)).collect(),
            mouse_button_inputs: MOUSE_BUTTONS.into_iter().map(|button| (button, false)).collect(),
            window_size,
            pending: Vec::new(),
        }
    }

    /// Records the new window size.
    pub fn resize(&mut self, size: PhysicalSize<u32>) {
        self.window_size = size;
    }

    /// Whether the right mouse button is down.
    pub fn is_orbiting(&self) -> bool {
        self.mouse_button_inputs
            .get(&MouseButton::Right)
            .copied()
            .unwrap_or(false)
    }

    /// Processes a window event and queues whatever commands it produces.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => {
                if let Some(key_state) = self.keyboard_inputs.get_mut(key) {
                    let pressed = *state == ElementState::Pressed;
                    let transition = RawInputState::from_raw_states(*key_state, pressed);
                    *key_state = pressed;
                    if transition.is_just_pressed() {
                        if let Some(action) = key_action(*key) {
                            self.pending.push(InputCommand::Action(action));
                        }
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(action) = scroll_action(*delta) {
                    self.pending.push(InputCommand::Action(action));
                }
            }
            WindowEvent::MouseInput { button, state, .. } => {
                if let Some(button_state) = self.mouse_button_inputs.get_mut(button) {
                    let pressed = *state == ElementState::Pressed;
                    let transition = RawInputState::from_raw_states(*button_state, pressed);
                    *button_state = pressed;
                    if *button == MouseButton::Left && transition.is_just_pressed() {
                        self.pending.push(InputCommand::Action(PuzzleAction::Click));
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.pending
                    .push(InputCommand::PointerMoved(to_ndc(*position, self.window_size)));
            }
            WindowEvent::CursorLeft { .. } => {
                self.pending.push(InputCommand::PointerLeft);
            }
            WindowEvent::Resized(size) => self.resize(*size),
            _ => {}
        }
    }

    /// Queues an orbit drag if the right button is held.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last update
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.is_orbiting() {
            self.pending.push(InputCommand::Orbit(delta));
        }
    }

    /// Returns everything queued since the last call, in arrival order.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        ProcessedInputState {
            commands: std::mem::take(&mut self.pending),
        }
    }

    /// Releases every key and button.
    ///
    /// This is called when the window loses focus to prevent stuck keys or buttons.
    pub fn reset_inputs(&mut self) {
        self.keyboard_inputs.values_mut().for_each(|state| *state = false);
        self.mouse_button_inputs.values_mut().for_each(|state| *state = false);
    }
}
