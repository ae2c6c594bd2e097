//! # Application State Management
//!
//! This module connects the window to the puzzle, including:
//! - Window creation
//! - Input routing in arrival order
//! - Pointer picking through the orbit camera
//! - Application lifecycle events

pub mod input_manager;
pub mod input_state;

use std::sync::Arc;

use cgmath::Vector2;
use input_manager::InputManager;
use input_state::InputCommand;
use log::{debug, error, info};

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::CameraConfig;
use crate::puzzle_state::camera_state::CameraState;
use crate::puzzle_state::picking::{BoardTransform, CandidatePicker};
use crate::puzzle_state::PuzzleSession;

/// The main application state container that manages the application's lifecycle.
///
/// The puzzle itself lives here from the start; the window and everything that
/// depends on its size are created once the event loop resumes.
pub struct ApplicationState {
    /// The puzzle being played
    pub session: PuzzleSession,

    /// Hit-testing table for the current candidate set
    pub picker: CandidatePicker,

    /// Initial orbit for the camera
    pub camera_config: CameraConfig,

    /// The window-bound state, once the window exists
    pub state: Option<InitializedApplicationState>,
}

/// Represents the window-bound part of the running application.
pub struct InitializedApplicationState {
    /// Handle to the application window
    pub window: Arc<Window>,

    /// Camera the pointer looks through
    pub camera_state: CameraState,

    /// Manages input state and event processing
    pub input_manager: InputManager,

    /// Last pointer position in normalised device coordinates
    pub last_pointer: Option<Vector2<f32>>,
}

impl ApplicationState {
    /// Creates the application around a started puzzle session.
    pub fn new(session: PuzzleSession, camera_config: CameraConfig) -> Self {
        let mut picker = CandidatePicker::new(BoardTransform::default());
        picker.refresh(session.store());
        Self {
            session,
            picker,
            camera_config,
            state: None,
        }
    }

    /// Applies every queued command in the order it arrived.
    fn process_input(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        let processed = state.input_manager.get_and_reset_processed_input();
        if processed.is_empty() {
            return;
        }

        for command in processed.commands {
            match command {
                InputCommand::PointerMoved(ndc) => {
                    state.last_pointer = Some(ndc);
                    Self::hover_at(&mut self.session, &mut self.picker, state);
                }
                InputCommand::PointerLeft => {
                    state.last_pointer = None;
                    self.session.hover(None);
                }
                InputCommand::Orbit(delta) => {
                    state.camera_state.drag(delta);
                    Self::hover_at(&mut self.session, &mut self.picker, state);
                }
                InputCommand::Action(action) => match self.session.apply(action) {
                    Ok(Some(cell)) => {
                        self.picker.refresh(self.session.store());
                        let snapshot = self.session.snapshot();
                        info!(
                            "Placed block at {cell}: {} instances to draw",
                            snapshot.instances().len()
                        );
                        state.window.set_title(&format!(
                            "Stacking Puzzle: {} blocks",
                            self.session.store().occupied_count()
                        ));
                    }
                    Ok(None) => {}
                    Err(err) => debug!("{action:?} ignored: {err}"),
                },
            }
        }
    }

    /// Re-picks the hovered cell under the last pointer position.
    fn hover_at(
        session: &mut PuzzleSession,
        picker: &mut CandidatePicker,
        state: &InitializedApplicationState,
    ) {
        picker.refresh(session.store());
        let ray = state
            .last_pointer
            .and_then(|ndc| state.camera_state.pointer_ray(ndc));
        match ray {
            Some(ray) => session.hover_ray(&ray, &*picker),
            None => session.hover(None),
        }
    }
}

impl ApplicationHandler for ApplicationState {
    /// Handles window-related events such as resize, focus changes, and input events.
    ///
    /// Input events are queued by the input manager and applied in `about_to_wait`.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        state.input_manager.intake_input(&event);

        match event {
            WindowEvent::Resized(size) => {
                state.camera_state.resize(size.width, size.height);
            }
            WindowEvent::Focused(is_focused) => {
                if !is_focused {
                    state.input_manager.reset_inputs();
                }
            }
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            _ => (),
        }
    }

    /// Handles device-level input events such as mouse motion.
    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = &mut self.state {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.input_manager.intake_mouse_motion(delta);
            }
        }
    }

    /// Creates the window the first time the application is resumed.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let attributes = Window::default_attributes().with_title("Stacking Puzzle");
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        info!("Window created at {}x{}", size.width, size.height);

        self.state = Some(InitializedApplicationState {
            camera_state: CameraState::new(&self.camera_config, size.width, size.height),
            input_manager: InputManager::new(size),
            last_pointer: None,
            window,
        });
    }

    /// Called before the event loop goes to sleep.
    ///
    /// Applies the input gathered since the last wake-up.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.process_input();
    }
}
