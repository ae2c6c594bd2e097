#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Stacking Puzzle
//!
//! The placement engine of a 3D block-stacking puzzle. Cubic blocks sit on a
//! pyramidal lattice, and a new block may only go where all three of its lower
//! neighbours are already filled.
//!
//! ## Key Modules
//!
//! * `puzzle_state` - Lattice occupancy, candidate computation, hover/selection and
//!   orientation, ray picking and the per-cell visual state handed to a renderer
//! * `config` - JSON settings for the board size and camera
//! * `error` - Placement and configuration errors
//! * `application_state` - The window and input wiring (private)
//!
//! ## Usage
//!
//! ```rust
//! use stacking_puzzle::config::PuzzleConfig;
//! use stacking_puzzle::puzzle_state::lattice::cell::Cell;
//! use stacking_puzzle::puzzle_state::PuzzleSession;
//!
//! let mut session = PuzzleSession::with_default_visuals(&PuzzleConfig::default()).unwrap();
//! let cell = Cell::new(1, 1, 0);
//! assert!(session.store().is_candidate(cell));
//!
//! session.set_orientation(2, true);
//! session.select(cell).unwrap();
//! session.commit().unwrap();
//! assert!(session.store().is_occupied(cell));
//! ```
//!
//! The interactive build opens a window and routes pointer and keyboard input into
//! a [`puzzle_state::PuzzleSession`]:
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

use application_state::ApplicationState;
use config::PuzzleConfig;
use log::{error, info};
use puzzle_state::PuzzleSession;
use winit::event_loop::EventLoop;

mod application_state;
pub mod config;
pub mod error;
pub mod puzzle_state;

/// Starts logging, loads the config and runs the puzzle window until it closes.
pub fn run() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");

    let config = match PuzzleConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!("Could not load config: {err}");
            return;
        }
    };
    let session = match PuzzleSession::with_default_visuals(&config) {
        Ok(session) => session,
        Err(err) => {
            error!("Could not start puzzle: {err}");
            return;
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            error!("Could not create event loop: {err}");
            return;
        }
    };

    let mut state = ApplicationState::new(session, config.camera);

    if let Err(err) = event_loop.run_app(&mut state) {
        error!("Event loop stopped: {err}");
    }
}
