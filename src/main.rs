//! # Stacking Puzzle Entry Point
//!
//! Calls into the library's `run()` function to open the puzzle window.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release
//! ```

fn main() {
    stacking_puzzle::run();
}
