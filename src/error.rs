//! # Error Types
//!
//! Errors raised by the lattice store, the placement session and the config layer.
//! Every placement error is locally recoverable: callers log it and leave the
//! prior board state visible.

use std::error::Error;
use std::fmt;

use crate::puzzle_state::lattice::cell::Cell;

/// Why a placement was rejected by the lattice store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPlacementReason {
    /// The cell lies outside the bounded lattice.
    OutOfBounds,
    /// The cell already holds a block.
    AlreadyOccupied,
    /// The cell is not in the candidate set (its support triple is incomplete,
    /// or it sits on or below the base layer).
    Unsupported,
}

impl fmt::Display for InvalidPlacementReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "cell is outside the lattice"),
            Self::AlreadyOccupied => write!(f, "cell is already occupied"),
            Self::Unsupported => write!(f, "cell is not a placement candidate"),
        }
    }
}

/// Errors from lattice and placement operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// A commit targeted a cell outside the current candidate set.
    /// The occupied set is never touched when this is returned.
    InvalidPlacement {
        /// The offending cell.
        cell: Cell,
        /// Which rule rejected it.
        reason: InvalidPlacementReason,
    },
    /// The base layer was initialised over a cell that is already filled.
    DuplicateBaseFill {
        /// The first base cell found occupied.
        cell: Cell,
    },
    /// A hover or selection refers to a cell that left the candidate set.
    StaleSelection {
        /// The stale cell.
        cell: Cell,
    },
    /// A commit was requested with nothing selected.
    NoSelection,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPlacement { cell, reason } => {
                write!(f, "invalid placement at {cell}: {reason}")
            }
            Self::DuplicateBaseFill { cell } => {
                write!(f, "base layer cell {cell} is already occupied")
            }
            Self::StaleSelection { cell } => {
                write!(f, "selection {cell} is no longer a placement candidate")
            }
            Self::NoSelection => write!(f, "no cell is selected"),
        }
    }
}

impl Error for PlacementError {}

/// Errors from loading or validating a [`PuzzleConfig`](crate::config::PuzzleConfig).
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(std::io::Error),
    /// The config file is not valid JSON for the config schema.
    Parse(serde_json::Error),
    /// The lattice half extent is outside the supported range.
    InvalidHalfExtent {
        /// The rejected value.
        value: i32,
        /// The largest supported value.
        max: i32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::InvalidHalfExtent { value, max } => {
                write!(f, "half_extent {value} must be in 1..={max}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::InvalidHalfExtent { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
