//! # Orientation Module
//!
//! The discrete pose carried by a pending placement: a rotation index about the
//! lattice's (1,1,1) diagonal plus a flip that turns the block upside down along
//! that diagonal.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation, Rotation3, Vector3};

/// Number of distinct rotation ticks.
pub const ORIENTATION_TICKS: i32 = 6;

/// Rotation index in `0..6` plus a flip flag.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Orientation {
    ticks: u8,
    flip: bool,
}

impl Orientation {
    /// The neutral pose: no rotation, no flip.
    pub const NEUTRAL: Orientation = Orientation { ticks: 0, flip: false };

    /// Creates an orientation, wrapping `ticks` into `0..6` (negative values included).
    pub fn new(ticks: i32, flip: bool) -> Self {
        Orientation {
            ticks: ticks.rem_euclid(ORIENTATION_TICKS) as u8,
            flip,
        }
    }

    /// The rotation index in `0..6`.
    pub fn ticks(&self) -> u8 {
        self.ticks
    }

    /// Whether the block is flipped along the diagonal.
    pub fn flip(&self) -> bool {
        self.flip
    }

    /// One tick clockwise.
    pub fn rotated_clockwise(self) -> Self {
        Orientation::new(self.ticks as i32 + 1, self.flip)
    }

    /// One tick counter-clockwise.
    pub fn rotated_counter_clockwise(self) -> Self {
        Orientation::new(self.ticks as i32 - 1, self.flip)
    }

    /// Same rotation with the flip toggled.
    pub fn flipped(self) -> Self {
        Orientation {
            ticks: self.ticks,
            flip: !self.flip,
        }
    }

    /// The block's pose in lattice space.
    ///
    /// Starts from the flip pose (identity, or the half turn taking the diagonal to
    /// its opposite), then turns about the diagonal by `2π · ticks / 3` in world space.
    pub fn rotation(&self) -> Quaternion<f32> {
        let diagonal = Vector3::new(1.0, 1.0, 1.0).normalize();
        let base = if self.flip {
            Quaternion::between_vectors(diagonal, -diagonal)
        } else {
            Quaternion::new(1.0, 0.0, 0.0, 0.0)
        };
        let angle = Rad(2.0 * PI * self.ticks as f32 / 3.0);
        Quaternion::from_axis_angle(diagonal, angle) * base
    }
}
