//! # Camera State Management
//!
//! This module handles the camera the pointer looks through:
//! - Orbit position around the board
//! - View and projection matrix calculations
//! - Pointer-to-ray conversion for hit-testing
//!
//! ## Core Components
//! - `Camera`: Orbit position around the board origin
//! - `Projection`: Manages the camera's projection matrix

use camera::{Camera, Projection};
use cgmath::{Deg, Rad, Vector2};

use crate::config::CameraConfig;

use super::picking::Ray;

pub mod camera;

/// Near clipping plane distance
const Z_NEAR: f32 = 0.1;
/// Far clipping plane distance
const Z_FAR: f32 = 1000.0;

/// Camera plus projection, sized to the window.
pub struct CameraState {
    /// The current orbit
    pub camera: Camera,
    /// Perspective settings for the current viewport
    pub projection: Projection,
    /// Radians of orbit per pixel of pointer drag
    orbit_sensitivity: f32,
}

impl CameraState {
    /// Creates a camera state for a viewport of `width` x `height` pixels.
    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(config),
            projection: Projection::new(width, height, Deg(config.fov_degrees), Z_NEAR, Z_FAR),
            orbit_sensitivity: config.orbit_sensitivity,
        }
    }

    /// Updates the projection for a resized viewport.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Orbits the camera by a pointer drag of `(dx, dy)` pixels.
    pub fn drag(&mut self, delta: (f64, f64)) {
        let (dx, dy) = delta;
        self.camera.orbit(
            Rad(-dx as f32 * self.orbit_sensitivity),
            Rad(-dy as f32 * self.orbit_sensitivity),
        );
    }

    /// World-space ray under a pointer given in normalised device coordinates.
    pub fn pointer_ray(&self, ndc: Vector2<f32>) -> Option<Ray> {
        camera::pointer_ray(&self.camera, &self.projection, ndc)
    }
}
