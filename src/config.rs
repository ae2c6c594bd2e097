//! # Configuration
//!
//! Settings for a puzzle session, read from JSON. Every field has a default, so an
//! empty object (or no file at all) gives the standard 8x8x8 board.
//!
//! ```json
//! { "half_extent": 5, "camera": { "fov_degrees": 8.0 } }
//! ```

use std::f32::consts::PI;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::puzzle_state::lattice::cell::LatticeBounds;

/// Environment variable naming the JSON config file.
pub const CONFIG_PATH_ENV: &str = "STACKING_PUZZLE_CONFIG";

/// Everything needed to start a puzzle session.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PuzzleConfig {
    /// The lattice spans `[-half_extent, half_extent)` on each axis.
    pub half_extent: i32,
    /// Coordinate sum of the pre-filled floor.
    pub base_layer: i32,
    /// Initial camera orbit.
    pub camera: CameraConfig,
}

impl Default for PuzzleConfig {
    fn default() -> Self {
        PuzzleConfig {
            half_extent: 4,
            base_layer: 1,
            camera: CameraConfig::default(),
        }
    }
}

impl PuzzleConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PuzzleConfig = serde_json::from_str(json)?;
        config.bounds()?;
        Ok(config)
    }

    /// Reads and validates the JSON config at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the file named by [`CONFIG_PATH_ENV`], or the defaults if it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => {
                info!("Loading config from {}", Path::new(&path).display());
                Self::from_path(path)
            }
            None => Ok(Self::default()),
        }
    }

    /// The lattice bounds this config describes.
    pub fn bounds(&self) -> Result<LatticeBounds, ConfigError> {
        LatticeBounds::new(self.half_extent)
    }
}

/// Orbit camera settings. Angles are in radians unless named otherwise.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Point the camera orbits and looks at.
    pub target: [f32; 3],
    /// Distance from the target.
    pub distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Initial angle from world up.
    pub polar: f32,
    /// Initial angle around world up.
    pub azimuth: f32,
    /// Smallest allowed polar angle.
    pub min_polar: f32,
    /// Largest allowed polar angle.
    pub max_polar: f32,
    /// Radians of orbit per pixel of drag.
    pub orbit_sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            target: [0.0, 1.0, 0.0],
            distance: 100.0,
            fov_degrees: 5.0,
            polar: 0.3 * PI,
            azimuth: 0.0,
            min_polar: 0.1 * PI,
            max_polar: 0.48 * PI,
            orbit_sensitivity: 0.005,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(PuzzleConfig::from_json_str("{}").unwrap(), PuzzleConfig::default());
    }

    #[test]
    fn partial_camera_keeps_other_defaults() {
        let config =
            PuzzleConfig::from_json_str(r#"{ "half_extent": 6, "camera": { "fov_degrees": 8.0 } }"#)
                .unwrap();
        assert_eq!(config.half_extent, 6);
        assert_eq!(config.base_layer, 1);
        assert_eq!(config.camera.fov_degrees, 8.0);
        assert_eq!(config.camera.distance, CameraConfig::default().distance);
    }

    #[test]
    fn rejects_bad_half_extent() {
        assert!(matches!(
            PuzzleConfig::from_json_str(r#"{ "half_extent": 0 }"#),
            Err(ConfigError::InvalidHalfExtent { value: 0, .. })
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            PuzzleConfig::from_json_str(r#"{ "half_extent": "four" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            PuzzleConfig::from_path("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
