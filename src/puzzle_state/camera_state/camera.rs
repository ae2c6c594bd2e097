//! # Camera Implementation
//!
//! This module contains the camera used to turn pointer positions into rays:
//! - An orbit camera circling the board
//! - Projection matrix handling
//! - Pointer unprojection
//!
//! ## Key Components
//! - `Camera`: Orbit position around a fixed target
//! - `Projection`: Manages perspective projection settings

use cgmath::*;

use crate::config::CameraConfig;
use crate::puzzle_state::picking::Ray;

/// Transformation matrix to convert from OpenGL's coordinate system to WGPU's.
///
/// This matrix performs two main transformations:
/// 1. Scales the Z coordinate from [-1, 1] to [-0.5, 0.5]
/// 2. Translates the Z coordinate from [-0.5, 0.5] to [0, 1]
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,  // Scale Z from [-1,1] to [-0.5,0.5]
    0.0, 0.0, 0.5, 1.0,  // Translate Z from [-0.5,0.5] to [0,1]
);

/// A camera orbiting a fixed target point.
///
/// The polar angle is measured from world up, so `0` looks straight down on the
/// board. It is clamped to a configured range so the view never flips over the
/// top or dips under the ground.
#[derive(Debug)]
pub struct Camera {
    /// The point the camera always looks at
    pub target: Point3<f32>,
    /// Distance from the target
    pub distance: f32,
    /// Angle from world up, in radians
    pub polar: Rad<f32>,
    /// Angle around world up, in radians
    pub azimuth: Rad<f32>,
    min_polar: Rad<f32>,
    max_polar: Rad<f32>,
}

impl Camera {
    /// Creates a camera from the configured orbit.
    pub fn new(config: &CameraConfig) -> Self {
        let mut camera = Self {
            target: Point3::from(config.target),
            distance: config.distance,
            polar: Rad(config.polar),
            azimuth: Rad(config.azimuth),
            min_polar: Rad(config.min_polar),
            max_polar: Rad(config.max_polar),
        };
        camera.clamp_polar();
        camera
    }

    /// The camera's position in world space.
    pub fn position(&self) -> Point3<f32> {
        let (polar_sin, polar_cos) = self.polar.0.sin_cos();
        let (azimuth_sin, azimuth_cos) = self.azimuth.0.sin_cos();
        self.target
            + Vector3::new(
                polar_sin * azimuth_cos,
                polar_cos,
                polar_sin * azimuth_sin,
            ) * self.distance
    }

    /// Calculates the view matrix for this camera.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Orbits the camera by the given angles.
    ///
    /// # Arguments
    /// * `delta_azimuth` - Change around world up
    /// * `delta_polar` - Change away from world up; clamped to the configured range
    pub fn orbit(&mut self, delta_azimuth: Rad<f32>, delta_polar: Rad<f32>) {
        self.azimuth = (self.azimuth + delta_azimuth).normalize();
        self.polar += delta_polar;
        self.clamp_polar();
    }

    fn clamp_polar(&mut self) {
        if self.polar < self.min_polar {
            self.polar = self.min_polar;
        } else if self.polar > self.max_polar {
            self.polar = self.max_polar;
        }
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let fovy: Rad<f32> = fovy.into();
        Self {
            aspect,
            fovy,
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Calculates the projection matrix.
    ///
    /// Combines the perspective projection with the OpenGL to WGPU coordinate system transform.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Casts a ray from the camera through a pointer position.
///
/// # Arguments
/// * `ndc` - Pointer in normalised device coordinates: x right and y up, both in [-1, 1]
///
/// # Returns
/// The world-space ray, or `None` if the view-projection matrix is singular.
pub fn pointer_ray(camera: &Camera, projection: &Projection, ndc: Vector2<f32>) -> Option<Ray> {
    let view_proj = projection.calc_matrix() * camera.calc_matrix();
    let inverse = view_proj.invert()?;
    let unproject = |depth: f32| {
        let clip = inverse * Vector4::new(ndc.x, ndc.y, depth, 1.0);
        Point3::from_homogeneous(clip)
    };
    let near = unproject(0.0);
    let far = unproject(1.0);
    Some(Ray::new(near, far - near))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default())
    }

    #[test]
    fn polar_is_clamped() {
        let mut camera = camera();
        camera.orbit(Rad(0.0), Rad(10.0));
        assert_eq!(camera.polar, Rad(CameraConfig::default().max_polar));
        camera.orbit(Rad(0.0), Rad(-10.0));
        assert_eq!(camera.polar, Rad(CameraConfig::default().min_polar));
    }

    #[test]
    fn stays_at_orbit_distance() {
        let mut camera = camera();
        camera.orbit(Rad(1.3), Rad(0.1));
        let distance = (camera.position() - camera.target).magnitude();
        assert!((distance - camera.distance).abs() < 1e-3);
    }

    #[test]
    fn centre_pointer_looks_at_target() {
        let camera = camera();
        let projection = Projection::new(800, 600, Deg(5.0), 0.1, 1000.0);
        let ray = pointer_ray(&camera, &projection, Vector2::new(0.0, 0.0)).unwrap();
        let expected = (camera.target - camera.position()).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
    }

    #[test]
    fn pointer_right_of_centre_bends_ray_right() {
        let camera = camera();
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        let centre = pointer_ray(&camera, &projection, Vector2::new(0.0, 0.0)).unwrap();
        let right = pointer_ray(&camera, &projection, Vector2::new(0.5, 0.0)).unwrap();
        let view = camera.calc_matrix();
        // In view space, +x is screen right.
        let side = (view * right.direction.extend(0.0)).x - (view * centre.direction.extend(0.0)).x;
        assert!(side > 0.0);
    }
}
