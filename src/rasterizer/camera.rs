//! Camera, view frustum and viewport mapping
//!
//! Camera space has its apex at the camera position, looking down +Z with
//! +Y up. Everything frustum-related derives from one set of source values:
//! horizontal FOV, near, far and the canvas aspect ratio.

use super::math::Vec3;
use super::types::{CanvasSettings, ConfigError};

/// View frustum in camera space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewFrustum {
    /// Full horizontal field of view (radians)
    pub horizontal_fov: f32,
    /// Full vertical field of view (radians), derived from the near-plane size
    pub vertical_fov: f32,
    pub near: f32,
    pub far: f32,
    pub near_width: f32,
    pub near_height: f32,
}

impl ViewFrustum {
    /// Build from a horizontal FOV in degrees and a width/height aspect ratio
    pub fn new(horizontal_fov_deg: f32, near: f32, far: f32, aspect: f32) -> Result<Self, ConfigError> {
        if !(horizontal_fov_deg > 0.0 && horizontal_fov_deg < 180.0) {
            return Err(ConfigError::InvalidFrustum(format!(
                "horizontal fov {} must be in (0, 180) degrees",
                horizontal_fov_deg
            )));
        }
        if !(near > 0.0) || !near.is_finite() {
            return Err(ConfigError::InvalidFrustum(format!("near distance {} must be positive", near)));
        }
        if !(far > near) || !far.is_finite() {
            return Err(ConfigError::InvalidFrustum(format!(
                "far distance {} must be greater than near {}",
                far, near
            )));
        }
        if !(aspect > 0.0) || !aspect.is_finite() {
            return Err(ConfigError::InvalidFrustum(format!("aspect ratio {} must be positive", aspect)));
        }

        let horizontal_fov = horizontal_fov_deg.to_radians();
        let near_width = 2.0 * near * (horizontal_fov * 0.5).tan();
        let near_height = near_width / aspect;
        let vertical_fov = 2.0 * (near_height / (2.0 * near)).atan();

        Ok(Self { horizontal_fov, vertical_fov, near, far, near_width, near_height })
    }
}

/// Camera: world position plus view frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub frustum: ViewFrustum,
}

impl Camera {
    pub fn new(position: Vec3, frustum: ViewFrustum) -> Self {
        Self { position, frustum }
    }

    pub fn world_to_camera(&self, p: Vec3) -> Vec3 {
        p - self.position
    }

    pub fn camera_to_world(&self, p: Vec3) -> Vec3 {
        p + self.position
    }
}

/// Perspective projection onto the near plane followed by canvas mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    near: f32,
    x_scale: f32,
    y_scale: f32,
}

impl Viewport {
    pub fn new(canvas: &CanvasSettings, frustum: &ViewFrustum) -> Self {
        let width = canvas.width() as f32;
        let height = canvas.height() as f32;
        Self {
            width,
            height,
            near: frustum.near,
            x_scale: width / frustum.near_width,
            y_scale: height / frustum.near_height,
        }
    }

    /// Perspective divide: `(x * near / z, y * near / z, 1 / z)`
    pub fn project(&self, p: Vec3) -> Vec3 {
        Vec3::new(p.x * self.near / p.z, p.y * self.near / p.z, 1.0 / p.z)
    }

    /// Near-plane coordinates to canvas pixels; y grows downward
    pub fn to_screen(&self, projected: Vec3) -> Vec3 {
        Vec3::new(
            projected.x * self.x_scale + self.width * 0.5,
            self.height * 0.5 - projected.y * self.y_scale,
            projected.z,
        )
    }

    /// Camera-space point to canvas `(x, y, 1/z)`
    pub fn camera_to_screen(&self, p: Vec3) -> Vec3 {
        self.to_screen(self.project(p))
    }

    /// Inverse of `camera_to_screen` for a screen point carrying `1/z` in z
    pub fn screen_to_camera(&self, s: Vec3) -> Vec3 {
        let z = 1.0 / s.z;
        let px = (s.x - self.width * 0.5) / self.x_scale;
        let py = (self.height * 0.5 - s.y) / self.y_scale;
        Vec3::new(px * z / self.near, py * z / self.near, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frustum() -> ViewFrustum {
        ViewFrustum::new(90.0, 1.0, 100.0, 4.0 / 3.0).unwrap()
    }

    #[test]
    fn test_frustum_derivation_is_consistent() {
        let f = frustum();
        assert!((f.near_width - 2.0).abs() < 1e-5);
        assert!((f.near_height - 1.5).abs() < 1e-5);
        assert!(((f.vertical_fov * 0.5).tan() * 2.0 * f.near - f.near_height).abs() < 1e-5);
        assert!(((f.horizontal_fov * 0.5).tan() * 2.0 * f.near - f.near_width).abs() < 1e-5);
    }

    #[test]
    fn test_frustum_rejects_bad_values() {
        assert!(ViewFrustum::new(0.0, 1.0, 10.0, 1.0).is_err());
        assert!(ViewFrustum::new(180.0, 1.0, 10.0, 1.0).is_err());
        assert!(ViewFrustum::new(60.0, 0.0, 10.0, 1.0).is_err());
        assert!(ViewFrustum::new(60.0, 5.0, 5.0, 1.0).is_err());
        assert!(ViewFrustum::new(60.0, 1.0, 10.0, 0.0).is_err());
    }

    #[test]
    fn test_project_at_near_plane() {
        let f = frustum();
        let viewport = Viewport::new(&CanvasSettings::new(800, 600).unwrap(), &f);
        let p = viewport.project(Vec3::new(0.3, -0.2, f.near));
        assert!((p.z - 1.0 / f.near).abs() < 1e-6);
        assert!((p.x - 0.3).abs() < 1e-6);
        assert!((p.y + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_near_plane_corners_map_to_canvas_corners() {
        let f = frustum();
        let viewport = Viewport::new(&CanvasSettings::new(800, 600).unwrap(), &f);
        let top_left = viewport.camera_to_screen(Vec3::new(-f.near_width / 2.0, f.near_height / 2.0, f.near));
        assert!(top_left.x.abs() < 1e-3 && top_left.y.abs() < 1e-3);
        let center = viewport.camera_to_screen(Vec3::new(0.0, 0.0, 5.0));
        assert!((center.x - 400.0).abs() < 1e-3 && (center.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_screen_round_trip() {
        let f = frustum();
        let viewport = Viewport::new(&CanvasSettings::new(640, 480).unwrap(), &f);
        for p in [Vec3::new(1.5, -2.0, 7.0), Vec3::new(-0.25, 0.75, 1.0), Vec3::new(10.0, 3.0, 42.0)] {
            let back = viewport.screen_to_camera(viewport.camera_to_screen(p));
            assert!((back - p).len() < 1e-3 * p.z, "{:?} -> {:?}", p, back);
        }
    }
}
