//! Core types for the rasterizer

use super::constants::{HEIGHT, MAX_CANVAS_DIM, WIDTH};
use super::math::Vec3;
use serde::{Deserialize, Serialize};

// =============================================================================
// Color
// =============================================================================

/// Linear RGB color, channels nominally in [0, 1].
/// Values outside the range are allowed during lighting and clamped when
/// written to the framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const GREY: Color = Color { r: 0.5, g: 0.5, b: 0.5 };
    pub const RED: Color = Color { r: 1.0, g: 0.0, b: 0.0 };
    pub const GREEN: Color = Color { r: 0.0, g: 1.0, b: 0.0 };
    pub const BLUE: Color = Color { r: 0.0, g: 0.0, b: 1.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create from 8-bit channels
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Channel-wise sum (no clamping)
    pub fn add(self, other: Color) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b)
    }

    /// Channel-wise product (light modulation)
    pub fn modulate(self, other: Color) -> Self {
        Self::new(self.r * other.r, self.g * other.g, self.b * other.b)
    }

    pub fn scale(self, s: f32) -> Self {
        Self::new(self.r * s, self.g * s, self.b * s)
    }

    /// Interpolate between two colors; `t` is not clamped so callers can
    /// step past the endpoints when walking integer spans
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }

    /// Convert to RGBA bytes with full opacity
    pub fn to_bytes(self) -> [u8; 4] {
        fn channel(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [channel(self.r), channel(self.g), channel(self.b), 255]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::GREY
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// A triangle of a transformed mesh: indices into the shared vertex array,
/// plus per-vertex colors and normals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub indices: [usize; 3],
    pub colors: [Color; 3],
    pub normals: [Vec3; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3], colors: [Color; 3], normals: [Vec3; 3]) -> Self {
        Self { indices, colors, normals }
    }
}

// =============================================================================
// Lighting
// =============================================================================

/// Directional light; `direction` points from the surface toward the light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Color,
}

/// Ambient term plus a list of directional lights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
    pub ambient: Color,
    #[serde(default)]
    pub directional: Vec<DirectionalLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: Color::new(0.3, 0.3, 0.3),
            directional: vec![DirectionalLight {
                direction: Vec3::new(-1.0, 1.0, -1.0),
                color: Color::new(0.6, 0.6, 0.6),
            }],
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Rendering feature toggles, passed explicitly into the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Clip geometry against the view frustum
    pub clipping: bool,
    /// Use the bounding sphere to skip or discard whole instances per plane
    pub bounding_sphere: bool,
    /// Draw only triangle edges
    pub wireframe_only: bool,
    /// Draw triangle edges on top of filled triangles
    pub wireframe_overlay: bool,
    /// Evaluate per-vertex lighting (false = use base colors)
    pub lighting: bool,
    /// Run the antialiasing post-filter on flush
    pub antialiasing: bool,
    /// Color the framebuffer is cleared to
    pub background: Color,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            clipping: true,
            bounding_sphere: true,
            wireframe_only: false,
            wireframe_overlay: false,
            lighting: true,
            antialiasing: false,
            background: Color::WHITE,
        }
    }
}

/// Output canvas size, validated on construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSettings {
    width: usize,
    height: usize,
}

impl CanvasSettings {
    pub fn new(width: usize, height: usize) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 || width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
            return Err(ConfigError::InvalidCanvas { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self { width: WIDTH, height: HEIGHT }
    }
}

/// Error type for invalid pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidCanvas { width: usize, height: usize },
    InvalidFrustum(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidCanvas { width, height } => write!(
                f,
                "invalid canvas size {}x{} (each side must be 1..={})",
                width, height, MAX_CANVAS_DIM
            ),
            ConfigError::InvalidFrustum(e) => write!(f, "invalid view frustum: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_to_bytes_clamps() {
        assert_eq!(Color::new(1.5, -0.2, 0.5).to_bytes(), [255, 0, 128, 255]);
    }

    #[test]
    fn test_color_lerp() {
        let c = Color::BLACK.lerp(Color::new(1.0, 0.5, 0.0), 0.5);
        assert!((c.r - 0.5).abs() < 1e-6);
        assert!((c.g - 0.25).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn test_canvas_validation() {
        assert!(CanvasSettings::new(800, 600).is_ok());
        assert_eq!(
            CanvasSettings::new(0, 600),
            Err(ConfigError::InvalidCanvas { width: 0, height: 600 })
        );
        assert!(CanvasSettings::new(100, MAX_CANVAS_DIM + 1).is_err());
    }

    #[test]
    fn test_settings_defaults_fill_missing_fields() {
        let s: RasterSettings = ron::from_str("(wireframe_only: true)").unwrap();
        assert!(s.wireframe_only);
        assert!(s.clipping);
        assert_eq!(s.background, Color::WHITE);
    }
}
