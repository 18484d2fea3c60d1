//! Software 3D rasterizer
//!
//! Everything between a transformed mesh and an RGBA pixel buffer:
//! - Perspective projection with a single canonical view frustum
//! - Bounding-sphere early-out and six-plane frustum clipping
//! - Per-vertex ambient + directional lighting (diffuse and specular)
//! - Gouraud-shaded scanline triangles and lines with a depth buffer
//!
//! # Module Organization
//!
//! - `types` - Color, Triangle, Lighting, RasterSettings, CanvasSettings
//! - `math` - Vec3, Mat4/Mat3 helpers
//! - `geometry` - Plane, Sphere, segment intersection
//! - `bounds` - minimal enclosing sphere (Welzl)
//! - `transform` - model and normal matrices per instance
//! - `camera` - ViewFrustum, Camera, Viewport
//! - `clip` - frustum clipper
//! - `lighting` - per-vertex light evaluation
//! - `render` - Framebuffer and scan conversion
//! - `filter` - post-processing passes applied on flush
//! - `constants` - canvas defaults and tolerances

#![allow(dead_code)]

// Sub-modules (exposed for namespaced access)
pub mod bounds;
pub mod camera;
pub mod clip;
pub mod constants;
pub mod filter;
pub mod geometry;
pub mod lighting;
pub mod math;
pub mod render;
pub mod transform;
pub mod types;

// =============================================================================
// Convenience re-exports for commonly used items
// =============================================================================

// Types - core data structures
pub use types::{CanvasSettings, Color, ConfigError, Lighting, RasterSettings, Triangle};

// Math - vectors
pub use math::Vec3;

// Pipeline stages
pub use camera::{Camera, ViewFrustum, Viewport};
pub use clip::{ClipError, Clipper};
pub use lighting::LightCalculator;
pub use transform::{ModelTransform, TransformError};

// Render - framebuffer and post-filters
pub use render::Framebuffer;
pub use filter::{PixelFilter, SimpleAntialiasing};

// Constants
pub use constants::{WIDTH, HEIGHT};
