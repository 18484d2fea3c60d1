//! Rasterizer constants
//!
//! Canvas defaults and numeric tolerances shared by the pipeline.

/// Default canvas width
pub const WIDTH: usize = 800;

/// Default canvas height
pub const HEIGHT: usize = 600;

/// Largest accepted canvas dimension
pub const MAX_CANVAS_DIM: usize = 8192;

/// Tolerance for plane classification and parallel-segment detection
pub const PLANE_EPSILON: f32 = f32::EPSILON;

/// Relative tolerance for sphere containment (f32 circumsphere error grows with radius)
pub const SPHERE_EPSILON: f32 = 1e-5;

/// Specular exponent used by the lighting evaluator
pub const SHININESS: i32 = 10;

/// Reciprocal-depth multiplier that lifts wireframe overlay edges above their own fill
pub const WIREFRAME_DEPTH_BIAS: f32 = 1.001;
