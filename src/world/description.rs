//! Scene description types
//!
//! Plain serde data: what a scene file contains before any transform,
//! clipping or lighting is applied.

use serde::{Deserialize, Serialize};
use crate::rasterizer::{Color, Lighting, RasterSettings, Triangle, Vec3};

/// A vertex as written in a scene file.
///
/// Accepts `[x, y, z]`, homogeneous `[x, y, z, w]` or `(x:, y:, z:)`.
/// Always written back as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "VertexRepr", into = "Vec<f32>")]
pub struct SceneVertex(pub Vec3);

#[derive(Deserialize)]
#[serde(untagged)]
enum VertexRepr {
    Homogeneous([f32; 4]),
    Plain([f32; 3]),
    Named { x: f32, y: f32, z: f32 },
}

impl From<VertexRepr> for SceneVertex {
    fn from(repr: VertexRepr) -> Self {
        match repr {
            VertexRepr::Homogeneous([x, y, z, w]) => {
                if w != 0.0 {
                    SceneVertex(Vec3::new(x / w, y / w, z / w))
                } else {
                    SceneVertex(Vec3::new(x, y, z))
                }
            }
            VertexRepr::Plain([x, y, z]) => SceneVertex(Vec3::new(x, y, z)),
            VertexRepr::Named { x, y, z } => SceneVertex(Vec3::new(x, y, z)),
        }
    }
}

impl From<SceneVertex> for Vec<f32> {
    fn from(v: SceneVertex) -> Self {
        vec![v.0.x, v.0.y, v.0.z]
    }
}

/// One triangle of a figure, in figure (model) space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleDescription {
    pub indices: [usize; 3],
    /// Single color for the whole triangle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    /// Per-vertex colors; take precedence over `color`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<[Color; 3]>,
    /// Per-vertex normals; the face normal is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<[Vec3; 3]>,
}

/// A named mesh that instances refer to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub name: String,
    pub vertices: Vec<SceneVertex>,
    pub triangles: Vec<TriangleDescription>,
    /// Fallback color for triangles that carry none
    #[serde(default)]
    pub color: Color,
}

impl Figure {
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices.iter().map(|v| v.0).collect()
    }

    /// Triangles with every attribute filled in.
    /// Indices must already be validated against `vertices`.
    pub fn resolved_triangles(&self) -> Vec<Triangle> {
        self.triangles
            .iter()
            .map(|t| {
                let colors = t.colors.unwrap_or([t.color.unwrap_or(self.color); 3]);
                let normals = t.normals.unwrap_or_else(|| [self.face_normal(t.indices); 3]);
                Triangle::new(t.indices, colors, normals)
            })
            .collect()
    }

    /// Normal of `(b - a) x (c - a)`; zero for a degenerate triangle
    fn face_normal(&self, [a, b, c]: [usize; 3]) -> Vec3 {
        let (a, b, c) = (self.vertices[a].0, self.vertices[b].0, self.vertices[c].0);
        (b - a).cross(c - a).normalize()
    }
}

/// Placement of a figure in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Name of the figure to draw
    pub name: String,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    /// Euler angles in degrees, applied X then Y then Z
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default)]
    pub translate: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Camera position and frustum source values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescription {
    #[serde(default)]
    pub position: Vec3,
    /// Horizontal field of view in degrees
    #[serde(alias = "fovInDegrees")]
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

/// Everything needed to render one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub figures: Vec<Figure>,
    pub instances: Vec<Instance>,
    pub camera: CameraDescription,
    #[serde(default)]
    pub lighting: Lighting,
    #[serde(default)]
    pub settings: RasterSettings,
}
