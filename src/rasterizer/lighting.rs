//! Per-vertex lighting (ambient + directional diffuse + specular)
//!
//! Evaluated once per triangle vertex; the rasterizer interpolates the
//! results across the triangle (Gouraud shading).

use super::constants::SHININESS;
use super::math::Vec3;
use super::types::{Color, Lighting};

/// Lights a vertex as seen from a fixed eye position
#[derive(Debug, Clone)]
pub struct LightCalculator {
    lighting: Lighting,
    eye: Vec3,
}

impl LightCalculator {
    pub fn new(lighting: Lighting, eye: Vec3) -> Self {
        Self { lighting, eye }
    }

    /// Shaded color: `base * (ambient + sum(diffuse + specular))`, unclamped
    pub fn calculate_color(&self, position: Vec3, normal: Vec3, base: Color) -> Color {
        let view = self.eye - position;
        let mut intensity = self.lighting.ambient;

        for light in &self.lighting.directional {
            let diffuse = diffuse_term(light.direction, normal);
            let specular = specular_term(light.direction, normal, view);
            intensity = intensity.add(light.color.scale(diffuse + specular));
        }

        base.modulate(intensity)
    }
}

/// `max(0, L·N / (|L||N|))`; zero-length inputs give no light
fn diffuse_term(light_dir: Vec3, normal: Vec3) -> f32 {
    let denom = light_dir.len() * normal.len();
    if denom == 0.0 {
        return 0.0;
    }
    (light_dir.dot(normal) / denom).max(0.0)
}

/// `max(0, R·V / (|R||V|))^shininess` with `R = 2(N·L)N - L` on unit N and L
fn specular_term(light_dir: Vec3, normal: Vec3, view: Vec3) -> f32 {
    let n = normal.normalize();
    let l = light_dir.normalize();
    let r = n * (2.0 * n.dot(l)) - l;

    let denom = r.len() * view.len();
    if denom == 0.0 {
        return 0.0;
    }
    (r.dot(view) / denom).max(0.0).powi(SHININESS)
}
