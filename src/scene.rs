//! Scene rendering
//!
//! One pass per frame: model transform, camera space, frustum clipping,
//! per-vertex lighting, projection and scan conversion.

use crate::rasterizer::{
    Camera, CanvasSettings, ClipError, Clipper, Color, ConfigError, Framebuffer,
    LightCalculator, ModelTransform, RasterSettings, TransformError, Triangle, Vec3,
    ViewFrustum, Viewport,
};
use crate::rasterizer::constants::WIREFRAME_DEPTH_BIAS;
use crate::world::SceneDescription;

/// Error type for building or running a scene pass
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    Config(ConfigError),
    Transform { instance: usize, source: TransformError },
    Clip(ClipError),
    UnknownFigure(String),
}

impl From<ConfigError> for RenderError {
    fn from(e: ConfigError) -> Self {
        RenderError::Config(e)
    }
}

impl From<ClipError> for RenderError {
    fn from(e: ClipError) -> Self {
        RenderError::Clip(e)
    }
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Config(e) => write!(f, "Config error: {}", e),
            RenderError::Transform { instance, source } => {
                write!(f, "Transform error in instance {}: {}", instance, source)
            }
            RenderError::Clip(e) => write!(f, "Clip error: {}", e),
            RenderError::UnknownFigure(name) => write!(f, "Unknown figure '{}'", name),
        }
    }
}

impl std::error::Error for RenderError {}

/// Counters for one scene pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub instances_drawn: usize,
    pub instances_culled: usize,
    pub triangles_drawn: usize,
    /// Vertices appended by clipping
    pub clip_vertices: usize,
}

impl std::fmt::Display for RenderStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} instances drawn, {} culled, {} triangles, {} clip vertices",
            self.instances_drawn, self.instances_culled, self.triangles_drawn, self.clip_vertices
        )
    }
}

/// A figure with all triangle attributes resolved, in model space
#[derive(Debug, Clone)]
struct Mesh {
    vertices: Vec<Vec3>,
    triangles: Vec<Triangle>,
}

/// Instance ready to draw: which mesh, and how to place it
#[derive(Debug, Clone)]
struct PreparedInstance {
    mesh: usize,
    transform: ModelTransform,
}

/// Renders a scene description into a framebuffer
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    camera: Camera,
    viewport: Viewport,
    clipper: Clipper,
    lights: LightCalculator,
    meshes: Vec<Mesh>,
    instances: Vec<PreparedInstance>,
}

impl SceneRenderer {
    /// Build everything that does not change between frames.
    /// Fails on an invalid frustum, a singular instance transform or an
    /// instance naming a figure the scene does not define.
    pub fn new(scene: &SceneDescription, canvas: CanvasSettings) -> Result<Self, RenderError> {
        let cam = &scene.camera;
        let frustum = ViewFrustum::new(cam.fov, cam.near, cam.far, canvas.aspect())?;
        let camera = Camera::new(cam.position, frustum);

        let meshes = scene
            .figures
            .iter()
            .map(|figure| Mesh { vertices: figure.positions(), triangles: figure.resolved_triangles() })
            .collect();

        let mut instances = Vec::with_capacity(scene.instances.len());
        for (i, instance) in scene.instances.iter().enumerate() {
            let mesh = scene
                .figures
                .iter()
                .position(|f| f.name == instance.name)
                .ok_or_else(|| RenderError::UnknownFigure(instance.name.clone()))?;
            let transform = ModelTransform::new(instance.scale, instance.rotation, instance.translate)
                .map_err(|source| RenderError::Transform { instance: i, source })?;
            instances.push(PreparedInstance { mesh, transform });
        }

        Ok(Self {
            camera,
            viewport: Viewport::new(&canvas, &frustum),
            clipper: Clipper::new(&frustum),
            lights: LightCalculator::new(scene.lighting.clone(), cam.position),
            meshes,
            instances,
        })
    }

    /// Clear `fb` and draw every instance
    pub fn render(&self, fb: &mut Framebuffer, settings: &RasterSettings) -> Result<RenderStats, RenderError> {
        fb.set_background(settings.background);
        fb.clear();

        let clipper = self.clipper.clone().with_bounding_sphere(settings.bounding_sphere);
        let mut stats = RenderStats::default();

        for instance in &self.instances {
            let mesh = &self.meshes[instance.mesh];

            // Model space -> world -> camera
            let mut vertices: Vec<Vec3> = mesh
                .vertices
                .iter()
                .map(|&p| self.camera.world_to_camera(instance.transform.transform_point(p)))
                .collect();
            let triangles: Vec<Triangle> = mesh
                .triangles
                .iter()
                .map(|t| {
                    let mut t = *t;
                    for n in &mut t.normals {
                        *n = instance.transform.transform_normal(*n);
                    }
                    t
                })
                .collect();

            let original_count = vertices.len();
            let visible = if settings.clipping {
                clipper.clip(&mut vertices, triangles)?
            } else {
                // Without clipping, anything closer than the near plane would
                // project arbitrarily far off screen
                let near = self.camera.frustum.near;
                triangles
                    .into_iter()
                    .filter(|t| t.indices.iter().all(|&i| vertices[i].z >= near))
                    .collect()
            };
            stats.clip_vertices += vertices.len() - original_count;

            if visible.is_empty() {
                stats.instances_culled += 1;
                continue;
            }
            stats.instances_drawn += 1;

            let screen: Vec<Vec3> = vertices.iter().map(|&p| self.viewport.camera_to_screen(p)).collect();

            for t in &visible {
                let colors = if settings.lighting {
                    let mut lit = t.colors;
                    for k in 0..3 {
                        let world = self.camera.camera_to_world(vertices[t.indices[k]]);
                        lit[k] = self.lights.calculate_color(world, t.normals[k], t.colors[k]);
                    }
                    lit
                } else {
                    t.colors
                };

                let [a, b, c] = t.indices.map(|i| screen[i]);
                if !settings.wireframe_only {
                    fb.draw_filled_triangle(a, b, c, colors[0], colors[1], colors[2]);
                }
                if settings.wireframe_only {
                    draw_outline(fb, [a, b, c], colors);
                } else if settings.wireframe_overlay {
                    let lifted = [a, b, c].map(|p| Vec3::new(p.x, p.y, p.z * WIREFRAME_DEPTH_BIAS));
                    draw_outline(fb, lifted, [Color::BLACK; 3]);
                }
                stats.triangles_drawn += 1;
            }
        }

        Ok(stats)
    }
}

fn draw_outline(fb: &mut Framebuffer, p: [Vec3; 3], c: [Color; 3]) {
    fb.draw_line(p[0], p[1], c[0], c[1]);
    fb.draw_line(p[1], p[2], c[1], c[2]);
    fb.draw_line(p[2], p[0], c[2], c[0]);
}
