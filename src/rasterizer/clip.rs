//! View-frustum clipping
//!
//! Six camera-space planes (near, far, left, right, top, bottom) with normals
//! pointing into the frustum. An instance is first tested against each plane
//! with its bounding sphere; only planes the sphere straddles clip triangles.
//! Clipping appends new vertices to the caller's vertex array and never
//! reuses an index for a different position.

use super::bounds::bounding_sphere;
use super::camera::ViewFrustum;
use super::constants::PLANE_EPSILON;
use super::geometry::Plane;
use super::math::Vec3;
use super::types::{Color, Triangle};

/// Which frustum side a plane bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneId {
    Near,
    Far,
    Left,
    Right,
    Top,
    Bottom,
}

impl PlaneId {
    pub fn label(&self) -> &'static str {
        match self {
            PlaneId::Near => "near",
            PlaneId::Far => "far",
            PlaneId::Left => "left",
            PlaneId::Right => "right",
            PlaneId::Top => "top",
            PlaneId::Bottom => "bottom",
        }
    }
}

/// Internal consistency failure during clipping
#[derive(Debug, Clone, PartialEq)]
pub enum ClipError {
    /// An edge classified as crossing the plane has no finite split point
    MissingIntersection { plane: PlaneId, from: Vec3, to: Vec3 },
}

impl std::fmt::Display for ClipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipError::MissingIntersection { plane, from, to } => write!(
                f,
                "edge {:?} -> {:?} straddles the {} plane but has no intersection",
                from, to, plane.label()
            ),
        }
    }
}

impl std::error::Error for ClipError {}

/// Frustum clipper
#[derive(Debug, Clone)]
pub struct Clipper {
    planes: [(PlaneId, Plane); 6],
    use_bounding_sphere: bool,
}

impl Clipper {
    pub fn new(frustum: &ViewFrustum) -> Self {
        let (sh, ch) = (frustum.horizontal_fov * 0.5).sin_cos();
        let (sv, cv) = (frustum.vertical_fov * 0.5).sin_cos();

        Self {
            planes: [
                (PlaneId::Near, Plane::new(Vec3::new(0.0, 0.0, 1.0), -frustum.near)),
                (PlaneId::Far, Plane::new(Vec3::new(0.0, 0.0, -1.0), frustum.far)),
                // x > -z * tan(h/2)
                (PlaneId::Left, Plane::new(Vec3::new(ch, 0.0, sh), 0.0)),
                // x < z * tan(h/2)
                (PlaneId::Right, Plane::new(Vec3::new(-ch, 0.0, sh), 0.0)),
                // y < z * tan(v/2)
                (PlaneId::Top, Plane::new(Vec3::new(0.0, -cv, sv), 0.0)),
                // y > -z * tan(v/2)
                (PlaneId::Bottom, Plane::new(Vec3::new(0.0, cv, sv), 0.0)),
            ],
            use_bounding_sphere: true,
        }
    }

    /// Disable the bounding-sphere early-out: every plane clips every triangle
    pub fn with_bounding_sphere(mut self, enabled: bool) -> Self {
        self.use_bounding_sphere = enabled;
        self
    }

    pub fn planes(&self) -> &[(PlaneId, Plane); 6] {
        &self.planes
    }

    /// Clip `triangles` against the frustum. New vertices are appended to
    /// `vertices`. An empty result means nothing is visible.
    pub fn clip(&self, vertices: &mut Vec<Vec3>, triangles: Vec<Triangle>) -> Result<Vec<Triangle>, ClipError> {
        let sphere = if self.use_bounding_sphere {
            Some(bounding_sphere(&referenced_vertices(vertices, &triangles)))
        } else {
            None
        };

        let mut current = triangles;
        for &(id, plane) in &self.planes {
            if current.is_empty() {
                break;
            }

            if let Some(sphere) = sphere {
                if plane.distance_to(sphere.center) > sphere.radius {
                    if plane.is_in_front(sphere.center) {
                        continue;
                    }
                    return Ok(Vec::new());
                }
            }

            let mut next = Vec::with_capacity(current.len());
            for triangle in &current {
                clip_triangle(id, &plane, vertices, triangle, &mut next)?;
            }
            current = next;
        }

        Ok(current)
    }
}

/// Vertices actually used by `triangles`; unreferenced mesh vertices must not
/// widen the sphere
fn referenced_vertices(vertices: &[Vec3], triangles: &[Triangle]) -> Vec<Vec3> {
    let mut used = vec![false; vertices.len()];
    for t in triangles {
        for &i in &t.indices {
            used[i] = true;
        }
    }
    vertices
        .iter()
        .zip(used)
        .filter_map(|(&v, u)| if u { Some(v) } else { None })
        .collect()
}

/// Clip one triangle against one plane, pushing 0, 1 or 2 triangles to `out`
pub fn clip_triangle(
    id: PlaneId,
    plane: &Plane,
    vertices: &mut Vec<Vec3>,
    triangle: &Triangle,
    out: &mut Vec<Triangle>,
) -> Result<(), ClipError> {
    let evals = triangle.indices.map(|i| plane.evaluate(vertices[i]));
    let front = evals.map(|e| e > PLANE_EPSILON);

    match front.iter().filter(|&&f| f).count() {
        3 => out.push(*triangle),
        0 => {}
        1 => {
            // Rotate so the kept vertex sits at position `a`, preserving winding
            let a = front.iter().position(|&f| f).unwrap_or(0);
            let (b, c) = ((a + 1) % 3, (a + 2) % 3);

            let ab = split_edge(id, &evals, vertices, triangle, a, b)?;
            let ac = split_edge(id, &evals, vertices, triangle, a, c)?;

            let mut clipped = *triangle;
            clipped.indices[b] = ab.0;
            clipped.colors[b] = ab.1.color;
            clipped.normals[b] = ab.1.normal;
            clipped.indices[c] = ac.0;
            clipped.colors[c] = ac.1.color;
            clipped.normals[c] = ac.1.normal;
            out.push(clipped);
        }
        _ => {
            // Two kept vertices `a`, `b`; `c` is behind. The quad a, b, b', a'
            // splits into (a, b, b') and (a, b', a').
            let c = front.iter().position(|&f| !f).unwrap_or(0);
            let (a, b) = ((c + 1) % 3, (c + 2) % 3);

            let ac = split_edge(id, &evals, vertices, triangle, a, c)?;
            let bc = split_edge(id, &evals, vertices, triangle, b, c)?;

            out.push(Triangle::new(
                [triangle.indices[a], triangle.indices[b], bc.0],
                [triangle.colors[a], triangle.colors[b], bc.1.color],
                [triangle.normals[a], triangle.normals[b], bc.1.normal],
            ));
            out.push(Triangle::new(
                [triangle.indices[a], bc.0, ac.0],
                [triangle.colors[a], bc.1.color, ac.1.color],
                [triangle.normals[a], bc.1.normal, ac.1.normal],
            ));
        }
    }

    Ok(())
}

struct SplitAttributes {
    color: Color,
    normal: Vec3,
}

/// Split edge `from -> to` (slots of `triangle`) where its plane evaluations
/// cross zero, append the new vertex and interpolate its attributes there.
/// `from` is in front and `to` is not, so the split point only fails to
/// exist for non-finite input.
fn split_edge(
    id: PlaneId,
    evals: &[f32; 3],
    vertices: &mut Vec<Vec3>,
    triangle: &Triangle,
    from: usize,
    to: usize,
) -> Result<(usize, SplitAttributes), ClipError> {
    let (a, b) = (vertices[triangle.indices[from]], vertices[triangle.indices[to]]);
    let hit = Plane::split_segment(a, b, evals[from], evals[to])
        .ok_or(ClipError::MissingIntersection { plane: id, from: a, to: b })?;

    let index = vertices.len();
    vertices.push(hit.point);

    Ok((
        index,
        SplitAttributes {
            color: triangle.colors[from].lerp(triangle.colors[to], hit.t),
            normal: triangle.normals[from].lerp(triangle.normals[to], hit.t),
        },
    ))
}
