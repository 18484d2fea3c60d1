//! Minimal bounding sphere (Welzl's algorithm)
//!
//! The point set is shuffled once, then processed in order: every point that
//! falls outside the current sphere is moved into the support set and the
//! sphere is rebuilt over the points seen before it. This is the recursive
//! formulation with the recursion over `P` turned into a loop, so stack depth
//! is bounded by the support size (at most 4) instead of the point count.
//!
//! Support sets of 0..=4 points are solved directly:
//! - 0 points: the dummy sphere
//! - 1 point: zero radius at that point
//! - 2 points: midpoint, half the distance
//! - 3 points: circumscribed circle in the triangle's plane (barycentric form)
//! - 4 points: circumsphere of the tetrahedron
//!
//! Collinear triples and coplanar quadruples fall back to the smallest
//! lower-order sphere that still holds every support point.

use rand::seq::SliceRandom;
use rand::Rng;

use super::geometry::Sphere;
use super::math::Vec3;

/// Minimal enclosing sphere of `points`, using a thread-local RNG for the pivot order
pub fn bounding_sphere(points: &[Vec3]) -> Sphere {
    bounding_sphere_with_rng(points, &mut rand::thread_rng())
}

/// Minimal enclosing sphere of `points` with an explicit RNG
pub fn bounding_sphere_with_rng<R: Rng + ?Sized>(points: &[Vec3], rng: &mut R) -> Sphere {
    let mut shuffled = points.to_vec();
    shuffled.shuffle(rng);
    let mut support = Vec::with_capacity(4);
    welzl(&shuffled, &mut support)
}

fn welzl(points: &[Vec3], support: &mut Vec<Vec3>) -> Sphere {
    let mut sphere = sphere_from_support(support);
    if support.len() == 4 {
        return sphere;
    }

    for i in 0..points.len() {
        if sphere.is_in(points[i]) {
            continue;
        }
        support.push(points[i]);
        sphere = welzl(&points[..i], support);
        support.pop();
    }

    sphere
}

fn sphere_from_support(support: &[Vec3]) -> Sphere {
    match *support {
        [] => Sphere::DUMMY,
        [p] => Sphere::point(p),
        [a, b] => sphere_from_two(a, b),
        [a, b, c] => sphere_from_three(a, b, c).unwrap_or_else(|| smallest_enclosing(support)),
        [a, b, c, d] => sphere_from_four(a, b, c, d).unwrap_or_else(|| smallest_enclosing(support)),
        _ => smallest_enclosing(support),
    }
}

fn sphere_from_two(a: Vec3, b: Vec3) -> Sphere {
    let ab = b - a;
    Sphere::new(a + ab * 0.5, ab.len() * 0.5)
}

/// Circumscribed sphere of a triangle, centered in the triangle's plane.
/// None for collinear points.
fn sphere_from_three(p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Sphere> {
    let p1_p2 = p2 - p1;
    let p1_p3 = p3 - p1;
    let p2_p1 = p1 - p2;
    let p2_p3 = p3 - p2;
    let p3_p1 = p1 - p3;
    let p3_p2 = p2 - p3;

    let normal = p1_p2.cross(p2_p3);
    let normal_len_sq = normal.len_sq();
    let scale = p1_p2.len_sq().max(p2_p3.len_sq()).max(p3_p1.len_sq());
    if normal_len_sq <= f32::EPSILON * scale * scale {
        return None;
    }

    let inv = 1.0 / (2.0 * normal_len_sq);
    let alpha = p2_p3.len_sq() * p1_p2.dot(p1_p3) * inv;
    let beta = p1_p3.len_sq() * p2_p1.dot(p2_p3) * inv;
    let gamma = p1_p2.len_sq() * p3_p1.dot(p3_p2) * inv;

    let center = p1 * alpha + p2 * beta + p3 * gamma;
    let radius = (p1_p2.len() * p2_p3.len() * p3_p1.len()) / (2.0 * normal_len_sq.sqrt());

    Some(Sphere::new(center, radius))
}

/// Circumsphere of a tetrahedron. None for coplanar points.
fn sphere_from_four(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Option<Sphere> {
    let u = b - a;
    let v = c - a;
    let w = d - a;

    let det = u.dot(v.cross(w));
    let scale = u.len().max(v.len()).max(w.len());
    if det.abs() <= f32::EPSILON * scale * scale * scale {
        return None;
    }

    let offset = (v.cross(w) * u.len_sq() + w.cross(u) * v.len_sq() + u.cross(v) * w.len_sq())
        * (1.0 / (2.0 * det));

    Some(Sphere::new(a + offset, offset.len()))
}

/// Smallest sphere through a subset of `points` that holds all of them.
/// Used only for degenerate support sets, which are tiny.
fn smallest_enclosing(points: &[Vec3]) -> Sphere {
    let mut best: Option<Sphere> = None;
    let mut consider = |candidate: Sphere| {
        if points.iter().all(|&p| candidate.is_in(p))
            && best.map_or(true, |b| candidate.radius < b.radius)
        {
            best = Some(candidate);
        }
    };

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            consider(sphere_from_two(points[i], points[j]));
            for k in (j + 1)..points.len() {
                if let Some(s) = sphere_from_three(points[i], points[j], points[k]) {
                    consider(s);
                }
            }
        }
    }

    match best {
        Some(sphere) => sphere,
        None => match points.first() {
            Some(&p) => {
                // No candidate fits within tolerance; grow around the first point
                let radius = points.iter().map(|&q| (q - p).len()).fold(0.0, f32::max);
                Sphere::new(p, radius)
            }
            None => Sphere::DUMMY,
        },
    }
}
