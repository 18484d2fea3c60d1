//! Planes and spheres used by frustum culling and clipping

use super::constants::{PLANE_EPSILON, SPHERE_EPSILON};
use super::math::Vec3;

/// Plane in the form `normal · p + distance = 0`.
/// The normal does not have to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

/// Where a segment crosses a plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Vec3,
    /// Parametric position along the segment, 0 at its start and 1 at its end
    pub t: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// `normal · p + distance`, not normalized
    pub fn evaluate(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.distance
    }

    /// Strictly in front; points on the plane are not in front
    pub fn is_in_front(&self, point: Vec3) -> bool {
        self.evaluate(point) > PLANE_EPSILON
    }

    /// Unsigned distance, normalized by the normal's length
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.evaluate(point).abs() / self.normal.len()
    }

    /// Intersection of segment `a -> b` with the plane.
    /// Returns None when the segment is parallel to the plane.
    pub fn segment_intersection(&self, a: Vec3, b: Vec3) -> Option<Intersection> {
        Self::split_segment(a, b, self.evaluate(a), self.evaluate(b))
    }

    /// Intersection from plane evaluations already computed for both ends.
    /// `t` is clamped to [0, 1] so ends classified on opposite sides always
    /// yield a point on the segment. None when `t` is not finite.
    pub fn split_segment(a: Vec3, b: Vec3, eval_a: f32, eval_b: f32) -> Option<Intersection> {
        let t = eval_a / (eval_a - eval_b);
        if !t.is_finite() {
            return None;
        }

        let t = t.clamp(0.0, 1.0);
        Some(Intersection { point: a + (b - a) * t, t })
    }
}

/// Bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Zero-radius sphere at the origin, the bound of an empty point set
    pub const DUMMY: Sphere = Sphere { center: Vec3::ZERO, radius: 0.0 };

    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Zero-radius sphere around a single point
    pub fn point(center: Vec3) -> Self {
        Self { center, radius: 0.0 }
    }

    pub fn is_dummy(&self) -> bool {
        self.radius < PLANE_EPSILON
    }

    /// Containment test on squared distances with a small relative tolerance
    pub fn is_in(&self, point: Vec3) -> bool {
        let r2 = self.radius * self.radius;
        (point - self.center).len_sq() <= r2 + r2 * SPHERE_EPSILON + PLANE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_on_plane_is_not_in_front() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 2.0), -4.0);
        let on_plane = Vec3::new(3.0, -7.0, 2.0);
        assert!(plane.distance_to(on_plane).abs() < 1e-6);
        assert!(!plane.is_in_front(on_plane));
        assert!(plane.is_in_front(Vec3::new(0.0, 0.0, 2.5)));
        assert!(!plane.is_in_front(Vec3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn test_distance_is_normalized() {
        let plane = Plane::new(Vec3::new(0.0, 3.0, 4.0), 0.0);
        let p = Vec3::new(0.0, 3.0, 4.0);
        assert!((plane.distance_to(p) - 5.0).abs() < 1e-5);
        assert!((plane.distance_to(-p) - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_segment_intersection() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 1.0), -1.0);
        let hit = plane
            .segment_intersection(Vec3::new(0.0, 0.0, 3.0), Vec3::new(2.0, 0.0, -1.0))
            .unwrap();
        assert!((hit.t - 0.5).abs() < 1e-6);
        assert!((hit.point.x - 1.0).abs() < 1e-6);
        assert!((hit.point.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_parallel_segment_has_no_intersection() {
        let plane = Plane::new(Vec3::new(0.0, 1.0, 0.0), 0.0);
        let hit = plane.segment_intersection(Vec3::new(0.0, 1.0, 0.0), Vec3::new(5.0, 1.0, 2.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_segment_ending_on_plane() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 1.0), -1.0);
        let on_plane = Vec3::new(4.0, 2.0, 1.0);
        assert!(!plane.is_in_front(on_plane));

        let hit = plane.segment_intersection(Vec3::new(0.0, 0.0, 5.0), on_plane).unwrap();
        assert_eq!(hit.t, 1.0);
        assert!((hit.point - on_plane).len() < 1e-6);
    }

    #[test]
    fn test_split_near_epsilon_evaluations() {
        // Both ends within a few ulps of the plane; the normal barely changes along the edge
        let a = Vec3::new(-1.0, 0.0, 1.0);
        let b = Vec3::new(-1.0 - f32::EPSILON, 0.0, 1.0);
        let hit = Plane::split_segment(a, b, 2.0 * f32::EPSILON, f32::EPSILON).unwrap();
        assert_eq!(hit.t, 1.0);

        let hit = Plane::split_segment(a, b, 3.0 * f32::EPSILON, -f32::EPSILON).unwrap();
        assert!((hit.t - 0.75).abs() < 1e-6);

        // Equal evaluations on both ends never produce a point
        assert!(Plane::split_segment(a, b, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_sphere_contains_boundary_points() {
        let sphere = Sphere::new(Vec3::new(1.0, 1.0, 1.0), 2.0);
        assert!(sphere.is_in(Vec3::new(3.0, 1.0, 1.0)));
        assert!(sphere.is_in(Vec3::new(1.0, 1.0, 1.0)));
        assert!(!sphere.is_in(Vec3::new(3.1, 1.0, 1.0)));
        assert!(Sphere::DUMMY.is_dummy());
        assert!(Sphere::DUMMY.is_in(Vec3::ZERO));
    }
}
