//! Ray / plane intersection

use crate::vector::Vec3;
use crate::ray::Ray;

/// Denominators below this are treated as a ray parallel to the plane
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// Infinite plane through `point` with unit `normal`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    #[inline]
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }

    /// Signed distance of `p` along the normal
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f64 {
        (p - self.point).dot(self.normal)
    }

    /// Intersection point of `ray` with this plane
    #[inline]
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        ray_plane_point(ray, self.point, self.normal)
    }
}

/// Ray-Plane intersection
///
/// Returns the ray parameter of the hit, or `None` when the ray is
/// (near) parallel to the plane or the plane lies behind the origin.
pub fn ray_plane(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<f64> {
    let denom = plane_normal.dot(ray.direction);

    if denom.abs() < PARALLEL_EPSILON || !denom.is_finite() {
        return None;
    }

    let t = (plane_point - ray.origin).dot(plane_normal) / denom;

    if t >= 0.0 && t.is_finite() {
        Some(t)
    } else {
        None
    }
}

/// Ray-Plane intersection point
#[inline]
pub fn ray_plane_point(ray: &Ray, plane_point: Vec3, plane_normal: Vec3) -> Option<Vec3> {
    ray_plane(ray, plane_point, plane_normal).map(|t| ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_plane_hit() {
        let ray = Ray::new(Vec3::new(1.0, 2.0, 10.0), Vec3::NEG_Z);
        let hit = ray_plane_point(&ray, Vec3::ZERO, Vec3::Z).unwrap();
        assert!(hit.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-12));
    }

    #[test]
    fn test_ray_plane_parallel() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        assert!(ray_plane(&ray, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_ray_plane_behind() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert!(ray_plane(&ray, Vec3::ZERO, Vec3::Z).is_none());
    }

    #[test]
    fn test_plane_signed_distance() {
        let plane = Plane::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 4.0));
        assert!((plane.signed_distance(Vec3::new(5.0, 5.0, 3.0)) - 1.0).abs() < 1e-12);
        assert!(plane.intersect(&Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z)).is_some());
    }
}
