//! 3D ray used for pointer picking and plane solving

use crate::vector::Vec3;

/// Ray with a normalized direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    /// Ray origin point
    pub origin: Vec3,
    /// Ray direction (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Create a ray from two points
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Get a point at distance t along the ray
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Get the closest point on the ray to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let t = (point - self.origin).dot(self.direction);
        if t <= 0.0 {
            self.origin
        } else {
            self.at(t)
        }
    }

    /// Check if the ray direction is usable
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.origin.is_finite() && self.direction.length_squared() > 1e-18
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_from_points() {
        let ray = Ray::from_points(Vec3::ZERO, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.origin, Vec3::ZERO);
        assert!((ray.direction.z - 1.0).abs() < 1e-12);
        assert!((ray.at(5.0).z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_closest_point() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let closest = ray.closest_point(Vec3::new(1.0, 0.0, 5.0));
        assert!(closest.abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-12));
        assert_eq!(ray.closest_point(Vec3::new(0.0, 0.0, -3.0)), Vec3::ZERO);
    }

    #[test]
    fn test_zero_direction_is_invalid() {
        assert!(!Ray::new(Vec3::ONE, Vec3::ZERO).is_valid());
        assert!(Ray::new(Vec3::ONE, Vec3::X).is_valid());
    }
}
