//! Quaternion for 3D rotations

use crate::vector::Vec3;
use crate::matrix::Mat3;
use core::ops::Mul;

/// Quaternion representing a 3D rotation.
///
/// Every constructor in this module returns a unit quaternion; the
/// manipulator relies on that when composing rotations across a drag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Create a new quaternion from raw components (not normalized)
    #[inline]
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis and angle (radians)
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let axis = axis.normalize();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos).normalize()
    }

    /// Create from rotation around X axis
    #[inline]
    pub fn from_rotation_x(angle: f64) -> Self {
        Self::from_axis_angle(Vec3::X, angle)
    }

    /// Create from rotation around Y axis
    #[inline]
    pub fn from_rotation_y(angle: f64) -> Self {
        Self::from_axis_angle(Vec3::Y, angle)
    }

    /// Create from rotation around Z axis
    #[inline]
    pub fn from_rotation_z(angle: f64) -> Self {
        Self::from_axis_angle(Vec3::Z, angle)
    }

    /// Create from a pure rotation matrix (columns must be orthonormal)
    pub fn from_mat3(m: &Mat3) -> Self {
        let [c0, c1, c2] = m.cols;
        let trace = c0.x + c1.y + c2.z;

        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new((c1.z - c2.y) / s, (c2.x - c0.z) / s, (c0.y - c1.x) / s, 0.25 * s)
        } else if c0.x > c1.y && c0.x > c2.z {
            let s = (1.0 + c0.x - c1.y - c2.z).sqrt() * 2.0;
            Self::new(0.25 * s, (c0.y + c1.x) / s, (c2.x + c0.z) / s, (c1.z - c2.y) / s)
        } else if c1.y > c2.z {
            let s = (1.0 + c1.y - c0.x - c2.z).sqrt() * 2.0;
            Self::new((c0.y + c1.x) / s, 0.25 * s, (c1.z + c2.y) / s, (c2.x - c0.z) / s)
        } else {
            let s = (1.0 + c2.z - c0.x - c1.y).sqrt() * 2.0;
            Self::new((c2.x + c0.z) / s, (c1.z + c2.y) / s, 0.25 * s, (c0.y - c1.x) / s)
        };
        q.normalize()
    }

    /// Get the length squared
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Get the length
    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Normalize the quaternion; degenerate input collapses to identity
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 && len.is_finite() {
            Self::new(self.x / len, self.y / len, self.z / len, self.w / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Dot product
    #[inline]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Same rotation, treating `q` and `-q` as equal
    pub fn same_rotation(self, other: Self, epsilon: f64) -> bool {
        (self.dot(other).abs() - 1.0).abs() <= epsilon
    }

    /// Component-wise comparison up to the sign ambiguity of quaternions
    pub fn abs_diff_eq(self, other: Self, epsilon: f64) -> bool {
        let close = |o: Self| {
            (self.x - o.x).abs() <= epsilon
                && (self.y - o.y).abs() <= epsilon
                && (self.z - o.z).abs() <= epsilon
                && (self.w - o.w).abs() <= epsilon
        };
        close(other) || close(Self::new(-other.x, -other.y, -other.z, -other.w))
    }

    /// Convert to 3x3 rotation matrix
    pub fn to_mat3(self) -> Mat3 {
        let x2 = self.x + self.x;
        let y2 = self.y + self.y;
        let z2 = self.z + self.z;
        let xx = self.x * x2;
        let xy = self.x * y2;
        let xz = self.x * z2;
        let yy = self.y * y2;
        let yz = self.y * z2;
        let zz = self.z * z2;
        let wx = self.w * x2;
        let wy = self.w * y2;
        let wz = self.w * z2;

        Mat3::from_cols(
            Vec3::new(1.0 - (yy + zz), xy + wz, xz - wy),
            Vec3::new(xy - wz, 1.0 - (xx + zz), yz + wx),
            Vec3::new(xz + wy, yz - wx, 1.0 - (xx + yy)),
        )
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product; the result is renormalized to keep drift out of long drags.
impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
        .normalize()
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}
