//! Matrix types for affine transformations

use crate::vector::{Vec3, Vec4};
use crate::quaternion::Quat;
use core::ops::Mul;

/// 3x3 matrix (column-major), used for rotation bases and frame axes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat3 {
    pub cols: [Vec3; 3],
}

impl Mat3 {
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    #[inline]
    pub fn col(&self, index: usize) -> Vec3 {
        self.cols[index]
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }

    /// Gram–Schmidt orthonormalization of the columns.
    ///
    /// Column 0 is the primary axis, column 1 is made orthogonal to it and the
    /// third axis is the cross product of the first two, so the result is a
    /// right-handed unit basis even for sheared or scaled input.
    pub fn orthonormalize(&self) -> Self {
        let (x, y, z) = orthonormal_basis(self.cols[0], self.cols[1], self.cols[2]);
        Self::from_cols(x, y, z)
    }

    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| a.abs_diff_eq(*b, epsilon))
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, rhs: Vec3) -> Vec3 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z
    }
}

/// Build a right-handed orthonormal basis from a primary and secondary hint.
///
/// `fallback` is used as the secondary direction when `secondary` is (nearly)
/// parallel to `primary`. A degenerate primary collapses to the world basis.
pub fn orthonormal_basis(primary: Vec3, secondary: Vec3, fallback: Vec3) -> (Vec3, Vec3, Vec3) {
    const DEGENERATE: f64 = 1e-9;

    let Some(x) = primary.try_normalize(DEGENERATE) else {
        return (Vec3::X, Vec3::Y, Vec3::Z);
    };

    let y = secondary
        .reject_from(x)
        .try_normalize(DEGENERATE)
        .or_else(|| fallback.reject_from(x).try_normalize(DEGENERATE))
        .unwrap_or_else(|| x.any_orthogonal());

    let z = x.cross(y).normalize();
    (x, y, z)
}

/// 4x4 affine matrix (column-major, bottom row always `0 0 0 1`)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, translation.extend(1.0))
    }

    /// Compose translation * rotation * scale
    pub fn from_trs(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let r = rotation.normalize().to_mat3();
        Self::from_cols(
            (r.cols[0] * scale.x).extend(0.0),
            (r.cols[1] * scale.y).extend(0.0),
            (r.cols[2] * scale.z).extend(0.0),
            translation.extend(1.0),
        )
    }

    /// Upper-left 3x3 block
    #[inline]
    pub fn to_mat3(&self) -> Mat3 {
        Mat3::from_cols(
            self.cols[0].truncate(),
            self.cols[1].truncate(),
            self.cols[2].truncate(),
        )
    }

    /// Get the translation component
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transform a point (w=1)
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        (*self * point.extend(1.0)).truncate()
    }

    /// Transform a vector (w=0)
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        (*self * vector.extend(0.0)).truncate()
    }

    pub fn is_finite(&self) -> bool {
        self.cols.iter().all(|c| c.to_array().iter().all(|v| v.is_finite()))
    }

    /// Largest absolute element difference between two matrices
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    #[inline]
    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.max_abs_diff(other) <= epsilon
    }

    /// Convert to flat array (column-major)
    pub fn to_array(&self) -> [f64; 16] {
        let [c0, c1, c2, c3] = self.cols;
        [
            c0.x, c0.y, c0.z, c0.w,
            c1.x, c1.y, c1.z, c1.w,
            c2.x, c2.y, c2.z, c2.w,
            c3.x, c3.y, c3.z, c3.w,
        ]
    }

    /// Build from a flat column-major array
    pub fn from_array(m: [f64; 16]) -> Self {
        Self::from_cols(
            Vec4::new(m[0], m[1], m[2], m[3]),
            Vec4::new(m[4], m[5], m[6], m[7]),
            Vec4::new(m[8], m[9], m[10], m[11]),
            Vec4::new(m[12], m[13], m[14], m[15]),
        )
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}
