//! Decomposed translation / rotation / scale pose

use crate::vector::Vec3;
use crate::quaternion::Quat;
use crate::matrix::{Mat3, Mat4};

/// Canonical decomposed pose of an affine matrix.
///
/// Scale components are expected to be non-zero; a zero column cannot be
/// decomposed and comes back as scale 0 with an identity rotation basis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    #[inline]
    pub const fn new(translation: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { translation, rotation, scale }
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    /// Set rotation (builder pattern)
    #[inline]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    /// Set scale (builder pattern)
    #[inline]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Compose into an affine matrix (T * R * S)
    #[inline]
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_trs(self.translation, self.rotation, self.scale)
    }

    /// Decompose an affine matrix.
    ///
    /// Scale magnitudes are the basis column lengths. A mirrored basis
    /// (negative determinant) is reported as a negative X scale.
    pub fn from_matrix(m: &Mat4) -> Self {
        let basis = m.to_mat3();
        let [c0, c1, c2] = basis.cols;

        let mut scale = Vec3::new(c0.length(), c1.length(), c2.length());
        if basis.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let unscale = |col: Vec3, s: f64| if s != 0.0 { col / s } else { Vec3::ZERO };
        let rotation_basis = Mat3::from_cols(
            unscale(c0, scale.x),
            unscale(c1, scale.y),
            unscale(c2, scale.z),
        );
        // Scaled input carries rounding noise; re-orthonormalize before extraction.
        let rotation = Quat::from_mat3(&rotation_basis.orthonormalize());

        Self {
            translation: m.translation(),
            rotation,
            scale,
        }
    }

    /// Rotate a local direction into world space (ignores scale)
    #[inline]
    pub fn transform_direction(&self, direction: Vec3) -> Vec3 {
        self.rotation * direction
    }

    pub fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.translation.abs_diff_eq(other.translation, epsilon)
            && self.rotation.abs_diff_eq(other.rotation, epsilon)
            && self.scale.abs_diff_eq(other.scale, epsilon)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Mat4> for Transform {
    fn from(m: Mat4) -> Self {
        Self::from_matrix(&m)
    }
}

impl From<Transform> for Mat4 {
    fn from(t: Transform) -> Self {
        t.to_matrix()
    }
}
