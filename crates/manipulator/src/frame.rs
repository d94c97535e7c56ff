//! Reference frame construction for the six orientation modes.
//!
//! A frame is an origin plus a right-handed orthonormal basis. Handle
//! directions are expressed in this basis; building never fails, degenerate
//! input falls back to the world basis.

use manip_math::{orthonormal_basis, Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::handle::Axis;
use crate::viewport::CameraState;

/// How the gizmo axes are oriented.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrientationMode {
    /// World axes
    #[default]
    Global,
    /// Target's own rotation
    Local,
    /// Camera right / up
    View,
    /// Local tangent frame at the origin (e.g. east-north-up)
    TangentPlane,
    /// Z along a reference surface normal
    Normal,
    /// Yaw/pitch gimbal independent of the target rotation
    Gimbal,
}

/// Gimbal angles in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GimbalAngles {
    pub yaw: f64,
    pub pitch: f64,
}

/// Origin and orthonormal axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub origin: Vec3,
    pub axes: Mat3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::world(Vec3::ZERO)
    }
}

impl Frame {
    /// World-aligned frame at `origin`
    pub fn world(origin: Vec3) -> Self {
        Self {
            origin,
            axes: Mat3::IDENTITY,
        }
    }

    #[inline]
    pub fn x(&self) -> Vec3 {
        self.axes.cols[0]
    }

    #[inline]
    pub fn y(&self) -> Vec3 {
        self.axes.cols[1]
    }

    #[inline]
    pub fn z(&self) -> Vec3 {
        self.axes.cols[2]
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> Vec3 {
        self.axes.cols[axis.index()]
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    /// Frame as an affine matrix (axes as columns, origin as translation)
    pub fn to_matrix(&self) -> Mat4 {
        let [x, y, z] = self.axes.cols;
        Mat4::from_cols(x.extend(0.0), y.extend(0.0), z.extend(0.0), self.origin.extend(1.0))
    }

    /// Unit length, mutually orthogonal and right-handed within `epsilon`.
    pub fn is_orthonormal(&self, epsilon: f64) -> bool {
        let [x, y, z] = self.axes.cols;
        [x, y, z].iter().all(|a| (a.length() - 1.0).abs() <= epsilon)
            && x.dot(y).abs() <= epsilon
            && y.dot(z).abs() <= epsilon
            && z.dot(x).abs() <= epsilon
            && (self.axes.determinant() - 1.0).abs() <= epsilon
    }
}

/// Builds frames for a given orientation mode.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameBuilder {
    pub mode: OrientationMode,
    /// Surface normal for [`OrientationMode::Normal`]
    pub reference_normal: Option<Vec3>,
    pub gimbal: GimbalAngles,
}

impl FrameBuilder {
    pub fn new(mode: OrientationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Build the frame for a target pose.
    ///
    /// `tangent_frame` supplies the tangent-plane basis at a point when the
    /// host has one. A missing pose yields the world frame at the origin.
    pub fn build<F>(&self, target: Option<&Mat4>, camera: Option<&CameraState>, tangent_frame: F) -> Frame
    where
        F: FnOnce(Vec3) -> Option<Mat3>,
    {
        let Some(matrix) = target.filter(|m| m.is_finite()) else {
            return Frame::default();
        };
        let origin = matrix.translation();

        let axes = match self.mode {
            OrientationMode::Global => Mat3::IDENTITY,
            OrientationMode::Local => matrix.to_mat3().orthonormalize(),
            OrientationMode::View => match camera {
                Some(camera) => view_axes(camera),
                None => Mat3::IDENTITY,
            },
            OrientationMode::TangentPlane => tangent_frame(origin)
                .map(|m| m.orthonormalize())
                .unwrap_or(Mat3::IDENTITY),
            OrientationMode::Normal => {
                let normal = self.reference_normal.unwrap_or_else(|| matrix.to_mat3().cols[2]);
                normal_axes(normal)
            }
            OrientationMode::Gimbal => gimbal_axes(self.gimbal),
        };

        Frame { origin, axes }
    }
}

/// Camera right and up; the third axis completes a right-handed basis and
/// therefore points back toward the viewer.
fn view_axes(camera: &CameraState) -> Mat3 {
    let (x, y, z) = orthonormal_basis(camera.right, camera.up, -camera.forward);
    Mat3::from_cols(x, y, z)
}

/// Z along `normal`, X and Y from a world helper axis that is not parallel to it.
fn normal_axes(normal: Vec3) -> Mat3 {
    let Some(z) = normal.try_normalize(1e-9) else {
        return Mat3::IDENTITY;
    };

    let helper = if z.dot(Vec3::Z).abs() < 0.9 {
        Vec3::Z
    } else if z.dot(Vec3::X).abs() < 0.9 {
        Vec3::X
    } else {
        Vec3::Y
    };

    let x = helper.cross(z).normalize();
    let y = z.cross(x);
    Mat3::from_cols(x, y, z)
}

fn gimbal_axes(gimbal: GimbalAngles) -> Mat3 {
    let (sy, cy) = gimbal.yaw.sin_cos();
    let (sp, cp) = gimbal.pitch.sin_cos();
    let x = Vec3::new(cy, 0.0, sy);
    let y = Vec3::new(0.0, cp, sp);

    let (x, y, z) = orthonormal_basis(x, y, Vec3::Z);
    Mat3::from_cols(x, y, z)
}
