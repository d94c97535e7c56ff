//! # manip_math - Double-Precision Manipulation Math
//!
//! Vector, quaternion and affine matrix primitives used by the transform
//! manipulator. Everything is `f64` so that compose/decompose round trips
//! and undo/redo restores stay exact to well below `1e-9`.

pub mod vector;
pub mod matrix;
pub mod quaternion;
pub mod transform;
pub mod ray;
pub mod intersect;

pub use vector::*;
pub use matrix::*;
pub use quaternion::*;
pub use transform::*;
pub use ray::*;
pub use intersect::*;

/// Common math constants
pub mod consts {
    pub const PI: f64 = core::f64::consts::PI;
    pub const FRAC_PI_2: f64 = PI / 2.0;
    pub const DEG_TO_RAD: f64 = PI / 180.0;
    pub const RAD_TO_DEG: f64 = 180.0 / PI;
    /// Threshold below which a length or denominator is treated as zero
    pub const EPSILON: f64 = 1e-9;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f64) -> f64 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f64) -> f64 {
    radians * consts::RAD_TO_DEG
}

/// Clamp value between min and max
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min { min }
    else if value > max { max }
    else { value }
}

/// Absolute-difference comparison for scalars
#[inline]
pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}
