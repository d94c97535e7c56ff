//! Pointer-ray to transform-delta solving.
//!
//! Every operation has a `begin` step that captures the immutable quantities
//! of a drag (solving plane, start hit, reference vector) and an `update`
//! step that turns the current pointer ray into a delta relative to the drag
//! start. Both are pure. A ray that misses its solving plane yields the
//! neutral delta rather than an error.

use manip_math::{consts::EPSILON, ray_plane_point, Mat3, Ray, Vec3};

use crate::handle::{Axis, OperationKind, TranslationPlane};
use crate::input::TypedValue;
use crate::snap::{Channel, Modifiers, Snapper};
use crate::viewport::CameraState;

/// Factors this close to zero are treated as exactly zero.
const ZERO_FACTOR: f64 = 1e-10;

/// Inputs captured at drag start.
#[derive(Clone, Copy, Debug)]
pub struct SolveContext {
    /// Frame axes frozen for the whole drag
    pub axes: Mat3,
    pub pivot: Vec3,
    pub camera: CameraState,
    pub start_ray: Ray,
}

/// Incremental transform produced by one update, relative to the drag start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Delta {
    Translate {
        vector: Vec3,
        /// Signed distance along the drag axis, or the vector length for planes
        distance: f64,
    },
    Rotate {
        axis: Vec3,
        /// Signed angle in radians
        angle: f64,
    },
    AxisScale {
        axis: Vec3,
        component: Axis,
        factor: f64,
    },
    UniformScale {
        factor: f64,
    },
}

impl Delta {
    /// True when applying this delta changes nothing
    pub fn is_neutral(&self) -> bool {
        match *self {
            Delta::Translate { vector, .. } => vector == Vec3::ZERO,
            Delta::Rotate { angle, .. } => angle == 0.0,
            Delta::AxisScale { factor, .. } | Delta::UniformScale { factor } => factor == 1.0,
        }
    }
}

/// Immutable per-drag solving state, one variant per operation kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OperationState {
    AxisTranslate {
        axis: Vec3,
        pivot: Vec3,
        plane_normal: Vec3,
        /// Press hit on the solving plane; `None` when the press ray missed it
        start_point: Option<Vec3>,
    },
    PlaneTranslate {
        /// In-plane directions used for typed input and per-component snapping
        u: Vec3,
        v: Vec3,
        normal: Vec3,
        pivot: Vec3,
        start_point: Option<Vec3>,
    },
    Rotate {
        axis: Vec3,
        pivot: Vec3,
        /// Start hit relative to the pivot; `None` when it was degenerate
        reference: Option<Vec3>,
        view: bool,
    },
    AxisScale {
        axis: Vec3,
        component: Axis,
        pivot: Vec3,
        plane_normal: Vec3,
        start_point: Option<Vec3>,
        initial_length: f64,
    },
    UniformScale {
        normal: Vec3,
        pivot: Vec3,
        start_point: Option<Vec3>,
        base_distance: f64,
    },
}

/// Plane containing `axis` that faces the camera as much as possible.
///
/// Always returns a finite unit vector perpendicular to `axis`, including
/// when the axis is parallel to the view direction.
pub fn axis_plane_normal(axis: Vec3, camera_direction: Vec3) -> Vec3 {
    let mut side = axis.cross(camera_direction);
    if side.length() < EPSILON {
        let fallback = if axis.z.abs() < 0.9 { Vec3::Z } else { Vec3::Y };
        side = axis.cross(fallback);
    }
    axis.cross(side)
        .try_normalize(EPSILON)
        .or_else(|| side.try_normalize(EPSILON))
        .unwrap_or_else(|| axis.any_orthogonal())
}

/// Signed angle from `from` to `to` about `axis`, in (-π, π].
///
/// At exactly 0° or 180° the cross product vanishes and the sign is
/// whatever the rounding yields.
pub fn signed_angle(from: Vec3, to: Vec3, axis: Vec3) -> f64 {
    let a = from.normalize();
    let b = to.normalize();
    let cross = a.cross(b);
    let angle = cross.length().atan2(a.dot(b));
    if cross.dot(axis) < 0.0 {
        -angle
    } else {
        angle
    }
}

fn clamp_factor(factor: f64) -> f64 {
    if factor.abs() < ZERO_FACTOR || !factor.is_finite() {
        1.0
    } else {
        factor
    }
}

impl OperationState {
    /// Capture the solving state for `kind`.
    pub fn begin(kind: OperationKind, ctx: &SolveContext) -> Self {
        let pivot = ctx.pivot;
        let view_dir = ctx.camera.forward.try_normalize(EPSILON).unwrap_or(Vec3::NEG_Z);
        let hit = |normal: Vec3| ray_plane_point(&ctx.start_ray, pivot, normal);

        match kind {
            OperationKind::AxisTranslate(a) => {
                let axis = ctx.axes.col(a.index()).normalize();
                let plane_normal = axis_plane_normal(axis, view_dir);
                OperationState::AxisTranslate {
                    axis,
                    pivot,
                    plane_normal,
                    start_point: hit(plane_normal),
                }
            }
            OperationKind::PlaneTranslate(plane) => {
                let (u, v, normal) = match plane {
                    TranslationPlane::Frame(p) => {
                        let (a, b) = p.axes();
                        (
                            ctx.axes.col(a.index()),
                            ctx.axes.col(b.index()),
                            ctx.axes.col(p.normal_axis().index()),
                        )
                    }
                    TranslationPlane::Screen => (ctx.camera.right, ctx.camera.up, view_dir),
                };
                OperationState::PlaneTranslate {
                    u: u.normalize(),
                    v: v.normalize(),
                    normal: normal.normalize(),
                    pivot,
                    start_point: hit(normal.normalize()),
                }
            }
            OperationKind::AxisRotate(a) => {
                Self::begin_rotate(ctx.axes.col(a.index()).normalize(), ctx, false)
            }
            OperationKind::ViewRotate => Self::begin_rotate(view_dir, ctx, true),
            OperationKind::AxisScale(component) => {
                let axis = ctx.axes.col(component.index()).normalize();
                let plane_normal = axis_plane_normal(axis, view_dir);
                let start_point = hit(plane_normal);
                let initial_length = start_point
                    .map_or(0.0, |p| (p - pivot).dot(axis).abs())
                    .max(EPSILON);
                OperationState::AxisScale {
                    axis,
                    component,
                    pivot,
                    plane_normal,
                    start_point,
                    initial_length,
                }
            }
            OperationKind::UniformScale => {
                let start_point = hit(view_dir);
                OperationState::UniformScale {
                    normal: view_dir,
                    pivot,
                    start_point,
                    base_distance: start_point.map_or(0.0, |p| (p - pivot).length()).max(EPSILON),
                }
            }
        }
    }

    fn begin_rotate(axis: Vec3, ctx: &SolveContext, view: bool) -> Self {
        let reference = ray_plane_point(&ctx.start_ray, ctx.pivot, axis)
            .and_then(|p| (p - ctx.pivot).try_normalize(EPSILON));
        OperationState::Rotate {
            axis,
            pivot: ctx.pivot,
            reference,
            view,
        }
    }

    /// Transform channel, used for snapping and typed input.
    pub fn channel(&self) -> Channel {
        match self {
            OperationState::AxisTranslate { .. } => Channel::Translate,
            OperationState::PlaneTranslate { .. } => Channel::Translate,
            OperationState::Rotate { .. } => Channel::Rotate,
            OperationState::AxisScale { .. } | OperationState::UniformScale { .. } => Channel::Scale,
        }
    }

    /// Delta that leaves every target where it started
    pub fn neutral(&self) -> Delta {
        match *self {
            OperationState::AxisTranslate { .. } | OperationState::PlaneTranslate { .. } => {
                Delta::Translate { vector: Vec3::ZERO, distance: 0.0 }
            }
            OperationState::Rotate { axis, .. } => Delta::Rotate { axis, angle: 0.0 },
            OperationState::AxisScale { axis, component, .. } => Delta::AxisScale {
                axis,
                component,
                factor: 1.0,
            },
            OperationState::UniformScale { .. } => Delta::UniformScale { factor: 1.0 },
        }
    }

    /// Delta for the current pointer ray.
    pub fn update(&self, ray: &Ray) -> Delta {
        match *self {
            OperationState::AxisTranslate { axis, pivot, plane_normal, start_point } => {
                let (Some(start_point), Some(point)) = (start_point, ray_plane_point(ray, pivot, plane_normal)) else {
                    return self.neutral();
                };
                let distance = (point - start_point).dot(axis);
                Delta::Translate { vector: axis * distance, distance }
            }
            OperationState::PlaneTranslate { normal, pivot, start_point, .. } => {
                let (Some(start_point), Some(point)) = (start_point, ray_plane_point(ray, pivot, normal)) else {
                    return self.neutral();
                };
                let vector = point - start_point;
                Delta::Translate { vector, distance: vector.length() }
            }
            OperationState::Rotate { axis, pivot, reference, .. } => {
                let Some(reference) = reference else {
                    return self.neutral();
                };
                let current = ray_plane_point(ray, pivot, axis)
                    .and_then(|p| (p - pivot).try_normalize(EPSILON));
                match current {
                    Some(current) => Delta::Rotate {
                        axis,
                        angle: signed_angle(reference, current, axis),
                    },
                    None => self.neutral(),
                }
            }
            OperationState::AxisScale {
                axis,
                component,
                pivot,
                plane_normal,
                start_point,
                initial_length,
            } => {
                let (Some(start_point), Some(point)) = (start_point, ray_plane_point(ray, pivot, plane_normal)) else {
                    return self.neutral();
                };
                let distance = (point - start_point).dot(axis);
                Delta::AxisScale {
                    axis,
                    component,
                    factor: clamp_factor(1.0 + distance / initial_length),
                }
            }
            OperationState::UniformScale { normal, pivot, start_point, base_distance } => {
                let (Some(_), Some(point)) = (start_point, ray_plane_point(ray, pivot, normal)) else {
                    return self.neutral();
                };
                Delta::UniformScale {
                    factor: clamp_factor((point - pivot).length() / base_distance),
                }
            }
        }
    }

    /// Quantize a pointer-derived delta according to the snap settings.
    pub fn snap(&self, delta: Delta, snapper: &Snapper, modifiers: Modifiers) -> Delta {
        match (*self, delta) {
            (OperationState::AxisTranslate { axis, .. }, Delta::Translate { distance, .. }) => {
                let distance = snapper.snap(Channel::Translate, distance, modifiers);
                Delta::Translate { vector: axis * distance, distance }
            }
            (OperationState::PlaneTranslate { u, v, .. }, Delta::Translate { vector, .. }) => {
                let a = snapper.snap(Channel::Translate, vector.dot(u), modifiers);
                let b = snapper.snap(Channel::Translate, vector.dot(v), modifiers);
                let vector = u * a + v * b;
                Delta::Translate { vector, distance: vector.length() }
            }
            (OperationState::Rotate { .. }, Delta::Rotate { axis, angle }) => Delta::Rotate {
                axis,
                angle: snapper.snap(Channel::Rotate, angle, modifiers),
            },
            (OperationState::AxisScale { .. }, Delta::AxisScale { axis, component, factor }) => {
                Delta::AxisScale {
                    axis,
                    component,
                    factor: snapper.snap(Channel::Scale, factor, modifiers),
                }
            }
            (OperationState::UniformScale { .. }, Delta::UniformScale { factor }) => Delta::UniformScale {
                factor: snapper.snap(Channel::Scale, factor, modifiers),
            },
            (_, other) => other,
        }
    }

    /// Exact delta for a typed value, or `None` if the value does not fit
    /// this operation's channel.
    pub fn typed_delta(&self, value: TypedValue) -> Option<Delta> {
        let delta = match (*self, value) {
            (OperationState::AxisTranslate { axis, .. }, TypedValue::Distance(d)) => Delta::Translate {
                vector: axis * d,
                distance: d,
            },
            (OperationState::PlaneTranslate { u, v, .. }, TypedValue::Plane(a, b)) => {
                let vector = u * a + v * b;
                Delta::Translate { vector, distance: vector.length() }
            }
            (OperationState::Rotate { axis, .. }, TypedValue::Angle(angle)) => Delta::Rotate { axis, angle },
            (OperationState::AxisScale { axis, component, .. }, TypedValue::Scale(f)) => Delta::AxisScale {
                axis,
                component,
                factor: clamp_factor(f),
            },
            (OperationState::UniformScale { .. }, TypedValue::Scale(f)) => Delta::UniformScale {
                factor: clamp_factor(f),
            },
            _ => return None,
        };
        Some(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manip_math::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-9;

    fn camera_looking(direction: Vec3) -> CameraState {
        CameraState::look_at(-direction * 10.0, Vec3::ZERO, if direction.z.abs() > 0.9 { Vec3::Y } else { Vec3::Z })
    }

    fn ctx(camera: CameraState, start_ray: Ray) -> SolveContext {
        SolveContext {
            axes: Mat3::IDENTITY,
            pivot: Vec3::ZERO,
            camera,
            start_ray,
        }
    }

    fn down_ray(x: f64, y: f64) -> Ray {
        Ray::new(Vec3::new(x, y, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn test_axis_translate_follows_pointer() {
        let camera = camera_looking(Vec3::new(0.0, 1.0, -1.0).normalize());
        let start = Ray::new(Vec3::new(0.3, -5.0, 5.0), Vec3::new(0.0, 1.0, -1.0));
        let state = OperationState::begin(OperationKind::AxisTranslate(Axis::X), &ctx(camera, start));

        for k in [-3.5, 0.0, 0.25, 7.0] {
            let moved = Ray::new(start.origin + Vec3::X * k, start.direction);
            match state.update(&moved) {
                Delta::Translate { distance, vector } => {
                    assert!((distance - k).abs() < 1e-6);
                    assert!(vector.abs_diff_eq(Vec3::new(k, 0.0, 0.0), 1e-6));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_axis_parallel_to_camera_has_unit_normal() {
        for axis in [Vec3::X, Vec3::Y, Vec3::Z, Vec3::NEG_Z] {
            let normal = axis_plane_normal(axis, axis);
            assert!(normal.is_finite());
            assert!((normal.length() - 1.0).abs() < EPS);
            assert!(normal.dot(axis).abs() < EPS);
        }

        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::AxisTranslate(Axis::Z), &ctx(camera, down_ray(0.0, 0.0)));
        match state {
            OperationState::AxisTranslate { plane_normal, .. } => {
                assert!((plane_normal.length() - 1.0).abs() < EPS);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_plane_translate_full_vector() {
        let camera = camera_looking(Vec3::NEG_Z);
        let kind = OperationKind::PlaneTranslate(TranslationPlane::Frame(crate::handle::Plane::XY));
        let state = OperationState::begin(kind, &ctx(camera, down_ray(1.0, 1.0)));
        match state.update(&down_ray(3.0, -2.0)) {
            Delta::Translate { vector, .. } => assert!(vector.abs_diff_eq(Vec3::new(2.0, -3.0, 0.0), EPS)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_axis_rotate_signed_angle() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::AxisRotate(Axis::Z), &ctx(camera, down_ray(1.0, 0.0)));

        let angle = |ray: Ray| match state.update(&ray) {
            Delta::Rotate { angle, .. } => angle,
            other => panic!("unexpected {other:?}"),
        };
        assert!((angle(down_ray(0.0, 2.0)) - FRAC_PI_2).abs() < EPS);
        assert!((angle(down_ray(0.0, -2.0)) + FRAC_PI_2).abs() < EPS);
        assert!((angle(down_ray(-1.0, 1.0)) - 3.0 * PI / 4.0).abs() < EPS);
    }

    #[test]
    fn test_rotate_with_degenerate_reference_is_neutral() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::AxisRotate(Axis::Z), &ctx(camera, down_ray(0.0, 0.0)));
        assert!(state.update(&down_ray(1.0, 1.0)).is_neutral());
    }

    #[test]
    fn test_view_rotate_axis_is_captured() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::ViewRotate, &ctx(camera, down_ray(1.0, 0.0)));
        match state {
            OperationState::Rotate { axis, view, .. } => {
                assert!(view);
                assert!(axis.abs_diff_eq(Vec3::NEG_Z, EPS));
            }
            other => panic!("unexpected {other:?}"),
        }
        // Counter-clockwise seen from above is clockwise about the view axis.
        match state.update(&down_ray(0.0, 1.0)) {
            Delta::Rotate { angle, .. } => assert!((angle + FRAC_PI_2).abs() < EPS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_axis_scale_factor() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::AxisScale(Axis::X), &ctx(camera, down_ray(2.0, 0.0)));
        match state.update(&down_ray(4.0, 0.5)) {
            Delta::AxisScale { factor, component, .. } => {
                assert_eq!(component, Axis::X);
                assert!((factor - 2.0).abs() < EPS);
            }
            other => panic!("unexpected {other:?}"),
        }
        // Dragging back through the pivot would give a zero factor.
        match state.update(&down_ray(0.0, 0.0)) {
            Delta::AxisScale { factor, .. } => assert_eq!(factor, 1.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_uniform_scale_factor() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::UniformScale, &ctx(camera, down_ray(0.0, 1.0)));
        match state.update(&down_ray(0.0, 3.0)) {
            Delta::UniformScale { factor } => assert!((factor - 3.0).abs() < EPS),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parallel_ray_gives_neutral_delta() {
        let camera = camera_looking(Vec3::NEG_Z);
        let parallel = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        for kind in [
            OperationKind::PlaneTranslate(TranslationPlane::Screen),
            OperationKind::AxisRotate(Axis::Z),
            OperationKind::UniformScale,
        ] {
            let state = OperationState::begin(kind, &ctx(camera, down_ray(1.0, 1.0)));
            assert!(state.update(&parallel).is_neutral(), "{kind:?}");
        }
    }

    #[test]
    fn test_missed_press_stays_neutral() {
        let camera = camera_looking(Vec3::NEG_Z);
        let missed = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::X);
        for kind in [
            OperationKind::AxisTranslate(Axis::X),
            OperationKind::PlaneTranslate(TranslationPlane::Frame(crate::handle::Plane::XY)),
            OperationKind::AxisScale(Axis::X),
            OperationKind::UniformScale,
        ] {
            let state = OperationState::begin(kind, &ctx(camera, missed));
            // Later hits have no start point to measure from, so no jump
            assert!(state.update(&down_ray(3.0, 2.0)).is_neutral(), "{kind:?}");
        }
    }

    #[test]
    fn test_typed_delta_channel_mismatch() {
        let camera = camera_looking(Vec3::NEG_Z);
        let state = OperationState::begin(OperationKind::AxisTranslate(Axis::Y), &ctx(camera, down_ray(0.0, 1.0)));
        assert!(state.typed_delta(TypedValue::Angle(1.0)).is_none());
        assert_eq!(
            state.typed_delta(TypedValue::Distance(0.05)),
            Some(Delta::Translate { vector: Vec3::new(0.0, 0.05, 0.0), distance: 0.05 })
        );
    }
}
