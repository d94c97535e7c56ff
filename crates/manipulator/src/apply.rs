//! Pivot-relative application of a delta to a target's starting pose.

use manip_math::{Quat, Transform, Vec3};

use crate::handle::Axis;
use crate::solver::Delta;

/// New pose for a target that started at `start` and transforms about `pivot`.
///
/// Rotation pre-multiplies in world space. Axis scale stretches only the
/// along-axis part of the pivot offset and one scale component.
pub fn apply_delta(start: &Transform, pivot: Vec3, delta: &Delta) -> Transform {
    match *delta {
        Delta::Translate { vector, .. } => Transform {
            translation: start.translation + vector,
            ..*start
        },
        Delta::Rotate { axis, angle } => {
            let dq = Quat::from_axis_angle(axis, angle);
            let relative = start.translation - pivot;
            Transform {
                translation: pivot + dq * relative,
                rotation: (dq * start.rotation).normalize(),
                scale: start.scale,
            }
        }
        Delta::AxisScale { axis, component, factor } => {
            let relative = start.translation - pivot;
            let along = relative.project_onto(axis);
            let across = relative - along;

            let mut scale = start.scale;
            match component {
                Axis::X => scale.x *= factor,
                Axis::Y => scale.y *= factor,
                Axis::Z => scale.z *= factor,
            }

            Transform {
                translation: pivot + across + along * factor,
                rotation: start.rotation,
                scale,
            }
        }
        Delta::UniformScale { factor } => Transform {
            translation: pivot + (start.translation - pivot) * factor,
            rotation: start.rotation,
            scale: start.scale * factor,
        },
    }
}
