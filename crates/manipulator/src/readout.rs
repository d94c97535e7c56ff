//! Live value shown next to the gizmo while dragging.

use std::fmt;

use manip_math::{degrees, Vec3};

use crate::solver::{Delta, OperationState};

/// Current drag amount, for the host's on-screen label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Readout {
    /// Meters along an axis
    Distance(f64),
    /// Meters in a plane
    Offset(Vec3),
    /// Radians
    Angle(f64),
    Factor(f64),
}

impl Readout {
    pub fn from_delta(state: &OperationState, delta: &Delta) -> Self {
        match (state, *delta) {
            (OperationState::PlaneTranslate { .. }, Delta::Translate { vector, .. }) => Readout::Offset(vector),
            (_, Delta::Translate { distance, .. }) => Readout::Distance(distance),
            (_, Delta::Rotate { angle, .. }) => Readout::Angle(angle),
            (_, Delta::AxisScale { factor, .. }) | (_, Delta::UniformScale { factor }) => Readout::Factor(factor),
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Readout::Distance(d) => write!(f, "{:.3} m", d),
            Readout::Offset(v) => write!(f, "({:.3}, {:.3}, {:.3}) m", v.x, v.y, v.z),
            Readout::Angle(a) => write!(f, "{:.2}°", degrees(a)),
            Readout::Factor(s) => write!(f, "×{:.3}", s),
        }
    }
}
