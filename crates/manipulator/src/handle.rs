//! Handle descriptors and the operation each one drives.

use serde::{Deserialize, Serialize};

/// Unique identifier for a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub &'static str);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transform channel a handle manipulates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Translate,
    Rotate,
    Scale,
}

/// Frame axis label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Frame plane label, named by the two axes it spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Plane {
    XY,
    YZ,
    XZ,
}

impl Plane {
    /// The two in-plane axes
    pub fn axes(self) -> (Axis, Axis) {
        match self {
            Plane::XY => (Axis::X, Axis::Y),
            Plane::YZ => (Axis::Y, Axis::Z),
            Plane::XZ => (Axis::X, Axis::Z),
        }
    }

    /// The axis perpendicular to the plane
    pub fn normal_axis(self) -> Axis {
        match self {
            Plane::XY => Axis::Z,
            Plane::YZ => Axis::X,
            Plane::XZ => Axis::Y,
        }
    }
}

/// Geometric kind of a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Axis(Axis),
    Plane(Plane),
    /// Screen-aligned handle (view ring, screen-plane move)
    View,
    /// Center handle acting on all axes
    Uniform,
}

/// Static priority class used when handles overlap; lower wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriorityClass {
    Axis = 0,
    Plane = 1,
    Screen = 2,
}

/// Solving plane for a translate drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranslationPlane {
    /// One of the frame planes
    Frame(Plane),
    /// Plane facing the camera through the pivot
    Screen,
}

/// Closed set of drag operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    AxisTranslate(Axis),
    PlaneTranslate(TranslationPlane),
    AxisRotate(Axis),
    ViewRotate,
    AxisScale(Axis),
    UniformScale,
}

impl OperationKind {
    pub fn mode(self) -> Mode {
        match self {
            OperationKind::AxisTranslate(_) | OperationKind::PlaneTranslate(_) => Mode::Translate,
            OperationKind::AxisRotate(_) | OperationKind::ViewRotate => Mode::Rotate,
            OperationKind::AxisScale(_) | OperationKind::UniformScale => Mode::Scale,
        }
    }
}

/// Immutable handle descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Handle {
    pub id: HandleId,
    pub mode: Mode,
    pub kind: HandleKind,
}

impl Handle {
    pub const fn new(id: &'static str, mode: Mode, kind: HandleKind) -> Self {
        Self { id: HandleId(id), mode, kind }
    }

    pub fn priority(&self) -> PriorityClass {
        match self.kind {
            HandleKind::Axis(_) => PriorityClass::Axis,
            HandleKind::Plane(_) => PriorityClass::Plane,
            HandleKind::View | HandleKind::Uniform => PriorityClass::Screen,
        }
    }

    /// Operation driven by dragging this handle.
    ///
    /// Rotating about a plane spins around the plane normal, and scaling a
    /// plane is treated as uniform scale.
    pub fn operation(&self) -> OperationKind {
        match (self.mode, self.kind) {
            (Mode::Translate, HandleKind::Axis(axis)) => OperationKind::AxisTranslate(axis),
            (Mode::Translate, HandleKind::Plane(plane)) => {
                OperationKind::PlaneTranslate(TranslationPlane::Frame(plane))
            }
            (Mode::Translate, HandleKind::View | HandleKind::Uniform) => {
                OperationKind::PlaneTranslate(TranslationPlane::Screen)
            }
            (Mode::Rotate, HandleKind::Axis(axis)) => OperationKind::AxisRotate(axis),
            (Mode::Rotate, HandleKind::Plane(plane)) => OperationKind::AxisRotate(plane.normal_axis()),
            (Mode::Rotate, HandleKind::View | HandleKind::Uniform) => OperationKind::ViewRotate,
            (Mode::Scale, HandleKind::Axis(axis)) => OperationKind::AxisScale(axis),
            (Mode::Scale, _) => OperationKind::UniformScale,
        }
    }
}

/// Registry of the handles a gizmo exposes.
#[derive(Clone, Debug, Default)]
pub struct HandleSet {
    handles: Vec<Handle>,
}

impl HandleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fourteen handles of a universal gizmo.
    pub fn standard() -> Self {
        use HandleKind::{Axis as A, Plane as P};
        let mut set = Self::new();
        for handle in [
            Handle::new("translate-x", Mode::Translate, A(Axis::X)),
            Handle::new("translate-y", Mode::Translate, A(Axis::Y)),
            Handle::new("translate-z", Mode::Translate, A(Axis::Z)),
            Handle::new("translate-xy", Mode::Translate, P(Plane::XY)),
            Handle::new("translate-yz", Mode::Translate, P(Plane::YZ)),
            Handle::new("translate-xz", Mode::Translate, P(Plane::XZ)),
            Handle::new("rotate-x", Mode::Rotate, A(Axis::X)),
            Handle::new("rotate-y", Mode::Rotate, A(Axis::Y)),
            Handle::new("rotate-z", Mode::Rotate, A(Axis::Z)),
            Handle::new("rotate-view", Mode::Rotate, HandleKind::View),
            Handle::new("scale-x", Mode::Scale, A(Axis::X)),
            Handle::new("scale-y", Mode::Scale, A(Axis::Y)),
            Handle::new("scale-z", Mode::Scale, A(Axis::Z)),
            Handle::new("scale-uniform", Mode::Scale, HandleKind::Uniform),
        ] {
            set.register(handle);
        }
        set
    }

    /// Register a handle, replacing any existing one with the same id.
    pub fn register(&mut self, handle: Handle) {
        match self.handles.iter_mut().find(|h| h.id == handle.id) {
            Some(existing) => *existing = handle,
            None => self.handles.push(handle),
        }
    }

    pub fn get(&self, id: HandleId) -> Option<&Handle> {
        self.handles.iter().find(|h| h.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.handles.iter()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
