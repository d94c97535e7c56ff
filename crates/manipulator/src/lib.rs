//! # manipulator - Interactive Transform Manipulator
//!
//! Translate, rotate and scale scene objects by dragging gizmo handles in a
//! 3D viewport.
//!
//! ## Features
//!
//! - **Orientation frames**: global, local, view, tangent plane, normal and gimbal
//! - **Pivots**: object origins, selection median, 3D cursor or per-object
//! - **Drag solving**: absolute deltas from the drag start, never accumulated
//! - **Snapping**: per-channel increments with fine-control modifiers
//! - **Typed input**: exact distances, angles and factors mid-drag
//! - **Undo/Redo**: one history entry per completed drag
//!
//! ## Architecture
//!
//! ```text
//! Pointer/Key → ManipulatorController → OperationState → Delta → apply_delta → TargetStore
//! ```
//!
//! The host supplies the scene (`TargetStore`), the camera (`Viewport`) and
//! handle hit testing (`PickingBackend`).

pub mod apply;
pub mod config;
pub mod controller;
pub mod error;
pub mod frame;
pub mod handle;
pub mod history;
pub mod input;
pub mod picker;
pub mod pivot;
pub mod readout;
pub mod snap;
pub mod solver;
pub mod target;
pub mod viewport;

pub use apply::apply_delta;
pub use config::{EnabledModes, ManipulatorConfig, SizeOptions, SnapSettings};
pub use controller::{EventResponse, KeyEvent, ManipulatorController};
pub use error::{InputError, ManipulatorError, Result};
pub use frame::{Frame, FrameBuilder, GimbalAngles, OrientationMode};
pub use handle::{Axis, Handle, HandleId, HandleKind, HandleSet, Mode, OperationKind, Plane, TranslationPlane};
pub use history::{HistoryEntry, HistoryItem, UndoHistory};
pub use input::{InputChannel, TypedBuffer, TypedValue};
pub use picker::{HandlePicker, PickingBackend};
pub use pivot::{PivotMode, PivotResolver, PivotResult};
pub use readout::Readout;
pub use snap::{Channel, Modifiers, Snapper};
pub use solver::{Delta, OperationState, SolveContext};
pub use target::{SceneTargets, TargetId, TargetStore};
pub use viewport::{CameraLock, CameraState, NavigationFlags, PerspectiveViewport, Viewport};

pub use manip_math;
