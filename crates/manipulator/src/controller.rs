//! Manipulator controller: the drag state machine.
//!
//! The controller is idle or dragging. A press on a handle snapshots every
//! target, resolves pivots, freezes the solving frame and locks camera
//! navigation. Moves re-solve from the snapshot, so every update is absolute
//! with respect to the drag start. Release records one history entry when
//! anything changed; cancel writes the snapshot back verbatim.

use std::collections::HashMap;

use manip_math::{clamp, Mat4, Ray, Transform, Vec2, Vec3};

use crate::apply::apply_delta;
use crate::config::{ManipulatorConfig, SizeOptions, SnapSettings};
use crate::error::{ManipulatorError, Result};
use crate::frame::{Frame, FrameBuilder, GimbalAngles, OrientationMode};
use crate::handle::{Handle, HandleId, HandleSet, Mode};
use crate::history::{HistoryEntry, HistoryItem, UndoHistory};
use crate::input::{self, InputChannel, TypedBuffer};
use crate::picker::{HandlePicker, PickingBackend};
use crate::pivot::{PivotMode, PivotResolver, PivotResult};
use crate::readout::Readout;
use crate::snap::{Modifiers, Snapper};
use crate::solver::{Delta, OperationState, SolveContext};
use crate::target::{TargetId, TargetStore};
use crate::viewport::{CameraLock, Viewport};

/// Keyboard input relevant to the manipulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    /// Printable character for typed input
    Char(char),
    Backspace,
    Enter,
    Escape,
    Undo,
    Redo,
}

/// Result of feeding an event to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResponse {
    /// Event not handled
    Ignored,
    /// Hover changed or was re-evaluated
    Hovered(Option<HandleId>),
    /// A drag began on the handle
    Started(HandleId),
    /// Targets were updated by the active drag
    Updated,
    /// The drag finished
    Committed,
    /// The drag was cancelled and targets restored
    Cancelled,
    /// Typed-input buffer changed
    Buffered,
    /// Typed input could not be parsed; nothing changed
    Rejected,
    Undone,
    Redone,
}

#[derive(Clone, Copy, Debug)]
struct TargetSnapshot {
    matrix: Mat4,
    trs: Transform,
}

/// State of one in-progress drag.
#[derive(Debug)]
struct DragSession {
    handle: Handle,
    start_ray: Ray,
    pivots: PivotResult,
    /// Snapshot order follows the controller's target list
    order: Vec<TargetId>,
    snapshots: HashMap<TargetId, TargetSnapshot>,
    state: OperationState,
    buffer: TypedBuffer,
}

/// Interactive translate / rotate / scale manipulator.
pub struct ManipulatorController<V: Viewport, P: PickingBackend> {
    viewport: V,
    picker: P,
    config: ManipulatorConfig,
    handles: HandleSet,
    targets: Vec<TargetId>,
    frame_builder: FrameBuilder,
    pivot_resolver: PivotResolver,
    snapper: Snapper,
    history: UndoHistory,
    camera_lock: CameraLock,
    modifiers: Modifiers,
    session: Option<DragSession>,
    /// Frame for display; solving uses the axes frozen in the session
    frame: Frame,
    gizmo_scale: f64,
    hovered: Option<HandleId>,
    readout: Option<Readout>,
}

impl<V: Viewport, P: PickingBackend> ManipulatorController<V, P> {
    /// Create a controller. Fails if the viewport has no camera.
    pub fn new(viewport: V, picker: P, config: ManipulatorConfig) -> Result<Self> {
        if viewport.camera().is_none() {
            return Err(ManipulatorError::CameraUnavailable);
        }

        let frame_builder = FrameBuilder::new(config.orientation);
        let snapper = Snapper::new(config.snap);
        let history = UndoHistory::with_capacity(config.history_limit);

        let mut controller = Self {
            viewport,
            picker,
            config,
            handles: HandleSet::standard(),
            targets: Vec::new(),
            frame_builder,
            pivot_resolver: PivotResolver::new(),
            snapper,
            history,
            camera_lock: CameraLock::default(),
            modifiers: Modifiers::NONE,
            session: None,
            frame: Frame::default(),
            gizmo_scale: 1.0,
            hovered: None,
            readout: None,
        };
        controller.update_gizmo_scale();
        Ok(controller)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut V {
        &mut self.viewport
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut P {
        &mut self.picker
    }

    pub fn config(&self) -> &ManipulatorConfig {
        &self.config
    }

    pub fn handles(&self) -> &HandleSet {
        &self.handles
    }

    /// Register extra handles (e.g. a screen-plane move handle).
    pub fn handles_mut(&mut self) -> &mut HandleSet {
        &mut self.handles
    }

    pub fn targets(&self) -> &[TargetId] {
        &self.targets
    }

    /// Display frame (origin at the representative pivot)
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// World size of the gizmo for constant on-screen size
    pub fn gizmo_scale(&self) -> f64 {
        self.gizmo_scale
    }

    pub fn hovered(&self) -> Option<HandleId> {
        self.hovered
    }

    pub fn readout(&self) -> Option<Readout> {
        self.readout
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn active_handle(&self) -> Option<HandleId> {
        self.session.as_ref().map(|s| s.handle.id)
    }

    /// Text typed during the current drag
    pub fn typed_text(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.buffer.as_str())
    }

    pub fn can_undo(&self) -> bool {
        self.session.is_none() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.session.is_none() && self.history.can_redo()
    }

    pub fn undo_count(&self) -> usize {
        self.history.undo_count()
    }

    pub fn redo_count(&self) -> usize {
        self.history.redo_count()
    }

    // ---------------------------------------------------------------------
    // Configuration
    //
    // Target, orientation and pivot changes are refused while dragging.
    // Frame-affecting setters recompute the display frame immediately.
    // ---------------------------------------------------------------------

    pub fn set_targets(&mut self, targets: Vec<TargetId>, scene: &dyn TargetStore) -> bool {
        if self.is_dragging() {
            log::warn!("Cannot change targets while dragging");
            return false;
        }
        self.targets = targets;
        self.refresh(scene);
        true
    }

    pub fn set_orientation(&mut self, mode: OrientationMode, scene: &dyn TargetStore) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.config.orientation = mode;
        self.frame_builder.mode = mode;
        self.refresh(scene);
        true
    }

    pub fn set_pivot(&mut self, mode: PivotMode, scene: &dyn TargetStore) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.config.pivot = mode;
        self.refresh(scene);
        true
    }

    /// Place (or clear) the 3D cursor used by [`PivotMode::Cursor`].
    pub fn set_cursor(&mut self, cursor: Option<Vec3>, scene: &dyn TargetStore) {
        self.pivot_resolver.set_cursor(cursor);
        self.refresh(scene);
    }

    pub fn set_reference_normal(&mut self, normal: Option<Vec3>, scene: &dyn TargetStore) {
        self.frame_builder.reference_normal = normal;
        self.refresh(scene);
    }

    pub fn set_gimbal(&mut self, gimbal: GimbalAngles, scene: &dyn TargetStore) {
        self.frame_builder.gimbal = gimbal;
        self.refresh(scene);
    }

    pub fn set_snap(&mut self, snap: SnapSettings) {
        self.config.snap = snap;
        self.snapper.settings = snap;
    }

    pub fn set_size(&mut self, size: SizeOptions) {
        self.config.size = size;
        self.update_gizmo_scale();
    }

    /// Enable or disable a mode; handles of disabled modes are never picked.
    pub fn enable(&mut self, mode: Mode, enabled: bool) {
        self.config.enabled.set(mode, enabled);
        if !enabled && self.hovered.and_then(|id| self.handles.get(id)).map(|h| h.mode) == Some(mode) {
            self.hovered = None;
        }
    }

    pub fn set_history_limit(&mut self, limit: usize) {
        self.config.history_limit = limit;
        self.history.set_max_size(limit);
    }

    /// Modifier keys are read on the next drag update.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Recompute the display frame and gizmo size from the current poses.
    pub fn refresh(&mut self, scene: &dyn TargetStore) {
        let poses: Vec<(TargetId, Mat4)> = self
            .targets
            .iter()
            .filter_map(|&id| {
                let pose = scene.world_matrix(id);
                if pose.is_none() {
                    log::debug!("Target {} has no pose, excluded from frame", id);
                }
                pose.map(|m| (id, m))
            })
            .collect();

        let positions: Vec<(TargetId, Vec3)> = poses.iter().map(|(id, m)| (*id, m.translation())).collect();
        let pivot = self.pivot_resolver.resolve(&positions, self.config.pivot).pivot;

        let camera = self.viewport.camera();
        let viewport = &self.viewport;
        let frame = self.frame_builder.build(
            poses.first().map(|(_, m)| m),
            camera.as_ref(),
            |origin| viewport.tangent_frame(origin),
        );
        self.frame = if poses.is_empty() { frame } else { frame.with_origin(pivot) };
        self.update_gizmo_scale();
    }

    fn update_gizmo_scale(&mut self) {
        let size = self.config.size;
        self.gizmo_scale = match self.viewport.camera() {
            Some(camera) => {
                let distance = (self.frame.origin - camera.position).length();
                clamp(
                    camera.pixel_size_at(distance) * size.screen_pixel_radius,
                    size.min_scale,
                    size.max_scale,
                )
            }
            None => size.min_scale,
        };
    }

    // ---------------------------------------------------------------------
    // Pointer events
    // ---------------------------------------------------------------------

    /// Pointer moved: updates the active drag, or the hover highlight.
    pub fn on_pointer_move(&mut self, screen: Vec2, scene: &mut dyn TargetStore) -> EventResponse {
        if self.session.is_some() {
            return self.update_drag(screen, scene);
        }

        self.refresh(scene);
        let hovered = HandlePicker::pick(&self.picker, screen, &self.handles, &self.config.enabled);
        if hovered != self.hovered {
            self.hovered = hovered;
            self.viewport.request_redraw();
        }
        EventResponse::Hovered(hovered)
    }

    /// Pointer pressed: starts a drag on the best handle under the pointer.
    pub fn on_pointer_down(&mut self, screen: Vec2, scene: &mut dyn TargetStore) -> EventResponse {
        if self.session.is_some() {
            return EventResponse::Ignored;
        }
        match HandlePicker::pick(&self.picker, screen, &self.handles, &self.config.enabled) {
            Some(id) => self.begin_drag(id, screen, scene),
            None => EventResponse::Ignored,
        }
    }

    /// Pointer released: commits the active drag.
    pub fn on_pointer_up(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        if self.session.is_some() {
            self.commit(scene)
        } else {
            EventResponse::Ignored
        }
    }

    /// Start a drag on a specific handle without picking, e.g. from a
    /// keyboard shortcut. Fails if the handle's mode is disabled.
    pub fn begin_with_handle(
        &mut self,
        id: HandleId,
        screen: Vec2,
        scene: &mut dyn TargetStore,
    ) -> Result<EventResponse> {
        if self.session.is_some() {
            return Ok(EventResponse::Ignored);
        }
        let Some(handle) = self.handles.get(id) else {
            return Ok(EventResponse::Ignored);
        };
        if !self.config.enabled.contains(handle.mode) {
            return Err(ManipulatorError::ModeDisabled(handle.mode));
        }
        Ok(self.begin_drag(id, screen, scene))
    }

    fn begin_drag(&mut self, id: HandleId, screen: Vec2, scene: &mut dyn TargetStore) -> EventResponse {
        let Some(handle) = self.handles.get(id).copied() else {
            return EventResponse::Ignored;
        };
        let Some(start_ray) = self.viewport.ray_at(screen) else {
            log::debug!("No pick ray at {:?}", screen);
            return EventResponse::Ignored;
        };
        let Some(camera) = self.viewport.camera() else {
            log::warn!("Viewport lost its camera, drag not started");
            return EventResponse::Ignored;
        };

        let mut order = Vec::with_capacity(self.targets.len());
        let mut snapshots = HashMap::with_capacity(self.targets.len());
        for &target in &self.targets {
            match scene.world_matrix(target) {
                Some(matrix) if matrix.is_finite() => {
                    order.push(target);
                    snapshots.insert(target, TargetSnapshot {
                        matrix,
                        trs: Transform::from_matrix(&matrix),
                    });
                }
                _ => log::warn!("Target {} has no resolvable pose, excluded from drag", target),
            }
        }
        if order.is_empty() {
            return EventResponse::Ignored;
        }

        let positions: Vec<(TargetId, Vec3)> = order
            .iter()
            .map(|id| (*id, snapshots[id].trs.translation))
            .collect();
        let pivots = self.pivot_resolver.resolve(&positions, self.config.pivot);

        let viewport = &self.viewport;
        let frame = self
            .frame_builder
            .build(Some(&snapshots[&order[0]].matrix), Some(&camera), |origin| viewport.tangent_frame(origin))
            .with_origin(pivots.pivot);

        let ctx = SolveContext {
            axes: frame.axes,
            pivot: pivots.pivot,
            camera,
            start_ray,
        };
        let state = OperationState::begin(handle.operation(), &ctx);

        self.camera_lock.lock(&mut self.viewport);
        self.frame = frame;
        self.update_gizmo_scale();
        self.hovered = Some(id);
        self.readout = Some(Readout::from_delta(&state, &state.neutral()));
        log::debug!("Begin {} drag on {} target(s)", handle.id, order.len());

        self.session = Some(DragSession {
            handle,
            start_ray,
            pivots,
            order,
            snapshots,
            state,
            buffer: TypedBuffer::default(),
        });
        self.viewport.request_redraw();
        EventResponse::Started(id)
    }

    fn update_drag(&mut self, screen: Vec2, scene: &mut dyn TargetStore) -> EventResponse {
        let Some(ray) = self.viewport.ray_at(screen) else {
            return EventResponse::Ignored;
        };
        let Some(session) = self.session.as_ref() else {
            return EventResponse::Ignored;
        };

        let raw = session.state.update(&ray);
        let delta = session.state.snap(raw, &self.snapper, self.modifiers);
        self.apply(delta, scene);
        EventResponse::Updated
    }

    /// Write `delta` (relative to the drag start) to every target.
    fn apply(&mut self, delta: Delta, scene: &mut dyn TargetStore) {
        let Some(session) = self.session.as_ref() else {
            return;
        };

        for id in &session.order {
            let snapshot = &session.snapshots[id];
            let matrix = if delta.is_neutral() {
                snapshot.matrix
            } else {
                apply_delta(&snapshot.trs, session.pivots.for_target(*id), &delta).to_matrix()
            };
            if !scene.set_world_matrix(*id, matrix) {
                log::warn!("Target {} disappeared during drag", id);
            }
        }

        self.readout = Some(Readout::from_delta(&session.state, &delta));
        self.refresh(scene);
        self.viewport.request_redraw();
    }

    fn commit(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        let Some(session) = self.session.take() else {
            return EventResponse::Ignored;
        };

        let tolerance = self.config.change_tolerance;
        let mut changed = false;
        let mut items = Vec::with_capacity(session.order.len());
        for id in &session.order {
            let before = session.snapshots[id].matrix;
            let Some(after) = scene.world_matrix(*id) else {
                log::warn!("Target {} disappeared before commit", id);
                continue;
            };
            changed |= after.max_abs_diff(&before) > tolerance;
            items.push(HistoryItem { target: *id, before, after });
        }

        if changed {
            self.history.push(HistoryEntry::new(session.handle.id.to_string(), items));
            log::debug!("Committed {} drag", session.handle.id);
        } else {
            log::debug!("{} drag made no change", session.handle.id);
        }

        self.end_session(scene);
        EventResponse::Committed
    }

    /// Abort the active drag, restoring every target's start matrix.
    pub fn cancel(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        let Some(session) = self.session.take() else {
            return EventResponse::Ignored;
        };

        for id in &session.order {
            if !scene.set_world_matrix(*id, session.snapshots[id].matrix) {
                log::warn!("Target {} disappeared before cancel", id);
            }
        }
        log::debug!("Cancelled {} drag", session.handle.id);

        self.end_session(scene);
        EventResponse::Cancelled
    }

    fn end_session(&mut self, scene: &dyn TargetStore) {
        self.camera_lock.unlock(&mut self.viewport);
        self.readout = None;
        self.refresh(scene);
        self.viewport.request_redraw();
    }

    // ---------------------------------------------------------------------
    // Keyboard
    // ---------------------------------------------------------------------

    pub fn on_key(&mut self, key: KeyEvent, scene: &mut dyn TargetStore) -> EventResponse {
        match key {
            KeyEvent::Undo => self.undo(scene),
            KeyEvent::Redo => self.redo(scene),
            KeyEvent::Escape => self.cancel(scene),
            KeyEvent::Char(c) => match self.session.as_mut() {
                Some(session) if !c.is_control() => {
                    session.buffer.push(c);
                    EventResponse::Buffered
                }
                _ => EventResponse::Ignored,
            },
            KeyEvent::Backspace => match self.session.as_mut() {
                Some(session) => {
                    session.buffer.backspace();
                    EventResponse::Buffered
                }
                None => EventResponse::Ignored,
            },
            KeyEvent::Enter => self.submit_typed(scene),
        }
    }

    /// Apply the typed value exactly and finish the drag.
    fn submit_typed(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        let Some(session) = self.session.as_ref() else {
            return EventResponse::Ignored;
        };

        let channel = InputChannel::for_operation(session.handle.operation());
        let text = session.buffer.as_str();
        let delta = match input::parse(channel, text) {
            Ok(value) => session.state.typed_delta(value),
            Err(err) => {
                log::warn!("Rejected typed input {:?}: {}", text, err);
                return EventResponse::Rejected;
            }
        };
        let Some(delta) = delta else {
            log::warn!("Typed input {:?} does not fit {:?}", text, channel);
            return EventResponse::Rejected;
        };

        self.apply(delta, scene);
        self.commit(scene)
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    /// Restore the `before` matrices of the last committed drag.
    pub fn undo(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        if self.session.is_some() {
            return EventResponse::Ignored;
        }
        let Some(entry) = self.history.pop_undo() else {
            return EventResponse::Ignored;
        };
        entry.restore_before(scene);
        log::debug!("Undo {}", entry.description);
        self.history.push_to_redo(entry);
        self.refresh(scene);
        self.viewport.request_redraw();
        EventResponse::Undone
    }

    /// Re-apply the `after` matrices of the last undone drag.
    pub fn redo(&mut self, scene: &mut dyn TargetStore) -> EventResponse {
        if self.session.is_some() {
            return EventResponse::Ignored;
        }
        let Some(entry) = self.history.pop_redo() else {
            return EventResponse::Ignored;
        };
        entry.restore_after(scene);
        log::debug!("Redo {}", entry.description);
        self.history.push_to_undo(entry);
        self.refresh(scene);
        self.viewport.request_redraw();
        EventResponse::Redone
    }

    /// Ray that started the active drag
    pub fn drag_start_ray(&self) -> Option<Ray> {
        self.session.as_ref().map(|s| s.start_ray)
    }
}
