//! Integration tests for the manipulator controller
//!
//! Drives full drags through a pinhole viewport looking down -Z and checks
//! target poses, history and camera locking.

use manipulator::manip_math::consts::FRAC_PI_2;
use manipulator::manip_math::{Mat4, Quat, Transform, Vec2, Vec3};
use manipulator::*;

const EPS: f64 = 1e-9;

/// Picking backend that reports a fixed handle everywhere.
struct FixedPicker {
    handle: Option<HandleId>,
    overlaps: Vec<HandleId>,
}

impl FixedPicker {
    fn new(id: &'static str) -> Self {
        Self {
            handle: Some(HandleId(id)),
            overlaps: Vec::new(),
        }
    }
}

impl PickingBackend for FixedPicker {
    fn pick(&self, _screen: Vec2) -> Option<HandleId> {
        self.handle
    }

    fn pick_all(&self, _screen: Vec2) -> Vec<HandleId> {
        self.overlaps.clone()
    }
}

type Controller = ManipulatorController<PerspectiveViewport, FixedPicker>;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup(handle: &'static str, targets: &[(u64, Vec3)]) -> (Controller, SceneTargets) {
    init_logger();
    let camera = CameraState::look_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y);
    let viewport = PerspectiveViewport::new(camera, 800.0, 600.0);
    let mut controller =
        ManipulatorController::new(viewport, FixedPicker::new(handle), ManipulatorConfig::default()).unwrap();

    let mut scene = SceneTargets::new();
    for &(id, position) in targets {
        scene.insert(TargetId(id), Mat4::from_translation(position));
    }
    assert!(controller.set_targets(targets.iter().map(|(id, _)| TargetId(*id)).collect(), &scene));
    (controller, scene)
}

fn screen_of(controller: &Controller, point: Vec3) -> Vec2 {
    controller.viewport().world_to_screen(point).unwrap()
}

fn position(scene: &SceneTargets, id: u64) -> Vec3 {
    scene.get(TargetId(id)).unwrap().translation()
}

fn drag(controller: &mut Controller, scene: &mut SceneTargets, from: Vec3, to: Vec3) {
    let down = screen_of(controller, from);
    let up = screen_of(controller, to);
    assert!(matches!(controller.on_pointer_down(down, scene), EventResponse::Started(_)));
    assert_eq!(controller.on_pointer_move(up, scene), EventResponse::Updated);
    assert_eq!(controller.on_pointer_up(scene), EventResponse::Committed);
}

#[test]
fn test_translate_drag_follows_pointer() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);

    let start = screen_of(&controller, Vec3::ZERO);
    assert_eq!(
        controller.on_pointer_down(start, &mut scene),
        EventResponse::Started(HandleId("translate-x"))
    );
    assert!(controller.is_dragging());
    assert_eq!(controller.viewport().navigation, NavigationFlags::NONE);

    let target = screen_of(&controller, Vec3::new(2.0, 0.0, 0.0));
    controller.on_pointer_move(target, &mut scene);
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), EPS));
    match controller.readout() {
        Some(Readout::Distance(d)) => assert!((d - 2.0).abs() < EPS),
        other => panic!("unexpected readout {other:?}"),
    }

    controller.on_pointer_up(&mut scene);
    assert!(!controller.is_dragging());
    assert_eq!(controller.viewport().navigation, NavigationFlags::ALL);
    assert_eq!(controller.undo_count(), 1);
    assert!(controller.readout().is_none());
}

#[test]
fn test_updates_are_absolute() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);

    let start = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(start, &mut scene);
    for x in [2.0, 3.0, 1.0] {
        let p = screen_of(&controller, Vec3::new(x, 0.0, 0.0));
        controller.on_pointer_move(p, &mut scene);
    }
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));

    // Back to the start point returns the exact start pose
    controller.on_pointer_move(start, &mut scene);
    assert!(position(&scene, 1).abs_diff_eq(Vec3::ZERO, EPS));
}

#[test]
fn test_cancel_restores_exact_matrix() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    let original = Mat4::from_trs(
        Vec3::new(0.25, -0.5, 0.0),
        Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0), 0.7),
        Vec3::new(1.5, 0.5, 2.0),
    );
    scene.insert(TargetId(1), original);

    let down = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(down, &mut scene);
    let moved = screen_of(&controller, Vec3::new(3.0, 0.0, 0.0));
    controller.on_pointer_move(moved, &mut scene);
    assert_ne!(*scene.get(TargetId(1)).unwrap(), original);

    assert_eq!(controller.on_key(KeyEvent::Escape, &mut scene), EventResponse::Cancelled);
    assert_eq!(*scene.get(TargetId(1)).unwrap(), original);
    assert_eq!(controller.undo_count(), 0);
    assert_eq!(controller.viewport().navigation, NavigationFlags::ALL);
}

#[test]
fn test_undo_redo_round_trip() {
    let (mut controller, mut scene) = setup("translate-y", &[(1, Vec3::new(1.0, 0.0, 0.0))]);
    let before = *scene.get(TargetId(1)).unwrap();

    drag(&mut controller, &mut scene, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.5, 0.0));
    let after = *scene.get(TargetId(1)).unwrap();
    assert!(after.translation().abs_diff_eq(Vec3::new(1.0, 2.5, 0.0), EPS));

    assert_eq!(controller.undo(&mut scene), EventResponse::Undone);
    assert!(scene.get(TargetId(1)).unwrap().abs_diff_eq(&before, EPS));
    assert!(controller.can_redo());

    assert_eq!(controller.on_key(KeyEvent::Redo, &mut scene), EventResponse::Redone);
    assert!(scene.get(TargetId(1)).unwrap().abs_diff_eq(&after, EPS));

    assert_eq!(controller.undo(&mut scene), EventResponse::Undone);
    assert!(scene.get(TargetId(1)).unwrap().abs_diff_eq(&before, EPS));

    // Nothing left to undo
    assert_eq!(controller.undo(&mut scene), EventResponse::Ignored);
}

#[test]
fn test_new_drag_clears_redo() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
    controller.undo(&mut scene);
    assert_eq!(controller.redo_count(), 1);

    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(controller.redo_count(), 0);
    assert_eq!(controller.undo_count(), 1);
}

#[test]
fn test_click_without_move_records_nothing() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    let down = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(down, &mut scene);
    assert_eq!(controller.on_pointer_up(&mut scene), EventResponse::Committed);
    assert_eq!(controller.undo_count(), 0);
}

#[test]
fn test_rotate_about_median() {
    let (mut controller, mut scene) = setup(
        "rotate-z",
        &[(1, Vec3::new(1.0, 0.0, 0.0)), (2, Vec3::new(-1.0, 0.0, 0.0))],
    );

    drag(&mut controller, &mut scene, Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));

    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), EPS));
    assert!(position(&scene, 2).abs_diff_eq(Vec3::new(0.0, -1.0, 0.0), EPS));
    let rotation = scene.transform(TargetId(1)).unwrap().rotation;
    assert!(rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), EPS));
}

#[test]
fn test_rotate_individual_keeps_positions() {
    let (mut controller, mut scene) = setup(
        "rotate-z",
        &[(1, Vec3::new(1.0, 0.0, 0.0)), (2, Vec3::new(-1.0, 0.0, 0.0))],
    );
    assert!(controller.set_pivot(PivotMode::Individual, &scene));

    // The drag circle is centred on the first target
    drag(&mut controller, &mut scene, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0));

    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
    assert!(position(&scene, 2).abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), EPS));
    for id in [1, 2] {
        let rotation = scene.transform(TargetId(id)).unwrap().rotation;
        assert!(rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_2), EPS));
    }
}

#[test]
fn test_axis_scale_drag() {
    let (mut controller, mut scene) = setup("scale-x", &[(1, Vec3::ZERO)]);

    drag(&mut controller, &mut scene, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));

    let t = scene.transform(TargetId(1)).unwrap();
    assert!(t.scale.abs_diff_eq(Vec3::new(2.0, 1.0, 1.0), EPS));
    assert!(t.translation.abs_diff_eq(Vec3::ZERO, EPS));
}

#[test]
fn test_snap_modifier_quantizes_translation() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    controller.set_modifiers(Modifiers::SNAP);

    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(1.3, 0.0, 0.0));
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), EPS));
}

#[test]
fn test_typed_distance_commits_exactly() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    controller.set_modifiers(Modifiers::SNAP);

    let down = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(down, &mut scene);
    let moved = screen_of(&controller, Vec3::new(3.0, 0.0, 0.0));
    controller.on_pointer_move(moved, &mut scene);

    for c in "5cm".chars() {
        assert_eq!(controller.on_key(KeyEvent::Char(c), &mut scene), EventResponse::Buffered);
    }
    assert_eq!(controller.typed_text(), Some("5cm"));
    assert_eq!(controller.on_key(KeyEvent::Enter, &mut scene), EventResponse::Committed);

    // Typed values bypass snapping
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(0.05, 0.0, 0.0), EPS));
    assert_eq!(controller.undo_count(), 1);
    assert!(!controller.is_dragging());
}

#[test]
fn test_typed_angle_and_scale() {
    let (mut controller, mut scene) = setup("rotate-z", &[(1, Vec3::new(1.0, 0.0, 0.0))]);
    assert!(controller.set_pivot(PivotMode::Cursor, &scene));
    controller.set_cursor(Some(Vec3::ZERO), &scene);

    let down = screen_of(&controller, Vec3::new(2.0, 0.0, 0.0));
    controller.on_pointer_down(down, &mut scene);
    "90".chars().for_each(|c| {
        controller.on_key(KeyEvent::Char(c), &mut scene);
    });
    controller.on_key(KeyEvent::Enter, &mut scene);
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), EPS));

    let (mut controller, mut scene) = setup("scale-uniform", &[(1, Vec3::ZERO)]);
    let down = screen_of(&controller, Vec3::new(1.0, 0.0, 0.0));
    controller.on_pointer_down(down, &mut scene);
    "150%".chars().for_each(|c| {
        controller.on_key(KeyEvent::Char(c), &mut scene);
    });
    assert_eq!(controller.on_key(KeyEvent::Enter, &mut scene), EventResponse::Committed);
    let t = scene.transform(TargetId(1)).unwrap();
    assert!(t.scale.abs_diff_eq(Vec3::splat(1.5), EPS));
}

#[test]
fn test_invalid_typed_input_is_rejected() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    let down = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(down, &mut scene);

    for c in "abc".chars() {
        controller.on_key(KeyEvent::Char(c), &mut scene);
    }
    assert_eq!(controller.on_key(KeyEvent::Enter, &mut scene), EventResponse::Rejected);
    assert!(controller.is_dragging());
    assert_eq!(controller.typed_text(), Some("abc"));
    assert!(position(&scene, 1).abs_diff_eq(Vec3::ZERO, EPS));

    controller.on_key(KeyEvent::Backspace, &mut scene);
    assert_eq!(controller.typed_text(), Some("ab"));
    assert_eq!(controller.on_key(KeyEvent::Escape, &mut scene), EventResponse::Cancelled);
}

#[test]
fn test_press_and_undo_ignored_while_dragging() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));

    let down = screen_of(&controller, Vec3::new(1.0, 0.0, 0.0));
    controller.on_pointer_down(down, &mut scene);
    assert_eq!(controller.on_pointer_down(down, &mut scene), EventResponse::Ignored);
    assert_eq!(controller.on_key(KeyEvent::Undo, &mut scene), EventResponse::Ignored);
    assert!(!controller.can_undo());
    assert_eq!(controller.active_handle(), Some(HandleId("translate-x")));

    controller.cancel(&mut scene);
    assert!(controller.can_undo());
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
}

#[test]
fn test_disabled_mode_is_not_picked() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    controller.enable(Mode::Translate, false);

    let screen = screen_of(&controller, Vec3::ZERO);
    assert_eq!(controller.on_pointer_move(screen, &mut scene), EventResponse::Hovered(None));
    assert_eq!(controller.on_pointer_down(screen, &mut scene), EventResponse::Ignored);
    assert!(matches!(
        controller.begin_with_handle(HandleId("translate-x"), screen, &mut scene),
        Err(ManipulatorError::ModeDisabled(Mode::Translate))
    ));
}

#[test]
fn test_overlapping_hits_prefer_axis() {
    let (mut controller, mut scene) = setup("scale-uniform", &[(1, Vec3::ZERO)]);
    controller.picker_mut().overlaps = vec![HandleId("scale-uniform"), HandleId("translate-xy"), HandleId("scale-x")];

    let screen = screen_of(&controller, Vec3::ZERO);
    assert_eq!(
        controller.on_pointer_move(screen, &mut scene),
        EventResponse::Hovered(Some(HandleId("scale-x")))
    );
    assert_eq!(controller.hovered(), Some(HandleId("scale-x")));
}

#[test]
fn test_unresolvable_target_is_excluded() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    assert!(controller.set_targets(vec![TargetId(1), TargetId(99)], &scene));

    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS));
    assert!(!scene.contains(TargetId(99)));
}

#[test]
fn test_targets_locked_while_dragging() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    let down = screen_of(&controller, Vec3::ZERO);
    controller.on_pointer_down(down, &mut scene);

    assert!(!controller.set_targets(Vec::new(), &scene));
    assert!(!controller.set_orientation(OrientationMode::View, &scene));
    assert_eq!(controller.targets(), &[TargetId(1)]);
}

#[test]
fn test_setters_update_display_frame() {
    let (mut controller, mut scene) = setup("translate-x", &[]);
    scene.insert_transform(
        TargetId(1),
        Transform::new(Vec3::new(5.0, 0.0, 0.0), Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE),
    );
    scene.insert(TargetId(2), Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));

    assert!(controller.set_targets(vec![TargetId(1)], &scene));
    assert!(controller.frame().origin.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS));
    assert!(controller.frame().x().abs_diff_eq(Vec3::X, EPS));
    let camera = controller.viewport().camera;
    let distance = (Vec3::new(5.0, 0.0, 0.0) - camera.position).length();
    let expected = camera.pixel_size_at(distance) * controller.config().size.screen_pixel_radius;
    assert!((controller.gizmo_scale() - expected).abs() < EPS);

    assert!(controller.set_orientation(OrientationMode::Local, &scene));
    assert!(controller.frame().x().abs_diff_eq(Vec3::Y, EPS));
    assert!(controller.frame().is_orthonormal(EPS));

    assert!(controller.set_targets(vec![TargetId(1), TargetId(2)], &scene));
    assert!(controller.frame().origin.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPS));

    assert!(controller.set_pivot(PivotMode::Origin, &scene));
    assert!(controller.frame().origin.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), EPS));

    // Cursor mode falls back to the median until a cursor is placed
    assert!(controller.set_pivot(PivotMode::Cursor, &scene));
    assert!(controller.frame().origin.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), EPS));
    controller.set_cursor(Some(Vec3::new(0.0, 4.0, 0.0)), &scene);
    assert!(controller.frame().origin.abs_diff_eq(Vec3::new(0.0, 4.0, 0.0), EPS));

    assert!(controller.set_orientation(OrientationMode::Normal, &scene));
    controller.set_reference_normal(Some(Vec3::X), &scene);
    assert!(controller.frame().z().abs_diff_eq(Vec3::X, EPS));

    assert!(controller.set_orientation(OrientationMode::Gimbal, &scene));
    assert!(controller.frame().x().abs_diff_eq(Vec3::X, EPS));
    controller.set_gimbal(GimbalAngles { yaw: FRAC_PI_2, pitch: 0.0 }, &scene);
    assert!(controller.frame().x().abs_diff_eq(Vec3::Z, EPS));
}

#[test]
fn test_local_axis_drag_moves_along_rotated_axis() {
    let (mut controller, mut scene) = setup("translate-x", &[(1, Vec3::ZERO)]);
    scene.insert_transform(
        TargetId(1),
        Transform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE),
    );
    assert!(controller.set_orientation(OrientationMode::Local, &scene));

    // Local X points along world Y; sideways pointer motion is ignored
    drag(&mut controller, &mut scene, Vec3::ZERO, Vec3::new(0.7, 2.0, 0.0));
    assert!(position(&scene, 1).abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), EPS));
}

#[test]
fn test_config_json_round_trip() {
    let mut config = ManipulatorConfig::default();
    config.orientation = OrientationMode::TangentPlane;
    config.pivot = PivotMode::Cursor;
    config.enabled.scale = false;

    let json = serde_json::to_string(&config).unwrap();
    let back: ManipulatorConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
