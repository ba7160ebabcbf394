//! Invariant tests for pedestal_interact
//!
//! These drive a full session through the headless scene and a scripted
//! tracker, checking the guarantees the interaction engine must keep.

use std::path::Path;
use std::time::Duration;

use approx::assert_relative_eq;
use pedestal_input::{TouchEvent, TouchPoint};
use pedestal_interact::animation::{EASING, EPSILON, TICK};
use pedestal_interact::headless::SceneCall;
use pedestal_interact::prelude::*;
use pedestal_math::{Mat4, Vec2, Vec3, AABB};
use pedestal_xr::ScriptedTracker;

type TestSession = Session<HeadlessScene, ScriptedTracker>;

/// Screen center of the headless camera viewport
const CENTER: Vec2 = Vec2::new(540.0, 960.0);

/// Surface point straight ahead of the camera
const SURFACE: Vec3 = Vec3::new(0.0, -0.25, -3.0);

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

fn pt(id: u64, x: f32, y: f32) -> TouchPoint {
    TouchPoint::new(id, Vec2::new(x, y))
}

fn session() -> TestSession {
    let config = SessionConfig::default()
        .with_model("chair", "models/chair.glb")
        .with_model("lamp", "models/lamp.glb");
    Session::new(config, HeadlessScene::new(), ScriptedTracker::new()).unwrap()
}

fn load(s: &mut TestSession, model: &str) {
    s.choose_model(model).unwrap();
    let template = s.scene_mut().load_template(Path::new("model.glb")).unwrap();
    s.finish_load(model, Ok(template)).unwrap();
}

fn show_surface(s: &mut TestSession, at: Vec3) {
    s.tracker_mut().set_hit(Some(Mat4::from_translation(at)));
    s.on_frame();
}

/// Place a chair in front of the camera and let it finish growing
fn place_ready(s: &mut TestSession) -> InstanceId {
    load(s, "chair");
    show_surface(s, SURFACE);
    let id = s.request_placement().unwrap();
    s.advance(Duration::from_secs(2));
    id
}

fn tap(s: &mut TestSession, at: Vec2, released: Vec2, start: Duration, held: Duration) -> Option<TapOutcome> {
    let down = TouchPoint::new(1, at);
    let up = TouchPoint::new(1, released);
    s.on_touch(&TouchEvent::start(vec![down], vec![down], start));
    s.on_touch(&TouchEvent::end(vec![], vec![up], start + held))
}

fn set_transform_calls(s: &TestSession) -> usize {
    s.scene()
        .count_calls(|c| matches!(c, SceneCall::SetTransform { .. }))
}

/// INVARIANT: Nothing is mutated by a touch-move while nothing is selected
#[test]
fn invariant_move_without_selection_mutates_nothing() {
    let mut s = session();
    let id = place_ready(&mut s);
    assert_eq!(
        tap(&mut s, Vec2::new(10.0, 10.0), Vec2::new(10.0, 10.0), ms(5000), ms(50)),
        Some(TapOutcome::Deselected)
    );
    assert_eq!(s.selected(), None);

    let before = s.instance(id).unwrap().transform;
    s.scene_mut().clear_calls();

    // One finger drag
    s.on_touch(&TouchEvent::start(vec![pt(1, 540.0, 960.0)], vec![pt(1, 540.0, 960.0)], ms(6000)));
    s.on_touch(&TouchEvent::moved(vec![pt(1, 700.0, 1200.0)], ms(6100)));
    // Two finger pinch
    let (a, b) = (pt(1, 700.0, 1200.0), pt(2, 800.0, 1200.0));
    s.on_touch(&TouchEvent::start(vec![a, b], vec![b], ms(6200)));
    s.on_touch(&TouchEvent::moved(vec![pt(1, 600.0, 1100.0), pt(2, 900.0, 1300.0)], ms(6300)));
    // Three finger lift
    let c = pt(3, 900.0, 1200.0);
    s.on_touch(&TouchEvent::start(vec![a, b, c], vec![c], ms(6400)));
    s.on_touch(&TouchEvent::moved(vec![pt(1, 700.0, 800.0), b, c], ms(6500)));

    assert_eq!(s.instance(id).unwrap().transform, before);
    assert_eq!(set_transform_calls(&s), 0);
    assert_eq!(s.gesture_mode(), &GestureMode::Idle);
}

/// INVARIANT: A second finger supersedes an in-flight single-finger drag
#[test]
fn invariant_pinch_supersedes_drag() {
    let mut s = session();
    let id = place_ready(&mut s);
    let start = s.instance(id).unwrap().transform;

    let a = pt(1, 500.0, 900.0);
    let b = pt(2, 600.0, 900.0);
    s.on_touch(&TouchEvent::start(vec![a], vec![a], ms(3000)));
    s.on_touch(&TouchEvent::start(vec![a, b], vec![b], ms(3010)));
    assert!(matches!(s.gesture_mode(), GestureMode::PinchScaleRotate(_)));

    // Both fingers slide right together: no translation, only pinch logic
    s.on_touch(&TouchEvent::moved(vec![pt(1, 550.0, 900.0), pt(2, 650.0, 900.0)], ms(3020)));
    let during = s.instance(id).unwrap().transform;
    assert_eq!(during.position, start.position);
    assert_relative_eq!(during.scale, start.scale, epsilon = 1e-6);

    // Lifting the first finger hands over to a drag at the second finger
    let out = s.on_touch(&TouchEvent::end(vec![pt(2, 650.0, 900.0)], vec![pt(1, 550.0, 900.0)], ms(3030)));
    assert_eq!(out, None);
    s.on_touch(&TouchEvent::moved(vec![pt(2, 660.0, 900.0)], ms(3040)));
    let after = s.instance(id).unwrap().transform;
    assert!(after.position.x > start.position.x);
    // Only the 10 px since the handover were applied
    let distance = start.position.length();
    let expected = 10.0 * 0.0015 * distance / 5.0;
    assert_relative_eq!(after.position.x - start.position.x, expected, epsilon = 1e-4);
}

/// INVARIANT: Pinch scaling by k then by 1/k restores the scale
#[test]
fn invariant_pinch_scale_is_reversible() {
    let mut s = session();
    let id = place_ready(&mut s);
    let original = s.instance(id).unwrap().transform.scale;

    let pinch = |s: &mut TestSession, from: f32, to: f32, t: u64| {
        let (a, b) = (pt(1, 540.0 - from / 2.0, 960.0), pt(2, 540.0 + from / 2.0, 960.0));
        s.on_touch(&TouchEvent::start(vec![a], vec![a], ms(t)));
        s.on_touch(&TouchEvent::start(vec![a, b], vec![b], ms(t + 5)));
        let (a2, b2) = (pt(1, 540.0 - to / 2.0, 960.0), pt(2, 540.0 + to / 2.0, 960.0));
        s.on_touch(&TouchEvent::moved(vec![a2, b2], ms(t + 50)));
        s.on_touch(&TouchEvent::end(vec![b2], vec![a2], ms(t + 60)));
        s.on_touch(&TouchEvent::end(vec![], vec![b2], ms(t + 70)));
    };

    pinch(&mut s, 100.0, 250.0, 4000);
    assert_relative_eq!(s.instance(id).unwrap().transform.scale, original * 2.5, epsilon = 1e-5);

    pinch(&mut s, 250.0, 100.0, 5000);
    assert_relative_eq!(s.instance(id).unwrap().transform.scale, original, epsilon = 1e-5);
    assert_eq!(s.selected(), Some(id));
}

/// INVARIANT: Tap classification is strict at 250 ms and 10 px
#[test]
fn invariant_tap_boundary() {
    let mut s = session();
    let id = place_ready(&mut s);

    s.deselect();
    let outcome = tap(&mut s, CENTER, CENTER + Vec2::new(9.0, 0.0), ms(10_000), ms(249));
    assert_eq!(outcome, Some(TapOutcome::Selected(id)));

    s.deselect();
    assert_eq!(tap(&mut s, CENTER, CENTER, ms(11_000), ms(251)), None);
    assert_eq!(s.selected(), None);

    assert_eq!(tap(&mut s, CENTER, CENTER + Vec2::new(0.0, 11.0), ms(12_000), ms(100)), None);
    assert_eq!(s.selected(), None);
}

/// INVARIANT: Deleting the selection hides its UI and neutralizes gestures
#[test]
fn invariant_delete_neutralizes_selection_and_gestures() {
    let mut s = session();
    let id = place_ready(&mut s);
    let highlight = s.selection().highlight().unwrap();

    let a = pt(1, 540.0, 960.0);
    s.on_touch(&TouchEvent::start(vec![a], vec![a], ms(3000)));
    assert_eq!(s.request_deletion().unwrap(), id);

    assert_eq!(s.selected(), None);
    assert!(!s.delete_visible());
    assert!(!s.scene().highlight_state(highlight).unwrap().visible);
    assert!(s.instance(id).is_none());
    assert!(!s.scene().is_alive(id));
    assert!(s.drain_events().contains(&SessionEvent::Deleted(id)));

    s.scene_mut().clear_calls();
    s.on_touch(&TouchEvent::moved(vec![pt(1, 700.0, 1100.0)], ms(3050)));
    assert_eq!(set_transform_calls(&s), 0);
    assert_eq!(s.gesture_mode(), &GestureMode::Idle);
    assert!(matches!(s.request_deletion(), Err(InteractError::NothingSelected)));
}

/// INVARIANT: Tapping empty space deselects; tapping the instance again
/// reselects it with a freshly fitted, visible highlight
#[test]
fn invariant_tap_deselects_and_reselects() {
    let mut s = session();
    let id = place_ready(&mut s);
    let highlight = s.selection().highlight().unwrap();

    assert_eq!(
        tap(&mut s, Vec2::new(20.0, 1900.0), Vec2::new(20.0, 1900.0), ms(3000), ms(80)),
        Some(TapOutcome::Deselected)
    );
    assert!(!s.scene().highlight_state(highlight).unwrap().visible);

    s.scene_mut().clear_calls();
    assert_eq!(
        tap(&mut s, CENTER, CENTER, ms(4000), ms(80)),
        Some(TapOutcome::Selected(id))
    );
    let state = s.scene().highlight_state(highlight).unwrap();
    assert!(state.visible);
    assert_eq!(state.fitted_to, Some(id));
    assert!(!state.bounds.is_empty());
    assert_eq!(
        s.scene().count_calls(|c| matches!(c, SceneCall::FitHighlight { node, .. } if *node == id)),
        1
    );
    assert_eq!(s.scene().count_calls(|c| matches!(c, SceneCall::CreateHighlight(_))), 0);
    assert_eq!(s.selection().highlight(), Some(highlight));
}

/// INVARIANT: Placement selects the new instance and eases it to base scale
#[test]
fn invariant_placement_grows_to_base_scale() {
    let mut s = session();
    load(&mut s, "chair");
    show_surface(&mut s, SURFACE);

    let id = s.request_placement().unwrap();
    assert_eq!(s.selected(), Some(id));
    assert!(s.delete_visible());
    let placed = s.instance(id).unwrap().transform;
    assert_relative_eq!(placed.scale, 0.5 * 0.001);
    assert!((placed.position - SURFACE).length() < 1e-5);

    let mut previous = placed.scale;
    let mut now = Duration::ZERO;
    while s.is_animating(id) {
        now += TICK;
        s.advance(now);
        let scale = s.instance(id).unwrap().transform.scale;
        if s.is_animating(id) {
            assert_relative_eq!(scale, previous + (0.5 - previous) * EASING, epsilon = 1e-6);
            assert!(0.5 - scale >= EPSILON);
        } else {
            assert_eq!(scale, 0.5);
        }
        previous = scale;
        assert!(now < Duration::from_secs(2));
    }
    assert_eq!(s.instance(id).unwrap().transform.scale, 0.5);
    assert_eq!(s.scene().transform(id).unwrap().scale, 0.5);
}

/// INVARIANT: Placement requires a surface, a chosen model and a loaded asset
#[test]
fn invariant_placement_preconditions() {
    let mut s = session();
    assert!(matches!(s.request_placement(), Err(InteractError::SurfaceNotFound)));

    show_surface(&mut s, SURFACE);
    assert!(matches!(s.request_placement(), Err(InteractError::NoModelChosen)));
    assert!(matches!(s.choose_model("sofa"), Err(InteractError::UnknownModel(_))));

    s.drain_events();
    s.choose_model("chair").unwrap();
    let events = s.drain_events();
    assert!(events.contains(&SessionEvent::LoadRequested("chair".into())));
    assert!(events.contains(&SessionEvent::ModelStatus {
        model: "chair".into(),
        status: ModelStatus::Loading,
    }));
    assert_eq!(s.instruction(), Some(&Instruction::Loading("chair".into())));

    assert!(matches!(s.request_placement(), Err(InteractError::AssetNotReady(_))));
    assert_eq!(s.instances().count(), 0);
}

/// INVARIANT: A failed model stays failed until explicitly retried
#[test]
fn invariant_failed_asset_needs_retry() {
    let mut s = session();
    show_surface(&mut s, SURFACE);
    s.choose_model("lamp").unwrap();
    s.finish_load("lamp", Err("truncated file".into())).unwrap();
    assert!(s.drain_events().contains(&SessionEvent::ModelStatus {
        model: "lamp".into(),
        status: ModelStatus::Error("truncated file".into()),
    }));

    assert!(matches!(s.request_placement(), Err(InteractError::AssetFailed { .. })));
    assert!(!s
        .drain_events()
        .iter()
        .any(|e| matches!(e, SessionEvent::LoadRequested(_))));

    s.retry_model("lamp").unwrap();
    assert_eq!(s.asset_state("lamp"), Some(&AssetState::Loading));
    assert!(s.drain_events().contains(&SessionEvent::LoadRequested("lamp".into())));

    let template = s.scene_mut().load_template(Path::new("lamp.glb")).unwrap();
    s.finish_load("lamp", Ok(template)).unwrap();
    assert!(s.request_placement().is_ok());
}

/// INVARIANT: Hits outside every placed instance count as empty space
#[test]
fn invariant_orphaned_hit_deselects() {
    let mut s = session();
    let id = place_ready(&mut s);
    let stray = s.scene_mut().attach_node(
        id,
        AABB::from_center_half_extents(Vec3::new(0.0, 0.5, 2.0), Vec3::splat(0.4)),
    );

    let outcome = tap(&mut s, CENTER, CENTER, ms(3000), ms(60));
    assert_eq!(outcome, Some(TapOutcome::Orphaned(stray)));
    assert_eq!(s.selected(), None);
}

/// INVARIANT: Touches on UI ignore regions never become taps or gestures
#[test]
fn invariant_ui_regions_are_ignored() {
    let mut s = session();
    let id = place_ready(&mut s);
    s.deselect();

    let toolbar = s.regions_mut().add(None, true).unwrap();
    let button = s.regions_mut().add(Some(toolbar), false).unwrap();
    let touch = pt(1, CENTER.x, CENTER.y).on(button);
    s.on_touch(&TouchEvent::start(vec![touch], vec![touch], ms(3000)));
    assert_eq!(s.gesture_mode(), &GestureMode::Idle);
    assert_eq!(s.on_touch(&TouchEvent::end(vec![], vec![touch], ms(3050))), None);
    assert_eq!(s.selected(), None);
    assert!(s.instance(id).is_some());
}

/// INVARIANT: Deleting a growing instance cancels its animation
#[test]
fn invariant_delete_cancels_entry_animation() {
    let mut s = session();
    load(&mut s, "chair");
    show_surface(&mut s, SURFACE);
    let id = s.request_placement().unwrap();
    s.advance(ms(48));
    assert!(s.is_animating(id));

    s.delete_instance(id);
    assert!(!s.is_animating(id));
    s.scene_mut().clear_calls();
    s.advance(ms(1000));
    assert_eq!(set_transform_calls(&s), 0);
}

/// INVARIANT: Instruction text follows surface and selection state
#[test]
fn invariant_instruction_tracks_state() {
    let mut s = session();
    assert_eq!(s.instruction(), Some(&Instruction::Scanning));

    load(&mut s, "chair");
    assert_eq!(s.instruction(), Some(&Instruction::Scanning));
    show_surface(&mut s, SURFACE);
    assert_eq!(s.instruction(), Some(&Instruction::ReadyToPlace));

    let id = s.request_placement().unwrap();
    assert_eq!(s.instruction(), Some(&Instruction::Manipulate));

    s.tracker_mut().set_hit(None);
    s.on_frame();
    assert_eq!(s.instruction(), Some(&Instruction::Manipulate));

    s.deselect();
    assert_eq!(s.instruction(), Some(&Instruction::Scanning));
    assert!(s.instance(id).is_some());
}

/// INVARIANT: Shutdown releases every instance and the highlight
#[test]
fn invariant_shutdown_releases_everything() {
    let mut s = session();
    let first = place_ready(&mut s);
    let second = s.request_placement().unwrap();
    let highlight = s.selection().highlight().unwrap();

    s.shutdown();
    assert_eq!(s.instances().count(), 0);
    assert!(s.index().is_empty());
    assert!(!s.scene().is_alive(first));
    assert!(!s.scene().is_alive(second));
    assert_eq!(s.scene().node_count(), 0);
    assert!(s.scene().highlight_state(highlight).is_none());
    assert!(!s.is_animating(second));
}

/// INVARIANT: Selecting another instance mid-pinch re-seeds the pinch from it
#[test]
fn invariant_selection_change_rebaselines_pinch() {
    let mut s = session();
    let first = place_ready(&mut s);
    show_surface(&mut s, Vec3::new(1.0, -0.25, -3.0));
    let second = s.request_placement().unwrap();
    s.advance(Duration::from_secs(4));
    assert_eq!(s.selected(), Some(second));

    let (a, b) = (pt(1, 490.0, 960.0), pt(2, 590.0, 960.0));
    s.on_touch(&TouchEvent::start(vec![a, b], vec![a, b], ms(5000)));
    let spread = vec![pt(1, 440.0, 960.0), pt(2, 640.0, 960.0)];
    s.on_touch(&TouchEvent::moved(spread.clone(), ms(5016)));
    assert_relative_eq!(s.instance(second).unwrap().transform.scale, 1.0, epsilon = 1e-5);

    s.select(first);
    assert_eq!(s.instance(first).unwrap().transform.scale, 0.5);

    // Same finger spread: the new selection keeps its own scale
    s.on_touch(&TouchEvent::moved(spread, ms(5032)));
    assert_relative_eq!(s.instance(first).unwrap().transform.scale, 0.5, epsilon = 1e-5);
    assert_relative_eq!(s.instance(second).unwrap().transform.scale, 1.0, epsilon = 1e-5);

    // Spreading further scales relative to the new baseline
    s.on_touch(&TouchEvent::moved(vec![pt(1, 390.0, 960.0), pt(2, 690.0, 960.0)], ms(5048)));
    assert_relative_eq!(s.instance(first).unwrap().transform.scale, 0.75, epsilon = 1e-5);
}

/// INVARIANT: Subscribers see every event, independently of drain_events
#[test]
fn invariant_subscribers_see_all_events() {
    let mut s = session();
    // Subscribers only see what is sent after they subscribe
    s.drain_events();
    let ui = s.subscribe();
    let loader = s.subscribe();
    let id = place_ready(&mut s);

    let drained = s.drain_events();
    let ui_events: Vec<SessionEvent> = ui.try_iter().collect();
    let loader_events: Vec<SessionEvent> = loader.try_iter().collect();
    assert!(drained.contains(&SessionEvent::Placed(id)));
    assert_eq!(ui_events, drained);
    assert_eq!(loader_events, drained);
    assert!(loader_events.contains(&SessionEvent::LoadRequested("chair".to_string())));
}

/// INVARIANT: The highlight is refit every frame while a selection is active
#[test]
fn invariant_frame_refits_highlight_to_moved_selection() {
    let mut s = session();
    let id = place_ready(&mut s);
    let highlight = s.selection().highlight().unwrap();
    let before = s.scene().highlight_state(highlight).unwrap().bounds.center();

    let start = pt(1, CENTER.x, CENTER.y);
    s.on_touch(&TouchEvent::start(vec![start], vec![start], ms(3000)));
    s.on_touch(&TouchEvent::moved(vec![pt(1, CENTER.x + 200.0, CENTER.y)], ms(3100)));
    let moved = s.instance(id).unwrap().transform.position;
    assert!(moved.x > before.x);

    s.scene_mut().clear_calls();
    s.on_frame();
    let fits = s
        .scene()
        .count_calls(|c| matches!(c, SceneCall::FitHighlight { node, .. } if *node == id));
    assert_eq!(fits, 1);
    let state = s.scene().highlight_state(highlight).unwrap();
    assert!(state.visible);
    assert_relative_eq!(state.bounds.center().x, moved.x, epsilon = 1e-4);
    assert_relative_eq!(state.bounds.center().z, moved.z, epsilon = 1e-4);

    // No selection, no refit
    s.deselect();
    s.scene_mut().clear_calls();
    s.on_frame();
    assert_eq!(s.scene().count_calls(|c| matches!(c, SceneCall::FitHighlight { .. })), 0);
}

/// INVARIANT: Each entry animation tick of a selected instance refits the highlight
#[test]
fn invariant_animation_ticks_refit_selected_highlight() {
    let mut s = session();
    load(&mut s, "chair");
    show_surface(&mut s, SURFACE);
    let id = s.request_placement().unwrap();
    let fits = |s: &TestSession| {
        s.scene()
            .count_calls(|c| matches!(c, SceneCall::FitHighlight { node, .. } if *node == id))
    };

    s.scene_mut().clear_calls();
    s.advance(TICK);
    assert_eq!(fits(&s), 1);
    s.advance(TICK * 3);
    assert_eq!(fits(&s), 3);
    assert!(s.is_animating(id));

    s.deselect();
    s.scene_mut().clear_calls();
    s.advance(TICK * 6);
    assert_eq!(fits(&s), 0);
    assert_eq!(set_transform_calls(&s), 3);
    assert!(s.is_animating(id));
}
