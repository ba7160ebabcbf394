//! Gesture recognizer
//!
//! Classifies the live contact set into one exclusive manipulation mode and
//! applies it to the selected instance's transform:
//!
//! | Contacts | Mode | Effect |
//! |---|---|---|
//! | 1 | [`GestureMode::SingleMove`] | drag on the horizontal plane |
//! | 2 | [`GestureMode::PinchScaleRotate`] | uniform scale and yaw |
//! | 3 | [`GestureMode::ThreeFingerLift`] | vertical position |
//!
//! A short, nearly stationary single touch is reported as a tap instead.

use std::time::Duration;

use pedestal_input::{InputRegions, TouchEvent, TouchPhase, TouchPoint};
use pedestal_math::{
    depth_scaled_sensitivity, pinch_angle, pinch_distance, screen_delta_to_world, Transform, Vec2,
};

use crate::scene::Camera;

/// World units of lift per pixel of vertical finger travel
pub const LIFT_SENSITIVITY: f32 = 0.005;

/// World units of drag per pixel at [`MOVE_REFERENCE_DISTANCE`]
pub const MOVE_SENSITIVITY: f32 = 0.0015;

/// Camera distance at which drag speed equals [`MOVE_SENSITIVITY`]
pub const MOVE_REFERENCE_DISTANCE: f32 = 5.0;

/// A tap lasts strictly less than this
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(250);

/// A tap travels strictly less than this many pixels
pub const TAP_MAX_TRAVEL: f32 = 10.0;

/// Pinch distances below this cannot serve as a scale reference
const MIN_PINCH_DISTANCE: f32 = 1e-3;

/// Single-finger drag state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragBaseline {
    /// Finger position at the previous sample
    pub last: Vec2,
}

/// Two-finger pinch state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchBaseline {
    /// Finger distance when the pinch started; `None` if degenerate
    pub initial_distance: Option<f32>,
    /// Finger angle at the previous sample
    pub previous_angle: f32,
    /// Instance scale when the pinch started
    pub base_scale: f32,
}

/// Three-finger lift state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiftBaseline {
    /// Instance height when the lift started
    pub base_y: f32,
    /// First finger's screen Y when the lift started
    pub base_screen_y: f32,
}

/// Exclusive manipulation mode
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureMode {
    #[default]
    Idle,
    SingleMove(DragBaseline),
    PinchScaleRotate(PinchBaseline),
    ThreeFingerLift(LiftBaseline),
}

impl GestureMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SingleMove(_) => "move",
            Self::PinchScaleRotate(_) => "pinch",
            Self::ThreeFingerLift(_) => "lift",
        }
    }
}

/// Where and when a single touch began, for tap classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapCandidate {
    pub position: Vec2,
    pub time: Duration,
}

/// What handling one touch event produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureOutput {
    /// The target transform was modified
    pub transformed: bool,
    /// The event completed a tap at this screen position
    pub tap: Option<Vec2>,
}

/// Touch state machine
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    mode: GestureMode,
    tap: Option<TapCandidate>,
    /// Live contacts as of the last event
    touches: Vec<TouchPoint>,
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &GestureMode {
        &self.mode
    }

    pub fn tap_candidate(&self) -> Option<&TapCandidate> {
        self.tap.as_ref()
    }

    /// Drop the current mode and tap candidate
    pub fn reset(&mut self) {
        self.set_mode(GestureMode::Idle);
        self.tap = None;
        self.touches.clear();
    }

    /// Re-seed the active mode from a newly selected transform.
    ///
    /// The fingers still down become the new baseline, so the next move
    /// changes the new selection only by what the fingers do from here.
    pub fn rebaseline(&mut self, target: &Transform) {
        if self.mode == GestureMode::Idle {
            return;
        }
        let mode = Self::baseline_for(&self.touches, Some(target));
        log::debug!("Gesture {} re-baselined for a new selection", mode.name());
        self.set_mode(mode);
    }

    /// Process one touch event.
    ///
    /// `target` is the selected instance's transform, `None` when nothing
    /// is selected.
    pub fn handle(
        &mut self,
        event: &TouchEvent,
        target: Option<&mut Transform>,
        camera: &Camera,
        regions: &InputRegions,
    ) -> GestureOutput {
        let output = match event.phase {
            TouchPhase::Start => {
                self.on_start(event, target.as_deref(), regions);
                GestureOutput::default()
            }
            TouchPhase::Move => GestureOutput {
                transformed: self.on_move(event, target, camera),
                tap: None,
            },
            TouchPhase::End => GestureOutput {
                transformed: false,
                tap: self.on_end(event, target.as_deref(), regions),
            },
            TouchPhase::Cancel => {
                self.reset();
                GestureOutput::default()
            }
        };
        self.touches.clone_from(&event.touches);
        output
    }

    fn on_start(&mut self, event: &TouchEvent, target: Option<&Transform>, regions: &InputRegions) {
        match event.touches.as_slice() {
            [] => {}
            [touch] => {
                if regions.is_ignored(touch.target) {
                    log::debug!("Touch {} started on a UI region, ignored", touch.id);
                    self.tap = None;
                    self.set_mode(GestureMode::Idle);
                    return;
                }
                self.tap = Some(TapCandidate {
                    position: touch.position,
                    time: event.time,
                });
                self.set_mode(GestureMode::SingleMove(DragBaseline { last: touch.position }));
            }
            touches => {
                // Higher arity supersedes whatever a lower count started
                self.tap = None;
                let mode = Self::baseline_for(touches, target);
                self.set_mode(mode);
            }
        }
    }

    fn on_move(&mut self, event: &TouchEvent, target: Option<&mut Transform>, camera: &Camera) -> bool {
        let Some(transform) = target else {
            if self.mode != GestureMode::Idle {
                log::debug!("No selection, dropping {} gesture", self.mode.name());
                self.set_mode(GestureMode::Idle);
            }
            return false;
        };

        match (&mut self.mode, event.touches.as_slice()) {
            (GestureMode::ThreeFingerLift(lift), [first, _, _]) => {
                transform.position.y =
                    lift.base_y + (lift.base_screen_y - first.position.y) * LIFT_SENSITIVITY;
                true
            }
            (GestureMode::PinchScaleRotate(pinch), [a, b]) => {
                if let Some(initial) = pinch.initial_distance {
                    let distance = pinch_distance(a.position, b.position);
                    transform.scale = pinch.base_scale * (distance / initial);
                }
                let angle = pinch_angle(a.position, b.position);
                transform.rotate_yaw(angle - pinch.previous_angle);
                pinch.previous_angle = angle;
                true
            }
            (GestureMode::SingleMove(drag), [touch]) => {
                let delta = touch.position - drag.last;
                drag.last = touch.position;
                let distance = transform.position.distance(camera.position);
                let k = depth_scaled_sensitivity(MOVE_SENSITIVITY, distance, MOVE_REFERENCE_DISTANCE);
                transform.position += screen_delta_to_world(delta, camera.rotation, k);
                true
            }
            _ => false,
        }
    }

    fn on_end(&mut self, event: &TouchEvent, target: Option<&Transform>, regions: &InputRegions) -> Option<Vec2> {
        let candidate = self.tap.take();
        let tap = match (candidate, event.count_before(), event.changed.first()) {
            (Some(start), 1, Some(released)) => Self::classify_tap(&start, released, event.time, regions),
            _ => None,
        };

        let mode = match event.touches.as_slice() {
            [] => GestureMode::Idle,
            // Remaining fingers pick up the gesture for their count from
            // where they are now, without a jump
            remaining => Self::baseline_for(remaining, target),
        };
        self.set_mode(mode);
        tap
    }

    fn classify_tap(
        start: &TapCandidate,
        released: &TouchPoint,
        now: Duration,
        regions: &InputRegions,
    ) -> Option<Vec2> {
        if regions.is_ignored(released.target) {
            return None;
        }
        let elapsed = now.saturating_sub(start.time);
        let travel = released.position.distance(start.position);
        if elapsed < TAP_MAX_DURATION && travel < TAP_MAX_TRAVEL {
            log::debug!("Tap at ({}, {}) after {:?}", released.position.x, released.position.y, elapsed);
            Some(released.position)
        } else {
            None
        }
    }

    /// Fresh mode for a contact set, baselined at the current positions
    fn baseline_for(touches: &[TouchPoint], target: Option<&Transform>) -> GestureMode {
        match (touches, target) {
            ([touch], _) => GestureMode::SingleMove(DragBaseline { last: touch.position }),
            ([a, b], Some(t)) => {
                let distance = pinch_distance(a.position, b.position);
                GestureMode::PinchScaleRotate(PinchBaseline {
                    initial_distance: (distance > MIN_PINCH_DISTANCE).then_some(distance),
                    previous_angle: pinch_angle(a.position, b.position),
                    base_scale: t.scale,
                })
            }
            ([first, _, _], Some(t)) => GestureMode::ThreeFingerLift(LiftBaseline {
                base_y: t.position.y,
                base_screen_y: first.position.y,
            }),
            _ => GestureMode::Idle,
        }
    }

    fn set_mode(&mut self, mode: GestureMode) {
        if self.mode.name() != mode.name() {
            log::debug!("Gesture mode {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }
}
