//! Touch gesture geometry
//!
//! Screen coordinates are in pixels with +Y pointing down, the way touch
//! events report them. World space is Y-up.

use crate::quaternion::Quat;
use crate::vector::{Vec2, Vec3};

/// Distance between two fingers in pixels
#[inline]
pub fn pinch_distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Angle of the finger-to-finger vector, `atan2(dy, dx)` in radians
#[inline]
pub fn pinch_angle(a: Vec2, b: Vec2) -> f32 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Map a pixel position to normalized device coordinates (-1..1, +Y up)
pub fn screen_to_ndc(point: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(
        (point.x / viewport.x) * 2.0 - 1.0,
        -(point.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Per-pixel drag speed scaled linearly with depth.
///
/// At `reference_distance` from the camera the result equals `base`.
#[inline]
pub fn depth_scaled_sensitivity(base: f32, distance: f32, reference_distance: f32) -> f32 {
    base * (distance / reference_distance)
}

/// Project a screen-space drag onto the horizontal world plane.
///
/// The drag becomes a camera-local vector `(dx, 0, dy) * sensitivity`
/// (screen right is camera +X, screen down is camera +Z, toward the
/// viewer), is rotated into world space by the camera orientation and loses
/// its vertical component.
pub fn screen_delta_to_world(delta: Vec2, camera_rotation: Quat, sensitivity: f32) -> Vec3 {
    let local = Vec3::new(delta.x * sensitivity, 0.0, delta.y * sensitivity);
    (camera_rotation * local).horizontal()
}
