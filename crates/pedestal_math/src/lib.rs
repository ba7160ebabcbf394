//! # pedestal_math - Math for placement and manipulation
//!
//! Small, dependency-free math primitives used by the interaction engine:
//! vectors, quaternions, column-major matrices, similarity transforms,
//! rays and bounding boxes, plus the touch gesture geometry (pinch distance
//! and angle, screen-to-world drag projection).

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bounds;
pub mod gesture;
pub mod intersect;
pub mod matrix;
pub mod quaternion;
pub mod ray;
pub mod transform;
pub mod vector;

pub use bounds::*;
pub use gesture::*;
pub use intersect::*;
pub use matrix::*;
pub use quaternion::*;
pub use ray::*;
pub use transform::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const FRAC_PI_2: f32 = PI / 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const EPSILON: f32 = 1e-6;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

pub mod prelude {
    pub use crate::bounds::AABB;
    pub use crate::gesture::{
        depth_scaled_sensitivity, pinch_angle, pinch_distance, screen_delta_to_world,
        screen_to_ndc,
    };
    pub use crate::intersect::{ray_aabb, ray_plane};
    pub use crate::matrix::Mat4;
    pub use crate::quaternion::Quat;
    pub use crate::ray::Ray;
    pub use crate::transform::Transform;
    pub use crate::vector::{Vec2, Vec3, Vec4};
    pub use crate::radians;
}
