//! Quaternion for 3D rotations

use crate::matrix::Mat4;
use crate::vector::Vec3;
use core::ops::{Mul, MulAssign};

/// Unit quaternion representing a 3D rotation
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create from axis and angle (radians)
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        let axis = axis.normalize();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(sin, 0.0, 0.0, cos)
    }

    /// Rotation about the vertical (Y) axis
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(0.0, sin, 0.0, cos)
    }

    #[inline]
    pub fn from_rotation_z(angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(0.0, 0.0, sin, cos)
    }

    /// Extract the rotation of a matrix whose upper 3x3 block is orthonormal
    pub fn from_rotation_matrix(m: &Mat4) -> Self {
        let c = &m.cols;
        let trace = c[0].x + c[1].y + c[2].z;

        if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self::new(
                (c[1].z - c[2].y) / s,
                (c[2].x - c[0].z) / s,
                (c[0].y - c[1].x) / s,
                0.25 * s,
            )
        } else if c[0].x > c[1].y && c[0].x > c[2].z {
            let s = (1.0 + c[0].x - c[1].y - c[2].z).sqrt() * 2.0;
            Self::new(
                0.25 * s,
                (c[0].y + c[1].x) / s,
                (c[2].x + c[0].z) / s,
                (c[1].z - c[2].y) / s,
            )
        } else if c[1].y > c[2].z {
            let s = (1.0 + c[1].y - c[0].x - c[2].z).sqrt() * 2.0;
            Self::new(
                (c[0].y + c[1].x) / s,
                0.25 * s,
                (c[1].z + c[2].y) / s,
                (c[2].x - c[0].z) / s,
            )
        } else {
            let s = (1.0 + c[2].z - c[0].x - c[1].y).sqrt() * 2.0;
            Self::new(
                (c[2].x + c[0].z) / s,
                (c[1].z + c[2].y) / s,
                0.25 * s,
                (c[0].y - c[1].x) / s,
            )
        }
        .normalize()
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 0.0 {
            let inv = 1.0 / len;
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Inverse of a unit quaternion
    #[inline]
    pub fn inverse(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Angle in radians between two rotations
    pub fn angle_between(self, other: Self) -> f32 {
        let d = self.dot(other).abs().min(1.0);
        2.0 * d.acos()
    }

    /// Rotate a vector
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Heading of the local +Z axis around world Y, in radians.
    ///
    /// Zero when +Z points along world +Z; `None` when +Z is vertical and
    /// the heading is undefined.
    pub fn yaw(self) -> Option<f32> {
        let forward = self.rotate(Vec3::Z).horizontal();
        if forward.length_squared() < 1e-12 {
            None
        } else {
            Some(forward.x.atan2(forward.z))
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Quat {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quat {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quat {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate(rhs)
    }
}
