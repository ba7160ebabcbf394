//! Matrix types

use crate::quaternion::Quat;
use crate::vector::{Vec3, Vec4};
use core::ops::Mul;

/// 4x4 matrix (column-major). Surface poses arrive from tracking in this form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat4 {
    pub cols: [Vec4; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    /// Create from a column-major array of 16 floats (WebXR/ARCore layout)
    pub fn from_cols_array(m: &[f32; 16]) -> Self {
        Self::from_cols(
            Vec4::new(m[0], m[1], m[2], m[3]),
            Vec4::new(m[4], m[5], m[6], m[7]),
            Vec4::new(m[8], m[9], m[10], m[11]),
            Vec4::new(m[12], m[13], m[14], m[15]),
        )
    }

    #[inline]
    pub fn from_translation(translation: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, translation.extend(1.0))
    }

    /// Create a rotation matrix from a quaternion
    pub fn from_quat(q: Quat) -> Self {
        let x2 = q.x + q.x;
        let y2 = q.y + q.y;
        let z2 = q.z + q.z;

        let xx = q.x * x2;
        let xy = q.x * y2;
        let xz = q.x * z2;
        let yy = q.y * y2;
        let yz = q.y * z2;
        let zz = q.z * z2;
        let wx = q.w * x2;
        let wy = q.w * y2;
        let wz = q.w * z2;

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Compose translation * rotation * scale
    pub fn from_scale_rotation_translation(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        let r = Self::from_quat(rotation);
        Self::from_cols(
            r.cols[0] * scale.x,
            r.cols[1] * scale.y,
            r.cols[2] * scale.z,
            translation.extend(1.0),
        )
    }

    /// Split an affine matrix into (scale, rotation, translation).
    ///
    /// Scale is the length of each basis column; a negative determinant flips
    /// the X scale so the remaining basis is a proper rotation.
    pub fn to_scale_rotation_translation(&self) -> (Vec3, Quat, Vec3) {
        let c0 = self.cols[0].truncate();
        let c1 = self.cols[1].truncate();
        let c2 = self.cols[2].truncate();

        let det = c0.dot(c1.cross(c2));
        let mut scale = Vec3::new(c0.length(), c1.length(), c2.length());
        if det < 0.0 {
            scale.x = -scale.x;
        }

        let inv = |s: f32| if s.abs() > 1e-12 { 1.0 / s } else { 0.0 };
        let rotation_only = Self::from_cols(
            (c0 * inv(scale.x)).extend(0.0),
            (c1 * inv(scale.y)).extend(0.0),
            (c2 * inv(scale.z)).extend(0.0),
            Vec4::W,
        );

        (scale, Quat::from_rotation_matrix(&rotation_only), self.translation())
    }

    /// Get the translation component
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Transform a point (w=1)
    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let v = *self * point.extend(1.0);
        v.truncate() / v.w
    }

    /// Transform a vector (w=0)
    #[inline]
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        (*self * vector.extend(0.0)).truncate()
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        self.cols[0] * rhs.x + self.cols[1] * rhs.y + self.cols[2] * rhs.z + self.cols[3] * rhs.w
    }
}
