//! Similarity transform (translation, rotation, uniform scale)

use crate::matrix::Mat4;
use crate::quaternion::Quat;
use crate::vector::Vec3;

/// Position, rotation and uniform scale of a placed object
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: 1.0,
    };

    #[inline]
    pub const fn new(position: Vec3, rotation: Quat, scale: f32) -> Self {
        Self { position, rotation, scale }
    }

    #[inline]
    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    /// Decompose a pose matrix.
    ///
    /// Non-uniform scale collapses to the mean of the axis scales; poses from
    /// surface tracking are rigid, so this is normally 1.
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, position) = m.to_scale_rotation_translation();
        Self {
            position,
            rotation,
            scale: (scale.x.abs() + scale.y.abs() + scale.z.abs()) / 3.0,
        }
    }

    #[inline]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.rotation, self.position)
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (point * self.scale)
    }

    /// Rotate about the world vertical axis through the object's origin
    #[inline]
    pub fn rotate_yaw(&mut self, angle: f32) {
        self.rotation = (Quat::from_rotation_y(angle) * self.rotation).normalize();
    }

    /// Turn about the world vertical axis so local +Z heads toward `target`,
    /// keeping the current pitch and roll.
    pub fn face_towards_yaw(&mut self, target: Vec3) {
        let to_target = (target - self.position).horizontal();
        if to_target.length_squared() < 1e-12 {
            return;
        }
        let desired = to_target.x.atan2(to_target.z);
        let current = self.rotation.yaw().unwrap_or(0.0);
        self.rotate_yaw(desired - current);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_matrix_roundtrip() {
        let t = Transform::new(Vec3::new(1.0, 0.0, -3.0), Quat::from_rotation_y(0.3), 0.5);
        let back = Transform::from_matrix(&t.to_matrix());
        assert_abs_diff_eq!(back.scale, 0.5, epsilon = 1e-5);
        assert!((back.position - t.position).length() < 1e-5);
        assert!(back.rotation.angle_between(t.rotation) < 1e-3);
    }

    #[test]
    fn test_face_towards_yaw_keeps_tilt() {
        let tilt = Quat::from_rotation_x(0.2);
        let mut t = Transform::new(Vec3::ZERO, tilt, 1.0);
        t.face_towards_yaw(Vec3::new(5.0, 3.0, 0.0));

        // +Z now heads along +X horizontally
        let heading = t.rotation.yaw().unwrap();
        assert_abs_diff_eq!(heading, core::f32::consts::FRAC_PI_2, epsilon = 1e-4);

        // Tilt relative to the horizontal plane survives the turn
        let forward = t.rotation * Vec3::Z;
        let original = tilt * Vec3::Z;
        assert_abs_diff_eq!(forward.y, original.y, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_yaw_accumulates() {
        let mut t = Transform::IDENTITY;
        t.rotate_yaw(0.25);
        t.rotate_yaw(0.5);
        assert_abs_diff_eq!(t.rotation.yaw().unwrap(), 0.75, epsilon = 1e-5);
    }
}
