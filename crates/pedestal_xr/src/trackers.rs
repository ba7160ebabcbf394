//! In-process tracking backends
//!
//! Used by the headless runtime and tests where no AR session exists.

use pedestal_math::{ray_plane, Mat4, Quat, Ray, Vec3};

use crate::{Pose, SurfaceTracker, XrError};

/// Reports whatever hit it was last given
#[derive(Debug, Default)]
pub struct ScriptedTracker {
    hit: Option<Mat4>,
    pending_error: Option<XrError>,
}

impl ScriptedTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pose reported from now on, `None` for no surface
    pub fn set_hit(&mut self, hit: Option<Mat4>) {
        self.hit = hit;
    }

    /// Make the next poll fail once
    pub fn fail_next(&mut self, error: XrError) {
        self.pending_error = Some(error);
    }
}

impl SurfaceTracker for ScriptedTracker {
    fn name(&self) -> &str {
        "scripted"
    }

    fn poll(&mut self) -> Result<Option<Mat4>, XrError> {
        if let Some(e) = self.pending_error.take() {
            return Err(e);
        }
        Ok(self.hit)
    }
}

/// Hit-tests the view ray against an infinite horizontal plane
#[derive(Debug)]
pub struct PlaneTracker {
    height: f32,
    view: Option<Pose>,
    max_distance: f32,
}

impl PlaneTracker {
    /// Floor plane at the given world height
    pub fn floor(height: f32) -> Self {
        Self {
            height,
            view: None,
            max_distance: 10.0,
        }
    }

    /// Hits farther than this are treated as no surface
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Update the device pose used for the next poll
    pub fn set_view_pose(&mut self, pose: Pose) {
        self.view = Some(pose);
    }

    pub fn height(&self) -> f32 {
        self.height
    }
}

impl SurfaceTracker for PlaneTracker {
    fn name(&self) -> &str {
        "plane"
    }

    fn poll(&mut self) -> Result<Option<Mat4>, XrError> {
        let view = self.view.ok_or(XrError::NotInitialized)?;
        let ray = Ray::new(view.position, view.forward());
        if !ray.is_valid() {
            return Err(XrError::RuntimeError("degenerate view orientation".into()));
        }

        let hit = ray_plane(&ray, Vec3::new(0.0, self.height, 0.0), Vec3::Y)
            .filter(|t| *t <= self.max_distance)
            .map(|t| {
                // Surface poses are upright; heading follows the view
                let heading = view.orientation.yaw().unwrap_or(0.0);
                Pose::new(ray.at(t), Quat::from_rotation_y(heading)).to_matrix()
            });
        Ok(hit)
    }
}
