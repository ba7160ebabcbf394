//! Surface tracking backends selectable at boot
//!
//! `scripted` reports whatever the scenario's `surface` steps say.
//! `plane` hit-tests the device view against a floor plane, steered by
//! `look` steps.

use pedestal_math::Mat4;
use pedestal_xr::{PlaneTracker, Pose, ScriptedTracker, SurfaceTracker, XrError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerKind {
    #[default]
    Scripted,
    Plane,
}

/// Surface tracking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub kind: TrackerKind,
    /// World height of the floor plane in meters
    pub floor_height: f32,
    /// Plane hits farther than this count as no surface
    pub max_distance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            kind: TrackerKind::Scripted,
            floor_height: 0.0,
            max_distance: 10.0,
        }
    }
}

/// The tracker a headless session runs against
#[derive(Debug)]
pub enum DeviceTracker {
    Scripted(ScriptedTracker),
    Plane(PlaneTracker),
}

impl DeviceTracker {
    /// Build the configured backend; a plane tracker starts out looking along `view`
    pub fn from_config(config: &TrackerConfig, view: Pose) -> Self {
        match config.kind {
            TrackerKind::Scripted => Self::Scripted(ScriptedTracker::new()),
            TrackerKind::Plane => {
                let mut plane = PlaneTracker::floor(config.floor_height).with_max_distance(config.max_distance);
                plane.set_view_pose(view);
                Self::Plane(plane)
            }
        }
    }

    /// Scripted hit; false when the backend computes its own hits
    pub fn set_hit(&mut self, hit: Option<Mat4>) -> bool {
        match self {
            Self::Scripted(tracker) => {
                tracker.set_hit(hit);
                true
            }
            Self::Plane(_) => false,
        }
    }

    /// New device pose; false when the backend ignores the view
    pub fn set_view_pose(&mut self, pose: Pose) -> bool {
        match self {
            Self::Plane(tracker) => {
                tracker.set_view_pose(pose);
                true
            }
            Self::Scripted(_) => false,
        }
    }
}

impl SurfaceTracker for DeviceTracker {
    fn name(&self) -> &str {
        match self {
            Self::Scripted(tracker) => tracker.name(),
            Self::Plane(tracker) => tracker.name(),
        }
    }

    fn poll(&mut self) -> Result<Option<Mat4>, XrError> {
        match self {
            Self::Scripted(tracker) => tracker.poll(),
            Self::Plane(tracker) => tracker.poll(),
        }
    }
}
