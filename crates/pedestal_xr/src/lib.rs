//! # pedestal_xr - Surface Tracking Layer
//!
//! The tracking subsystem is a black box that, once per frame, either finds
//! a real-world surface under the device's aim and reports its pose, or
//! finds nothing. This crate provides:
//! - the [`SurfaceTracker`] backend trait (ARCore, ARKit, WebXR hit-test...)
//! - the [`SurfaceReticle`] read by placement
//! - [`TrackingSystem`], which polls a backend each frame and reports
//!   found/lost transitions
//! - two in-process backends: [`ScriptedTracker`] and [`PlaneTracker`]
//!
//! ## Example
//!
//! ```ignore
//! use pedestal_xr::prelude::*;
//!
//! let mut tracking = TrackingSystem::new(PlaneTracker::floor(0.0));
//!
//! // Frame loop
//! loop {
//!     match tracking.update() {
//!         ReticleChange::Found => show_hint("Tap place"),
//!         ReticleChange::Lost => show_hint("Move your phone"),
//!         ReticleChange::Unchanged => {}
//!     }
//! }
//! ```

pub mod trackers;

pub use trackers::{PlaneTracker, ScriptedTracker};

use pedestal_math::{Mat4, Quat, Vec3};

/// Pose (position + orientation)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self { position, orientation }
    }

    /// Convert to transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::ONE, self.orientation, self.position)
    }

    /// Rigid part of a matrix (scale discarded)
    pub fn from_matrix(m: &Mat4) -> Self {
        let (_, orientation, position) = m.to_scale_rotation_translation();
        Self { position, orientation }
    }

    /// Viewing direction, -Z in local space
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

/// Surface tracking backend
pub trait SurfaceTracker {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Hit-test for the current frame.
    ///
    /// `Ok(Some(pose))` when a surface was found, `Ok(None)` when the
    /// backend is tracking but found nothing this frame.
    fn poll(&mut self) -> Result<Option<Mat4>, XrError>;
}

impl<T: SurfaceTracker + ?Sized> SurfaceTracker for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn poll(&mut self) -> Result<Option<Mat4>, XrError> {
        (**self).poll()
    }
}

/// Placement reticle: the pose of the best current surface hit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceReticle {
    /// Last reported surface pose. Stale while hidden.
    pub pose: Mat4,
    /// Whether a surface was found this frame
    pub visible: bool,
}

impl Default for SurfaceReticle {
    fn default() -> Self {
        Self {
            pose: Mat4::IDENTITY,
            visible: false,
        }
    }
}

impl SurfaceReticle {
    /// The pose, only while a surface is currently found
    pub fn current_pose(&self) -> Option<Mat4> {
        if self.visible { Some(self.pose) } else { None }
    }
}

/// Visibility transition produced by one tracking update
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReticleChange {
    Found,
    Lost,
    Unchanged,
}

/// Tracking errors
#[derive(Clone, Debug, PartialEq)]
pub enum XrError {
    /// Backend not initialized or session not running
    NotInitialized,
    /// Tracking temporarily lost (insufficient features, motion blur...)
    TrackingLost(String),
    /// Runtime error reported by the backend
    RuntimeError(String),
}

impl core::fmt::Display for XrError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "XR not initialized"),
            Self::TrackingLost(s) => write!(f, "Tracking lost: {}", s),
            Self::RuntimeError(s) => write!(f, "Runtime error: {}", s),
        }
    }
}

impl std::error::Error for XrError {}

/// Polls a tracking backend once per frame and maintains the reticle
pub struct TrackingSystem<T: SurfaceTracker> {
    backend: T,
    reticle: SurfaceReticle,
    frame_index: u64,
}

impl<T: SurfaceTracker> TrackingSystem<T> {
    pub fn new(backend: T) -> Self {
        Self {
            backend,
            reticle: SurfaceReticle::default(),
            frame_index: 0,
        }
    }

    /// Run one frame of hit testing.
    ///
    /// Backend errors hide the reticle for this frame; they never propagate,
    /// tracking recovers on its own on a later frame.
    pub fn update(&mut self) -> ReticleChange {
        self.frame_index += 1;
        let was_visible = self.reticle.visible;

        match self.backend.poll() {
            Ok(Some(pose)) => {
                self.reticle.pose = pose;
                self.reticle.visible = true;
            }
            Ok(None) => self.reticle.visible = false,
            Err(e) => {
                log::debug!("{}: frame {} without hit: {}", self.backend.name(), self.frame_index, e);
                self.reticle.visible = false;
            }
        }

        match (was_visible, self.reticle.visible) {
            (false, true) => ReticleChange::Found,
            (true, false) => ReticleChange::Lost,
            _ => ReticleChange::Unchanged,
        }
    }

    pub fn reticle(&self) -> &SurfaceReticle {
        &self.reticle
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn backend(&self) -> &T {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut T {
        &mut self.backend
    }
}

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::{
        PlaneTracker, Pose, ReticleChange, ScriptedTracker, SurfaceReticle, SurfaceTracker,
        TrackingSystem, XrError,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_and_lost_transitions() {
        let mut tracking = TrackingSystem::new(ScriptedTracker::new());
        assert_eq!(tracking.update(), ReticleChange::Unchanged);
        assert!(!tracking.reticle().visible);

        let pose = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        tracking.backend_mut().set_hit(Some(pose));
        assert_eq!(tracking.update(), ReticleChange::Found);
        assert_eq!(tracking.update(), ReticleChange::Unchanged);
        assert_eq!(tracking.reticle().current_pose(), Some(pose));

        tracking.backend_mut().set_hit(None);
        assert_eq!(tracking.update(), ReticleChange::Lost);
        assert_eq!(tracking.reticle().current_pose(), None);
        assert_eq!(tracking.frame_index(), 4);
    }

    #[test]
    fn test_backend_error_hides_reticle() {
        let mut tracking = TrackingSystem::new(ScriptedTracker::new());
        tracking.backend_mut().set_hit(Some(Mat4::IDENTITY));
        tracking.update();

        tracking.backend_mut().fail_next(XrError::TrackingLost("blur".into()));
        assert_eq!(tracking.update(), ReticleChange::Lost);
        // Failure is one-shot, the scripted hit is reported again
        assert_eq!(tracking.update(), ReticleChange::Found);
    }

    #[test]
    fn test_pose_matrix_roundtrip() {
        let pose = Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_y(0.5));
        let back = Pose::from_matrix(&pose.to_matrix());
        assert!((back.position - pose.position).length() < 1e-5);
        assert!(back.orientation.angle_between(pose.orientation) < 1e-3);
    }
}
