//! Placement controller
//!
//! Turns the reticle pose into the starting transform of a new instance.
//! Orchestration (asset checks, cloning, selection, animation) lives in
//! [`Session::request_placement`](crate::session::Session::request_placement).

use pedestal_math::{Mat4, Transform, Vec3};

use crate::assets::ModelId;
use crate::scene::NodeId;

/// Placed instances are identified by the root node of their clone
pub type InstanceId = NodeId;

/// A model clone in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedInstance {
    pub id: InstanceId,
    /// Catalog model this was cloned from
    pub model: ModelId,
    /// Current transform; gestures and the entry animation write here
    pub transform: Transform,
}

/// Chosen model and placement parameters
#[derive(Debug, Clone)]
pub struct PlacementController {
    chosen: Option<ModelId>,
    base_scale: f32,
}

impl PlacementController {
    pub fn new(base_scale: f32) -> Self {
        Self {
            chosen: None,
            base_scale,
        }
    }

    pub fn choose(&mut self, model: ModelId) {
        self.chosen = Some(model);
    }

    pub fn chosen(&self) -> Option<&ModelId> {
        self.chosen.as_ref()
    }

    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Final transform of an instance placed at `pose`.
    ///
    /// Position and orientation come from the pose, scale is the base
    /// scale, and the instance is turned about the vertical axis so its
    /// local +Z faces `camera_position`. Pitch and roll of the pose are kept.
    pub fn placement_transform(&self, pose: &Mat4, camera_position: Vec3) -> Transform {
        let mut transform = Transform::from_matrix(pose).with_scale(self.base_scale);
        transform.face_towards_yaw(camera_position);
        transform
    }
}
