//! Rendering collaborator seam
//!
//! The engine never touches renderables directly. Everything it needs from
//! the scene graph (cloning a model, moving a node, the selection highlight,
//! picking, disposal and the camera) goes through [`SceneBackend`].

use pedestal_core::Id;
use pedestal_math::{screen_to_ndc, Mat4, Quat, Ray, Transform, Vec2, Vec3};

use crate::error::SceneError;

/// Scene node handle
pub type NodeId = Id;

/// Selection highlight handle
pub type HighlightId = Id;

/// Loaded model template handle
pub type TemplateId = Id;

/// Result of cloning a template into the scene
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedModel {
    /// Root node of the clone, already attached to the scene
    pub root: NodeId,
    /// Descendants of the root as `(node, parent)` pairs
    pub nodes: Vec<(NodeId, NodeId)>,
}

/// Nearest node hit by a picking ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub node: NodeId,
    pub distance: f32,
}

/// Camera state as reported by the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position
    pub position: Vec3,
    /// World orientation; the camera looks down its local -Z
    pub rotation: Quat,
    /// Vertical field of view in radians
    pub fov_y: f32,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: 60f32.to_radians(),
            viewport: Vec2::new(1080.0, 1920.0),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = Vec2::new(width, height);
        self
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    /// World-to-camera matrix.
    ///
    /// Hit testing works from rays and never needs it; it is here for hosts
    /// that render the scene from this camera.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation.inverse()) * Mat4::from_translation(-self.position)
    }

    /// Ray from the camera through normalized device coordinates
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Ray {
        let half_height = (self.fov_y * 0.5).tan();
        let local = Vec3::new(ndc.x * half_height * self.aspect(), ndc.y * half_height, -1.0);
        Ray::new(self.position, self.rotation * local)
    }

    /// Ray from the camera through a screen pixel
    pub fn ray_through_screen(&self, point: Vec2) -> Ray {
        self.ray_through_ndc(screen_to_ndc(point, self.viewport))
    }
}

/// Rendering / scene graph backend
pub trait SceneBackend {
    /// Deep-clone a loaded template and attach it to the scene.
    ///
    /// Clones never share mutable renderable state with the template or
    /// with each other.
    fn clone_model(&mut self, template: TemplateId) -> Result<SpawnedModel, SceneError>;

    /// Set a node's local transform
    fn set_transform(&mut self, node: NodeId, transform: &Transform);

    /// Create the (initially hidden) selection highlight
    fn create_highlight(&mut self) -> HighlightId;

    /// Resize the highlight to bound `node` and its descendants
    fn fit_highlight(&mut self, highlight: HighlightId, node: NodeId);

    fn set_highlight_visible(&mut self, highlight: HighlightId, visible: bool);

    fn destroy_highlight(&mut self, highlight: HighlightId);

    /// Intersect a ray with `roots` and their descendants.
    ///
    /// Returns the nearest hit node, which may be any descendant.
    fn intersect(&self, ray: &Ray, roots: &[NodeId]) -> Option<SceneHit>;

    /// Detach `node` from the scene and release its geometry, materials and
    /// textures, descendants included
    fn dispose(&mut self, node: NodeId);

    /// Current camera
    fn camera(&self) -> Camera;
}
