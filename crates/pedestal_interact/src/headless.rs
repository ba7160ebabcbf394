//! In-memory scene backend
//!
//! Keeps a flat node table with parent links, local transforms and mesh
//! bounds, picks with ray/AABB tests, and records every call it receives.
//! Used by the `pedestal` runtime and by tests.

use std::collections::BTreeMap;
use std::path::Path;

use pedestal_core::IdGenerator;
use pedestal_math::{ray_aabb, Mat4, Ray, Transform, Vec3, AABB};

use crate::error::SceneError;
use crate::scene::{Camera, HighlightId, NodeId, SceneBackend, SceneHit, SpawnedModel, TemplateId};

/// A recorded backend call
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    CloneModel { template: TemplateId, root: NodeId },
    SetTransform { node: NodeId, transform: Transform },
    CreateHighlight(HighlightId),
    FitHighlight { highlight: HighlightId, node: NodeId },
    SetHighlightVisible { highlight: HighlightId, visible: bool },
    DestroyHighlight(HighlightId),
    Dispose(NodeId),
}

#[derive(Debug, Clone)]
struct SceneNode {
    parent: Option<NodeId>,
    transform: Transform,
    /// Mesh bounds in local space, `None` for pure group nodes
    bounds: Option<AABB>,
}

/// Highlight box state
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightState {
    pub visible: bool,
    /// World-space box, empty until first fitted
    pub bounds: AABB,
    pub fitted_to: Option<NodeId>,
}

/// Headless scene graph
pub struct HeadlessScene {
    ids: IdGenerator,
    templates: BTreeMap<TemplateId, AABB>,
    nodes: BTreeMap<NodeId, SceneNode>,
    highlights: BTreeMap<HighlightId, HighlightState>,
    camera: Camera,
    calls: Vec<SceneCall>,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self {
            ids: IdGenerator::new(),
            templates: BTreeMap::new(),
            nodes: BTreeMap::new(),
            highlights: BTreeMap::new(),
            camera: Camera::default(),
            calls: Vec::new(),
        }
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    /// Register a template whose single mesh has the given local bounds
    pub fn add_template(&mut self, mesh_bounds: AABB) -> TemplateId {
        let id = self.ids.next();
        self.templates.insert(id, mesh_bounds);
        id
    }

    /// Stand-in for a model loader: accepts glTF paths, producing a unit
    /// box resting on its origin
    pub fn load_template(&mut self, path: &Path) -> Result<TemplateId, String> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("glb") | Some("gltf") => Ok(self.add_template(AABB::new(
                Vec3::new(-0.5, 0.0, -0.5),
                Vec3::new(0.5, 1.0, 0.5),
            ))),
            _ => Err(format!("unsupported model format: {}", path.display())),
        }
    }

    /// Attach an extra mesh node the engine does not know about
    pub fn attach_node(&mut self, parent: NodeId, mesh_bounds: AABB) -> NodeId {
        let id = self.ids.next();
        self.nodes.insert(
            id,
            SceneNode {
                parent: Some(parent),
                transform: Transform::IDENTITY,
                bounds: Some(mesh_bounds),
            },
        );
        id
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn transform(&self, node: NodeId) -> Option<&Transform> {
        self.nodes.get(&node).map(|n| &n.transform)
    }

    pub fn highlight_state(&self, highlight: HighlightId) -> Option<&HighlightState> {
        self.highlights.get(&highlight)
    }

    pub fn calls(&self) -> &[SceneCall] {
        &self.calls
    }

    pub fn count_calls<F: Fn(&SceneCall) -> bool>(&self, pred: F) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// World matrix of a node
    pub fn world_matrix(&self, node: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(node);
        let mut guard = self.nodes.len() + 1;
        while let (Some(id), true) = (current, guard > 0) {
            guard -= 1;
            let Some(n) = self.nodes.get(&id) else { break };
            matrix = n.transform.to_matrix() * matrix;
            current = n.parent;
        }
        matrix
    }

    /// World bounds of a node and its descendants
    pub fn world_bounds(&self, node: NodeId) -> AABB {
        self.nodes
            .iter()
            .filter(|&(&id, _)| self.is_descendant(id, node))
            .filter_map(|(&id, n)| n.bounds.map(|b| b.transform(&self.world_matrix(id))))
            .fold(AABB::EMPTY, |acc, b| acc.union(&b))
    }

    /// Whether `node` is `ancestor` or below it
    fn is_descendant(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        let mut guard = self.nodes.len() + 1;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if guard == 0 {
                return false;
            }
            guard -= 1;
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }
}

impl SceneBackend for HeadlessScene {
    fn clone_model(&mut self, template: TemplateId) -> Result<SpawnedModel, SceneError> {
        let bounds = *self
            .templates
            .get(&template)
            .ok_or(SceneError::UnknownTemplate(template))?;

        let root = self.ids.next();
        let mesh = self.ids.next();
        self.nodes.insert(
            root,
            SceneNode {
                parent: None,
                transform: Transform::IDENTITY,
                bounds: None,
            },
        );
        self.nodes.insert(
            mesh,
            SceneNode {
                parent: Some(root),
                transform: Transform::IDENTITY,
                bounds: Some(bounds),
            },
        );
        self.calls.push(SceneCall::CloneModel { template, root });
        Ok(SpawnedModel {
            root,
            nodes: vec![(mesh, root)],
        })
    }

    fn set_transform(&mut self, node: NodeId, transform: &Transform) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.transform = *transform;
        }
        self.calls.push(SceneCall::SetTransform {
            node,
            transform: *transform,
        });
    }

    fn create_highlight(&mut self) -> HighlightId {
        let id = self.ids.next();
        self.highlights.insert(
            id,
            HighlightState {
                visible: false,
                bounds: AABB::EMPTY,
                fitted_to: None,
            },
        );
        self.calls.push(SceneCall::CreateHighlight(id));
        id
    }

    fn fit_highlight(&mut self, highlight: HighlightId, node: NodeId) {
        let bounds = self.world_bounds(node);
        if let Some(h) = self.highlights.get_mut(&highlight) {
            h.bounds = bounds;
            h.fitted_to = Some(node);
        }
        self.calls.push(SceneCall::FitHighlight { highlight, node });
    }

    fn set_highlight_visible(&mut self, highlight: HighlightId, visible: bool) {
        if let Some(h) = self.highlights.get_mut(&highlight) {
            h.visible = visible;
        }
        self.calls.push(SceneCall::SetHighlightVisible { highlight, visible });
    }

    fn destroy_highlight(&mut self, highlight: HighlightId) {
        self.highlights.remove(&highlight);
        self.calls.push(SceneCall::DestroyHighlight(highlight));
    }

    fn intersect(&self, ray: &Ray, roots: &[NodeId]) -> Option<SceneHit> {
        self.nodes
            .iter()
            .filter(|&(&id, _)| roots.iter().any(|&r| self.is_descendant(id, r)))
            .filter_map(|(&id, n)| {
                let world = n.bounds?.transform(&self.world_matrix(id));
                ray_aabb(ray, &world).map(|distance| SceneHit { node: id, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn dispose(&mut self, node: NodeId) {
        let doomed: Vec<NodeId> = self
            .nodes
            .keys()
            .copied()
            .filter(|&id| self.is_descendant(id, node))
            .collect();
        for id in doomed {
            self.nodes.remove(&id);
        }
        self.calls.push(SceneCall::Dispose(node));
    }

    fn camera(&self) -> Camera {
        self.camera
    }
}
