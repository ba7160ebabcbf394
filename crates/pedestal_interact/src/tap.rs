//! Tap router
//!
//! A tap selects the placed instance under the finger or, if there is none,
//! clears the selection.

use pedestal_core::Hierarchy;
use pedestal_math::Vec2;

use crate::placement::InstanceId;
use crate::scene::{NodeId, SceneBackend};

/// What a tap resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// The tap landed on this instance
    Selected(InstanceId),
    /// Nothing under the tap
    Deselected,
    /// Geometry was hit but belongs to no placed instance
    Orphaned(NodeId),
}

/// Resolve a tap at screen position `point`.
///
/// `placed` lists the roots of all placed instances and `index` mirrors
/// their node trees. A hit on any descendant resolves to the nearest
/// ancestor (self included) that is a placed root.
pub fn route_tap<S: SceneBackend>(
    scene: &S,
    point: Vec2,
    placed: &[InstanceId],
    index: &Hierarchy<NodeId>,
) -> TapOutcome {
    let ray = scene.camera().ray_through_screen(point);
    let Some(hit) = scene.intersect(&ray, placed) else {
        return TapOutcome::Deselected;
    };

    match index.nearest_ancestor(hit.node, |n| placed.contains(&n)) {
        Some(instance) => TapOutcome::Selected(instance),
        None => {
            log::warn!("Tap hit node {} outside every placed instance", hit.node);
            TapOutcome::Orphaned(hit.node)
        }
    }
}
