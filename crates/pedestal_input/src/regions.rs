//! UI regions excluded from gesture input
//!
//! Buttons and panels overlay the camera view. A touch that starts on one of
//! them (or anything nested inside one) belongs to the UI, not to the scene.

use std::collections::BTreeSet;

use pedestal_core::{Hierarchy, HierarchyError, Id, IdGenerator};

/// Identifier of a UI element
pub type UiNodeId = Id;

/// Mirror of the UI tree with per-element "ignore gestures" flags
#[derive(Default)]
pub struct InputRegions {
    ids: IdGenerator,
    tree: Hierarchy<UiNodeId>,
    ignored: BTreeSet<UiNodeId>,
}

impl InputRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new UI element under `parent`
    pub fn add(&mut self, parent: Option<UiNodeId>, ignore: bool) -> Result<UiNodeId, HierarchyError> {
        let node = self.ids.next();
        self.tree.insert(node, parent)?;
        if ignore {
            self.ignored.insert(node);
        }
        Ok(node)
    }

    pub fn set_ignore(&mut self, node: UiNodeId, ignore: bool) {
        if ignore {
            self.ignored.insert(node);
        } else {
            self.ignored.remove(&node);
        }
    }

    /// Remove an element and everything nested in it
    pub fn remove(&mut self, node: UiNodeId) {
        for removed in self.tree.remove_subtree(node) {
            self.ignored.remove(&removed);
        }
    }

    pub fn contains(&self, node: UiNodeId) -> bool {
        self.tree.contains(node)
    }

    /// Whether a touch on `target` must be kept away from gestures.
    ///
    /// True when the target or any of its ancestors carries the ignore flag.
    pub fn is_ignored(&self, target: Option<UiNodeId>) -> bool {
        match target {
            Some(node) => self
                .tree
                .nearest_ancestor(node, |n| self.ignored.contains(&n))
                .is_some(),
            None => false,
        }
    }
}
