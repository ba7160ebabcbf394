//! Owned parent index with nearest-ancestor queries
//!
//! Scene graphs and UI trees belong to external collaborators. Instead of
//! climbing their trees, callers mirror the parent links they care about
//! into a [`Hierarchy`] and ask it for the nearest node satisfying a
//! predicate.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::error::HierarchyError;

/// Parent index over copyable node keys
#[derive(Debug, Clone)]
pub struct Hierarchy<K: Copy + Ord> {
    /// node -> parent (None for roots)
    parents: BTreeMap<K, Option<K>>,
}

impl<K: Copy + Ord> Hierarchy<K> {
    pub fn new() -> Self {
        Self {
            parents: BTreeMap::new(),
        }
    }

    /// Register a node under `parent` (or as a root).
    ///
    /// The parent does not need to be registered yet; unknown parents simply
    /// end the ancestor chain.
    pub fn insert(&mut self, node: K, parent: Option<K>) -> Result<(), HierarchyError> {
        if self.parents.contains_key(&node) {
            return Err(HierarchyError::AlreadyRegistered);
        }
        if let Some(p) = parent {
            if p == node {
                return Err(HierarchyError::SelfParent);
            }
            if self.ancestors(p).any(|a| a == node) {
                return Err(HierarchyError::Cycle);
            }
        }
        self.parents.insert(node, parent);
        Ok(())
    }

    /// Remove a single node. Children keep pointing at it and therefore
    /// lose their ancestor chain at this point.
    pub fn remove(&mut self, node: K) -> bool {
        self.parents.remove(&node).is_some()
    }

    /// Remove a node and every registered descendant of it.
    ///
    /// Returns the removed nodes.
    pub fn remove_subtree(&mut self, root: K) -> Vec<K> {
        let doomed: Vec<K> = self
            .parents
            .keys()
            .copied()
            .filter(|&n| self.ancestors(n).any(|a| a == root))
            .collect();
        for node in &doomed {
            self.parents.remove(node);
        }
        doomed
    }

    pub fn contains(&self, node: K) -> bool {
        self.parents.contains_key(&node)
    }

    pub fn parent(&self, node: K) -> Option<K> {
        self.parents.get(&node).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn clear(&mut self) {
        self.parents.clear();
    }

    /// Walk from `node` (inclusive) up to the root
    pub fn ancestors(&self, node: K) -> Ancestors<'_, K> {
        Ancestors {
            hierarchy: self,
            next: Some(node),
            remaining: self.parents.len() + 1,
        }
    }

    /// Nearest ancestor of `node` (inclusive) for which `pred` holds
    pub fn nearest_ancestor<F>(&self, node: K, mut pred: F) -> Option<K>
    where
        F: FnMut(K) -> bool,
    {
        self.ancestors(node).find(|&n| pred(n))
    }
}

impl<K: Copy + Ord> Default for Hierarchy<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a, K: Copy + Ord> {
    hierarchy: &'a Hierarchy<K>,
    next: Option<K>,
    remaining: usize,
}

impl<'a, K: Copy + Ord> Iterator for Ancestors<'a, K> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let current = self.next?;
        self.next = self.hierarchy.parent(current);
        Some(current)
    }
}
