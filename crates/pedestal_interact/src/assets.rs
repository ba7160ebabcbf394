//! Model asset cache
//!
//! One entry per catalog model. Loading itself belongs to the host: the
//! cache only records what was requested and what came back.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::config::ModelEntry;
use crate::scene::TemplateId;

/// Model identifier from the catalog
pub type ModelId = String;

/// Load state of a model
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState {
    Unloaded,
    Loading,
    /// Loaded; instances are cloned from this template
    Ready(TemplateId),
    /// Load failed; stays failed until retried
    Failed(String),
}

#[derive(Debug, Clone)]
struct AssetEntry {
    path: PathBuf,
    state: AssetState,
}

/// Catalog models and their load states
#[derive(Debug, Clone, Default)]
pub struct AssetCache {
    entries: BTreeMap<ModelId, AssetEntry>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(models: &[ModelEntry]) -> Self {
        let mut cache = Self::new();
        for model in models {
            cache.register(model.id.clone(), model.path.clone());
        }
        cache
    }

    /// Add a model in the `Unloaded` state. Re-registering keeps the state.
    pub fn register(&mut self, id: ModelId, path: PathBuf) {
        self.entries
            .entry(id)
            .and_modify(|e| e.path = path.clone())
            .or_insert(AssetEntry {
                path,
                state: AssetState::Unloaded,
            });
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn state(&self, id: &str) -> Option<&AssetState> {
        self.entries.get(id).map(|e| &e.state)
    }

    pub fn path(&self, id: &str) -> Option<&Path> {
        self.entries.get(id).map(|e| e.path.as_path())
    }

    /// Template of a loaded model
    pub fn template(&self, id: &str) -> Option<TemplateId> {
        match self.state(id) {
            Some(AssetState::Ready(template)) => Some(*template),
            _ => None,
        }
    }

    /// Mark an unloaded model as loading.
    ///
    /// Returns false when the model is unknown or not `Unloaded`.
    pub fn begin_load(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if entry.state == AssetState::Unloaded => {
                entry.state = AssetState::Loading;
                true
            }
            _ => false,
        }
    }

    /// Record a load result. Returns false for unknown models.
    pub fn finish_load(&mut self, id: &str, result: Result<TemplateId, String>) -> bool {
        let Some(entry) = self.entries.get_mut(id) else {
            return false;
        };
        entry.state = match result {
            Ok(template) => AssetState::Ready(template),
            Err(reason) => AssetState::Failed(reason),
        };
        true
    }

    /// Return a failed model to `Unloaded`. Returns false if it had not failed.
    pub fn reset_failed(&mut self, id: &str) -> bool {
        match self.entries.get_mut(id) {
            Some(entry) if matches!(entry.state, AssetState::Failed(_)) => {
                entry.state = AssetState::Unloaded;
                true
            }
            _ => false,
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = &ModelId> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedestal_core::Id;

    fn cache() -> AssetCache {
        AssetCache::from_catalog(&[ModelEntry::new("chair", "chair.glb")])
    }

    #[test]
    fn test_load_lifecycle() {
        let mut cache = cache();
        assert_eq!(cache.state("chair"), Some(&AssetState::Unloaded));
        assert!(cache.begin_load("chair"));
        assert!(!cache.begin_load("chair"));
        assert_eq!(cache.state("chair"), Some(&AssetState::Loading));
        assert_eq!(cache.template("chair"), None);

        let template = Id::new(4, 0);
        assert!(cache.finish_load("chair", Ok(template)));
        assert_eq!(cache.template("chair"), Some(template));
        assert_eq!(cache.path("chair"), Some(Path::new("chair.glb")));
    }

    #[test]
    fn test_failure_sticks_until_reset() {
        let mut cache = cache();
        cache.begin_load("chair");
        cache.finish_load("chair", Err("corrupt file".into()));
        assert!(!cache.begin_load("chair"));
        assert_eq!(cache.state("chair"), Some(&AssetState::Failed("corrupt file".into())));

        assert!(cache.reset_failed("chair"));
        assert!(!cache.reset_failed("chair"));
        assert!(cache.begin_load("chair"));
    }

    #[test]
    fn test_unknown_model() {
        let mut cache = cache();
        assert!(!cache.contains("lamp"));
        assert!(!cache.begin_load("lamp"));
        assert!(!cache.finish_load("lamp", Ok(Id::new(0, 0))));
        assert_eq!(cache.state("lamp"), None);
    }
}
