//! Session configuration
//!
//! Only the model catalog and the placement scale are configurable. Gesture
//! thresholds and sensitivities are fixed constants in [`crate::gesture`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One entry of the model catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Identifier used by the UI (`choose_model`)
    pub id: String,
    /// Asset path handed to the loader
    pub path: PathBuf,
}

impl ModelEntry {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Uniform scale every placed instance grows to (default: 0.5)
    pub base_scale: f32,

    /// Models that can be placed
    pub models: Vec<ModelEntry>,

    /// Model chosen when the session starts
    pub default_model: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_scale: 0.5,
            models: Vec::new(),
            default_model: None,
        }
    }
}

impl SessionConfig {
    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Set base scale
    pub fn with_base_scale(mut self, base_scale: f32) -> Self {
        self.base_scale = base_scale;
        self
    }

    /// Add a catalog entry
    pub fn with_model(mut self, id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.models.push(ModelEntry::new(id, path));
        self
    }

    /// Set the model chosen at startup
    pub fn with_default_model(mut self, id: impl Into<String>) -> Self {
        self.default_model = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_scale.is_finite() && self.base_scale > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base_scale must be positive, got {}",
                self.base_scale
            )));
        }
        if self.models.is_empty() {
            return Err(ConfigError::Invalid("model catalog is empty".into()));
        }
        for (i, entry) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|other| other.id == entry.id) {
                return Err(ConfigError::Invalid(format!("duplicate model id '{}'", entry.id)));
            }
        }
        if let Some(default) = &self.default_model {
            if !self.models.iter().any(|m| &m.id == default) {
                return Err(ConfigError::Invalid(format!(
                    "default model '{}' is not in the catalog",
                    default
                )));
            }
        }
        Ok(())
    }
}
