//! Error types for the interaction engine

use pedestal_core::HierarchyError;
use thiserror::Error;

use crate::assets::ModelId;
use crate::scene::TemplateId;

/// Interaction errors.
///
/// None of these end the session; they explain why a request was declined.
#[derive(Debug, Error)]
pub enum InteractError {
    /// Placement requested while no surface is under the reticle
    #[error("No surface found under the reticle")]
    SurfaceNotFound,

    /// Placement requested before any model was chosen
    #[error("No model chosen")]
    NoModelChosen,

    /// Model id missing from the catalog
    #[error("Unknown model: {0}")]
    UnknownModel(ModelId),

    /// Model still loading (or load just requested)
    #[error("Model {0} is not loaded yet")]
    AssetNotReady(ModelId),

    /// Model failed to load and has not been retried
    #[error("Model {model} failed to load: {reason}")]
    AssetFailed { model: ModelId, reason: String },

    /// Operation needs a selection
    #[error("Nothing is selected")]
    NothingSelected,

    /// Scene node could not be indexed
    #[error("Hierarchy index rejected node: {0}")]
    Hierarchy(#[from] HierarchyError),

    /// Rendering collaborator failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors reported by a [`SceneBackend`](crate::scene::SceneBackend)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// Template handle not known to the backend
    #[error("Unknown model template: {0}")]
    UnknownTemplate(TemplateId),

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Result type for interaction operations
pub type Result<T> = std::result::Result<T, InteractError>;
