//! # pedestal_interact - Placement & Manipulation Engine
//!
//! Turns surface hits and raw multi-touch streams into placed, selected and
//! manipulated model instances:
//!
//! - **Placement**: clone the chosen model onto the surface under the
//!   reticle, facing the camera, growing in with an entry animation
//! - **Selection**: one selected instance at a time, with a highlight box
//! - **Gestures**: drag (1 finger), pinch scale/rotate (2), lift (3)
//! - **Taps**: select the instance under the finger, or deselect
//!
//! Rendering, tracking and asset loading stay with the host behind
//! [`SceneBackend`], [`SurfaceTracker`](pedestal_xr::SurfaceTracker) and
//! [`SessionEvent::LoadRequested`] / [`Session::finish_load`].
//!
//! ## Example
//!
//! ```ignore
//! use pedestal_interact::prelude::*;
//!
//! let config = SessionConfig::default().with_model("chair", "chair.glb");
//! let mut session = Session::new(config, HeadlessScene::new(), ScriptedTracker::new())?;
//! session.choose_model("chair")?;
//!
//! for event in session.drain_events() {
//!     if let SessionEvent::LoadRequested(model) = event {
//!         let template = loader.load(&model);
//!         session.finish_load(&model, template)?;
//!     }
//! }
//!
//! session.on_frame();
//! let instance = session.request_placement()?;
//! ```

pub mod animation;
pub mod assets;
pub mod config;
pub mod error;
pub mod events;
pub mod gesture;
pub mod headless;
pub mod placement;
pub mod scene;
pub mod selection;
pub mod session;
pub mod tap;

pub use assets::{AssetCache, AssetState, ModelId};
pub use config::{ModelEntry, SessionConfig};
pub use error::{ConfigError, InteractError, Result, SceneError};
pub use events::{EventChannel, Instruction, ModelStatus, SessionEvent};
pub use gesture::{GestureMode, GestureRecognizer};
pub use headless::HeadlessScene;
pub use placement::{InstanceId, PlacedInstance};
pub use scene::{Camera, NodeId, SceneBackend, SceneHit, SpawnedModel, TemplateId};
pub use session::Session;
pub use tap::TapOutcome;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::assets::{AssetState, ModelId};
    pub use crate::config::SessionConfig;
    pub use crate::error::{InteractError, Result};
    pub use crate::events::{Instruction, ModelStatus, SessionEvent};
    pub use crate::gesture::GestureMode;
    pub use crate::headless::HeadlessScene;
    pub use crate::placement::InstanceId;
    pub use crate::scene::{Camera, SceneBackend};
    pub use crate::session::Session;
    pub use crate::tap::TapOutcome;
    pub use pedestal_input::{TouchEvent, TouchPoint};
    pub use pedestal_xr::{ScriptedTracker, SurfaceTracker};
}
