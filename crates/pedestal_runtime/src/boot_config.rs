//! Boot Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: `pedestal path/to/config.toml`
//! 2. Environment variable: `PEDESTAL_CONFIG=path/to/config.toml`
//! 3. `pedestal.toml` in the working directory
//! 4. Built-in defaults (a one-model demo catalog)
//!
//! `PEDESTAL_DEBUG` (or `--debug`) forces debug logging and
//! `PEDESTAL_SCENARIO` overrides the scenario path.
//!
//! # Example Config File
//!
//! ```toml
//! debug = false
//! scenario = "scenarios/demo.toml"
//!
//! [camera]
//! height = 1.5
//! pitch_deg = -35.0
//! width = 1080
//! viewport_height = 1920
//!
//! [tracker]
//! kind = "plane"
//! floor_height = 0.0
//!
//! [session]
//! base_scale = 0.5
//! default_model = "chair"
//!
//! [[session.models]]
//! id = "chair"
//! path = "models/chair.glb"
//! ```

use std::path::{Path, PathBuf};

use pedestal_interact::{Camera, ConfigError, SessionConfig};
use pedestal_math::{Quat, Vec3};
use pedestal_xr::Pose;
use serde::{Deserialize, Serialize};

use crate::tracker::TrackerConfig;

const DEFAULT_CONFIG_FILE: &str = "pedestal.toml";

/// Device camera of the headless scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye height above the floor in meters
    pub height: f32,
    /// Downward tilt in degrees (negative looks down)
    pub pitch_deg: f32,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    /// Vertical field of view in degrees
    pub fov_deg: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 1.5,
            pitch_deg: -35.0,
            width: 1080,
            viewport_height: 1920,
            fov_deg: 60.0,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera {
            position: Vec3::new(0.0, self.height, 0.0),
            rotation: Quat::from_rotation_x(self.pitch_deg.to_radians()),
            fov_y: self.fov_deg.to_radians(),
            viewport: pedestal_math::Vec2::new(self.width as f32, self.viewport_height as f32),
        }
    }

    /// Device pose at boot
    pub fn view_pose(&self) -> Pose {
        let camera = self.to_camera();
        Pose::new(camera.position, camera.rotation)
    }
}

/// Complete boot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Placement session settings
    pub session: SessionConfig,
    /// Device camera
    pub camera: CameraConfig,
    /// Surface tracking backend
    pub tracker: TrackerConfig,
    /// Enable debug logging
    pub debug: bool,
    /// Scenario to replay; the built-in demo when unset
    pub scenario: Option<PathBuf>,
    /// Config file this was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default()
                .with_model("chair", "models/chair.glb")
                .with_default_model("chair"),
            camera: CameraConfig::default(),
            tracker: TrackerConfig::default(),
            debug: false,
            scenario: None,
            config_path: None,
        }
    }
}

impl BootConfig {
    /// Load boot configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_sources(std::env::args().skip(1), |key| std::env::var(key).ok())
    }

    /// Load from explicit arguments and an environment lookup
    pub fn from_sources<I, E>(args: I, env: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut debug_flag = false;
        let mut path_arg = None;
        for arg in args {
            if arg == "--debug" {
                debug_flag = true;
            } else if arg.starts_with("--") {
                continue;
            } else if path_arg.is_none() {
                path_arg = Some(PathBuf::from(arg));
            }
        }

        // 1-3. Config file
        let explicit = path_arg.or_else(|| env("PEDESTAL_CONFIG").filter(|p| !p.is_empty()).map(PathBuf::from));
        let mut config = match explicit {
            Some(path) => Self::load_from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => Self::default(),
        };

        // Environment overrides
        if debug_flag || env("PEDESTAL_DEBUG").is_some_and(|v| v != "0" && v != "false") {
            config.debug = true;
        }
        if let Some(scenario) = env("PEDESTAL_SCENARIO").filter(|p| !p.is_empty()) {
            config.scenario = Some(PathBuf::from(scenario));
        }

        config.session.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        config.config_path = Some(path.to_path_buf());

        // Relative scenario paths are relative to the config file
        if let (Some(scenario), Some(dir)) = (&config.scenario, path.parent()) {
            if scenario.is_relative() {
                config.scenario = Some(dir.join(scenario));
            }
        }
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Log filter implied by the config
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    /// Log configuration summary
    pub fn print_summary(&self) {
        log::info!("=== Boot Configuration ===");
        match &self.config_path {
            Some(path) => log::info!("  Config: {}", path.display()),
            None => log::info!("  Config: built-in defaults"),
        }
        log::info!("  Models: {}", self.session.models.len());
        log::info!("  Base scale: {}", self.session.base_scale);
        log::info!(
            "  Camera: {:.2} m high, pitch {:.1} deg, {}x{}",
            self.camera.height,
            self.camera.pitch_deg,
            self.camera.width,
            self.camera.viewport_height
        );
        log::info!("  Tracker: {:?}", self.tracker.kind);
        match &self.scenario {
            Some(path) => log::info!("  Scenario: {}", path.display()),
            None => log::info!("  Scenario: built-in demo"),
        }
        log::info!("  Debug: {}", self.debug);
        log::info!("==========================");
    }
}
