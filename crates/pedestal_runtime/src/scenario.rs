//! Scripted interaction scenarios
//!
//! A scenario is a TOML list of `[[step]]` tables replayed against a
//! headless session. Model loads requested by the session complete
//! immediately through [`HeadlessScene::load_template`].
//!
//! ```toml
//! [[step]]
//! action = "surface"
//! position = [0.0, 0.0, -2.0]
//!
//! [[step]]
//! action = "place"
//!
//! [[step]]
//! action = "advance"
//! ms = 500
//! ```
//!
//! With the plane tracker, `look` steps move the device instead and the
//! surface is wherever the view meets the floor:
//!
//! ```toml
//! [[step]]
//! action = "look"
//! position = [0.0, 1.5, 0.0]
//! pitch_deg = -45.0
//! ```

use std::path::Path;
use std::time::Duration;

use pedestal_input::{RawTouch, TouchTracker, UiNodeId};
use pedestal_interact::{HeadlessScene, InteractError, SceneBackend, Session, SessionEvent, TapOutcome};
use pedestal_math::{Mat4, Quat, Vec3};
use pedestal_xr::Pose;
use serde::Deserialize;
use thiserror::Error;

use crate::tracker::DeviceTracker;

pub type HeadlessSession = Session<HeadlessScene, DeviceTracker>;

/// Built-in scenario: place, drag, pinch, deselect, place again, delete
pub const DEMO: &str = r#"
[[step]]
action = "choose"
model = "chair"

[[step]]
action = "surface"
position = [0.0, 0.0, -2.14]

[[step]]
action = "place"

[[step]]
action = "advance"
ms = 600

[[step]]
action = "touch_start"
id = 1
x = 540.0
y = 960.0

[[step]]
action = "advance"
ms = 100

[[step]]
action = "touch_move"
id = 1
x = 640.0
y = 960.0

[[step]]
action = "touch_end"
id = 1

[[step]]
action = "touch_start"
id = 1
x = 440.0
y = 1100.0

[[step]]
action = "touch_start"
id = 2
x = 640.0
y = 1100.0

[[step]]
action = "touch_move"
id = 2
x = 740.0
y = 1100.0

[[step]]
action = "touch_end"
id = 2

[[step]]
action = "touch_end"
id = 1

[[step]]
action = "touch_start"
id = 3
x = 100.0
y = 200.0

[[step]]
action = "touch_end"
id = 3

[[step]]
action = "surface"
position = [0.8, 0.0, -2.5]
yaw_deg = 30.0

[[step]]
action = "place"

[[step]]
action = "advance"
ms = 200

[[step]]
action = "delete"
"#;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Step {step}: no region #{region}")]
    UnknownRegion { step: usize, region: usize },

    #[error("Session error: {0}")]
    Session(#[from] InteractError),
}

/// One scenario step
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Poll surface tracking once
    Frame,
    /// Report a surface hit (or none) and poll
    Surface {
        position: Option<[f32; 3]>,
        #[serde(default)]
        yaw_deg: f32,
    },
    /// Move the device camera and poll
    Look {
        position: [f32; 3],
        #[serde(default)]
        pitch_deg: f32,
        #[serde(default)]
        yaw_deg: f32,
    },
    Choose { model: String },
    Retry { model: String },
    Place,
    Delete,
    /// Add a UI region whose touches the engine ignores (or not)
    Region {
        #[serde(default = "default_true")]
        ignore: bool,
    },
    TouchStart {
        id: u64,
        x: f32,
        y: f32,
        region: Option<usize>,
    },
    TouchMove { id: u64, x: f32, y: f32 },
    TouchEnd { id: u64 },
    TouchCancel,
    /// Move the clock forward and run due animation ticks
    Advance { ms: u32 },
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn demo() -> Result<Self, ScenarioError> {
        Self::from_toml_str(DEMO)
    }
}

/// What a replay did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: usize,
    pub placed: usize,
    pub deleted: usize,
    pub taps: usize,
    /// Requests the session turned down
    pub declined: usize,
}

/// Replays scenarios against a headless session
pub struct ScenarioRunner<'a> {
    session: &'a mut HeadlessSession,
    touches: TouchTracker,
    regions: Vec<UiNodeId>,
    clock_ms: u32,
    summary: RunSummary,
}

impl<'a> ScenarioRunner<'a> {
    pub fn new(session: &'a mut HeadlessSession) -> Self {
        Self {
            session,
            touches: TouchTracker::new(),
            regions: Vec::new(),
            clock_ms: 0,
            summary: RunSummary::default(),
        }
    }

    pub fn run(mut self, scenario: &Scenario) -> Result<RunSummary, ScenarioError> {
        self.pump_events()?;
        for (index, step) in scenario.steps.iter().enumerate() {
            log::debug!("Step {}: {:?}", index, step);
            self.apply(index, step)?;
            self.pump_events()?;
            self.summary.steps += 1;
        }
        Ok(self.summary)
    }

    fn apply(&mut self, index: usize, step: &Step) -> Result<(), ScenarioError> {
        match step {
            Step::Frame => self.session.on_frame(),
            Step::Surface { position, yaw_deg } => {
                let hit = position.map(|[x, y, z]| {
                    Mat4::from_scale_rotation_translation(
                        Vec3::ONE,
                        Quat::from_rotation_y(yaw_deg.to_radians()),
                        Vec3::new(x, y, z),
                    )
                });
                if !self.session.tracker_mut().set_hit(hit) {
                    log::warn!("Step {}: tracker computes its own surface, hit ignored", index);
                }
                self.session.on_frame();
            }
            Step::Look {
                position,
                pitch_deg,
                yaw_deg,
            } => {
                let [x, y, z] = *position;
                let orientation =
                    Quat::from_rotation_y(yaw_deg.to_radians()) * Quat::from_rotation_x(pitch_deg.to_radians());
                let view = Pose::new(Vec3::new(x, y, z), orientation);

                let mut camera = self.session.scene().camera();
                camera.position = view.position;
                camera.rotation = view.orientation;
                self.session.scene_mut().set_camera(camera);
                if !self.session.tracker_mut().set_view_pose(view) {
                    log::warn!("Step {}: tracker ignores the view pose", index);
                }
                self.session.on_frame();
            }
            Step::Choose { model } => {
                let result = self.session.choose_model(model);
                self.check(result)?;
            }
            Step::Retry { model } => {
                let result = self.session.retry_model(model);
                self.check(result)?;
            }
            Step::Place => {
                let result = self.session.request_placement().map(|_| ());
                self.check(result)?;
            }
            Step::Delete => {
                let result = self.session.request_deletion().map(|_| ());
                self.check(result)?;
            }
            Step::Region { ignore } => {
                let region = self
                    .session
                    .regions_mut()
                    .add(None, *ignore)
                    .map_err(InteractError::from)?;
                self.regions.push(region);
            }
            Step::TouchStart { id, x, y, region } => {
                let target = match region {
                    Some(r) => Some(
                        *self
                            .regions
                            .get(*r)
                            .ok_or(ScenarioError::UnknownRegion { step: index, region: *r })?,
                    ),
                    None => None,
                };
                self.touch(RawTouch::Down {
                    id: *id,
                    x: *x,
                    y: *y,
                    target,
                    time_ms: self.clock_ms,
                });
            }
            Step::TouchMove { id, x, y } => self.touch(RawTouch::Motion {
                id: *id,
                x: *x,
                y: *y,
                time_ms: self.clock_ms,
            }),
            Step::TouchEnd { id } => self.touch(RawTouch::Up {
                id: *id,
                time_ms: self.clock_ms,
            }),
            Step::TouchCancel => self.touch(RawTouch::Cancel { time_ms: self.clock_ms }),
            Step::Advance { ms } => {
                self.clock_ms = self.clock_ms.saturating_add(*ms);
                self.session
                    .advance(Duration::from_millis(u64::from(self.clock_ms)));
            }
        }
        Ok(())
    }

    fn touch(&mut self, raw: RawTouch) {
        let Some(event) = self.touches.process(raw) else {
            log::warn!("Ignoring touch for unknown contact: {:?}", raw);
            return;
        };
        if let Some(outcome) = self.session.on_touch(&event) {
            self.summary.taps += 1;
            match outcome {
                TapOutcome::Selected(instance) => log::info!("Tap selected {}", instance),
                TapOutcome::Deselected => log::info!("Tap deselected"),
                TapOutcome::Orphaned(node) => log::warn!("Tap hit orphaned node {}", node),
            }
        }
    }

    /// Precondition failures are part of normal use; log and go on
    fn check(&mut self, result: pedestal_interact::Result<()>) -> Result<(), ScenarioError> {
        match result {
            Ok(()) => Ok(()),
            Err(
                e @ (InteractError::SurfaceNotFound
                | InteractError::NoModelChosen
                | InteractError::UnknownModel(_)
                | InteractError::AssetNotReady(_)
                | InteractError::AssetFailed { .. }
                | InteractError::NothingSelected),
            ) => {
                log::warn!("Request declined: {}", e);
                self.summary.declined += 1;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Serve load requests and log status events
    fn pump_events(&mut self) -> Result<(), ScenarioError> {
        loop {
            let events = self.session.drain_events();
            if events.is_empty() {
                return Ok(());
            }
            for event in events {
                match event {
                    SessionEvent::LoadRequested(model) => {
                        let result = match self.session.model_path(&model).map(Path::to_path_buf) {
                            Some(path) => self.session.scene_mut().load_template(&path),
                            None => Err(format!("no path for model '{}'", model)),
                        };
                        self.session.finish_load(&model, result)?;
                    }
                    SessionEvent::Placed(_) => self.summary.placed += 1,
                    SessionEvent::Deleted(_) => self.summary.deleted += 1,
                    SessionEvent::Instruction(instruction) => {
                        log::info!("Instruction: {:?}", instruction)
                    }
                    other => log::debug!("Event: {:?}", other),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot_config::CameraConfig;
    use crate::tracker::{TrackerConfig, TrackerKind};
    use approx::assert_abs_diff_eq;
    use pedestal_interact::{AssetState, Instruction, SessionConfig};

    fn session_with(kind: TrackerKind) -> HeadlessSession {
        let config = SessionConfig::default()
            .with_model("chair", "models/chair.glb")
            .with_model("broken", "models/broken.obj")
            .with_default_model("chair");
        let camera = CameraConfig::default();
        let tracker_config = TrackerConfig {
            kind,
            ..Default::default()
        };
        let tracker = DeviceTracker::from_config(&tracker_config, camera.view_pose());
        Session::new(config, HeadlessScene::new().with_camera(camera.to_camera()), tracker).unwrap()
    }

    fn session() -> HeadlessSession {
        session_with(TrackerKind::Scripted)
    }

    #[test]
    fn test_demo_scenario() {
        let mut session = session();
        let scenario = Scenario::demo().unwrap();
        let summary = ScenarioRunner::new(&mut session).run(&scenario).unwrap();

        assert_eq!(summary.steps, scenario.steps.len());
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.deleted, 1);
        assert_eq!(summary.taps, 1);
        assert_eq!(summary.declined, 0);
        assert_eq!(session.instances().count(), 1);
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn test_declined_requests_are_counted() {
        let mut session = session();
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "place"

            [[step]]
            action = "delete"

            [[step]]
            action = "choose"
            model = "sofa"
            "#,
        )
        .unwrap();
        let summary = ScenarioRunner::new(&mut session).run(&scenario).unwrap();
        assert_eq!(summary.declined, 3);
        assert_eq!(summary.placed, 0);
        assert_eq!(session.instruction(), Some(&Instruction::Scanning));
    }

    #[test]
    fn test_loader_failure_reaches_session() {
        let mut session = session();
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "choose"
            model = "broken"
            "#,
        )
        .unwrap();
        ScenarioRunner::new(&mut session).run(&scenario).unwrap();
        assert!(matches!(session.asset_state("broken"), Some(AssetState::Failed(_))));
        assert!(matches!(session.asset_state("chair"), Some(AssetState::Ready(_))));
    }

    #[test]
    fn test_touch_on_ignored_region_is_not_a_tap() {
        let mut session = session();
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "region"

            [[step]]
            action = "touch_start"
            id = 1
            x = 100.0
            y = 200.0
            region = 0

            [[step]]
            action = "touch_end"
            id = 1
            "#,
        )
        .unwrap();
        let summary = ScenarioRunner::new(&mut session).run(&scenario).unwrap();
        assert_eq!(summary.taps, 0);
    }

    #[test]
    fn test_unknown_region_fails() {
        let mut session = session();
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "touch_start"
            id = 1
            x = 0.0
            y = 0.0
            region = 4
            "#,
        )
        .unwrap();
        assert!(matches!(
            ScenarioRunner::new(&mut session).run(&scenario),
            Err(ScenarioError::UnknownRegion { step: 0, region: 4 })
        ));
    }

    #[test]
    fn test_plane_tracker_places_where_device_looks() {
        let mut session = session_with(TrackerKind::Plane);
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "choose"
            model = "chair"

            [[step]]
            action = "look"
            position = [0.0, 1.5, 0.0]
            pitch_deg = -45.0

            [[step]]
            action = "place"

            [[step]]
            action = "surface"
            position = [5.0, 0.0, 5.0]

            [[step]]
            action = "look"
            position = [0.0, 1.5, 0.0]
            pitch_deg = -45.0
            yaw_deg = 90.0

            [[step]]
            action = "place"
            "#,
        )
        .unwrap();
        let summary = ScenarioRunner::new(&mut session).run(&scenario).unwrap();
        assert_eq!(summary.placed, 2);
        assert_eq!(summary.declined, 0);

        let mut positions: Vec<Vec3> = session.instances().map(|i| i.transform.position).collect();
        positions.sort_by(|a, b| a.x.total_cmp(&b.x));
        // Turning left by 90 degrees looks down -X
        assert_abs_diff_eq!(positions[0].x, -1.5, epsilon = 1e-3);
        assert_abs_diff_eq!(positions[0].z, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(positions[1].x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(positions[1].z, -1.5, epsilon = 1e-3);
        assert_abs_diff_eq!(session.scene().camera().position.y, 1.5);
    }

    #[test]
    fn test_plane_tracker_finds_nothing_at_horizon() {
        let mut session = session_with(TrackerKind::Plane);
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "look"
            position = [0.0, 1.5, 0.0]

            [[step]]
            action = "place"
            "#,
        )
        .unwrap();
        let summary = ScenarioRunner::new(&mut session).run(&scenario).unwrap();
        assert_eq!(summary.declined, 1);
        assert_eq!(session.instances().count(), 0);
    }

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[step]]
            action = "surface"

            [[step]]
            action = "advance"
            ms = 16
            "#,
        )
        .unwrap();
        assert_eq!(
            scenario.steps,
            vec![
                Step::Surface { position: None, yaw_deg: 0.0 },
                Step::Advance { ms: 16 },
            ]
        );
    }
}
