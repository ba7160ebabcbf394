//! Pedestal Runtime
//!
//! Boots a placement session against the headless scene and the configured
//! surface tracker (scripted hits or a floor plane), replays a touch scenario and reports where everything
//! ended up.
//!
//! Run with: cargo run -p pedestal_runtime -- [config.toml] [--debug]
//!       or: cargo run --bin pedestal

mod boot_config;
mod scenario;
mod tracker;

use boot_config::BootConfig;
use pedestal_interact::{ConfigError, HeadlessScene, InteractError, Session};
use scenario::{Scenario, ScenarioError, ScenarioRunner};
use thiserror::Error;
use tracker::DeviceTracker;

#[derive(Error, Debug)]
enum RuntimeError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] InteractError),

    #[error("Scenario error: {0}")]
    Scenario(#[from] ScenarioError),
}

fn main() {
    // Configuration decides the log level, so it loads first
    let config = BootConfig::load();
    let filter = config.as_ref().map_or("info", BootConfig::log_filter);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC: {}", panic_info);
    }));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load boot configuration: {}", e);
            std::process::exit(2);
        }
    };
    config.print_summary();

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &BootConfig) -> Result<(), RuntimeError> {
    let scenario = match &config.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::demo()?,
    };

    let scene = HeadlessScene::new().with_camera(config.camera.to_camera());
    let tracker = DeviceTracker::from_config(&config.tracker, config.camera.view_pose());
    let mut session = Session::new(config.session.clone(), scene, tracker)?;

    let summary = ScenarioRunner::new(&mut session).run(&scenario)?;
    log::info!(
        "Replayed {} steps: {} placed, {} deleted, {} taps, {} declined",
        summary.steps,
        summary.placed,
        summary.deleted,
        summary.taps,
        summary.declined
    );

    for instance in session.instances() {
        let t = &instance.transform;
        log::info!(
            "  {} '{}': position ({:.3}, {:.3}, {:.3}), yaw {:.1} deg, scale {:.3}",
            instance.id,
            instance.model,
            t.position.x,
            t.position.y,
            t.position.z,
            t.rotation.yaw().unwrap_or(0.0).to_degrees(),
            t.scale
        );
    }
    if let Some(selected) = session.selected() {
        log::info!("  Selected: {}", selected);
    }

    session.shutdown();
    log::info!("Session shut down");
    Ok(())
}
