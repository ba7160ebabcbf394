//! Placement session
//!
//! [`Session`] owns all mutable interaction state: the placed instances,
//! their hierarchy index, the selection, gesture and animation state, the
//! asset cache and surface tracking. Hosts drive it from one thread:
//!
//! - UI: [`choose_model`](Session::choose_model),
//!   [`request_placement`](Session::request_placement),
//!   [`request_deletion`](Session::request_deletion),
//!   [`retry_model`](Session::retry_model)
//! - asset loader: [`finish_load`](Session::finish_load)
//! - platform: [`on_touch`](Session::on_touch), [`on_frame`](Session::on_frame),
//!   [`advance`](Session::advance)
//!
//! Status goes out through [`SessionEvent`]s.

use std::collections::BTreeMap;
use std::time::Duration;

use pedestal_core::Hierarchy;
use pedestal_input::{InputRegions, TouchEvent};
use pedestal_xr::{ReticleChange, SurfaceReticle, SurfaceTracker, TrackingSystem};

use crate::animation::{AnimationScheduler, EntryAnimation};
use crate::assets::{AssetCache, AssetState, ModelId};
use crate::config::SessionConfig;
use crate::error::{InteractError, Result};
use crate::events::{Instruction, ModelStatus, Notifier, SessionEvent};
use crate::gesture::{GestureMode, GestureRecognizer};
use crate::placement::{InstanceId, PlacedInstance, PlacementController};
use crate::scene::{NodeId, SceneBackend, SpawnedModel, TemplateId};
use crate::selection::SelectionManager;
use crate::tap::{route_tap, TapOutcome};

pub struct Session<S: SceneBackend, T: SurfaceTracker> {
    scene: S,
    tracking: TrackingSystem<T>,
    regions: InputRegions,
    assets: AssetCache,
    placement: PlacementController,
    selection: SelectionManager,
    gestures: GestureRecognizer,
    animations: AnimationScheduler,
    placed: BTreeMap<InstanceId, PlacedInstance>,
    index: Hierarchy<NodeId>,
    notifier: Notifier,
    clock: Duration,
}

impl<S: SceneBackend, T: SurfaceTracker> Session<S, T> {
    /// Create a session. Starts loading the default model if one is set.
    pub fn new(config: SessionConfig, scene: S, tracker: T) -> Result<Self> {
        config.validate()?;

        let mut session = Self {
            scene,
            tracking: TrackingSystem::new(tracker),
            regions: InputRegions::new(),
            assets: AssetCache::from_catalog(&config.models),
            placement: PlacementController::new(config.base_scale),
            selection: SelectionManager::new(),
            gestures: GestureRecognizer::new(),
            animations: AnimationScheduler::new(),
            placed: BTreeMap::new(),
            index: Hierarchy::new(),
            notifier: Notifier::new(),
            clock: Duration::ZERO,
        };

        log::info!(
            "Session started with {} model(s), base scale {}",
            session.assets.len(),
            config.base_scale
        );
        session.notifier.instruct(Instruction::Scanning);
        if let Some(model) = config.default_model {
            session.choose_model(&model)?;
        }
        Ok(session)
    }

    // UI-facing operations

    /// Choose the model for subsequent placements, loading it if needed
    pub fn choose_model(&mut self, model: &str) -> Result<()> {
        if !self.assets.contains(model) {
            log::warn!("Cannot choose unknown model '{}'", model);
            return Err(InteractError::UnknownModel(model.to_owned()));
        }
        log::info!("Model '{}' chosen", model);
        self.placement.choose(model.to_owned());
        if self.assets.state(model) == Some(&AssetState::Unloaded) {
            self.request_load(model);
        }
        self.update_instruction();
        Ok(())
    }

    /// Place the chosen model on the surface under the reticle
    pub fn request_placement(&mut self) -> Result<InstanceId> {
        let pose = self
            .tracking
            .reticle()
            .current_pose()
            .ok_or(InteractError::SurfaceNotFound)?;
        let model = self
            .placement
            .chosen()
            .cloned()
            .ok_or(InteractError::NoModelChosen)?;
        let template = self.ready_template(&model)?;

        self.deselect();

        let spawned = self.scene.clone_model(template)?;
        let root = spawned.root;
        if let Err(e) = self.index_spawned(&spawned) {
            self.index.remove_subtree(root);
            self.scene.dispose(root);
            return Err(e.into());
        }

        let camera = self.scene.camera();
        let mut transform = self.placement.placement_transform(&pose, camera.position);
        let animation = EntryAnimation::new(transform.scale);
        transform.scale = animation.current();
        self.scene.set_transform(root, &transform);
        self.placed.insert(
            root,
            PlacedInstance {
                id: root,
                model: model.clone(),
                transform,
            },
        );

        log::info!(
            "Placed '{}' as {} at ({:.3}, {:.3}, {:.3})",
            model,
            root,
            transform.position.x,
            transform.position.y,
            transform.position.z
        );
        self.notifier.notify(SessionEvent::Placed(root));
        self.select(root);
        self.animations.start(root, animation, self.clock);
        Ok(root)
    }

    /// Delete the selected instance
    pub fn request_deletion(&mut self) -> Result<InstanceId> {
        let instance = self.selection.selected().ok_or(InteractError::NothingSelected)?;
        self.delete_instance(instance);
        Ok(instance)
    }

    /// Reset a failed model and load it again
    pub fn retry_model(&mut self, model: &str) -> Result<()> {
        if !self.assets.contains(model) {
            return Err(InteractError::UnknownModel(model.to_owned()));
        }
        if self.assets.reset_failed(model) {
            log::info!("Retrying model '{}'", model);
            self.request_load(model);
            self.update_instruction();
        } else {
            log::debug!("Model '{}' has not failed, nothing to retry", model);
        }
        Ok(())
    }

    /// Completion callback of the asset loader
    pub fn finish_load(&mut self, model: &str, result: std::result::Result<TemplateId, String>) -> Result<()> {
        if !self.assets.contains(model) {
            return Err(InteractError::UnknownModel(model.to_owned()));
        }
        let model = model.to_owned();
        let status = match &result {
            Ok(_) => {
                log::info!("Model '{}' ready", model);
                ModelStatus::Ready
            }
            Err(reason) => {
                log::warn!("Model '{}' failed to load: {}", model, reason);
                ModelStatus::Error(reason.clone())
            }
        };
        self.assets.finish_load(&model, result);
        self.notifier.model_status(&model, status);
        self.update_instruction();
        Ok(())
    }

    // Host callbacks

    /// Feed one touch event. Returns how a completed tap was resolved.
    pub fn on_touch(&mut self, event: &TouchEvent) -> Option<TapOutcome> {
        let selected = self.selection.selected();
        let target = selected
            .and_then(|id| self.placed.get_mut(&id))
            .map(|instance| &mut instance.transform);
        let camera = self.scene.camera();
        let output = self.gestures.handle(event, target, &camera, &self.regions);

        if output.transformed {
            if let Some(instance) = selected.and_then(|id| self.placed.get(&id)) {
                self.scene.set_transform(instance.id, &instance.transform);
            }
        }

        let point = output.tap?;
        let roots: Vec<InstanceId> = self.placed.keys().copied().collect();
        let outcome = route_tap(&self.scene, point, &roots, &self.index);
        match outcome {
            TapOutcome::Selected(instance) => self.select(instance),
            TapOutcome::Deselected | TapOutcome::Orphaned(_) => self.deselect(),
        }
        Some(outcome)
    }

    /// Per-frame update: surface tracking and highlight refresh
    pub fn on_frame(&mut self) {
        match self.tracking.update() {
            ReticleChange::Found => {
                log::debug!("Surface found");
                self.update_instruction();
            }
            ReticleChange::Lost => {
                log::debug!("Surface lost");
                self.update_instruction();
            }
            ReticleChange::Unchanged => {}
        }
        self.selection.refresh(&mut self.scene);
    }

    /// Run the entry animation ticks due by `now`
    pub fn advance(&mut self, now: Duration) {
        self.clock = self.clock.max(now);
        let placed = &self.placed;
        let ticks = self.animations.advance(self.clock, |id| placed.contains_key(&id));

        for tick in ticks {
            let Some(instance) = self.placed.get_mut(&tick.instance) else {
                continue;
            };
            instance.transform.scale = tick.scale;
            self.scene.set_transform(instance.id, &instance.transform);
            if self.selection.is_selected(tick.instance) {
                self.selection.refresh(&mut self.scene);
            }
            if tick.finished {
                log::debug!("Entry animation of {} finished", tick.instance);
            }
        }
    }

    /// Tear down: delete every instance and dispose the highlight
    pub fn shutdown(&mut self) {
        let ids: Vec<InstanceId> = self.placed.keys().copied().collect();
        for id in ids {
            self.delete_instance(id);
        }
        self.animations.cancel_all();
        self.selection.dispose(&mut self.scene);
        self.gestures.reset();
        self.index.clear();
        log::info!("Session shut down");
    }

    // Selection

    /// Select a placed instance
    pub fn select(&mut self, instance: InstanceId) {
        if !self.placed.contains_key(&instance) {
            log::warn!("Cannot select {}: not a placed instance", instance);
            return;
        }
        let changed = !self.selection.is_selected(instance);
        self.selection.select(instance, &mut self.scene, &mut self.notifier);
        if changed {
            // Gestures in flight continue on the new selection from its own transform
            if let Some(selected) = self.placed.get(&instance) {
                self.gestures.rebaseline(&selected.transform);
            }
        }
    }

    /// Clear the selection and restore placement guidance
    pub fn deselect(&mut self) {
        if self.selection.deselect(&mut self.scene, &mut self.notifier) {
            self.update_instruction();
        }
    }

    /// Remove an instance from the scene and release its resources
    pub fn delete_instance(&mut self, instance: InstanceId) -> bool {
        if !self.placed.contains_key(&instance) {
            return false;
        }
        if self.selection.is_selected(instance) {
            self.deselect();
        }
        self.animations.cancel(instance);
        self.placed.remove(&instance);
        self.index.remove_subtree(instance);
        self.scene.dispose(instance);

        log::info!("Deleted {}", instance);
        self.notifier.notify(SessionEvent::Deleted(instance));
        true
    }

    // Accessors

    /// Pending events, oldest first
    pub fn drain_events(&self) -> Vec<SessionEvent> {
        self.notifier.drain()
    }

    /// A receiver of its own for a consumer on another thread. It sees
    /// every later event, independently of [`drain_events`](Self::drain_events).
    pub fn subscribe(&mut self) -> crossbeam_channel::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.selection.selected()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn instance(&self, id: InstanceId) -> Option<&PlacedInstance> {
        self.placed.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &PlacedInstance> {
        self.placed.values()
    }

    pub fn gesture_mode(&self) -> &GestureMode {
        self.gestures.mode()
    }

    pub fn reticle(&self) -> &SurfaceReticle {
        self.tracking.reticle()
    }

    pub fn asset_state(&self, model: &str) -> Option<&AssetState> {
        self.assets.state(model)
    }

    /// Catalog path of a model, for the asset loader
    pub fn model_path(&self, model: &str) -> Option<&std::path::Path> {
        self.assets.path(model)
    }

    pub fn chosen_model(&self) -> Option<&ModelId> {
        self.placement.chosen()
    }

    pub fn instruction(&self) -> Option<&Instruction> {
        self.notifier.instruction()
    }

    pub fn delete_visible(&self) -> bool {
        self.notifier.delete_visible()
    }

    pub fn is_animating(&self, instance: InstanceId) -> bool {
        self.animations.is_animating(instance)
    }

    pub fn index(&self) -> &Hierarchy<NodeId> {
        &self.index
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn tracker_mut(&mut self) -> &mut T {
        self.tracking.backend_mut()
    }

    pub fn regions(&self) -> &InputRegions {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut InputRegions {
        &mut self.regions
    }

    // Internals

    /// Template of a ready model, or why placement must wait
    fn ready_template(&mut self, model: &str) -> Result<TemplateId> {
        match self.assets.state(model).cloned() {
            None => Err(InteractError::UnknownModel(model.to_owned())),
            Some(AssetState::Ready(template)) => Ok(template),
            Some(AssetState::Unloaded) => {
                self.request_load(model);
                self.update_instruction();
                Err(InteractError::AssetNotReady(model.to_owned()))
            }
            Some(AssetState::Loading) => {
                log::warn!("Placement declined: '{}' is still loading", model);
                self.notifier.model_status(&model.to_owned(), ModelStatus::Loading);
                Err(InteractError::AssetNotReady(model.to_owned()))
            }
            Some(AssetState::Failed(reason)) => {
                log::warn!("Placement declined: '{}' failed to load", model);
                Err(InteractError::AssetFailed {
                    model: model.to_owned(),
                    reason,
                })
            }
        }
    }

    fn request_load(&mut self, model: &str) {
        if self.assets.begin_load(model) {
            log::info!("Loading model '{}'", model);
            let model = model.to_owned();
            self.notifier.model_status(&model, ModelStatus::Loading);
            self.notifier.notify(SessionEvent::LoadRequested(model));
        }
    }

    fn index_spawned(&mut self, spawned: &SpawnedModel) -> std::result::Result<(), pedestal_core::HierarchyError> {
        self.index.insert(spawned.root, None)?;
        for &(node, parent) in &spawned.nodes {
            self.index.insert(node, Some(parent))?;
        }
        Ok(())
    }

    /// Instruction matching the current state
    fn guidance(&self) -> Instruction {
        if self.selection.selected().is_some() {
            return Instruction::Manipulate;
        }
        if let Some(model) = self.placement.chosen() {
            if self.assets.state(model) == Some(&AssetState::Loading) {
                return Instruction::Loading(model.clone());
            }
        }
        if self.tracking.reticle().visible {
            Instruction::ReadyToPlace
        } else {
            Instruction::Scanning
        }
    }

    fn update_instruction(&mut self) {
        let instruction = self.guidance();
        self.notifier.instruct(instruction);
    }
}
