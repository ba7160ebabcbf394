//! Selection manager
//!
//! At most one placed instance is selected. The highlight is created on
//! first use, hidden (never destroyed) on deselect, and destroyed only when
//! the session shuts down.

use crate::events::{Instruction, Notifier, SessionEvent};
use crate::placement::InstanceId;
use crate::scene::{HighlightId, SceneBackend};

#[derive(Debug, Default)]
pub struct SelectionManager {
    selected: Option<InstanceId>,
    highlight: Option<HighlightId>,
    highlight_visible: bool,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<InstanceId> {
        self.selected
    }

    pub fn is_selected(&self, instance: InstanceId) -> bool {
        self.selected == Some(instance)
    }

    pub fn highlight(&self) -> Option<HighlightId> {
        self.highlight
    }

    pub fn highlight_visible(&self) -> bool {
        self.highlight_visible
    }

    /// Select `instance`, deselecting any other instance first
    pub fn select<S: SceneBackend>(&mut self, instance: InstanceId, scene: &mut S, notifier: &mut Notifier) {
        if self.selected == Some(instance) {
            self.refresh(scene);
            return;
        }
        if self.selected.is_some() {
            self.release(scene);
        }

        let highlight = match self.highlight {
            Some(h) => h,
            None => {
                let h = scene.create_highlight();
                self.highlight = Some(h);
                h
            }
        };
        scene.fit_highlight(highlight, instance);
        scene.set_highlight_visible(highlight, true);
        self.highlight_visible = true;
        self.selected = Some(instance);

        log::debug!("Selected {}", instance);
        notifier.notify(SessionEvent::SelectionChanged(Some(instance)));
        notifier.show_delete(true);
        notifier.instruct(Instruction::Manipulate);
    }

    /// Clear the selection. Returns false when nothing was selected.
    ///
    /// Restoring the placement guidance text is up to the caller, which
    /// knows whether a surface is currently found.
    pub fn deselect<S: SceneBackend>(&mut self, scene: &mut S, notifier: &mut Notifier) -> bool {
        let Some(previous) = self.release(scene) else {
            return false;
        };
        log::debug!("Deselected {}", previous);
        notifier.notify(SessionEvent::SelectionChanged(None));
        notifier.show_delete(false);
        true
    }

    /// Refit the highlight to the selection's current bounds
    pub fn refresh<S: SceneBackend>(&self, scene: &mut S) {
        if let (Some(instance), Some(highlight)) = (self.selected, self.highlight) {
            scene.fit_highlight(highlight, instance);
        }
    }

    /// Destroy the highlight for good
    pub fn dispose<S: SceneBackend>(&mut self, scene: &mut S) {
        self.release(scene);
        if let Some(highlight) = self.highlight.take() {
            scene.destroy_highlight(highlight);
        }
    }

    fn release<S: SceneBackend>(&mut self, scene: &mut S) -> Option<InstanceId> {
        let previous = self.selected.take()?;
        if let Some(highlight) = self.highlight {
            scene.set_highlight_visible(highlight, false);
        }
        self.highlight_visible = false;
        Some(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessScene, SceneCall};
    use pedestal_math::AABB;

    fn spawn(scene: &mut HeadlessScene) -> InstanceId {
        let template = scene.add_template(AABB::new(pedestal_math::Vec3::ZERO, pedestal_math::Vec3::ONE));
        scene.clone_model(template).unwrap().root
    }

    #[test]
    fn test_select_switches_and_reuses_highlight() {
        let mut scene = HeadlessScene::new();
        let mut notifier = Notifier::new();
        let mut selection = SelectionManager::new();
        let a = spawn(&mut scene);
        let b = spawn(&mut scene);

        selection.select(a, &mut scene, &mut notifier);
        let highlight = selection.highlight().unwrap();
        selection.select(b, &mut scene, &mut notifier);

        assert_eq!(selection.selected(), Some(b));
        assert_eq!(selection.highlight(), Some(highlight));
        assert_eq!(scene.count_calls(|c| matches!(c, SceneCall::CreateHighlight(_))), 1);
        assert!(scene.highlight_state(highlight).unwrap().visible);
        assert!(notifier.delete_visible());
    }

    #[test]
    fn test_deselect_hides_without_destroying() {
        let mut scene = HeadlessScene::new();
        let mut notifier = Notifier::new();
        let mut selection = SelectionManager::new();
        assert!(!selection.deselect(&mut scene, &mut notifier));

        let a = spawn(&mut scene);
        selection.select(a, &mut scene, &mut notifier);
        assert!(selection.deselect(&mut scene, &mut notifier));

        let highlight = selection.highlight().unwrap();
        assert!(!scene.highlight_state(highlight).unwrap().visible);
        assert!(!selection.highlight_visible());
        assert!(!notifier.delete_visible());
        assert_eq!(
            notifier.drain().last(),
            Some(&SessionEvent::DeleteAffordance(false))
        );

        selection.dispose(&mut scene);
        assert!(scene.highlight_state(highlight).is_none());
    }
}
