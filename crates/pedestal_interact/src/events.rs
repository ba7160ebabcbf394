//! Outgoing status events
//!
//! The UI (buttons, instruction text) and the asset loader are driven by
//! events drained from the session. The channel is an unbounded crossbeam
//! pair, so a consumer may hold its own receiver on another thread.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::assets::ModelId;
use crate::placement::InstanceId;

/// Load status of a model, as shown on its button
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Loading,
    Ready,
    Error(String),
}

/// Instruction text shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// No surface found yet: move the device around
    Scanning,
    /// Surface found and nothing selected: tap to place
    ReadyToPlace,
    /// Selection active: drag, pinch, lift
    Manipulate,
    /// Chosen model is being loaded
    Loading(ModelId),
}

/// Event emitted by a session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Model load status changed
    ModelStatus { model: ModelId, status: ModelStatus },
    /// The asset loader should load this model and report back
    LoadRequested(ModelId),
    /// Instruction text changed
    Instruction(Instruction),
    /// Show or hide the delete button
    DeleteAffordance(bool),
    /// Selection changed
    SelectionChanged(Option<InstanceId>),
    /// A new instance was placed
    Placed(InstanceId),
    /// An instance was deleted
    Deleted(InstanceId),
}

/// Event channel with a primary queue plus broadcast subscribers.
///
/// Every subscriber gets its own unbounded queue and sees every event sent
/// after it subscribed, independently of the primary queue and of each other.
pub struct EventChannel<E> {
    sender: Sender<E>,
    receiver: Receiver<E>,
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> EventChannel<E> {
    /// Create a new channel
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            subscribers: Vec::new(),
        }
    }

    /// Send an event to the primary queue and every live subscriber
    pub fn send(&mut self, event: E) {
        // Subscribers whose receiver was dropped are pruned here
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
        // Cannot fail: the channel keeps its own receiver alive
        let _ = self.sender.send(event);
    }

    /// Receive an event from the primary queue
    pub fn receive(&self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Drain the primary queue
    pub fn drain(&self) -> Vec<E> {
        self.receiver.try_iter().collect()
    }

    /// A new receiver of its own, fed with every later event
    pub fn subscribe(&mut self) -> Receiver<E> {
        let (sender, receiver) = unbounded();
        self.subscribers.push(sender);
        receiver
    }

    /// Number of live subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if the primary queue is empty
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Pending count on the primary queue
    pub fn len(&self) -> usize {
        self.receiver.len()
    }
}

impl<E: Clone> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Session-side event publisher.
///
/// Instruction and delete-affordance events are only sent when the shown
/// state actually changes.
#[derive(Default)]
pub struct Notifier {
    channel: EventChannel<SessionEvent>,
    instruction: Option<Instruction>,
    delete_visible: bool,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notify(&mut self, event: SessionEvent) {
        self.channel.send(event);
    }

    pub fn instruct(&mut self, instruction: Instruction) {
        if self.instruction.as_ref() == Some(&instruction) {
            return;
        }
        log::debug!("Instruction: {:?}", instruction);
        self.instruction = Some(instruction.clone());
        self.channel.send(SessionEvent::Instruction(instruction));
    }

    pub fn show_delete(&mut self, visible: bool) {
        if self.delete_visible == visible {
            return;
        }
        self.delete_visible = visible;
        self.channel.send(SessionEvent::DeleteAffordance(visible));
    }

    pub fn model_status(&mut self, model: &ModelId, status: ModelStatus) {
        self.channel.send(SessionEvent::ModelStatus {
            model: model.clone(),
            status,
        });
    }

    /// Current instruction
    pub fn instruction(&self) -> Option<&Instruction> {
        self.instruction.as_ref()
    }

    pub fn delete_visible(&self) -> bool {
        self.delete_visible
    }

    pub fn drain(&self) -> Vec<SessionEvent> {
        self.channel.drain()
    }

    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        self.channel.subscribe()
    }
}
