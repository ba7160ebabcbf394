//! Touch contacts and gesture events

use std::time::Duration;

use pedestal_math::Vec2;

use crate::regions::UiNodeId;

/// One finger on the screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    /// Platform contact id, stable for the contact's lifetime
    pub id: u64,
    /// Screen position in pixels (+Y down)
    pub position: Vec2,
    /// UI element the contact started on, if any
    pub target: Option<UiNodeId>,
}

impl TouchPoint {
    pub fn new(id: u64, position: Vec2) -> Self {
        Self { id, position, target: None }
    }

    pub fn on(mut self, target: UiNodeId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Touch event phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// A touch event carrying the live contact set
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    /// Contacts on the screen after this event, in touch-down order
    pub touches: Vec<TouchPoint>,
    /// Contacts this event is about (new, moved, released or cancelled)
    pub changed: Vec<TouchPoint>,
    /// Monotonic event time
    pub time: Duration,
}

impl TouchEvent {
    pub fn start(touches: Vec<TouchPoint>, changed: Vec<TouchPoint>, time: Duration) -> Self {
        Self { phase: TouchPhase::Start, touches, changed, time }
    }

    pub fn moved(touches: Vec<TouchPoint>, time: Duration) -> Self {
        Self { phase: TouchPhase::Move, changed: touches.clone(), touches, time }
    }

    /// `remaining` are still down, `released` were lifted
    pub fn end(remaining: Vec<TouchPoint>, released: Vec<TouchPoint>, time: Duration) -> Self {
        Self { phase: TouchPhase::End, touches: remaining, changed: released, time }
    }

    pub fn cancel(cancelled: Vec<TouchPoint>, time: Duration) -> Self {
        Self { phase: TouchPhase::Cancel, touches: Vec::new(), changed: cancelled, time }
    }

    /// Number of live contacts after this event
    pub fn count(&self) -> usize {
        self.touches.len()
    }

    /// Number of contacts on the screen just before this event
    pub fn count_before(&self) -> usize {
        match self.phase {
            TouchPhase::Start => self.touches.len().saturating_sub(self.changed.len()),
            TouchPhase::Move => self.touches.len(),
            TouchPhase::End | TouchPhase::Cancel => self.touches.len() + self.changed.len(),
        }
    }

    pub fn first(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }
}

/// Per-contact platform event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawTouch {
    /// Touch started
    Down {
        id: u64,
        x: f32,
        y: f32,
        target: Option<UiNodeId>,
        time_ms: u32,
    },
    /// Touch moved
    Motion {
        id: u64,
        x: f32,
        y: f32,
        time_ms: u32,
    },
    /// Touch ended
    Up {
        id: u64,
        time_ms: u32,
    },
    /// Touch cancelled by the platform; ends every contact
    Cancel {
        time_ms: u32,
    },
}

/// Folds per-contact platform events into set-carrying [`TouchEvent`]s
#[derive(Debug, Default)]
pub struct TouchTracker {
    active: Vec<TouchPoint>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live contacts in touch-down order
    pub fn active(&self) -> &[TouchPoint] {
        &self.active
    }

    /// Process one raw event.
    ///
    /// Events for unknown contacts (motion or release without a down, or a
    /// repeated down) yield nothing.
    pub fn process(&mut self, raw: RawTouch) -> Option<TouchEvent> {
        match raw {
            RawTouch::Down { id, x, y, target, time_ms } => {
                if self.index_of(id).is_some() {
                    log::debug!("Ignoring repeated touch down for contact {}", id);
                    return None;
                }
                let point = TouchPoint { id, position: Vec2::new(x, y), target };
                self.active.push(point);
                Some(TouchEvent::start(self.active.clone(), vec![point], millis(time_ms)))
            }
            RawTouch::Motion { id, x, y, time_ms } => {
                let index = self.index_of(id)?;
                self.active[index].position = Vec2::new(x, y);
                Some(TouchEvent {
                    phase: TouchPhase::Move,
                    touches: self.active.clone(),
                    changed: vec![self.active[index]],
                    time: millis(time_ms),
                })
            }
            RawTouch::Up { id, time_ms } => {
                let index = self.index_of(id)?;
                let released = self.active.remove(index);
                Some(TouchEvent::end(self.active.clone(), vec![released], millis(time_ms)))
            }
            RawTouch::Cancel { time_ms } => {
                if self.active.is_empty() {
                    return None;
                }
                let cancelled = std::mem::take(&mut self.active);
                Some(TouchEvent::cancel(cancelled, millis(time_ms)))
            }
        }
    }

    fn index_of(&self, id: u64) -> Option<usize> {
        self.active.iter().position(|t| t.id == id)
    }
}

fn millis(time_ms: u32) -> Duration {
    Duration::from_millis(u64::from(time_ms))
}
