//! Entry animation
//!
//! A freshly placed instance grows from almost nothing to its base scale by
//! exponential smoothing on a fixed 16 ms tick. Time is injected: the
//! scheduler runs however many ticks have come due by the `now` it is given.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::placement::InstanceId;

/// Tick interval
pub const TICK: Duration = Duration::from_millis(16);

/// Fraction of the remaining distance covered per tick
pub const EASING: f32 = 0.2;

/// Snap to target once this close
pub const EPSILON: f32 = 0.005;

/// Starting scale as a fraction of the target
pub const START_FRACTION: f32 = 0.001;

/// Per-instance easing state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryAnimation {
    current: f32,
    target: f32,
    easing: f32,
    epsilon: f32,
    finished: bool,
}

impl EntryAnimation {
    pub fn new(target: f32) -> Self {
        Self {
            current: target * START_FRACTION,
            target,
            easing: EASING,
            epsilon: EPSILON,
            finished: false,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advance one tick and return the new value
    pub fn step(&mut self) -> f32 {
        if self.finished {
            return self.current;
        }
        self.current += (self.target - self.current) * self.easing;
        if (self.target - self.current).abs() < self.epsilon {
            self.current = self.target;
            self.finished = true;
        }
        self.current
    }
}

/// One tick applied to one instance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTick {
    pub instance: InstanceId,
    pub scale: f32,
    pub finished: bool,
}

#[derive(Debug, Clone)]
struct Scheduled {
    animation: EntryAnimation,
    next_due: Duration,
}

/// Runs entry animations against an injected clock
#[derive(Debug, Default)]
pub struct AnimationScheduler {
    running: BTreeMap<InstanceId, Scheduled>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start animating `instance`; the first tick comes due at `now + TICK`.
    ///
    /// Replaces any animation already running for the instance.
    pub fn start(&mut self, instance: InstanceId, animation: EntryAnimation, now: Duration) {
        self.running.insert(
            instance,
            Scheduled {
                animation,
                next_due: now + TICK,
            },
        );
    }

    /// Stop animating `instance`. Returns false if it was not animating.
    pub fn cancel(&mut self, instance: InstanceId) -> bool {
        self.running.remove(&instance).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.running.clear();
    }

    pub fn is_animating(&self, instance: InstanceId) -> bool {
        self.running.contains_key(&instance)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }

    /// Run every tick due by `now`.
    ///
    /// Animations whose instance is no longer alive are retired without
    /// ticking. Finished animations are removed after their last tick.
    pub fn advance<F>(&mut self, now: Duration, is_alive: F) -> Vec<AnimationTick>
    where
        F: Fn(InstanceId) -> bool,
    {
        let mut ticks = Vec::new();
        self.running.retain(|&instance, scheduled| {
            if !is_alive(instance) {
                log::debug!("Retiring entry animation of removed instance {}", instance);
                return false;
            }
            while scheduled.next_due <= now && !scheduled.animation.is_finished() {
                let scale = scheduled.animation.step();
                scheduled.next_due += TICK;
                ticks.push(AnimationTick {
                    instance,
                    scale,
                    finished: scheduled.animation.is_finished(),
                });
            }
            !scheduled.animation.is_finished()
        });
        ticks
    }
}
