//! # pedestal_input - Touch Input
//!
//! Platforms deliver touches one contact at a time (down, motion, up,
//! cancel). Gesture recognition needs the whole live contact set with every
//! event, so this crate:
//! - folds per-contact [`RawTouch`] events into set-carrying [`TouchEvent`]s
//!   through a [`TouchTracker`]
//! - tracks which UI elements must not participate in gestures
//!   ([`InputRegions`])

pub mod regions;
pub mod touch;

pub use regions::*;
pub use touch::*;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::regions::{InputRegions, UiNodeId};
    pub use crate::touch::{RawTouch, TouchEvent, TouchPhase, TouchPoint, TouchTracker};
}
