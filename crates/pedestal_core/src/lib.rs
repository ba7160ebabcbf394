//! # pedestal_core - Pedestal Core
//!
//! Zero-dependency primitives shared by every Pedestal crate:
//! - **Ids**: generational identifiers for placed instances and scene objects
//! - **Errors**: hierarchy index errors
//! - **Hierarchy**: an owned parent index answering "nearest qualifying
//!   ancestor" queries without climbing a foreign scene graph

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

pub mod error;
pub mod hierarchy;
pub mod id;

pub use error::*;
pub use hierarchy::*;
pub use id::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::HierarchyError;
    pub use crate::hierarchy::Hierarchy;
    pub use crate::id::{Id, IdGenerator};
}
