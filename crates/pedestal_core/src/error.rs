//! Error types for the core library

use core::fmt;

/// Hierarchy index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    /// A node was registered as its own parent
    SelfParent,
    /// Linking the node would close a cycle
    Cycle,
    /// The node is already present in the index
    AlreadyRegistered,
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyError::SelfParent => write!(f, "node cannot be its own parent"),
            HierarchyError::Cycle => write!(f, "link would create a cycle"),
            HierarchyError::AlreadyRegistered => write!(f, "node already registered"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HierarchyError {}
