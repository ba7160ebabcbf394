//! Generational identifiers for scene objects, placed instances and UI regions

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Opaque identifier: a 32-bit index stamped with a 32-bit generation
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id {
    bits: u64,
}

impl Id {
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())?;
        if self.generation() != 0 {
            write!(f, "v{}", self.generation())?;
        }
        Ok(())
    }
}

/// Hands out ids in increasing index order.
///
/// Indices are never reused within one generator, so a stale id held by an
/// animation or a gesture can never alias a newer object.
pub struct IdGenerator {
    next: AtomicU64,
    generation: u32,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self::with_generation(0)
    }

    /// Stamp every id with `generation`, so ids from two generators never match
    pub const fn with_generation(generation: u32) -> Self {
        Self {
            next: AtomicU64::new(0),
            generation,
        }
    }

    pub fn next(&self) -> Id {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        Id::new(index as u32, self.generation)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
