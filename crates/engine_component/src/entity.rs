//! Entity identifiers and allocation.
//!
//! An [`EntityId`] is a plain `u64`. Ids are handed out by an
//! [`EntityAllocator`] owned by each registry, so two registries may reuse the
//! same numbers without interfering.

use serde::{Deserialize, Serialize};

/// A unique entity identifier within one registry.
///
/// Ids are never recycled: once allocated, an id stays bound to the same
/// entity for the lifetime of the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Allocates monotonically increasing entity ids, starting at 0.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Create an allocator whose first id is 0.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 0 }
    }

    /// Allocates a fresh entity id.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }
}
