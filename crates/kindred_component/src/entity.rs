//! Entity handles and allocation.
//!
//! An [`Entity`] is a lightweight `(index, generation)` pair with no inherent
//! data. Indices are recycled once an entity is destroyed, and the generation
//! is bumped each time, so a handle to a destroyed entity never aliases the
//! entity that later reuses its index. An index whose generation would wrap
//! is retired instead of recycled.

/// A generational entity handle.
///
/// Entities are pure identifiers. Components are attached to entities by a
/// store to give them meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Create an entity handle from its raw parts.
    #[must_use]
    pub const fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index, shared by every generation.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// The generation of this handle.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

/// Allocates entity handles, recycling freed indices.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    /// Current generation per index.
    generations: Vec<u32>,
    /// Whether each index is currently handed out.
    alive: Vec<bool>,
    /// Freed indices awaiting reuse.
    free: Vec<u32>,
}

impl EntityAllocator {
    /// Creates a new, empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh entity handle, reusing a freed index when available.
    ///
    /// Returns `None` once every `u32` index is in use or retired.
    pub fn allocate(&mut self) -> Option<Entity> {
        if let Some(index) = self.free.pop() {
            let slot = index as usize;
            self.alive[slot] = true;
            return Some(Entity::from_raw(index, self.generations[slot]));
        }
        let index = u32::try_from(self.generations.len()).ok()?;
        self.generations.push(0);
        self.alive.push(true);
        Some(Entity::from_raw(index, 0))
    }

    /// Frees `entity`, invalidating every outstanding copy of its handle.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.is_live(entity) {
            return false;
        }
        let slot = entity.index as usize;
        self.alive[slot] = false;
        // An index whose generation is exhausted is never handed out again.
        if let Some(next) = self.generations[slot].checked_add(1) {
            self.generations[slot] = next;
            self.free.push(entity.index);
        }
        true
    }

    /// Returns `true` if `entity` is the current, allocated generation of its
    /// index.
    #[must_use]
    pub fn is_live(&self, entity: Entity) -> bool {
        let slot = entity.index as usize;
        slot < self.generations.len()
            && self.alive[slot]
            && self.generations[slot] == entity.generation
    }
}
