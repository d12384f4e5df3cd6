//! Entity handles and allocation.
//!
//! An [`Entity`] is a stable [`EntityId`] plus an activity flag. It carries no
//! component data; components live in the registry and are looked up by id.
//! Liveness is owned by whoever allocated the entity, not by the registry.

use serde::{Deserialize, Serialize};

/// A unique entity identifier.
///
/// Ids are handed out by an [`EntityAllocator`] and are never reused, so an id
/// still referenced by stored components can never name a different entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// The null / invalid id sentinel.
    pub const INVALID: EntityId = EntityId(0);

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) id.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Entity> for EntityId {
    fn from(entity: Entity) -> Self {
        entity.id
    }
}

/// An entity handle: a stable id and whether the entity is currently active.
///
/// Inactive entities keep their id and any components already attached, but
/// may not accrue new components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    active: bool,
}

impl Entity {
    /// Create an active entity with the given id.
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self { id, active: true }
    }

    /// Create an active entity from a raw `u64` identifier.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self::new(EntityId(id))
    }

    /// Returns this entity's id.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }

    /// Returns `true` if the entity is active.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.active
    }

    /// Mark the entity active.
    pub fn activate(&mut self) {
        self.active = true;
    }

    /// Mark the entity inactive. Systems should stop processing it.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Returns a copy of this handle with the given activity flag.
    #[must_use]
    pub const fn with_active(self, active: bool) -> Self {
        Self {
            id: self.id,
            active,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.active { "active" } else { "inactive" };
        write!(f, "Entity({})[{status}]", self.id)
    }
}

/// Allocates monotonically increasing entity ids.
///
/// Ids start at 1 (0 is reserved for [`EntityId::INVALID`]) and are never
/// recycled.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// Creates a new allocator.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocates a fresh, active entity.
    pub fn allocate(&mut self) -> Entity {
        let id = self.next_id;
        self.next_id += 1;
        Entity::from_raw(id)
    }

    /// Returns the number of entities allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
