//! Entity identity for the ECS.
//!
//! Entities are lightweight handles. All state an entity refers to (its component values, its
//! component mask and its system mask) lives in the [`Manager`] and in the component stores, never
//! inside the handle itself.
//!
//! # Generation Tracking
//!
//! An [`Entity`] combines an [`Id`] and a [`Generation`]. The id identifies the slot, while the
//! generation counts how many times that slot has been released. When an entity is destroyed its
//! slot generation is bumped before the id is recycled, so a stale handle kept across a destroy no
//! longer compares equal to the entity that reuses its id:
//!
//! ```rust,ignore
//! let entity = manager.create();   // Entity { id: 0, generation: 0 }
//! manager.destroy(entity);
//! let reused = manager.create();   // Entity { id: 0, generation: 1 }
//! assert_eq!(entity.id(), reused.id());
//! assert!(!manager.contains(entity));
//! ```
//!
//! # Recycling
//!
//! Released ids are first kept in a bounded recycle pool (a LIFO stack) and handed back by the next
//! [`Manager::create`] calls. Ids released while the pool is full spill into an overflow free list
//! that is consulted once the pool is drained, so no id is ever leaked.

use fixedbitset::FixedBitSet;
use log::warn;

use crate::ecs::mask::Mask;

/// The generation of an entity, used to detect stale handles.
/// The generation starts at `FIRST` and is incremented each time the slot is released.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u32);

impl Generation {
    /// The first generation of an entity.
    pub const FIRST: Self = Self(0);

    /// Get the next generation from the current.
    #[inline]
    pub fn next(&self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Get the raw generation value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

/// An entity identifier. Dense, starting at zero, and reused after the entity is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Get the raw id value.
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Get the index of this id if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// A handle to one logical object in a world.
///
/// Handles are plain values: cheap to copy, hash and compare. Two handles are equal when both their
/// id and their generation are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    /// The slot identifier of the entity.
    id: Id,

    /// The generation of the slot when this handle was created.
    generation: Generation,
}

impl Entity {
    /// Construct a first generation entity for an id.
    ///
    /// This is primarily used for testing.
    #[cfg(test)]
    #[inline]
    pub(crate) fn new(id: u32) -> Self {
        Self::new_with_generation(Id(id), Generation::FIRST)
    }

    #[inline]
    pub(crate) const fn new_with_generation(id: Id, generation: Generation) -> Self {
        Self { id, generation }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the generation of this entity.
    #[inline]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.id.index()
    }
}

/// Per-id bookkeeping. The masks are derived state owned by the component and system
/// registries; the manager only stores them.
#[derive(Debug, Default, Clone, Copy)]
struct Slot {
    generation: Generation,
    component_mask: Mask,
    system_mask: Mask,
}

/// Owns entity identity: allocation, id recycling, liveness and the per-entity masks.
#[derive(Debug)]
pub struct Manager {
    /// One slot per id ever allocated.
    slots: Vec<Slot>,

    /// Bit `n` is set while the entity with id `n` is alive.
    live: FixedBitSet,

    /// Number of live entities.
    len: usize,

    /// Recently released ids, reused last-in first-out.
    pool: Vec<Id>,

    /// Maximum number of ids kept in `pool`.
    pool_limit: usize,

    /// Ids released while the pool was full.
    overflow: Vec<Id>,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RECYCLE_LIMIT)
    }
}

impl Manager {
    /// Default bound of the recycle pool.
    pub const DEFAULT_RECYCLE_LIMIT: usize = 100;

    /// Construct a new manager with the given recycle pool bound.
    pub fn new(pool_limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            live: FixedBitSet::new(),
            len: 0,
            pool: Vec::new(),
            pool_limit,
            overflow: Vec::new(),
        }
    }

    /// Create a new entity, reusing a released id when one is available.
    ///
    /// The returned entity always starts with empty component and system masks.
    pub fn create(&mut self) -> Entity {
        let id = match self.pool.pop().or_else(|| self.overflow.pop()) {
            Some(id) => id,
            None => {
                let id = Id(self.slots.len() as u32);
                self.slots.push(Slot::default());
                self.live.grow(self.slots.len());
                id
            }
        };

        let slot = &mut self.slots[id.index()];
        slot.component_mask = Mask::EMPTY;
        slot.system_mask = Mask::EMPTY;

        self.live.insert(id.index());
        self.len += 1;

        Entity::new_with_generation(id, slot.generation)
    }

    /// Release an entity so its id may be reused.
    ///
    /// Returns `false` (and does nothing) if the entity is not alive, which makes repeated destroys
    /// harmless. The caller is responsible for having removed the entity's components first.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.contains(entity) {
            warn!("Attempted to destroy an entity that is not alive: {entity:?}");
            return false;
        }

        let id = entity.id();
        let slot = &mut self.slots[id.index()];
        slot.generation = slot.generation.next();
        slot.component_mask = Mask::EMPTY;
        slot.system_mask = Mask::EMPTY;

        self.live.set(id.index(), false);
        self.len -= 1;

        if self.pool.len() < self.pool_limit {
            self.pool.push(id);
        } else {
            self.overflow.push(id);
        }
        true
    }

    /// Check whether the entity is alive. Stale handles (older generations) are not.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.live.contains(entity.index())
            && self.slots[entity.index()].generation == entity.generation()
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all live entities in id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.live
            .ones()
            .map(|index| Entity::new_with_generation(Id(index as u32), self.slots[index].generation))
    }

    /// The component mask of a live entity.
    #[inline]
    pub fn component_mask(&self, entity: Entity) -> Option<Mask> {
        self.contains(entity)
            .then(|| self.slots[entity.index()].component_mask)
    }

    /// The system mask of a live entity.
    #[inline]
    pub fn system_mask(&self, entity: Entity) -> Option<Mask> {
        self.contains(entity)
            .then(|| self.slots[entity.index()].system_mask)
    }

    /// Overwrite the component mask of a live entity.
    #[inline]
    pub(crate) fn set_component_mask(&mut self, entity: Entity, mask: Mask) {
        debug_assert!(self.contains(entity), "component mask set on a dead entity");
        self.slots[entity.index()].component_mask = mask;
    }

    /// Overwrite the system mask of a live entity.
    #[inline]
    pub(crate) fn set_system_mask(&mut self, entity: Entity, mask: Mask) {
        debug_assert!(self.contains(entity), "system mask set on a dead entity");
        self.slots[entity.index()].system_mask = mask;
    }

    /// Number of ids waiting in the bounded recycle pool.
    #[inline]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }
}
