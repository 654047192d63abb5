//! Packed per-type component storage.
//!
//! A [`ComponentStore`] is a sparse set: component values live in a dense vec, the owning entity of
//! each value lives at the same row of a parallel entity vec, and a [`SparseIndex`] maps entity ids
//! to rows. Adding appends, removing moves the last row into the vacated one (swap-remove), and
//! every lookup is a single index probe.
//!
//! # Ordering
//!
//! Removal relocates the last entry, so the order of the dense vecs is arbitrary and rows are only
//! stable until the next add or remove. Rows captured before a mutation must not be reused after
//! it.
//!
//! # Capacity
//!
//! The store tracks a logical capacity starting at its initial size. It doubles when an add finds
//! the store full, and halves when a removal leaves at most a quarter of it in use while it is
//! still above the initial size.

use std::fmt;

use crate::ecs::{
    component::Component,
    entity::Entity,
    storage::{Row, SparseIndex},
};

/// Dense storage for every component of type `C`.
pub struct ComponentStore<C> {
    /// The entity owning the component at the same row.
    entities: Vec<Entity>,

    /// The packed component values.
    components: Vec<C>,

    /// Entity id to dense row.
    index: SparseIndex,

    /// Current logical capacity.
    capacity: usize,

    /// The capacity the store starts with and never shrinks below.
    initial_capacity: usize,
}

impl<C> fmt::Debug for ComponentStore<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("len", &self.components.len())
            .field("capacity", &self.capacity)
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

impl<C: Component> Default for ComponentStore<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Component> ComponentStore<C> {
    /// Default starting capacity.
    pub const DEFAULT_CAPACITY: usize = 8;

    /// Create an empty store with the default starting capacity.
    #[inline]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create an empty store with a custom starting capacity (at least 1).
    #[inline]
    pub fn with_capacity(initial_capacity: usize) -> Self {
        Self::with_index(initial_capacity, SparseIndex::new())
    }

    /// Create an empty store with a custom starting capacity and sparse index.
    pub fn with_index(initial_capacity: usize, index: SparseIndex) -> Self {
        let initial_capacity = initial_capacity.max(1);
        Self {
            entities: Vec::with_capacity(initial_capacity),
            components: Vec::with_capacity(initial_capacity),
            index,
            capacity: initial_capacity,
            initial_capacity,
        }
    }

    /// Add a component for `entity`.
    ///
    /// Returns `false` without touching the store if the entity already has a component here, or
    /// if another generation of the same id does.
    pub fn add(&mut self, entity: Entity, component: C) -> bool {
        // Any resident row for this id blocks the add, including one of another generation.
        if self.index.contains(entity.id()) {
            return false;
        }

        if self.components.len() == self.capacity {
            self.resize(self.capacity * 2);
        }

        self.index.insert(entity.id(), Row::new(self.components.len()));
        self.entities.push(entity);
        self.components.push(component);
        true
    }

    /// Remove the component of `entity`, returning it if it was present.
    ///
    /// The last entry is moved into the vacated row, so removing never leaves holes but does
    /// reorder the store.
    pub fn remove(&mut self, entity: Entity) -> Option<C> {
        let row = self.row(entity)?;
        self.index.remove(entity.id());

        self.entities.swap_remove(row.index());
        let component = self.components.swap_remove(row.index());

        // Point the relocated entity (if any) at its new row.
        if let Some(moved) = self.entities.get(row.index()) {
            self.index.insert(moved.id(), row);
        }

        if self.capacity > self.initial_capacity && self.components.len() <= self.capacity / 4 {
            self.resize(self.capacity / 2);
        }

        Some(component)
    }

    /// Get the component of `entity`.
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.row(entity).map(|row| &self.components[row.index()])
    }

    /// Get the component of `entity` mutably.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.row(entity).map(|row| &mut self.components[row.index()])
    }

    /// Overwrite the component of `entity` in place.
    ///
    /// # Panics
    ///
    /// If `entity` has no component in this store. Writing to an absent component is a caller
    /// bug; use [`get_mut`](Self::get_mut) when absence is an expected outcome.
    pub fn update(&mut self, entity: Entity, component: C) {
        match self.get_mut(entity) {
            Some(slot) => *slot = component,
            None => panic!(
                "cannot update {}: {entity:?} has no such component",
                std::any::type_name::<C>()
            ),
        }
    }

    /// Check whether `entity` has a component in this store.
    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.row(entity).is_some()
    }

    /// Drop every component and return to the initial capacity.
    pub fn clear(&mut self) {
        self.entities = Vec::with_capacity(self.initial_capacity);
        self.components = Vec::with_capacity(self.initial_capacity);
        self.index.clear();
        self.capacity = self.initial_capacity;
    }

    /// Get the dense row of `entity`, if present.
    ///
    /// The row of a stale handle (an older generation of the same id) is not returned.
    #[inline]
    pub fn row(&self, entity: Entity) -> Option<Row> {
        let row = self.index.get(entity.id())?;
        (self.entities[row.index()] == entity).then_some(row)
    }

    /// Number of components stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The current logical capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The dense entity vec, row aligned with [`components`](Self::components).
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The dense component vec, row aligned with [`entities`](Self::entities).
    #[inline]
    pub fn components(&self) -> &[C] {
        &self.components
    }

    /// The dense component vec, mutably. Rows cannot be added or removed through it.
    #[inline]
    pub fn components_mut(&mut self) -> &mut [C] {
        &mut self.components
    }

    /// Iterate over `(entity, component)` pairs in dense order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (Entity, &C)> + '_ {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate over `(entity, component)` pairs in dense order, with mutable components.
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut C)> + '_ {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// A view that can change component values but not which entities are stored.
    #[inline]
    pub fn values_mut(&mut self) -> ValuesMut<'_, C> {
        ValuesMut { store: self }
    }

    /// Move the backing vecs to a new logical capacity.
    fn resize(&mut self, capacity: usize) {
        self.capacity = capacity;
        if capacity > self.components.capacity() {
            self.entities.reserve_exact(capacity - self.entities.len());
            self.components.reserve_exact(capacity - self.components.len());
        } else {
            self.entities.shrink_to(capacity);
            self.components.shrink_to(capacity);
        }
    }
}

/// Mutable access to the values of a [`ComponentStore`] without structural access.
///
/// Handed out to code that must not add or remove components directly, since doing so would skip
/// the entity mask and system membership bookkeeping of a world.
pub struct ValuesMut<'a, C> {
    store: &'a mut ComponentStore<C>,
}

impl<C: Component> ValuesMut<'_, C> {
    #[inline]
    pub fn get(&self, entity: Entity) -> Option<&C> {
        self.store.get(entity)
    }

    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut C> {
        self.store.get_mut(entity)
    }

    #[inline]
    pub fn contains(&self, entity: Entity) -> bool {
        self.store.contains(entity)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        self.store.entities()
    }

    #[inline]
    pub fn components_mut(&mut self) -> &mut [C] {
        self.store.components_mut()
    }

    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (Entity, &mut C)> + '_ {
        self.store.iter_mut()
    }
}
