//! The World is the central container for all entities, components, and systems.
//!
//! # Architecture
//!
//! The World coordinates several subsystems:
//! - **Entity manager**: entity ids, recycling, liveness and the per-entity type masks
//! - **Components**: one packed sparse set per component type
//! - **System registry**: system instances, their filters and their matched entities
//! - **Type registries**: dense ids and mask bits for component and system types
//!
//! Every component add or remove goes through the World so the entity's component mask and the
//! matched sets of all systems change together.
//!
//! # Entity lifecycle
//!
//! ```text
//! create_entity ─► Active ─destroy_entity─► PendingDestroy ─tick─► Gone
//!                    └──────────────destroy_now──────────────────────┘
//! ```
//!
//! A pending entity is fully usable until the end of the next [`World::tick`], when its
//! components are removed through the regular path and its id is released for reuse.
//!
//! # Example
//!
//! ```ignore
//! use sieve_engine::ecs::World;
//!
//! let mut world = World::new();
//! world.add_system::<Movement>()?;
//!
//! let entity = world.create_entity();
//! world.add_component(entity, Position { x: 0.0, y: 0.0 })?;
//! world.add_component(entity, Velocity { dx: 1.0, dy: 0.0 })?;
//!
//! world.tick(1.0 / 60.0);
//! world.destroy_entity(entity);
//! world.tick(1.0 / 60.0);
//! assert!(!world.is_alive(entity));
//! ```

mod config;
mod type_registry;

use std::{any::type_name, mem, sync::Arc};

use fixedbitset::FixedBitSet;
use log::{debug, trace, warn};

use crate::ecs::{
    component::{Component, ComponentStore, Components, ValuesMut},
    entity::{self, Entity},
    mask::Mask,
    system::{self, CommandBuffer, Matched, System},
};

pub use config::Config;
pub use type_registry::{CapacityError, Descriptor, TypeId, TypeKind, TypeRegistry};

/// Entities, their components and the systems processing them.
///
/// A world is single threaded: it holds boxed systems that need not be `Send`, so it cannot be
/// moved to another thread. Type registries may still be shared between worlds.
pub struct World {
    config: Config,
    entities: entity::Manager,
    components: Components,
    systems: system::Registry,

    /// Entities queued by `destroy_entity`, in queue order.
    pending: Vec<Entity>,

    /// Bit `n` is set while the live entity with id `n` is queued.
    pending_set: FixedBitSet,

    /// Structural changes queued by systems during the current tick.
    commands: CommandBuffer,

    ticks: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create a world with the default [`Config`] and its own type registries.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_type_registries(
            config,
            Arc::new(TypeRegistry::new(TypeKind::Component)),
            Arc::new(TypeRegistry::new(TypeKind::System)),
        )
    }

    /// Create a world on existing type registries, which may be shared with other worlds.
    ///
    /// Sharing a registry makes a type's id and bit identical in every world using it.
    pub fn with_type_registries(
        config: Config,
        component_types: Arc<TypeRegistry>,
        system_types: Arc<TypeRegistry>,
    ) -> Self {
        debug_assert_eq!(component_types.kind(), TypeKind::Component);
        debug_assert_eq!(system_types.kind(), TypeKind::System);

        Self {
            config,
            entities: entity::Manager::new(config.recycle_limit),
            components: Components::new(
                component_types,
                config.initial_capacity,
                config.index_block_size,
            ),
            systems: system::Registry::new(system_types, config.index_block_size),
            pending: Vec::new(),
            pending_set: FixedBitSet::new(),
            commands: CommandBuffer::new(),
            ticks: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The component type registry of this world.
    #[inline]
    pub fn component_types(&self) -> &Arc<TypeRegistry> {
        self.components.types()
    }

    /// The system type registry of this world.
    #[inline]
    pub fn system_types(&self) -> &Arc<TypeRegistry> {
        self.systems.types()
    }

    /// Number of completed ticks.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // Entities

    /// Create an entity with no components.
    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    /// Queue `entity` for destruction at the end of the next tick.
    ///
    /// The entity stays alive and fully usable until then. Queuing an entity that is already
    /// queued, or is not alive, does nothing and returns `false`.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.contains(entity) {
            warn!("Attempted to destroy an entity that is not alive: {entity:?}");
            return false;
        }
        if self.pending_set.contains(entity.index()) {
            return false;
        }

        self.pending_set.grow(entity.index() + 1);
        self.pending_set.insert(entity.index());
        self.pending.push(entity);
        true
    }

    /// Destroy `entity` immediately, skipping the pending state.
    ///
    /// Every component is removed through the regular path, so systems stop tracking the entity
    /// before its id is released. Returns `false` if the entity is not alive.
    pub fn destroy_now(&mut self, entity: Entity) -> bool {
        let Some(mask) = self.entities.component_mask(entity) else {
            warn!("Attempted to destroy an entity that is not alive: {entity:?}");
            return false;
        };

        for index in mask.indices() {
            if let Some(transition) = self
                .components
                .remove_index(&mut self.entities, entity, index)
            {
                self.systems
                    .refresh(&mut self.entities, entity, transition.new());
            }
        }

        if self.pending_set.contains(entity.index()) {
            self.pending_set.set(entity.index(), false);
        }
        self.entities.destroy(entity)
    }

    /// Whether `entity` is alive, including while it is pending destruction.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.contains(entity)
    }

    /// Whether `entity` is alive and queued for destruction.
    #[inline]
    pub fn is_pending_destroy(&self, entity: Entity) -> bool {
        self.entities.contains(entity) && self.pending_set.contains(entity.index())
    }

    /// Number of live entities, pending ones included.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate over all live entities.
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// The component mask of a live entity.
    #[inline]
    pub fn component_mask(&self, entity: Entity) -> Option<Mask> {
        self.entities.component_mask(entity)
    }

    /// The mask of the systems tracking a live entity.
    #[inline]
    pub fn system_mask(&self, entity: Entity) -> Option<Mask> {
        self.entities.system_mask(entity)
    }

    // Components

    /// Register `C` ahead of its first use.
    pub fn register_component<C: Component>(&mut self) -> Result<Descriptor, CapacityError> {
        let descriptor = self.components.register::<C>()?;
        debug!(
            "Registered component {} as {:?}",
            type_name::<C>(),
            descriptor.id()
        );
        Ok(descriptor)
    }

    /// Add `component` to `entity`, registering `C` on first use.
    ///
    /// Returns `Ok(false)` and drops `component` when the entity already has a `C` or is not alive.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when `C` is new and every component type bit is taken.
    pub fn add_component<C: Component>(
        &mut self,
        entity: Entity,
        component: C,
    ) -> Result<bool, CapacityError> {
        if !self.entities.contains(entity) {
            warn!(
                "Attempted to add {} to an entity that is not alive: {entity:?}",
                type_name::<C>()
            );
            return Ok(false);
        }

        match self
            .components
            .insert(&mut self.entities, entity, component)?
        {
            Some(transition) => {
                self.systems
                    .refresh(&mut self.entities, entity, transition.new());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[inline]
    pub fn get_component<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.components.get(entity)
    }

    #[inline]
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.components.get_mut(entity)
    }

    /// Overwrite the `C` component of `entity`.
    ///
    /// # Panics
    ///
    /// Panics if `entity` has no `C` component.
    pub fn update_component<C: Component>(&mut self, entity: Entity, component: C) {
        match self.components.get_mut::<C>(entity) {
            Some(slot) => *slot = component,
            None => panic!(
                "cannot update {}: {entity:?} has no such component",
                type_name::<C>()
            ),
        }
    }

    /// Remove and return the `C` component of `entity`.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> Option<C> {
        let (component, transition) = self.components.remove::<C>(&mut self.entities, entity)?;
        self.systems
            .refresh(&mut self.entities, entity, transition.new());
        Some(component)
    }

    #[inline]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components.contains::<C>(entity)
    }

    /// Every `C` in the world, packed.
    #[inline]
    pub fn components<C: Component>(&self) -> Option<&ComponentStore<C>> {
        self.components.store()
    }

    /// Write access to the values of every `C` in the world.
    #[inline]
    pub fn components_mut<C: Component>(&mut self) -> Option<ValuesMut<'_, C>> {
        self.components.values_mut()
    }

    // Systems

    /// Register a default constructed `S`, or return the one already registered.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when the system type or one of its filter's component types
    /// cannot get a bit.
    pub fn add_system<S: System + Default>(&mut self) -> Result<&mut S, CapacityError> {
        self.add_system_with(S::default)
    }

    /// Register the `S` built by `factory`, or return the one already registered.
    ///
    /// The factory only runs when `S` is not registered yet.
    pub fn add_system_with<S: System>(
        &mut self,
        factory: impl FnOnce() -> S,
    ) -> Result<&mut S, CapacityError> {
        let component_types = Arc::clone(self.components.types());
        self.systems
            .add(factory, &component_types, &mut self.entities)
    }

    #[inline]
    pub fn get_system<S: System>(&self) -> Option<&S> {
        self.systems.get()
    }

    #[inline]
    pub fn get_system_mut<S: System>(&mut self) -> Option<&mut S> {
        self.systems.get_mut()
    }

    /// Unregister `S` and return it. Entities it tracked lose its bit.
    pub fn remove_system<S: System>(&mut self) -> Option<S> {
        let system = self.systems.remove::<S>(&mut self.entities);
        if system.is_none() {
            warn!("Attempted to remove a system that is not registered: {}", type_name::<S>());
        }
        system
    }

    /// Enable or disable `S`. Returns `false` if it is not registered.
    #[inline]
    pub fn set_system_enabled<S: System>(&mut self, enabled: bool) -> bool {
        self.systems.set_enabled::<S>(enabled)
    }

    #[inline]
    pub fn is_system_enabled<S: System>(&self) -> bool {
        self.systems.is_enabled::<S>()
    }

    /// The entities `S` currently matches.
    #[inline]
    pub fn matched<S: System>(&self) -> Option<&Matched> {
        self.systems.matched::<S>()
    }

    #[inline]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // Tick

    /// Advance the world by one tick.
    ///
    /// 1. Every enabled system runs once, in registration order, over its current matched set.
    /// 2. Structural changes the systems queued are applied in the order they were queued.
    /// 3. Entities queued for destruction are destroyed.
    pub fn tick(&mut self, delta: f32) {
        self.systems
            .update_all(&mut self.components, &self.commands, delta);

        let commands = mem::take(&mut self.commands);
        let queued = commands.len();
        commands.flush(self);

        let destroyed = self.flush_pending();
        self.ticks += 1;

        trace!(
            "Tick {} applied {queued} commands and destroyed {destroyed} entities",
            self.ticks
        );
    }

    fn flush_pending(&mut self) -> usize {
        let pending = mem::take(&mut self.pending);
        let mut destroyed = 0;
        for entity in pending {
            if self.entities.contains(entity) && self.destroy_now(entity) {
                destroyed += 1;
            }
        }
        destroyed
    }
}
