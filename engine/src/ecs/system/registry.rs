//! System registry and incremental membership.
//!
//! The [`Registry`] owns every system instance together with its filter and its [`Matched`] set.
//! Whenever an entity's component mask changes, [`Registry::refresh`] moves the entity in or out
//! of each system's set by comparing the filter against the new mask and the system's bit in the
//! entity's system mask. Work per mutation is proportional to the number of systems, never to the
//! number of entities.

use std::{any::Any, sync::Arc};

use log::{debug, trace};

use crate::ecs::{
    component::Components,
    entity::{self, Entity},
    filter::Filter,
    mask::Mask,
    system::{CommandBuffer, Frame, Matched, System},
    world::{CapacityError, Descriptor, TypeRegistry},
};

/// Object safe wrapper over a concrete [`System`].
trait Run: Any {
    fn run(&mut self, frame: Frame<'_>);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<S: System> Run for S {
    fn run(&mut self, frame: Frame<'_>) {
        self.update(frame);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct Entry {
    descriptor: Descriptor,
    filter: Filter,
    enabled: bool,
    matched: Matched,
    system: Box<dyn Run>,
}

/// Registered systems in registration order.
pub struct Registry {
    /// Dense ids and bits of system types.
    types: Arc<TypeRegistry>,

    entries: Vec<Entry>,

    /// Sparse index block size of new matched sets.
    index_block_size: usize,
}

impl Registry {
    /// Create an empty registry over a system type registry.
    pub fn new(types: Arc<TypeRegistry>, index_block_size: usize) -> Self {
        Self {
            types,
            entries: Vec::new(),
            index_block_size,
        }
    }

    /// The system type registry.
    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Register the system built by `factory`, unless one of type `S` is already registered.
    ///
    /// A new system starts enabled and is seeded with every live entity its filter matches. This
    /// is the only full scan of the entities; from then on membership is kept by [`refresh`].
    /// When `S` is already registered the factory is not called and the existing instance is
    /// returned unchanged.
    ///
    /// [`refresh`]: Self::refresh
    pub fn add<S: System>(
        &mut self,
        factory: impl FnOnce() -> S,
        component_types: &TypeRegistry,
        entities: &mut entity::Manager,
    ) -> Result<&mut S, CapacityError> {
        let position = match self.position::<S>() {
            Some(position) => position,
            None => self.insert(factory, component_types, entities)?,
        };
        Ok(self.downcast_mut(position))
    }

    fn insert<S: System>(
        &mut self,
        factory: impl FnOnce() -> S,
        component_types: &TypeRegistry,
        entities: &mut entity::Manager,
    ) -> Result<usize, CapacityError> {
        let filter = Filter::accept::<S::Filter>(component_types)?;
        let descriptor = self.types.get_or_assign::<S>()?;

        let mut matched = Matched::with_block_size(self.index_block_size);
        let seeded: Vec<(Entity, Mask)> = entities
            .iter()
            .filter_map(|entity| {
                let components = entities.component_mask(entity)?;
                let systems = entities.system_mask(entity)?;
                filter.matches(components).then_some((entity, systems))
            })
            .collect();
        for (entity, systems) in seeded {
            matched.insert(entity);
            entities.set_system_mask(entity, systems.with(descriptor.bit()));
        }

        debug!(
            "Added system {} with filter {:?}, matching {} entities",
            std::any::type_name::<S>(),
            filter.required(),
            matched.len()
        );

        self.entries.push(Entry {
            descriptor,
            filter,
            enabled: true,
            matched,
            system: Box::new(factory()),
        });
        Ok(self.entries.len() - 1)
    }

    /// Get the registered system of type `S`.
    pub fn get<S: System>(&self) -> Option<&S> {
        let position = self.position::<S>()?;
        self.entries[position].system.as_any().downcast_ref()
    }

    /// Get the registered system of type `S` mutably.
    pub fn get_mut<S: System>(&mut self) -> Option<&mut S> {
        let position = self.position::<S>()?;
        self.entries[position].system.as_any_mut().downcast_mut()
    }

    /// Unregister the system of type `S` and return it.
    ///
    /// Its bit is cleared from every entity it tracked. The type keeps its id, so registering `S`
    /// again reuses the same bit.
    pub fn remove<S: System>(&mut self, entities: &mut entity::Manager) -> Option<S> {
        let position = self.position::<S>()?;
        let entry = self.entries.remove(position);

        for &entity in &entry.matched {
            if let Some(systems) = entities.system_mask(entity) {
                entities.set_system_mask(entity, systems.without(entry.descriptor.bit()));
            }
        }

        debug!("Removed system {}", std::any::type_name::<S>());
        entry.system.into_any().downcast::<S>().ok().map(|system| *system)
    }

    /// Enable or disable the system of type `S`. Returns `false` if it is not registered.
    ///
    /// A disabled system is skipped by [`update_all`](Self::update_all) but keeps its matched set
    /// current.
    pub fn set_enabled<S: System>(&mut self, enabled: bool) -> bool {
        match self.position::<S>() {
            Some(position) => {
                self.entries[position].enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Whether the system of type `S` is registered and enabled.
    pub fn is_enabled<S: System>(&self) -> bool {
        self.position::<S>()
            .is_some_and(|position| self.entries[position].enabled)
    }

    /// The entities currently matched by the system of type `S`.
    pub fn matched<S: System>(&self) -> Option<&Matched> {
        self.position::<S>()
            .map(|position| &self.entries[position].matched)
    }

    /// Number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bring every system's membership of `entity` in line with its new component mask.
    pub(crate) fn refresh(
        &mut self,
        entities: &mut entity::Manager,
        entity: Entity,
        components: Mask,
    ) {
        let Some(mut systems) = entities.system_mask(entity) else {
            return;
        };

        for entry in &mut self.entries {
            let bit = entry.descriptor.bit();
            let tracked = systems.intersects(bit);
            match (entry.filter.matches(components), tracked) {
                (true, false) => {
                    entry.matched.insert(entity);
                    systems = systems.with(bit);
                }
                (false, true) => {
                    entry.matched.remove(entity);
                    systems = systems.without(bit);
                }
                _ => {}
            }
        }

        entities.set_system_mask(entity, systems);
    }

    /// Run every enabled system once, in registration order.
    pub(crate) fn update_all(
        &mut self,
        components: &mut Components,
        commands: &CommandBuffer,
        delta: f32,
    ) {
        for entry in self.entries.iter_mut().filter(|entry| entry.enabled) {
            trace!(
                "Updating system {} over {} entities",
                entry_name(&self.types, entry.descriptor),
                entry.matched.len()
            );
            entry
                .system
                .run(Frame::new(&entry.matched, components, commands, delta));
        }
    }

    fn position<S: System>(&self) -> Option<usize> {
        let descriptor = self.types.get::<S>()?;
        self.entries
            .iter()
            .position(|entry| entry.descriptor == descriptor)
    }

    fn downcast_mut<S: System>(&mut self, position: usize) -> &mut S {
        self.entries[position]
            .system
            .as_any_mut()
            .downcast_mut()
            .expect("system entry holds an instance of another type")
    }
}

fn entry_name(types: &TypeRegistry, descriptor: Descriptor) -> &'static str {
    types.name(descriptor.id()).unwrap_or("<unnamed>")
}
