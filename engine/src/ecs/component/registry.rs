use std::{any::Any, sync::Arc};

use crate::ecs::{
    component::{Component, ComponentStore, ValuesMut},
    entity::{self, Entity},
    mask::Mask,
    storage::SparseIndex,
    world::{CapacityError, Descriptor, TypeRegistry},
};

/// The change an add or remove made to an entity's component mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    old: Mask,
    new: Mask,
}

impl Transition {
    /// The component mask before the change.
    #[inline]
    pub fn old(&self) -> Mask {
        self.old
    }

    /// The component mask after the change.
    #[inline]
    pub fn new(&self) -> Mask {
        self.new
    }
}

/// Object safe view of a [`ComponentStore`] of any component type.
trait ErasedStore: Any {
    fn remove_entity(&mut self, entity: Entity) -> bool;
    fn len(&self) -> usize;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStore for ComponentStore<C> {
    fn remove_entity(&mut self, entity: Entity) -> bool {
        self.remove(entity).is_some()
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns one [`ComponentStore`] per registered component type.
///
/// Stores are indexed by the dense id the component [`TypeRegistry`] assigned to their type, so
/// walking the bits of an entity's component mask reaches every store holding one of its
/// components directly.
///
/// Value access (`get`, `get_mut`, `values_mut`, `store`) is public. Adding and removing go through
/// the world, since they must keep the entity's component mask and system memberships in step.
pub struct Components {
    /// Dense ids and bits of component types.
    types: Arc<TypeRegistry>,

    /// Type-erased stores indexed by component type id.
    stores: Vec<Option<Box<dyn ErasedStore>>>,

    /// Starting capacity of newly created stores.
    initial_capacity: usize,

    /// Sparse index block size of newly created stores.
    index_block_size: usize,
}

impl Components {
    /// Create an empty registry over a component type registry.
    pub fn new(types: Arc<TypeRegistry>, initial_capacity: usize, index_block_size: usize) -> Self {
        Self {
            types,
            stores: Vec::new(),
            initial_capacity,
            index_block_size,
        }
    }

    /// The component type registry.
    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Register `C`, creating its store on first use.
    pub fn register<C: Component>(&mut self) -> Result<Descriptor, CapacityError> {
        let descriptor = self.types.get_or_assign::<C>()?;
        self.store_or_create::<C>(descriptor);
        Ok(descriptor)
    }

    /// Get the store of `C`, if one has been created in this registry.
    pub fn store<C: Component>(&self) -> Option<&ComponentStore<C>> {
        let descriptor = self.types.get::<C>()?;
        self.stores
            .get(descriptor.id().index())?
            .as_ref()?
            .as_any()
            .downcast_ref()
    }

    /// Get a value-only mutable view of the store of `C`.
    pub fn values_mut<C: Component>(&mut self) -> Option<ValuesMut<'_, C>> {
        self.store_mut::<C>().map(ComponentStore::values_mut)
    }

    /// Get the `C` component of `entity`.
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> Option<&C> {
        self.store::<C>()?.get(entity)
    }

    /// Get the `C` component of `entity` mutably.
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Option<&mut C> {
        self.store_mut::<C>()?.get_mut(entity)
    }

    /// Check whether `entity` has a `C` component.
    #[inline]
    pub fn contains<C: Component>(&self, entity: Entity) -> bool {
        self.store::<C>().is_some_and(|store| store.contains(entity))
    }

    /// Total number of components across all stores.
    pub fn len(&self) -> usize {
        self.stores.iter().flatten().map(|store| store.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add `component` to a live `entity` and set its type bit in the entity's component mask.
    ///
    /// Returns `Ok(None)` when the entity is dead or already has a `C`, leaving everything
    /// untouched.
    pub(crate) fn insert<C: Component>(
        &mut self,
        entities: &mut entity::Manager,
        entity: Entity,
        component: C,
    ) -> Result<Option<Transition>, CapacityError> {
        let Some(old) = entities.component_mask(entity) else {
            return Ok(None);
        };

        let descriptor = self.types.get_or_assign::<C>()?;
        if !self.store_or_create::<C>(descriptor).add(entity, component) {
            return Ok(None);
        }

        let new = old.with(descriptor.bit());
        entities.set_component_mask(entity, new);
        Ok(Some(Transition { old, new }))
    }

    /// Remove the `C` component of `entity` and clear its type bit.
    pub(crate) fn remove<C: Component>(
        &mut self,
        entities: &mut entity::Manager,
        entity: Entity,
    ) -> Option<(C, Transition)> {
        let old = entities.component_mask(entity)?;
        let descriptor = self.types.get::<C>()?;
        let component = self.store_mut::<C>()?.remove(entity)?;

        let new = old.without(descriptor.bit());
        entities.set_component_mask(entity, new);
        Some((component, Transition { old, new }))
    }

    /// Remove the component with type index `index` from `entity`, whatever its type.
    pub(crate) fn remove_index(
        &mut self,
        entities: &mut entity::Manager,
        entity: Entity,
        index: usize,
    ) -> Option<Transition> {
        let old = entities.component_mask(entity)?;
        let store = self.stores.get_mut(index)?.as_mut()?;
        if !store.remove_entity(entity) {
            return None;
        }

        let new = old.without(Mask::bit(index));
        entities.set_component_mask(entity, new);
        Some(Transition { old, new })
    }

    fn store_mut<C: Component>(&mut self) -> Option<&mut ComponentStore<C>> {
        let descriptor = self.types.get::<C>()?;
        self.stores
            .get_mut(descriptor.id().index())?
            .as_mut()?
            .as_any_mut()
            .downcast_mut()
    }

    fn store_or_create<C: Component>(&mut self, descriptor: Descriptor) -> &mut ComponentStore<C> {
        let index = descriptor.id().index();
        if index >= self.stores.len() {
            self.stores.resize_with(index + 1, || None);
        }

        let (initial_capacity, block_size) = (self.initial_capacity, self.index_block_size);
        self.stores[index]
            .get_or_insert_with(|| {
                let store: Box<dyn ErasedStore> = Box::new(ComponentStore::<C>::with_index(
                    initial_capacity,
                    SparseIndex::new_with_block_size(block_size),
                ));
                store
            })
            .as_any_mut()
            .downcast_mut()
            .expect("component store slot holds a store of another type")
    }
}

#[cfg(test)]
mod tests {
    use sieve_macros::Component;

    use super::*;
    use crate::ecs::world::TypeKind;

    #[derive(Component, Debug, PartialEq)]
    struct Position(f32);

    #[derive(Component, Debug, PartialEq)]
    struct Velocity(f32);

    fn setup() -> (Components, entity::Manager) {
        let types = Arc::new(TypeRegistry::new(TypeKind::Component));
        (Components::new(types, 8, 64), entity::Manager::default())
    }

    #[test]
    fn insert_sets_mask_bits() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();

        // When
        let first = components.insert(&mut entities, entity, Position(1.0)).unwrap();
        let second = components.insert(&mut entities, entity, Velocity(2.0)).unwrap();

        // Then
        let pos = components.types().get::<Position>().unwrap().bit();
        let vel = components.types().get::<Velocity>().unwrap().bit();
        assert_eq!(first.unwrap().old(), Mask::EMPTY);
        assert_eq!(first.unwrap().new(), pos);
        assert_eq!(second.unwrap().new(), pos.with(vel));
        assert_eq!(entities.component_mask(entity), Some(pos.with(vel)));
        assert_eq!(components.get::<Position>(entity), Some(&Position(1.0)));
        assert_eq!(components.len(), 2);
    }

    #[test]
    fn insert_duplicate_is_noop() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();
        components.insert(&mut entities, entity, Position(1.0)).unwrap();

        // When
        let result = components.insert(&mut entities, entity, Position(5.0)).unwrap();

        // Then
        assert_eq!(result, None);
        assert_eq!(components.get::<Position>(entity), Some(&Position(1.0)));
    }

    #[test]
    fn insert_on_dead_entity_is_noop() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();
        entities.destroy(entity);

        // When
        let result = components.insert(&mut entities, entity, Position(1.0)).unwrap();

        // Then
        assert_eq!(result, None);
        assert!(components.store::<Position>().is_none());
    }

    #[test]
    fn remove_clears_mask_bit() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();
        components.insert(&mut entities, entity, Position(1.0)).unwrap();
        components.insert(&mut entities, entity, Velocity(2.0)).unwrap();

        // When
        let (removed, transition) = components.remove::<Position>(&mut entities, entity).unwrap();

        // Then
        let vel = components.types().get::<Velocity>().unwrap().bit();
        assert_eq!(removed, Position(1.0));
        assert_eq!(transition.new(), vel);
        assert_eq!(entities.component_mask(entity), Some(vel));
        assert!(!components.contains::<Position>(entity));
        assert!(components.remove::<Position>(&mut entities, entity).is_none());
    }

    #[test]
    fn remove_index_walks_mask() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();
        components.insert(&mut entities, entity, Position(1.0)).unwrap();
        components.insert(&mut entities, entity, Velocity(2.0)).unwrap();

        // When
        let mask = entities.component_mask(entity).unwrap();
        for index in mask.indices() {
            assert!(components.remove_index(&mut entities, entity, index).is_some());
        }

        // Then
        assert_eq!(entities.component_mask(entity), Some(Mask::EMPTY));
        assert!(components.is_empty());
    }

    #[test]
    fn unregistered_type_reads_as_absent() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();

        // Then
        assert_eq!(components.get::<Position>(entity), None);
        assert!(!components.contains::<Position>(entity));
        assert!(components.remove::<Position>(&mut entities, entity).is_none());
        assert!(components.types().is_empty());
    }

    #[test]
    fn values_mut_updates_in_place() {
        // Given
        let (mut components, mut entities) = setup();
        let entity = entities.create();
        components.insert(&mut entities, entity, Velocity(1.0)).unwrap();

        // When
        if let Some(mut values) = components.values_mut::<Velocity>() {
            for velocity in values.components_mut() {
                velocity.0 = 9.0;
            }
        }

        // Then
        assert_eq!(components.get::<Velocity>(entity), Some(&Velocity(9.0)));
    }
}
