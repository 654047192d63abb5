//! Dense type ids and type bits for components and systems.
//!
//! This module provides [`TypeRegistry`], a thread-safe registry that assigns every distinct Rust
//! type a dense numeric id (`0..32`) together with the single [`Mask`] bit derived from it. A
//! world keeps one registry per [`TypeKind`]: component bits make up entity component masks and
//! filters, system bits make up entity system masks.
//!
//! # Capacity
//!
//! Masks are 32 bits wide, so a registry holds at most [`TypeRegistry::CAPACITY`] types.
//! Registering one more returns a [`CapacityError`] and consumes no id. Registration is permanent:
//! there is no way to release an id once assigned.
//!
//! # Thread Safety
//!
//! Lookups are lock-free reads via `DashMap`; registration of a new type only contends on the map
//! shard of that type and an atomic counter. Several worlds can share one registry through an
//! `Arc` to get consistent ids across them.
//!
//! # Example
//!
//! ```rust,ignore
//! let registry = TypeRegistry::new(TypeKind::Component);
//!
//! let pos = registry.get_or_assign::<Position>()?;
//! let vel = registry.get_or_assign::<Velocity>()?;
//!
//! assert_eq!(registry.get_or_assign::<Position>()?, pos);
//! assert!(!pos.bit().intersects(vel.bit()));
//! ```

use std::{
    any::{TypeId as StdTypeId, type_name},
    error, fmt,
    sync::{
        RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use dashmap::DashMap;
use log::debug;

use crate::ecs::mask::Mask;

/// The kind of types a registry hands ids out for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Component types (attached to entities).
    Component,
    /// System types (subscribed to entities through a filter).
    System,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Component => write!(f, "component"),
            TypeKind::System => write!(f, "system"),
        }
    }
}

/// A dense type identifier in `0..32`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    /// Construct a new Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this ID for use in indexable storage (e.g., Vec, bitset).
    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// The registration record of one type: its dense id and its mask bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    id: TypeId,
    bit: Mask,
}

impl Descriptor {
    #[inline]
    const fn new(id: TypeId) -> Self {
        Self {
            id,
            bit: Mask::bit(id.index()),
        }
    }

    /// Get the dense type id.
    #[inline]
    pub const fn id(&self) -> TypeId {
        self.id
    }

    /// Get the single-bit mask of this type (`1 << id`).
    #[inline]
    pub const fn bit(&self) -> Mask {
        self.bit
    }
}

/// Returned when a registry is asked for a type beyond its fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityError {
    /// The kind of registry that ran out of ids.
    kind: TypeKind,
    /// The name of the type that could not be registered.
    type_name: &'static str,
}

impl CapacityError {
    #[inline]
    pub const fn new(kind: TypeKind, type_name: &'static str) -> Self {
        Self { kind, type_name }
    }

    /// The kind of registry that was full.
    #[inline]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// The name of the rejected type.
    #[inline]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot register {} type '{}': all {} {} slots are taken",
            self.kind,
            self.type_name,
            TypeRegistry::CAPACITY,
            self.kind
        )
    }
}

impl error::Error for CapacityError {}

/// A thread-safe registry of dense type ids for one [`TypeKind`].
pub struct TypeRegistry {
    /// The kind of types this registry serves.
    kind: TypeKind,

    /// Map from Rust TypeId to our descriptor. Lock-free reads via sharded concurrent hashmap.
    type_map: DashMap<StdTypeId, Descriptor>,

    /// Type names indexed by dense id. Protected by RwLock for rare writes.
    names: RwLock<Vec<&'static str>>,

    /// Next available type identifier.
    next_id: AtomicU32,
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .finish()
    }
}

impl TypeRegistry {
    /// Maximum number of types a registry can hold, one per mask bit.
    pub const CAPACITY: usize = Mask::CAPACITY;

    /// Create a new, empty registry.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            type_map: DashMap::new(),
            names: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// The kind of types this registry serves.
    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Get the descriptor of `T`, assigning the next free id on first use.
    ///
    /// Idempotent: every later call for the same type returns the same descriptor. Fails with a
    /// [`CapacityError`] when all [`Self::CAPACITY`] ids are already taken by other types.
    pub fn get_or_assign<T: 'static>(&self) -> Result<Descriptor, CapacityError> {
        let std_type_id = StdTypeId::of::<T>();

        // Fast path: already registered (lock-free read)
        if let Some(existing) = self.type_map.get(&std_type_id) {
            return Ok(*existing);
        }

        // Slow path: the entry API settles racing registrations of the same type
        match self.type_map.entry(std_type_id) {
            dashmap::Entry::Occupied(occupied) => Ok(*occupied.get()),
            dashmap::Entry::Vacant(vacant) => {
                // Claim an id only while one is left, so a failed registration consumes nothing.
                let id = self
                    .next_id
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                        ((next as usize) < Self::CAPACITY).then_some(next + 1)
                    })
                    .map_err(|_| CapacityError::new(self.kind, type_name::<T>()))?;

                let descriptor = Descriptor::new(TypeId(id));

                let mut names = self.names.write().unwrap_or_else(|e| e.into_inner());
                let index = id as usize;
                if index >= names.len() {
                    names.resize(index + 1, "");
                }
                names[index] = type_name::<T>();

                vacant.insert(descriptor);
                debug!(
                    "Registered {} type '{}' as id {}",
                    self.kind,
                    type_name::<T>(),
                    id
                );
                Ok(descriptor)
            }
        }
    }

    /// Get the descriptor of `T`, if registered.
    #[inline]
    pub fn get<T: 'static>(&self) -> Option<Descriptor> {
        self.type_map
            .get(&StdTypeId::of::<T>())
            .map(|entry| *entry.value())
    }

    /// Get the type name registered under `id`.
    pub fn name(&self, id: TypeId) -> Option<&'static str> {
        let names = self.names.read().unwrap_or_else(|e| e.into_inner());
        names.get(id.index()).copied().filter(|name| !name.is_empty())
    }

    /// Get the number of registered types.
    #[inline]
    pub fn len(&self) -> usize {
        self.next_id.load(Ordering::Acquire) as usize
    }

    /// Check if the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
