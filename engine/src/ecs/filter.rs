//! Conjunctive component filters.
//!
//! A [`Filter`] is the set of component types a system requires, folded into a single [`Mask`].
//! An entity matches when its component mask contains every required bit.

use crate::{
    ecs::{
        component::Component,
        mask::Mask,
        world::{CapacityError, TypeRegistry},
    },
    tuples_up_to_16,
};

/// A set of component types that can be turned into a required mask.
///
/// Implemented for `()` and for tuples of up to sixteen [`Component`] types.
pub trait Accept {
    /// Fold the bit of every type into one mask, registering types on first sight.
    fn accept(types: &TypeRegistry) -> Result<Mask, CapacityError>;
}

impl Accept for () {
    fn accept(_types: &TypeRegistry) -> Result<Mask, CapacityError> {
        Ok(Mask::EMPTY)
    }
}

macro_rules! tuple_accept {
    ($($name: ident),*) => {
        impl<$($name: Component),*> Accept for ($($name,)*) {
            fn accept(types: &TypeRegistry) -> Result<Mask, CapacityError> {
                let mut required = Mask::EMPTY;
                $(
                    required = required.with(types.get_or_assign::<$name>()?.bit());
                )*
                Ok(required)
            }
        }
    }
}

tuples_up_to_16!(tuple_accept);

/// The required component mask of a system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    required: Mask,
}

impl Filter {
    /// Build a filter requiring every type in `A`.
    ///
    /// Types not yet known to `types` are registered, so this fails only when the registry is full.
    pub fn accept<A: Accept>(types: &TypeRegistry) -> Result<Self, CapacityError> {
        A::accept(types).map(Self::from_mask)
    }

    /// Build a filter from a raw required mask.
    #[inline]
    pub const fn from_mask(required: Mask) -> Self {
        Self { required }
    }

    #[inline]
    pub const fn required(&self) -> Mask {
        self.required
    }

    /// Check whether an entity with component mask `mask` matches.
    ///
    /// A filter that requires nothing matches nothing.
    #[inline]
    pub const fn matches(&self, mask: Mask) -> bool {
        !self.required.is_empty() && mask.contains_all(self.required)
    }
}
