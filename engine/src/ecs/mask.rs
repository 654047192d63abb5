//! Fixed-width type bitmasks.
//!
//! Every registered component or system type owns exactly one bit of a [`Mask`]. An entity's
//! component mask is the union of the bits of all components it carries, and its system mask is
//! the union of the bits of all systems currently tracking it. The width is fixed at 32 bits, which
//! is why a [`TypeRegistry`](crate::ecs::world::TypeRegistry) refuses a 33rd type.

use std::fmt;

/// A set of type bits packed into a `u32`.
#[derive(Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mask(u32);

impl Mask {
    /// The mask with no bits set.
    pub const EMPTY: Self = Self(0);

    /// Number of distinct type bits a mask can hold.
    pub const CAPACITY: usize = u32::BITS as usize;

    /// Construct a mask from raw bits.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Construct a mask holding the single bit for the type index `index`.
    ///
    /// # Panics
    ///
    /// Debug builds panic if `index` is not below [`Mask::CAPACITY`].
    #[inline]
    pub const fn bit(index: usize) -> Self {
        debug_assert!(index < Self::CAPACITY, "mask bit index out of range");
        Self(1 << index)
    }

    /// Get the raw bits.
    #[inline]
    pub const fn bits(&self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of bits set.
    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check whether every bit of `other` is also set in `self`.
    #[inline]
    pub const fn contains_all(&self, other: Mask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Check whether any bit of `other` is set in `self`.
    #[inline]
    pub const fn intersects(&self, other: Mask) -> bool {
        self.0 & other.0 != 0
    }

    /// A copy of this mask with the bits of `other` added.
    #[inline]
    #[must_use]
    pub const fn with(self, other: Mask) -> Self {
        Self(self.0 | other.0)
    }

    /// A copy of this mask with the bits of `other` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, other: Mask) -> Self {
        Self(self.0 & !other.0)
    }

    /// Iterate over the indices of the set bits, lowest first.
    #[inline]
    pub fn indices(&self) -> Indices {
        Indices(self.0)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mask({:#034b})", self.0)
    }
}

impl From<u32> for Mask {
    #[inline]
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

/// Iterator over the set bit indices of a [`Mask`].
pub struct Indices(u32);

impl Iterator for Indices {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros() as usize;
        // Clear the lowest set bit.
        self.0 &= self.0 - 1;
        Some(index)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Indices {}
