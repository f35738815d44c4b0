use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::Bitable;

pub struct Bitmask<T: Bitable>(pub u64, PhantomData<T>);

// Written out so `T` itself needs none of these traits.
impl<T: Bitable> Clone for Bitmask<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Bitable> Copy for Bitmask<T> {}

impl<T: Bitable> PartialEq for Bitmask<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Bitable> Eq for Bitmask<T> {}

impl<T: Bitable> Hash for Bitmask<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: Bitable> Bitmask<T> {
    /// Create a new bitmask from a slice of values.
    pub fn new(values: &[T]) -> Self {
        let mut bits = 0;
        for value in values {
            bits |= value.bit();
        }
        Self(bits, PhantomData)
    }

    /// Create an empty bitmask.
    pub const fn empty() -> Self {
        Self(0, PhantomData)
    }

    /// Create a new bitmask from a raw value.
    pub const fn from_value(value: u64) -> Self {
        Self(value, PhantomData)
    }

    /// Check if the bitmask contains a specific value.
    #[inline]
    pub fn contains(&self, bit: T) -> bool {
        (self.0 & bit.bit()) != 0
    }

    /// Insert a value to the bitmask.
    #[inline]
    pub fn insert(&mut self, bit: T) {
        self.0 |= bit.bit();
    }

    /// Remove a value from the bitmask.
    #[inline]
    pub fn remove(&mut self, bit: T) {
        self.0 &= !bit.bit();
    }

    /// Insert or remove a value depending on `on`.
    #[inline]
    pub fn set(&mut self, bit: T, on: bool) {
        if on {
            self.insert(bit);
        } else {
            self.remove(bit);
        }
    }

    /// Check if the bitmask is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if the bitmask is subset of another bitmask.
    #[inline]
    pub fn is_subset(&self, other: &Bitmask<T>) -> bool {
        self.0 & other.0 == self.0
    }

    /// Check if the bitmask is superset of another bitmask.
    #[inline]
    pub fn is_superset(&self, other: &Bitmask<T>) -> bool {
        other.is_subset(self)
    }

    /// Bits that differ between `self` and `other`.
    #[inline]
    pub fn changed(&self, other: &Bitmask<T>) -> Bitmask<T> {
        Self(self.0 ^ other.0, PhantomData)
    }

    /// Keep only the lowest `count` bits.
    #[inline]
    pub fn truncate(&self, count: u32) -> Bitmask<T> {
        if count >= u64::BITS {
            *self
        } else {
            Self(self.0 & ((1u64 << count) - 1), PhantomData)
        }
    }

    /// Count the number of bits set in the bitmask.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over the positions of set bits, lowest first.
    #[inline]
    pub fn iter(&self) -> Indices {
        Indices(self.0)
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmask({:#b})", self.0)
    }
}

/// Iterator over the set bit positions of a [`Bitmask`].
#[derive(Debug, Clone)]
pub struct Indices(u64);

impl Iterator for Indices {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        if self.0 == 0 {
            return None;
        }
        let index = self.0.trailing_zeros();
        self.0 &= self.0 - 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Indices {}
