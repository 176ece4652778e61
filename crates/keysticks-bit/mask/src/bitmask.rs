use std::fmt;
use std::marker::PhantomData;

use crate::Bitable;

/// A set of [`Bitable`] values packed into a single `u64`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitmask<T: Bitable>(u64, PhantomData<T>);

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

    /// Create a bitmask from raw bits.
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits, PhantomData)
    }

    /// Raw bits of the mask.
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn contains(&self, value: T) -> bool {
        (self.0 & value.bit()) != 0
    }

    #[inline]
    pub fn insert(&mut self, value: T) {
        self.0 |= value.bit();
    }

    #[inline]
    pub fn remove(&mut self, value: T) {
        self.0 &= !value.bit();
    }

    /// Builder-style insert.
    #[inline]
    #[must_use]
    pub fn with(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if every value of `self` is also in `other`.
    #[inline]
    pub fn is_subset(&self, other: &Bitmask<T>) -> bool {
        self.0 & other.0 == self.0
    }

    #[inline]
    pub fn is_superset(&self, other: &Bitmask<T>) -> bool {
        other.is_subset(self)
    }

    #[inline]
    pub fn intersects(&self, other: &Bitmask<T>) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    #[must_use]
    pub fn union(&self, other: &Bitmask<T>) -> Self {
        Self(self.0 | other.0, PhantomData)
    }

    #[inline]
    #[must_use]
    pub fn intersection(&self, other: &Bitmask<T>) -> Self {
        Self(self.0 & other.0, PhantomData)
    }

    #[inline]
    #[must_use]
    pub fn difference(&self, other: &Bitmask<T>) -> Self {
        Self(self.0 & !other.0, PhantomData)
    }

    /// Count the number of values in the bitmask.
    #[inline]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Iterate over the values in ascending bit order.
    pub fn iter(&self) -> Iter<T> {
        Iter {
            rest: self.0,
            _marker: PhantomData,
        }
    }
}

impl<T: Bitable> Default for Bitmask<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Bitable + fmt::Debug> fmt::Debug for Bitmask<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Bitable> FromIterator<T> for Bitmask<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut mask = Self::empty();
        for value in iter {
            mask.insert(value);
        }
        mask
    }
}

impl<T: Bitable> IntoIterator for Bitmask<T> {
    type Item = T;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the values of a [`Bitmask`].
pub struct Iter<T: Bitable> {
    rest: u64,
    _marker: PhantomData<T>,
}

impl<T: Bitable> Iterator for Iter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        while self.rest != 0 {
            let index = self.rest.trailing_zeros();
            self.rest &= self.rest - 1;
            if let Some(value) = T::from_index(index) {
                return Some(value);
            }
        }
        None
    }
}
