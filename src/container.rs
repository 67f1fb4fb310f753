//! The capabilities every tree collection shares.

use crate::error::Result;
use crate::{TreeMap, TreeSeq, TreeSet};

/// Operations common to [`TreeMap`], [`TreeSet`] and [`TreeSeq`].
///
/// Code written against this trait works with any of the three collections.
///
/// # Examples
///
/// ```
/// use tree_collections::{OrderedContainer, TreeSeq, TreeSet};
///
/// fn median<C: OrderedContainer>(container: &C) -> Option<C::Entry<'_>> {
///     let middle = isize::try_from(container.len() / 2).ok()?;
///     container.nth(middle).ok()
/// }
///
/// let set = TreeSet::from_values([5, 1, 3]).unwrap();
/// let seq = TreeSeq::from_values([2, 2, 9, 1]).unwrap();
/// assert_eq!(median(&set), Some(&3));
/// assert_eq!(median(&seq), Some(&2));
/// ```
pub trait OrderedContainer {
    /// The type the container is ordered by.
    type Key;

    /// What positional access yields: an entry for maps, an element otherwise.
    type Entry<'a>
    where
        Self: 'a;

    /// Returns the number of stored entries.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if an entry with a key equal to `key` is stored.
    fn contains(&self, key: &Self::Key) -> bool;

    /// Returns the entry at `index` in sorted order; negative indices count
    /// from the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) unless
    /// `-len <= index < len`.
    fn nth(&self, index: isize) -> Result<Self::Entry<'_>>;

    /// Returns the number of entries whose key is strictly less than `key`.
    fn rank(&self, key: &Self::Key) -> usize;

    /// Removes everything.
    fn clear(&mut self);
}

impl<K: Ord, V> OrderedContainer for TreeMap<K, V> {
    type Key = K;
    type Entry<'a>
        = (&'a K, &'a V)
    where
        Self: 'a;

    fn len(&self) -> usize {
        TreeMap::len(self)
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn nth(&self, index: isize) -> Result<Self::Entry<'_>> {
        TreeMap::nth(self, index)
    }

    fn rank(&self, key: &K) -> usize {
        TreeMap::rank(self, key)
    }

    fn clear(&mut self) {
        TreeMap::clear(self);
    }
}

impl<T: Ord> OrderedContainer for TreeSet<T> {
    type Key = T;
    type Entry<'a>
        = &'a T
    where
        Self: 'a;

    fn len(&self) -> usize {
        TreeSet::len(self)
    }

    fn contains(&self, key: &T) -> bool {
        TreeSet::contains(self, key)
    }

    fn nth(&self, index: isize) -> Result<Self::Entry<'_>> {
        TreeSet::nth(self, index)
    }

    fn rank(&self, key: &T) -> usize {
        TreeSet::rank(self, key)
    }

    fn clear(&mut self) {
        TreeSet::clear(self);
    }
}

impl<T: Ord> OrderedContainer for TreeSeq<T> {
    type Key = T;
    type Entry<'a>
        = &'a T
    where
        Self: 'a;

    fn len(&self) -> usize {
        TreeSeq::len(self)
    }

    fn contains(&self, key: &T) -> bool {
        TreeSeq::contains(self, key)
    }

    fn nth(&self, index: isize) -> Result<Self::Entry<'_>> {
        TreeSeq::nth(self, index)
    }

    fn rank(&self, key: &T) -> usize {
        TreeSeq::rank(self, key)
    }

    fn clear(&mut self) {
        TreeSeq::clear(self);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{Error, Key};

    fn exercise<C: OrderedContainer<Key = Key>>(mut container: C, present: &Key, absent: &Key) {
        assert!(container.contains(present));
        assert!(!container.contains(absent));
        assert!(container.nth(0).is_ok());
        let len = container.len();
        assert_eq!(
            container.nth(isize::try_from(len).unwrap()).err(),
            Some(Error::IndexOutOfRange { index: isize::try_from(len).unwrap(), len })
        );
        assert!(container.rank(absent) <= len);

        container.clear();
        assert!(container.is_empty());
        assert!(!container.contains(present));
    }

    #[test]
    fn every_view_implements_the_capability_set() {
        let keys = [Key::from(3), Key::from("x"), Key::from(-1.5)];
        let (present, absent) = (Key::from("x"), Key::from(7));

        exercise(TreeMap::from_entries(keys.clone().map(|k| (k, ()))).unwrap(), &present, &absent);
        exercise(TreeSet::from_values(keys.clone()).unwrap(), &present, &absent);
        exercise(TreeSeq::from_values(keys).unwrap(), &present, &absent);
    }
}
