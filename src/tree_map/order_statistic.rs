use core::borrow::Borrow;
use core::ops::{Index, IndexMut};

use super::TreeMap;
use crate::Rank;
use crate::error::Result;
use crate::key::Orderable;
use crate::order_statistic::resolve_index;

impl<K, V> TreeMap<K, V> {
    /// Returns the entry at position `index` in sorted order.
    ///
    /// Negative indices count from the end: `-1` is the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) unless
    /// `-len <= index < len`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Error, TreeMap};
    ///
    /// let map = TreeMap::from_entries([("a", 10), ("c", 30), ("b", 20)]).unwrap();
    ///
    /// assert_eq!(map.nth(1), Ok((&"b", &20)));
    /// assert_eq!(map.nth(-1), Ok((&"c", &30)));
    /// assert_eq!(map.nth(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    /// assert_eq!(map.nth(-4), Err(Error::IndexOutOfRange { index: -4, len: 3 }));
    /// ```
    pub fn nth(&self, index: isize) -> Result<(&K, &V)> {
        let rank = resolve_index(index, self.len())?;
        Ok(self.raw.get_by_rank(rank).expect("TreeMap::nth: resolved rank out of bounds"))
    }
}

impl<K: Ord, V> TreeMap<K, V> {
    /// Returns the number of keys strictly less than `key`.
    ///
    /// This is where `key` sits, or would be inserted, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let map = TreeMap::from_entries([(10, ()), (20, ()), (30, ())]).unwrap();
    /// assert_eq!(map.rank(&20), 1);
    /// assert_eq!(map.rank(&25), 2);
    /// assert_eq!(map.rank(&99), 3);
    /// ```
    pub fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(key)
    }

    /// Returns the zero-based rank of `key` in sorted order, or `None` if the
    /// key is not present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(key)
    }
}

impl<K: Orderable + Clone, V: Clone> TreeMap<K, V> {
    /// Returns the key and a mutable reference to the value at `index`.
    ///
    /// The key is returned as a shared reference because changing it could
    /// break the map's ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) unless
    /// `-len <= index < len`.
    pub fn nth_mut(&mut self, index: isize) -> Result<(&K, &mut V)> {
        let rank = resolve_index(index, self.len())?;
        Ok(self.raw.get_by_rank_mut(rank).expect("TreeMap::nth_mut: resolved rank out of bounds"))
    }

    /// Removes and returns the entry at `index` in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`](crate::Error::IndexOutOfRange) unless
    /// `-len <= index < len`. The map is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut map = TreeMap::from_entries([(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
    /// assert_eq!(map.remove_nth(-2), Ok((2, 'b')));
    /// assert!(map.remove_nth(2).is_err());
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove_nth(&mut self, index: isize) -> Result<(K, V)> {
        let rank = resolve_index(index, self.len())?;
        Ok(self.raw.remove_at(rank).expect("TreeMap::remove_nth: resolved rank out of bounds"))
    }
}

/// Indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<K, V> Index<Rank> for TreeMap<K, V> {
    type Output = V;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.raw.get_by_rank(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

/// Mutably indexes into the map by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use tree_collections::{Rank, TreeMap};
///
/// let mut map = TreeMap::from_entries([("a", 1), ("b", 2)]).unwrap();
/// map[Rank(1)] += 10;
/// assert_eq!(map[&"b"], 12);
/// ```
impl<K: Orderable + Clone, V: Clone> IndexMut<Rank> for TreeMap<K, V> {
    fn index_mut(&mut self, rank: Rank) -> &mut Self::Output {
        self.raw.get_by_rank_mut(rank.0).map(|(_, v)| v).expect("index out of bounds")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn rank_and_nth_are_inverse() {
        let map = TreeMap::from_entries((0..200).map(|i| (i * 3, i))).unwrap();
        for i in 0..200 {
            let (k, v) = map.nth(i).unwrap();
            assert_eq!(map.rank(k), usize::try_from(i).unwrap());
            assert_eq!(map.rank_of(k), Some(usize::try_from(*v).unwrap()));
            assert_eq!(map.nth(i - 200).unwrap(), (k, v));
        }
        assert_eq!(map.rank_of(&1), None);
        assert_eq!(map.rank(&1), 1);
    }

    #[test]
    #[should_panic(expected = "index out of bounds")]
    fn index_by_rank_panics_past_end() {
        let map = TreeMap::from_entries([(1, 1)]).unwrap();
        let _ = map[Rank(1)];
    }

    #[test]
    fn nth_mut_updates_in_place() {
        let mut map = TreeMap::from_entries([(1, 1), (2, 2)]).unwrap();
        *map.nth_mut(-1).unwrap().1 = 20;
        assert_eq!(map[&2], 20);
        assert_eq!(map.nth_mut(2).unwrap_err(), Error::IndexOutOfRange { index: 2, len: 2 });
    }
}
