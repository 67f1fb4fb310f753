use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Index, RangeBounds};

use crate::config::Degree;
use crate::cursor::{Cursor, Iter, Keys, Values};
use crate::error::{Error, Result};
use crate::key::Orderable;
use crate::raw::{Duplicates, RawTree};

mod order_statistic;

/// An ordered map with unique keys and O(log n) order-statistic queries.
///
/// Entries are kept in ascending key order. Besides the usual lookups, the map
/// answers "what is the n-th entry" and "how many keys sort before this one" in
/// logarithmic time, and accepts negative indices counting from the end.
///
/// Keys are validated with [`Orderable::check_orderable`] before any mutation,
/// so a map of [`Key`](crate::Key)s never holds a `NaN`.
///
/// Cloning a map is O(1): the clone shares every node with the original, and
/// whichever side is mutated first copies the nodes it touches.
///
/// # Examples
///
/// ```
/// use tree_collections::{Key, TreeMap};
///
/// let mut map = TreeMap::new();
/// map.insert(Key::from(1), "one").unwrap();
/// map.insert(Key::from("two"), "two").unwrap();
/// map.insert(Key::from(-2.5), "minus two and a half").unwrap();
///
/// // Numbers sort before text.
/// assert_eq!(map.nth(0).unwrap(), (&Key::Float(-2.5), &"minus two and a half"));
/// assert_eq!(map.nth(-1).unwrap().1, &"two");
///
/// // Integers and floats compare by value.
/// assert_eq!(map.get(&Key::Float(1.0)), Some(&"one"));
/// ```
pub struct TreeMap<K, V> {
    raw: RawTree<K, V>,
}

impl<K, V> TreeMap<K, V> {
    /// Makes a new, empty `TreeMap` with the default [`Degree`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(1, "a").unwrap();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_degree(Degree::DEFAULT)
    }

    /// Makes a new, empty `TreeMap` whose nodes use the given degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Degree, TreeMap};
    ///
    /// let map: TreeMap<i32, i32> = TreeMap::with_degree(Degree::new(4).unwrap());
    /// assert_eq!(map.degree().get(), 4);
    /// ```
    #[must_use]
    pub const fn with_degree(degree: Degree) -> Self {
        Self {
            raw: RawTree::new(degree),
        }
    }

    /// Returns the degree this map was built with.
    #[must_use]
    pub const fn degree(&self) -> Degree {
        self.raw.degree()
    }

    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the map, removing all entries.
    ///
    /// Cursors opened before the call keep yielding the old contents.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut a = TreeMap::new();
    /// a.insert(1, "a").unwrap();
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first entry in the map, the one with the minimum key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first()
    }

    /// Returns the last entry in the map, the one with the maximum key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let map = TreeMap::from_entries([(1, "b"), (2, "a")]).unwrap();
    /// assert_eq!(map.last_key_value(), Some((&2, &"a")));
    /// ```
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last()
    }

    /// Gets a borrowed iterator over the entries of the map, sorted by key.
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.raw, 0, self.len())
    }

    /// Opens a snapshot cursor over the entries of the map, sorted by key.
    ///
    /// The cursor owns shared references to the map's nodes. It stays valid
    /// while the map is mutated, cleared or dropped, and yields the entries as
    /// they were when it was opened.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut map = TreeMap::from_entries([(1, 'a'), (2, 'b')]).unwrap();
    /// let mut cursor = map.cursor();
    /// map.insert(0, 'z').unwrap();
    ///
    /// assert_eq!(cursor.next(), Some((1, 'a')));
    /// assert_eq!(map.len(), 3);
    /// ```
    pub fn cursor(&self) -> Cursor<K, V> {
        Cursor::new(&self.raw, 0, self.len())
    }

    /// Same as [`cursor`](Self::cursor).
    pub fn items(&self) -> Cursor<K, V> {
        self.cursor()
    }

    /// Opens a snapshot cursor over the keys of the map, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let map = TreeMap::from_entries([(2, "b"), (1, "a")]).unwrap();
    /// let keys: Vec<_> = map.keys().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<K, V> {
        Keys::new(&self.raw, 0, self.len())
    }

    /// Opens a snapshot cursor over the values of the map, in key order.
    pub fn values(&self) -> Values<K, V> {
        Values::new(&self.raw)
    }
}

impl<K: Ord, V> TreeMap<K, V> {
    /// Returns `true` if the map contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(1, "a").unwrap();
    /// assert!(map.contains_key(&1));
    /// assert!(!map.contains_key(&2));
    /// ```
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(key)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get(key)
    }

    /// Returns the stored key and the value corresponding to `key`.
    ///
    /// The stored key may differ from the probe when the two merely compare
    /// equal, as `Key::Int(2)` and `Key::Float(2.0)` do.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(key)
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Gets a borrowed iterator over a sub-range of entries in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::Included;
    /// use tree_collections::TreeMap;
    ///
    /// let map = TreeMap::from_entries([(3, "a"), (5, "b"), (8, "c")]).unwrap();
    /// let found: Vec<_> = map.range((Included(&4), Included(&8))).collect();
    /// assert_eq!(found, [(&5, &"b"), (&8, &"c")]);
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; O(1) amortized per step.
    pub fn range<Q, R>(&self, range: R) -> Iter<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        let (start, end) = self.raw.rank_range(&range);
        Iter::new(&self.raw, start, end)
    }
}

impl<K: Orderable + Clone, V: Clone> TreeMap<K, V> {
    /// Builds a map from entries in any order.
    ///
    /// All keys are validated before the map is built. When a key repeats, the
    /// first occurrence's key is stored with the last occurrence's value, the
    /// same outcome as inserting the entries in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if any key cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Error, Key, TreeMap};
    ///
    /// let map = TreeMap::from_entries([(3, 'c'), (1, 'a'), (3, 'C')]).unwrap();
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map[&3], 'C');
    ///
    /// let bad = TreeMap::from_entries([(Key::Float(f64::NAN), ())]);
    /// assert_eq!(bad.unwrap_err(), Error::UnorderableKey("float"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n log n) for the sort; the tree itself is built in O(n).
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::from_entries_with_degree(entries, Degree::DEFAULT)
    }

    /// Like [`from_entries`](Self::from_entries), with an explicit degree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if any key cannot be ordered.
    pub fn from_entries_with_degree<I>(entries: I, degree: Degree) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Ok(Self {
            raw: RawTree::from_unsorted(entries, degree, Duplicates::Replace)?,
        })
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated, though.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if `key` cannot be ordered. The map is
    /// left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Key, TreeMap};
    ///
    /// let mut map = TreeMap::new();
    /// assert_eq!(map.insert(Key::Int(37), "a").unwrap(), None);
    /// assert_eq!(map.insert(Key::Float(37.0), "b").unwrap(), Some("a"));
    ///
    /// // The original key stays.
    /// assert_eq!(map.first_key_value(), Some((&Key::Int(37), &"b")));
    /// assert!(map.insert(Key::Float(f64::NAN), "c").is_err());
    /// assert_eq!(map.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.raw.insert(key, value, Duplicates::Replace)
    }

    /// Inserts every entry, validating all keys first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if any key cannot be ordered, in which
    /// case nothing is inserted.
    pub fn extend_entries<I>(&mut self, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries: alloc::vec::Vec<(K, V)> = entries.into_iter().collect();
        for (key, _) in &entries {
            key.check_orderable()?;
        }
        for (key, value) in entries {
            self.insert(key, value)?;
        }
        Ok(())
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeMap;
    ///
    /// let mut map = TreeMap::new();
    /// map.insert(1, "a").unwrap();
    /// if let Some(x) = map.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(map[&1], "b");
    /// ```
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_mut(key)
    }

    /// Removes a key from the map, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and the value if
    /// the key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(key)
    }

    /// Like [`remove`](Self::remove), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Error, TreeMap};
    ///
    /// let mut map = TreeMap::from_entries([("a", 1)]).unwrap();
    /// assert_eq!(map.try_remove("a"), Ok(1));
    /// assert_eq!(map.try_remove("a"), Err(Error::KeyNotFound));
    /// ```
    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove(key).ok_or(Error::KeyNotFound)
    }

    /// Removes and returns the first entry in the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the map is empty.
    pub fn pop_first(&mut self) -> Result<(K, V)> {
        self.raw.pop_first().ok_or(Error::EmptyContainer)
    }

    /// Removes and returns the last entry in the map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Error, TreeMap};
    ///
    /// let mut map = TreeMap::from_entries([(1, "a"), (2, "b")]).unwrap();
    /// assert_eq!(map.pop_last(), Ok((2, "b")));
    /// assert_eq!(map.pop_last(), Ok((1, "a")));
    /// assert_eq!(map.pop_last(), Err(Error::EmptyContainer));
    /// ```
    pub fn pop_last(&mut self) -> Result<(K, V)> {
        self.raw.pop_last().ok_or(Error::EmptyContainer)
    }
}

impl<K: Clone, V: Clone> Clone for TreeMap<K, V> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for TreeMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for TreeMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for TreeMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for TreeMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for TreeMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for TreeMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for TreeMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, K, V> IntoIterator for &'a TreeMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for TreeMap<K, V> {
    type Item = (K, V);
    type IntoIter = Cursor<K, V>;

    /// Turns the map into a cursor over its entries. Entries are cloned out
    /// of nodes still shared with other maps or cursors.
    fn into_iter(self) -> Self::IntoIter {
        self.cursor()
    }
}

impl<K, Q, V> Index<&Q> for TreeMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}
