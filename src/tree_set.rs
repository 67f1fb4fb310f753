use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::{Index, RangeBounds};

use crate::Rank;
use crate::config::Degree;
use crate::cursor::{ElementCursor, Elements};
use crate::error::{Error, Result};
use crate::key::Orderable;
use crate::order_statistic::resolve_index;
use crate::raw::{Duplicates, RawTree};

/// An ordered set with O(log n) order-statistic queries.
///
/// It is a logic error for an element to be modified in such a way that its
/// ordering relative to any other element changes while it is in the set.
///
/// # Examples
///
/// ```
/// use tree_collections::{Key, TreeSet};
///
/// let mut set = TreeSet::new();
/// for value in [Key::from(1), Key::from(-1), Key::from(2), Key::from(-3), Key::from(5.2)] {
///     set.add(value).unwrap();
/// }
///
/// let sorted: Vec<String> = set.iter().map(ToString::to_string).collect();
/// assert_eq!(sorted, ["-3", "-1", "1", "2", "5.2"]);
///
/// // 2.0 is already present as 2.
/// assert!(!set.add(Key::Float(2.0)).unwrap());
/// assert_eq!(set.nth(-1).unwrap(), &Key::Float(5.2));
/// ```
pub struct TreeSet<T> {
    raw: RawTree<T, ()>,
}

impl<T> TreeSet<T> {
    /// Makes a new, empty `TreeSet` with the default [`Degree`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_degree(Degree::DEFAULT)
    }

    /// Makes a new, empty `TreeSet` whose nodes use the given degree.
    #[must_use]
    pub const fn with_degree(degree: Degree) -> Self {
        Self {
            raw: RawTree::new(degree),
        }
    }

    /// Returns the number of elements in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the set contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the set, removing all elements.
    ///
    /// Cursors opened before the call keep yielding the old contents.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the smallest element in the set, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeSet;
    ///
    /// let set = TreeSet::from_values([3, 1, 2]).unwrap();
    /// assert_eq!(set.first(), Some(&1));
    /// assert_eq!(set.last(), Some(&3));
    /// ```
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|(element, ())| element)
    }

    /// Returns a reference to the largest element in the set, if any.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|(element, ())| element)
    }

    /// Returns the element at position `index` in sorted order.
    ///
    /// Negative indices count from the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `-len <= index < len`.
    pub fn nth(&self, index: isize) -> Result<&T> {
        let rank = resolve_index(index, self.len())?;
        let (element, ()) = self.raw.get_by_rank(rank).expect("TreeSet::nth: resolved rank out of bounds");
        Ok(element)
    }

    /// Gets a borrowed iterator that visits the elements in ascending order.
    pub fn iter(&self) -> Elements<'_, T> {
        Elements::new(&self.raw, 0, self.len())
    }

    /// Opens a snapshot cursor over the elements in ascending order.
    ///
    /// See [`Cursor`](crate::Cursor) for what a snapshot guarantees.
    pub fn cursor(&self) -> ElementCursor<T> {
        ElementCursor::new(&self.raw, 0, self.len())
    }
}

impl<T: Ord> TreeSet<T> {
    /// Returns `true` if the set contains an element equal to the value.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(value)
    }

    /// Returns a reference to the stored element equal to the value, if any.
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.get_key_value(value).map(|(element, ())| element)
    }

    /// Returns the number of elements strictly less than `value`.
    pub fn rank<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(value)
    }

    /// Returns the rank of `value` if it is in the set.
    pub fn rank_of<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(value)
    }

    /// Gets a borrowed iterator over a sub-range of elements in the set.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeSet;
    ///
    /// let set = TreeSet::from_values([3, 5, 8]).unwrap();
    /// assert_eq!(set.range(4..).next(), Some(&5));
    /// assert_eq!(set.range(..=5).count(), 2);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Elements<'_, T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        let (start, end) = self.raw.rank_range(&range);
        Elements::new(&self.raw, start, end)
    }
}

impl<T: Orderable + Clone> TreeSet<T> {
    /// Builds a set from values in any order, keeping the first of each run of
    /// equal values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if any value cannot be ordered.
    pub fn from_values<I>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        Self::from_values_with_degree(values, Degree::DEFAULT)
    }

    /// Like [`from_values`](Self::from_values), with an explicit degree.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if any value cannot be ordered.
    pub fn from_values_with_degree<I>(values: I, degree: Degree) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let entries = values.into_iter().map(|value| (value, ()));
        Ok(Self {
            raw: RawTree::from_unsorted(entries, degree, Duplicates::Replace)?,
        })
    }

    /// Adds a value to the set.
    ///
    /// Returns whether the value was newly inserted. An equal element already
    /// in the set is kept as it is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if `value` cannot be ordered. The set
    /// is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeSet;
    ///
    /// let mut set = TreeSet::new();
    /// assert_eq!(set.add(2), Ok(true));
    /// assert_eq!(set.add(2), Ok(false));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn add(&mut self, value: T) -> Result<bool> {
        Ok(self.raw.insert(value, (), Duplicates::Replace)?.is_none())
    }

    /// Removes an element equal to `value`, if there is one.
    ///
    /// Returns whether an element was removed.
    pub fn discard<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(value).is_some()
    }

    /// Removes an element equal to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyNotFound`] if no element equals `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Error, TreeSet};
    ///
    /// let mut set = TreeSet::from_values(["a"]).unwrap();
    /// assert_eq!(set.remove("a"), Ok(()));
    /// assert_eq!(set.remove("a"), Err(Error::KeyNotFound));
    /// assert!(!set.discard("a"));
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> Result<()>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.discard(value) { Ok(()) } else { Err(Error::KeyNotFound) }
    }

    /// Removes and returns the smallest element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the set is empty.
    pub fn pop_first(&mut self) -> Result<T> {
        self.raw.pop_first().map(|(element, ())| element).ok_or(Error::EmptyContainer)
    }

    /// Removes and returns the largest element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the set is empty.
    pub fn pop_last(&mut self) -> Result<T> {
        self.raw.pop_last().map(|(element, ())| element).ok_or(Error::EmptyContainer)
    }
}

impl<T: Clone> Clone for TreeSet<T> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<T: Hash> Hash for TreeSet<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for TreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for TreeSet<T> {}

impl<T: PartialOrd> PartialOrd for TreeSet<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for TreeSet<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T> Default for TreeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a TreeSet<T> {
    type Item = &'a T;
    type IntoIter = Elements<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Indexes into the set by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
///
/// # Examples
///
/// ```
/// use tree_collections::{Rank, TreeSet};
///
/// let set = TreeSet::from_values(["b", "a"]).unwrap();
/// assert_eq!(set[Rank(0)], "a");
/// ```
impl<T> Index<Rank> for TreeSet<T> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.raw.get_by_rank(rank.0).map(|(element, ())| element).expect("index out of bounds")
    }
}
