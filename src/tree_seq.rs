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

/// A sorted sequence that keeps duplicates, with positional access.
///
/// Elements are kept in ascending order. Equal elements stay in the order they
/// were inserted, and removing by value takes the earliest of them.
///
/// # Examples
///
/// ```
/// use tree_collections::TreeSeq;
///
/// let mut seq = TreeSeq::new();
/// for value in [1, 2, 1, 2, 3, 1, 0, -1, 1] {
///     seq.insert(value).unwrap();
/// }
///
/// assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [-1, 0, 1, 1, 1, 1, 2, 2, 3]);
/// assert_eq!(seq.nth(0), Ok(&-1));
/// assert_eq!(seq.nth(-1), Ok(&3));
/// assert_eq!(seq.count(&1), 4);
/// assert_eq!(seq.index_of(&2), Some(6));
/// ```
pub struct TreeSeq<T> {
    raw: RawTree<T, ()>,
}

impl<T> TreeSeq<T> {
    /// Makes a new, empty `TreeSeq` with the default [`Degree`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_degree(Degree::DEFAULT)
    }

    /// Makes a new, empty `TreeSeq` whose nodes use the given degree.
    #[must_use]
    pub const fn with_degree(degree: Degree) -> Self {
        Self {
            raw: RawTree::new(degree),
        }
    }

    /// Returns the number of elements, counting duplicates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Removes every element. Cursors opened before the call are unaffected.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|(element, ())| element)
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|(element, ())| element)
    }

    /// Returns the element at position `index`; negative indices count from
    /// the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `-len <= index < len`.
    pub fn nth(&self, index: isize) -> Result<&T> {
        let rank = resolve_index(index, self.len())?;
        let (element, ()) = self.raw.get_by_rank(rank).expect("TreeSeq::nth: resolved rank out of bounds");
        Ok(element)
    }

    /// Gets a borrowed iterator over the elements in order.
    pub fn iter(&self) -> Elements<'_, T> {
        Elements::new(&self.raw, 0, self.len())
    }

    /// Opens a snapshot cursor over the elements in order.
    ///
    /// See [`Cursor`](crate::Cursor) for what a snapshot guarantees.
    pub fn cursor(&self) -> ElementCursor<T> {
        ElementCursor::new(&self.raw, 0, self.len())
    }
}

impl<T: Ord> TreeSeq<T> {
    /// Returns `true` if some element equals `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.contains_key(value)
    }

    /// Returns the earliest-inserted element equal to `value`.
    ///
    /// The stored element is returned, which may differ from `value` when
    /// distinct elements compare equal (such as `Key::Int(1)` and
    /// `Key::Float(1.0)`).
    pub fn get<Q>(&self, value: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let rank = self.raw.rank_of(value)?;
        self.raw.get_by_rank(rank).map(|(element, ())| element)
    }

    /// Returns the number of elements equal to `value`.
    ///
    /// # Complexity
    ///
    /// O(log n), independent of the count.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.upper_rank(value) - self.raw.rank(value)
    }

    /// Returns the position of the first element equal to `value`.
    pub fn index_of<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank_of(value)
    }

    /// Returns the number of elements strictly less than `value`.
    pub fn rank<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.rank(value)
    }

    /// Returns the number of elements less than or equal to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::TreeSeq;
    ///
    /// let seq = TreeSeq::from_values([5, 1, 5, 3]).unwrap();
    /// assert_eq!(seq.rank(&5), 2);
    /// assert_eq!(seq.upper_rank(&5), 4);
    /// ```
    pub fn upper_rank<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.upper_rank(value)
    }

    /// Gets a borrowed iterator over the elements within `range`.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
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

impl<T: Orderable + Clone> TreeSeq<T> {
    /// Builds a sequence from values in any order. Equal values keep the order
    /// they had in `values`.
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
            raw: RawTree::from_unsorted(entries, degree, Duplicates::Keep)?,
        })
    }

    /// Inserts `value` after every element equal to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] if `value` cannot be ordered. The
    /// sequence is left unchanged.
    pub fn insert(&mut self, value: T) -> Result<()> {
        self.raw.insert(value, (), Duplicates::Keep)?;
        Ok(())
    }

    /// Removes the earliest-inserted element equal to `value`.
    ///
    /// Returns whether an element was removed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_collections::{Key, TreeSeq};
    ///
    /// let mut seq = TreeSeq::new();
    /// seq.insert(Key::Float(1.0)).unwrap();
    /// seq.insert(Key::Int(1)).unwrap();
    ///
    /// assert!(seq.remove(&Key::Int(1)));
    /// assert!(matches!(seq.first(), Some(Key::Int(1))));
    /// ```
    pub fn remove<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.remove(value).is_some()
    }

    /// Removes and returns the element at `index`; negative indices count from
    /// the end.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] unless `-len <= index < len`.
    pub fn remove_at(&mut self, index: isize) -> Result<T> {
        let rank = resolve_index(index, self.len())?;
        let (element, ()) = self.raw.remove_at(rank).expect("TreeSeq::remove_at: resolved rank out of bounds");
        Ok(element)
    }

    /// Removes and returns the first element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the sequence is empty.
    pub fn pop_first(&mut self) -> Result<T> {
        self.raw.pop_first().map(|(element, ())| element).ok_or(Error::EmptyContainer)
    }

    /// Removes and returns the last element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyContainer`] if the sequence is empty.
    pub fn pop_last(&mut self) -> Result<T> {
        self.raw.pop_last().map(|(element, ())| element).ok_or(Error::EmptyContainer)
    }
}

impl<T: Clone> Clone for TreeSeq<T> {
    fn clone(&self) -> Self {
        Self { raw: self.raw.clone() }
    }
}

impl<T: Hash> Hash for TreeSeq<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for element in self {
            element.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for TreeSeq<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for TreeSeq<T> {}

impl<T: PartialOrd> PartialOrd for TreeSeq<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for TreeSeq<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for TreeSeq<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for TreeSeq<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a TreeSeq<T> {
    type Item = &'a T;
    type IntoIter = Elements<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Indexes into the sequence by rank.
///
/// # Panics
///
/// Panics if `rank` is out of bounds.
impl<T> Index<Rank> for TreeSeq<T> {
    type Output = T;

    fn index(&self, rank: Rank) -> &Self::Output {
        self.raw.get_by_rank(rank.0).map(|(element, ())| element).expect("index out of bounds")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Key;
    use alloc::vec::Vec;

    #[test]
    fn remove_at_resolves_negative_indices() {
        let mut seq = TreeSeq::from_values([4, 2, 2, 8]).unwrap();
        assert_eq!(seq.remove_at(-1), Ok(8));
        assert_eq!(seq.remove_at(0), Ok(2));
        assert_eq!(seq.remove_at(-3), Err(Error::IndexOutOfRange { index: -3, len: 2 }));
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [2, 4]);
    }

    #[test]
    fn get_returns_the_earliest_equal_element() {
        let mut seq = TreeSeq::new();
        seq.insert(Key::Float(1.0)).unwrap();
        seq.insert(Key::Int(1)).unwrap();
        seq.insert(Key::Int(0)).unwrap();

        assert!(matches!(seq.get(&Key::Int(1)), Some(Key::Float(_))));
        assert!(matches!(seq.get(&Key::Float(0.0)), Some(Key::Int(0))));
        assert_eq!(seq.get(&Key::from("missing")), None);
    }

    #[test]
    fn stable_bulk_build() {
        // Ordered by the number alone; the letter tells equal elements apart.
        #[derive(Clone, Debug, Eq, PartialEq)]
        struct Tagged(i32, char);
        impl Ord for Tagged {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.cmp(&other.0)
            }
        }
        impl PartialOrd for Tagged {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Orderable for Tagged {}

        let seq = TreeSeq::from_values([Tagged(1, 'a'), Tagged(0, 'b'), Tagged(1, 'c'), Tagged(1, 'd')]).unwrap();
        let tags: Vec<char> = seq.iter().map(|t| t.1).collect();
        assert_eq!(tags, ['b', 'a', 'c', 'd']);
    }
}
