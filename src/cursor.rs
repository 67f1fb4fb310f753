//! Iterators and snapshot cursors over the tree collections.
//!
//! [`Iter`] and [`Elements`] borrow the collection. [`Cursor`], [`Keys`],
//! [`Values`] and [`ElementCursor`] own shared references to the tree's nodes instead: they stay
//! valid after the collection is mutated, cleared or dropped, and always yield
//! the contents as they were when the cursor was created.

use alloc::sync::Arc;
use core::fmt;
use core::iter::FusedIterator;

use crate::raw::{Node, RawTree, Walker};

/// A borrowed iterator over the entries of a [`TreeMap`](crate::TreeMap), in
/// ascending key order.
///
/// This `struct` is created by the [`iter`](crate::TreeMap::iter) and
/// [`range`](crate::TreeMap::range) methods.
///
/// # Examples
///
/// ```
/// use tree_collections::TreeMap;
///
/// let map = TreeMap::from_entries([(1, "a"), (2, "b")]).unwrap();
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    walker: Walker<&'a Node<K, V>>,
}

impl<'a, K, V> Iter<'a, K, V> {
    /// Iterates over the entries with ranks in `start..end`.
    pub(crate) fn new(tree: &'a RawTree<K, V>, start: usize, end: usize) -> Self {
        Self {
            walker: Walker::new(tree.root().map(|root| &**root), start, end),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.walker.next_with(|node, index| {
            let node: &'a Node<K, V> = *node;
            (node.key(index), node.value(index))
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walker.len(), Some(self.walker.len()))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.walker.next_back_with(|node, index| {
            let node: &'a Node<K, V> = *node;
            (node.key(index), node.value(index))
        })
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.walker.len()
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            walker: self.walker.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.walker.len()).finish()
    }
}

impl<K, V> Default for Iter<'_, K, V> {
    /// Creates an empty `Iter`.
    ///
    /// ```
    /// # use tree_collections::cursor::Iter;
    /// let iter: Iter<'_, u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        Self { walker: Walker::empty() }
    }
}

/// A borrowed iterator over the elements of a [`TreeSet`](crate::TreeSet) or
/// [`TreeSeq`](crate::TreeSeq), in ascending order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Elements<'a, T> {
    inner: Iter<'a, T, ()>,
}

impl<'a, T> Elements<'a, T> {
    pub(crate) fn new(tree: &'a RawTree<T, ()>, start: usize, end: usize) -> Self {
        Self {
            inner: Iter::new(tree, start, end),
        }
    }
}

impl<'a, T> Iterator for Elements<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Elements<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(element, ())| element)
    }
}

impl<T> ExactSizeIterator for Elements<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Elements<'_, T> {}

impl<T> Clone for Elements<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> fmt::Debug for Elements<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements").field("remaining", &self.inner.len()).finish()
    }
}

impl<T> Default for Elements<'_, T> {
    fn default() -> Self {
        Self {
            inner: Iter::default(),
        }
    }
}

/// An owned snapshot cursor over the entries of a tree collection.
///
/// A cursor holds shared references to the nodes it has yet to visit, so it is
/// unaffected by anything that happens to the collection afterwards. Entries
/// are cloned out as they are yielded. A cursor is consumed as it is walked;
/// create a new one to start over.
///
/// # Examples
///
/// ```
/// use tree_collections::TreeMap;
///
/// let mut map = TreeMap::from_entries([(1, 'a'), (2, 'b'), (3, 'c')]).unwrap();
/// let cursor = map.cursor();
///
/// map.clear();
/// drop(map);
///
/// assert_eq!(cursor.collect::<Vec<_>>(), [(1, 'a'), (2, 'b'), (3, 'c')]);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Cursor<K, V> {
    walker: Walker<Arc<Node<K, V>>>,
}

impl<K, V> Cursor<K, V> {
    /// Opens a cursor over the entries with ranks in `start..end`.
    pub(crate) fn new(tree: &RawTree<K, V>, start: usize, end: usize) -> Self {
        Self {
            walker: Walker::new(tree.root().cloned(), start, end),
        }
    }
}

impl<K: Clone, V: Clone> Iterator for Cursor<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.walker.next_with(|node, index| (node.key(index).clone(), node.value(index).clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.walker.len(), Some(self.walker.len()))
    }
}

impl<K: Clone, V: Clone> DoubleEndedIterator for Cursor<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.walker.next_back_with(|node, index| (node.key(index).clone(), node.value(index).clone()))
    }
}

impl<K: Clone, V: Clone> ExactSizeIterator for Cursor<K, V> {
    fn len(&self) -> usize {
        self.walker.len()
    }
}

impl<K: Clone, V: Clone> FusedIterator for Cursor<K, V> {}

impl<K, V> Clone for Cursor<K, V> {
    fn clone(&self) -> Self {
        Self {
            walker: self.walker.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Cursor<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor").field("remaining", &self.walker.len()).finish()
    }
}

impl<K, V> Default for Cursor<K, V> {
    fn default() -> Self {
        Self { walker: Walker::empty() }
    }
}

/// An owned snapshot cursor over the keys of a [`TreeMap`](crate::TreeMap).
///
/// See [`Cursor`] for the snapshot semantics.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<K, V> {
    inner: Cursor<K, V>,
}

/// An owned snapshot cursor over the elements of a [`TreeSet`](crate::TreeSet)
/// or [`TreeSeq`](crate::TreeSeq), in ascending order.
///
/// See [`Cursor`] for the snapshot semantics.
pub type ElementCursor<T> = Keys<T, ()>;

impl<K, V> Keys<K, V> {
    pub(crate) fn new(tree: &RawTree<K, V>, start: usize, end: usize) -> Self {
        Self {
            inner: Cursor::new(tree, start, end),
        }
    }
}

impl<K: Clone, V> Iterator for Keys<K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.walker.next_with(|node, index| node.key(index).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.walker.len(), Some(self.inner.walker.len()))
    }
}

impl<K: Clone, V> DoubleEndedIterator for Keys<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.walker.next_back_with(|node, index| node.key(index).clone())
    }
}

impl<K: Clone, V> ExactSizeIterator for Keys<K, V> {
    fn len(&self) -> usize {
        self.inner.walker.len()
    }
}

impl<K: Clone, V> FusedIterator for Keys<K, V> {}

impl<K, V> Clone for Keys<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Keys<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.walker.len()).finish()
    }
}

impl<K, V> Default for Keys<K, V> {
    fn default() -> Self {
        Self {
            inner: Cursor::default(),
        }
    }
}

/// An owned snapshot cursor over the values of a [`TreeMap`](crate::TreeMap).
///
/// See [`Cursor`] for the snapshot semantics.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<K, V> {
    inner: Cursor<K, V>,
}

impl<K, V> Values<K, V> {
    pub(crate) fn new(tree: &RawTree<K, V>) -> Self {
        Self {
            inner: Cursor::new(tree, 0, tree.len()),
        }
    }
}

impl<K, V: Clone> Iterator for Values<K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.walker.next_with(|node, index| node.value(index).clone())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.inner.walker.len(), Some(self.inner.walker.len()))
    }
}

impl<K, V: Clone> DoubleEndedIterator for Values<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.walker.next_back_with(|node, index| node.value(index).clone())
    }
}

impl<K, V: Clone> ExactSizeIterator for Values<K, V> {
    fn len(&self) -> usize {
        self.inner.walker.len()
    }
}

impl<K, V: Clone> FusedIterator for Values<K, V> {}

impl<K, V> Clone for Values<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V> fmt::Debug for Values<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.walker.len()).finish()
    }
}

impl<K, V> Default for Values<K, V> {
    fn default() -> Self {
        Self {
            inner: Cursor::default(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::config::Degree;
    use crate::raw::Duplicates;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn tree(len: u32) -> RawTree<u32, u32> {
        let mut tree = RawTree::new(Degree::new(2).unwrap());
        for k in 0..len {
            tree.insert(k, k * 10, Duplicates::Replace).unwrap();
        }
        tree
    }

    #[test]
    fn empty_iterators() {
        let tree = tree(0);
        assert_eq!(Iter::new(&tree, 0, 0).next(), None);
        assert_eq!(Cursor::new(&tree, 0, 0).next_back(), None);
        assert_eq!(Keys::<u8, u8>::default().len(), 0);
    }

    #[test]
    fn cursor_outlives_tree() {
        let mut source = tree(40);
        let cursor = Cursor::new(&source, 0, source.len());
        let values = Values::new(&source);
        for k in 0..40 {
            source.remove(&k);
        }
        drop(source);

        assert_eq!(cursor.map(|(k, _)| k).collect::<Vec<_>>(), (0..40).collect::<Vec<_>>());
        assert_eq!(values.rev().next(), Some(390));
    }

    proptest! {
        #[test]
        fn meets_in_the_middle(len in 0u32..300, start in 0usize..300, span in 0usize..300, fronts in 0usize..300) {
            let tree = tree(len);
            let start = start.min(tree.len());
            let end = (start + span).min(tree.len());
            let expected: Vec<u32> = (start as u32..end as u32).collect();

            // Interleave front and back steps; the two ends must meet exactly.
            let mut iter = Iter::new(&tree, start, end);
            let mut front = Vec::new();
            let mut back = Vec::new();
            for step in 0.. {
                let item = if step < fronts { iter.next() } else { iter.next_back() };
                let Some((k, _)) = item else { break };
                if step < fronts { front.push(*k) } else { back.push(*k) }
                prop_assert_eq!(iter.len(), expected.len() - front.len() - back.len());
            }
            back.reverse();
            front.extend(back);
            prop_assert_eq!(front, expected.clone());

            let keys: Vec<u32> = Keys::new(&tree, start, end).rev().collect();
            prop_assert_eq!(keys, expected.into_iter().rev().collect::<Vec<_>>());
        }
    }
}
