use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::ops::{Bound, RangeBounds};

use super::node::{Node, RankPosition, SearchResult};
use crate::config::Degree;
use crate::error::Result;
use crate::key::Orderable;

/// The B-tree backing every collection in the crate.
///
/// Nodes are reference counted. Cloning a `RawTree` or opening a cursor only
/// bumps the root's count; the first mutation afterwards copies the nodes on
/// the path it touches and leaves the shared originals intact.
pub(crate) struct RawTree<K, V> {
    /// Root node, if the tree is non-empty.
    root: Option<Arc<Node<K, V>>>,
    /// Total number of entries in the tree.
    len: usize,
    degree: Degree,
}

/// How an insertion treats an existing equal key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Duplicates {
    /// Overwrite the value of the equal key; the stored key is kept.
    Replace,
    /// Insert after every equal key.
    Keep,
}

/// Result of an insertion into a subtree.
enum InsertResult<K, V> {
    /// An equal key existed; its previous value is returned.
    Replaced(V),
    /// A new entry was added without splitting this node.
    Inserted,
    /// A new entry was added and this node split; the parent must absorb the
    /// median entry and the new right sibling.
    Split { key: K, value: V, right: Node<K, V> },
}

impl<K, V> Clone for RawTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            len: self.len,
            degree: self.degree,
        }
    }
}

impl<K, V> RawTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new(degree: Degree) -> Self {
        Self {
            root: None,
            len: 0,
            degree,
        }
    }

    /// Returns the number of entries in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn degree(&self) -> Degree {
        self.degree
    }

    /// Returns the number of levels, 0 for an empty tree.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            height += 1;
            current = node.children().first().map(|child| &**child);
        }
        height
    }

    pub(crate) fn root(&self) -> Option<&Arc<Node<K, V>>> {
        self.root.as_ref()
    }

    /// Drops this tree's reference to its nodes. Cursors opened earlier keep
    /// their own references.
    pub(crate) fn clear(&mut self) {
        log::debug!("clearing tree of {} entries", self.len);
        self.root = None;
        self.len = 0;
    }

    /// Returns the entry at position `rank` in sorted order.
    pub(crate) fn get_by_rank(&self, rank: usize) -> Option<(&K, &V)> {
        if rank >= self.len {
            return None;
        }

        let mut current = self.root.as_deref()?;
        let mut remaining = rank;

        loop {
            match current.locate(remaining) {
                RankPosition::Entry(index) => return Some((current.key(index), current.value(index))),
                RankPosition::Child(index, child_rank) => {
                    current = current.child(index);
                    remaining = child_rank;
                }
            }
        }
    }

    pub(crate) fn first(&self) -> Option<(&K, &V)> {
        self.get_by_rank(0)
    }

    pub(crate) fn last(&self) -> Option<(&K, &V)> {
        self.len.checked_sub(1).and_then(|rank| self.get_by_rank(rank))
    }
}

impl<K: Ord, V> RawTree<K, V> {
    /// Searches for a key and returns its entry if found.
    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.root.as_deref()?;

        loop {
            match current.search(key) {
                SearchResult::Found(index) => return Some((current.key(index), current.value(index))),
                SearchResult::NotFound(_) if current.is_leaf() => return None,
                SearchResult::NotFound(index) => current = current.child(index),
            }
        }
    }

    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.get_key_value(key).is_some()
    }

    /// Returns the number of entries strictly less than `key`.
    pub(crate) fn rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_before(|node| node.lower_bound(key))
    }

    /// Returns the number of entries less than or equal to `key`.
    pub(crate) fn upper_rank<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count_before(|node| node.upper_bound(key))
    }

    /// Descends the tree, at each node skipping the first `bound(node)` entries
    /// and the subtrees left of them, and returns the total skipped.
    fn count_before(&self, bound: impl Fn(&Node<K, V>) -> usize) -> usize {
        let mut rank = 0;
        let mut current = self.root.as_deref();

        while let Some(node) = current {
            let index = bound(node);
            if node.is_leaf() {
                return rank + index;
            }
            rank += node.rank_before_child(index);
            current = Some(node.child(index));
        }
        rank
    }

    /// Returns the rank of the first entry equal to `key`, if any.
    pub(crate) fn rank_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut rank = 0;
        let mut current = self.root.as_deref()?;
        // The entry just after every subtree skipped so far, i.e. the candidate
        // sitting at `rank` if the current subtree has nothing >= `key`.
        let mut successor: Option<&K> = None;

        loop {
            let index = current.lower_bound(key);
            if index < current.key_count() {
                successor = Some(current.key(index));
            }
            if current.is_leaf() {
                let candidate = successor?;
                return (<K as Borrow<Q>>::borrow(candidate) == key).then_some(rank + index);
            }
            rank += current.rank_before_child(index);
            current = current.child(index);
        }
    }

    /// Converts range bounds on keys into a half-open range of ranks.
    ///
    /// # Panics
    ///
    /// Panics if the start bound is greater than the end bound.
    pub(crate) fn rank_range<Q, R>(&self, range: &R) -> (usize, usize)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
        R: RangeBounds<Q>,
    {
        validate_range_bounds(range);
        let start = match range.start_bound() {
            Bound::Included(key) => self.rank(key),
            Bound::Excluded(key) => self.upper_rank(key),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(key) => self.upper_rank(key),
            Bound::Excluded(key) => self.rank(key),
            Bound::Unbounded => self.len,
        };
        (start, end.max(start))
    }
}

/// Validates that the start bound does not exceed the end bound.
///
/// # Panics
///
/// Panics if `start > end` or if `start == end` and both bounds are `Excluded`.
fn validate_range_bounds<T, R>(range: &R)
where
    T: ?Sized + Ord,
    R: RangeBounds<T>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                start < end
            } else {
                start <= end
            };
        assert!(valid, "range start is greater than range end in tree collection");
    }
}

impl<K: Orderable + Clone, V: Clone> RawTree<K, V> {
    /// Builds a tree from entries in any order.
    ///
    /// Every key is validated before anything is built. Equal keys keep their
    /// relative order; under [`Duplicates::Replace`] each run of equal keys
    /// collapses to its first key paired with its last value, matching what
    /// inserting the entries one at a time would leave.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`](crate::Error::UnorderableKey) if any
    /// key is rejected by [`Orderable::check_orderable`].
    pub(crate) fn from_unsorted(
        entries: impl IntoIterator<Item = (K, V)>,
        degree: Degree,
        duplicates: Duplicates,
    ) -> Result<Self> {
        let mut entries: Vec<(K, V)> = entries.into_iter().collect();
        for (key, _) in &entries {
            key.check_orderable()?;
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        if duplicates == Duplicates::Replace {
            let mut deduped: Vec<(K, V)> = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                match deduped.last_mut() {
                    Some(last) if last.0 == key => last.1 = value,
                    _ => deduped.push((key, value)),
                }
            }
            entries = deduped;
        }

        Ok(Self::from_sorted(entries, degree))
    }

    /// Builds a tree from entries already sorted by key.
    ///
    /// The result is balanced with every node as evenly filled as the degree
    /// allows. Equal keys keep their order.
    pub(crate) fn from_sorted(entries: Vec<(K, V)>, degree: Degree) -> Self {
        debug_assert!(entries.is_sorted_by(|a, b| a.0 <= b.0), "from_sorted: entries are not sorted");
        let len = entries.len();
        if len == 0 {
            return Self::new(degree);
        }

        // capacities[h] is the most entries a subtree of height h + 1 can hold.
        let mut capacities = Vec::new();
        let mut capacity = degree.max_keys();
        capacities.push(capacity);
        while capacity < len {
            capacity = degree.max_keys().saturating_add((degree.max_keys() + 1).saturating_mul(capacity));
            capacities.push(capacity);
        }

        log::debug!("bulk building {len} entries at height {}", capacities.len());
        let mut entries = entries.into_iter();
        let root = build_subtree(&mut entries, len, &capacities, degree, true);
        debug_assert!(entries.next().is_none(), "from_sorted: entries left over");

        Self {
            root: Some(Arc::new(root)),
            len,
            degree,
        }
    }

    /// Inserts an entry, returning the previous value for an equal key under
    /// [`Duplicates::Replace`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`](crate::Error::UnorderableKey) if `key`
    /// is rejected by [`Orderable::check_orderable`]; the tree is unchanged.
    pub(crate) fn insert(&mut self, key: K, value: V, duplicates: Duplicates) -> Result<Option<V>> {
        key.check_orderable()?;

        let Some(root) = self.root.as_mut() else {
            let mut leaf = Node::new_leaf();
            leaf.insert_entry(0, key, value);
            self.root = Some(Arc::new(leaf));
            self.len = 1;
            return Ok(None);
        };

        match insert_into(Arc::make_mut(root), key, value, duplicates, self.degree) {
            InsertResult::Replaced(old) => Ok(Some(old)),
            InsertResult::Inserted => {
                self.len += 1;
                Ok(None)
            }
            InsertResult::Split { key, value, right } => {
                let old_root = self.root.take().expect("RawTree::insert: root vanished during split");
                let mut new_root = Node::new_internal(old_root);
                new_root.insert_split_child(0, key, value, right);
                self.root = Some(Arc::new(new_root));
                self.len += 1;
                log::trace!("root split, height is now {}", self.height());
                Ok(None)
            }
        }
    }

    /// Returns a mutable reference to the value of `key`.
    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        // Look before touching anything so a miss does not detach shared nodes.
        if !self.contains_key(key) {
            return None;
        }

        let mut current = Arc::make_mut(self.root.as_mut()?);
        loop {
            match current.search(key) {
                SearchResult::Found(index) => return Some(current.value_mut(index)),
                SearchResult::NotFound(index) => current = current.child_mut(index),
            }
        }
    }

    /// Returns the value at `rank` mutably.
    pub(crate) fn get_by_rank_mut(&mut self, rank: usize) -> Option<(&K, &mut V)> {
        if rank >= self.len {
            return None;
        }

        let mut current = Arc::make_mut(self.root.as_mut()?);
        let mut remaining = rank;
        loop {
            match current.locate(remaining) {
                RankPosition::Entry(index) => return Some(current.entry_mut(index)),
                RankPosition::Child(index, child_rank) => {
                    current = current.child_mut(index);
                    remaining = child_rank;
                }
            }
        }
    }

    /// Removes the first entry equal to `key`.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let rank = self.rank_of(key)?;
        self.remove_at(rank)
    }

    /// Removes the entry at position `rank` in sorted order.
    pub(crate) fn remove_at(&mut self, rank: usize) -> Option<(K, V)> {
        if rank >= self.len {
            return None;
        }

        let root = Arc::make_mut(self.root.as_mut()?);
        let removed = remove_from(root, rank, self.degree);
        self.len -= 1;

        if root.key_count() == 0 {
            self.collapse_root();
        }

        Some(removed)
    }

    pub(crate) fn pop_first(&mut self) -> Option<(K, V)> {
        self.remove_at(0)
    }

    pub(crate) fn pop_last(&mut self) -> Option<(K, V)> {
        self.len.checked_sub(1).and_then(|rank| self.remove_at(rank))
    }

    /// Replaces a root left without keys by its only child, or empties the tree.
    fn collapse_root(&mut self) {
        let Some(root) = self.root.take() else {
            return;
        };
        if root.is_leaf() {
            return;
        }

        self.root = match Arc::try_unwrap(root) {
            Ok(node) => node.into_only_child(),
            Err(shared) => Some(Arc::clone(shared.child(0))),
        };
        log::trace!("root collapsed, height is now {}", self.height());
    }
}

/// Inserts into the subtree rooted at `node`, splitting it if it overflows.
fn insert_into<K, V>(node: &mut Node<K, V>, key: K, value: V, duplicates: Duplicates, degree: Degree) -> InsertResult<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    let index = match duplicates {
        Duplicates::Replace => match node.search(&key) {
            SearchResult::Found(index) => return InsertResult::Replaced(node.replace_value(index, value)),
            SearchResult::NotFound(index) => index,
        },
        Duplicates::Keep => node.upper_bound(&key),
    };

    if node.is_leaf() {
        node.insert_entry(index, key, value);
    } else {
        match insert_into(node.child_mut(index), key, value, duplicates, degree) {
            InsertResult::Replaced(old) => return InsertResult::Replaced(old),
            InsertResult::Inserted => {
                node.grow_child(index);
                return InsertResult::Inserted;
            }
            InsertResult::Split { key, value, right } => node.insert_split_child(index, key, value, right),
        }
    }

    if node.key_count() <= degree.max_keys() {
        return InsertResult::Inserted;
    }
    let (key, value, right) = node.split();
    InsertResult::Split { key, value, right }
}

/// Removes the entry at `rank` from the subtree rooted at `node`.
///
/// On return `node` may hold fewer than the minimum number of keys; the caller
/// repairs that.
fn remove_from<K: Clone, V: Clone>(node: &mut Node<K, V>, rank: usize, degree: Degree) -> (K, V) {
    match node.locate(rank) {
        RankPosition::Entry(index) if node.is_leaf() => node.remove_entry(index),
        RankPosition::Entry(index) => {
            // Swap in the in-order predecessor, taken from the end of the left subtree.
            let predecessor_rank = node.child_size(index) - 1;
            let (key, value) = remove_from(node.child_mut(index), predecessor_rank, degree);
            let removed = node.replace_entry(index, key, value);
            node.shrink_child(index);
            fix_underflow(node, index, degree);
            removed
        }
        RankPosition::Child(index, child_rank) => {
            let removed = remove_from(node.child_mut(index), child_rank, degree);
            node.shrink_child(index);
            fix_underflow(node, index, degree);
            removed
        }
    }
}

/// Restores the minimum fill of `children[index]` by borrowing from a sibling
/// or merging with one.
fn fix_underflow<K: Clone, V: Clone>(node: &mut Node<K, V>, index: usize, degree: Degree) {
    if node.child(index).key_count() >= degree.min_keys() {
        return;
    }

    let has_left = index > 0;
    let has_right = index + 1 < node.children().len();

    if has_left && node.child(index - 1).key_count() > degree.min_keys() {
        borrow_from_left(node, index);
    } else if has_right && node.child(index + 1).key_count() > degree.min_keys() {
        borrow_from_right(node, index);
    } else if has_left {
        merge_children(node, index - 1);
    } else {
        merge_children(node, index);
    }
}

/// Rotates the last entry of `children[index - 1]` up into the parent and the
/// parent's separator down to the front of `children[index]`.
fn borrow_from_left<K: Clone, V: Clone>(node: &mut Node<K, V>, index: usize) {
    let (key, value, moved_child) = node.child_mut(index - 1).pop_back();
    let (separator_key, separator_value) = node.replace_entry(index - 1, key, value);
    node.child_mut(index).push_front(separator_key, separator_value, moved_child);
    node.refresh_child_size(index - 1);
    node.refresh_child_size(index);
}

/// Rotates the first entry of `children[index + 1]` up into the parent and the
/// parent's separator down to the back of `children[index]`.
fn borrow_from_right<K: Clone, V: Clone>(node: &mut Node<K, V>, index: usize) {
    let (key, value, moved_child) = node.child_mut(index + 1).pop_front();
    let (separator_key, separator_value) = node.replace_entry(index, key, value);
    node.child_mut(index).push_back(separator_key, separator_value, moved_child);
    node.refresh_child_size(index);
    node.refresh_child_size(index + 1);
}

/// Merges `children[index + 1]` and the separator between them into
/// `children[index]`.
fn merge_children<K: Clone, V: Clone>(node: &mut Node<K, V>, index: usize) {
    let (key, value, right) = node.remove_separator(index);
    let right = Arc::try_unwrap(right).unwrap_or_else(|shared| (*shared).clone());
    node.child_mut(index).merge_with_right(key, value, right);
    node.refresh_child_size(index);
}

/// Builds a subtree holding the next `len` entries of `entries`.
///
/// `capacities[h]` is the most entries a subtree of height `h + 1` can hold;
/// the subtree built here has height `capacities.len()`.
fn build_subtree<K, V>(
    entries: &mut impl Iterator<Item = (K, V)>,
    len: usize,
    capacities: &[usize],
    degree: Degree,
    is_root: bool,
) -> Node<K, V> {
    let mut node = Node::new_leaf();
    let child_capacities = &capacities[..capacities.len() - 1];

    let Some(&child_capacity) = child_capacities.last() else {
        for (key, value) in entries.take(len) {
            node.push_entry(key, value);
        }
        return node;
    };

    // Fewest children that can hold `len` entries, raised to the minimum fan-out
    // for non-root nodes. Spreading entries evenly then keeps every child within
    // its own fill bounds.
    let mut child_count = (len + 1).div_ceil(child_capacity + 1);
    if !is_root {
        child_count = child_count.max(degree.get());
    }
    let child_entries = len - (child_count - 1);
    let base = child_entries / child_count;
    let extra = child_entries % child_count;

    for i in 0..child_count {
        let child_len = base + usize::from(i < extra);
        node.push_child(build_subtree(entries, child_len, child_capacities, degree, false));
        if i + 1 < child_count {
            let (key, value) = entries.next().expect("build_subtree: ran out of entries");
            node.push_entry(key, value);
        }
    }
    node
}
