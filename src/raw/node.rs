use alloc::sync::Arc;
use core::borrow::Borrow;

use smallvec::SmallVec;

// Inline capacity fits the default degree (16) plus one overflow entry before a
// split. Nodes built with a larger degree spill to the heap.
const INLINE_KEYS: usize = 32;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

/// A B-tree node. Entries live in every node, not only in leaves.
///
/// A leaf has no children. An internal node has exactly one more child than it
/// has keys, and `child_sizes[i]` is the number of entries stored in the subtree
/// rooted at `children[i]`.
///
/// Children are shared through `Arc`, so a node may be reachable from several
/// trees and cursors at once. Mutation goes through [`Node::child_mut`], which
/// clones a shared child before handing out a mutable reference.
#[derive(Clone)]
pub(crate) struct Node<K, V> {
    // The number of entries in the subtree rooted at this node.
    size: usize,
    keys: SmallVec<[K; INLINE_KEYS]>,
    values: SmallVec<[V; INLINE_KEYS]>,
    children: SmallVec<[Arc<Node<K, V>>; INLINE_CHILDREN]>,
    child_sizes: SmallVec<[usize; INLINE_CHILDREN]>,
}

/// Result of searching for a key in a node.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into, or the insertion
    /// point in a leaf.
    NotFound(usize),
}

/// Where a rank falls within a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum RankPosition {
    /// The rank names the entry at this index.
    Entry(usize),
    /// The rank lies inside `children[index]`, at the given rank within it.
    Child(usize, usize),
}

impl<K, V> Node<K, V> {
    /// Creates a new empty leaf node.
    pub(crate) fn new_leaf() -> Self {
        Self {
            size: 0,
            keys: SmallVec::new(),
            values: SmallVec::new(),
            children: SmallVec::new(),
            child_sizes: SmallVec::new(),
        }
    }

    /// Creates an internal node whose only child is `child`.
    pub(crate) fn new_internal(child: Arc<Node<K, V>>) -> Self {
        let mut node = Self::new_leaf();
        node.size = child.size();
        node.child_sizes.push(child.size());
        node.children.push(child);
        node
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of entries in the subtree rooted at this node.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    /// Recalculates the subtree size from the keys and child sizes.
    pub(crate) fn update_size(&mut self) {
        self.size = self.keys.len() + self.child_sizes.iter().sum::<usize>();
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn value(&self, index: usize) -> &V {
        &self.values[index]
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    /// Returns the key and a mutable reference to the value at `index`.
    pub(crate) fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        (&self.keys[index], &mut self.values[index])
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> &Arc<Node<K, V>> {
        &self.children[index]
    }

    pub(crate) fn children(&self) -> &[Arc<Node<K, V>>] {
        &self.children
    }

    #[inline]
    pub(crate) fn child_size(&self, index: usize) -> usize {
        self.child_sizes[index]
    }

    #[cfg(test)]
    pub(crate) fn child_sizes(&self) -> &[usize] {
        &self.child_sizes
    }

    /// Finds which entry or child subtree holds the entry at `rank`.
    pub(crate) fn locate(&self, mut rank: usize) -> RankPosition {
        if self.is_leaf() {
            return RankPosition::Entry(rank);
        }
        for (i, &child_size) in self.child_sizes.iter().enumerate().take(self.keys.len()) {
            if rank < child_size {
                return RankPosition::Child(i, rank);
            }
            if rank == child_size {
                return RankPosition::Entry(i);
            }
            rank -= child_size + 1;
        }
        RankPosition::Child(self.keys.len(), rank)
    }

    /// Number of entries in the subtree that precede `children[index]` within
    /// this node, i.e. the rank offset of that child.
    pub(crate) fn rank_before_child(&self, index: usize) -> usize {
        index + self.child_sizes[..index].iter().sum::<usize>()
    }

    /// Replaces the value at `index`, returning the previous one.
    pub(crate) fn replace_value(&mut self, index: usize, value: V) -> V {
        core::mem::replace(&mut self.values[index], value)
    }

    /// Replaces the entry at `index`, returning the previous one.
    pub(crate) fn replace_entry(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            core::mem::replace(&mut self.keys[index], key),
            core::mem::replace(&mut self.values[index], value),
        )
    }

    /// Inserts an entry into a leaf at the given position.
    pub(crate) fn insert_entry(&mut self, index: usize, key: K, value: V) {
        debug_assert!(self.is_leaf(), "insert_entry: expected leaf node");
        self.keys.insert(index, key);
        self.values.insert(index, value);
        self.size += 1;
    }

    /// Removes the entry at the given position from a leaf.
    pub(crate) fn remove_entry(&mut self, index: usize) -> (K, V) {
        debug_assert!(self.is_leaf(), "remove_entry: expected leaf node");
        self.size -= 1;
        (self.keys.remove(index), self.values.remove(index))
    }

    /// Records one more entry below `children[index]`.
    pub(crate) fn grow_child(&mut self, index: usize) {
        self.child_sizes[index] += 1;
        self.size += 1;
    }

    /// Records one fewer entry below `children[index]`.
    pub(crate) fn shrink_child(&mut self, index: usize) {
        self.child_sizes[index] -= 1;
        self.size -= 1;
    }

    /// Re-reads the size of `children[index]` into `child_sizes`.
    ///
    /// Used after entries moved between siblings; the node's own size does not
    /// change.
    pub(crate) fn refresh_child_size(&mut self, index: usize) {
        self.child_sizes[index] = self.children[index].size();
    }

    /// Absorbs a split of `children[index]`: the median entry moves up into this
    /// node and `right` becomes the child after it.
    pub(crate) fn insert_split_child(&mut self, index: usize, key: K, value: V, right: Node<K, V>) {
        self.refresh_child_size(index);
        let right_size = right.size();
        self.keys.insert(index, key);
        self.values.insert(index, value);
        self.children.insert(index + 1, Arc::new(right));
        self.child_sizes.insert(index + 1, right_size);
        self.update_size();
    }

    /// Removes `keys[index]` and the child to its right, returning both.
    /// The caller merges them into `children[index]`.
    pub(crate) fn remove_separator(&mut self, index: usize) -> (K, V, Arc<Node<K, V>>) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        let right = self.children.remove(index + 1);
        self.child_sizes.remove(index + 1);
        (key, value, right)
    }

    /// Removes the single remaining child of an internal node with no keys.
    pub(crate) fn into_only_child(mut self) -> Option<Arc<Node<K, V>>> {
        debug_assert!(self.keys.is_empty(), "into_only_child: node still has keys");
        self.children.pop()
    }

    /// Pops the last entry, along with the last child if this node is internal.
    pub(crate) fn pop_back(&mut self) -> (K, V, Option<(Arc<Node<K, V>>, usize)>) {
        let key = self.keys.pop().expect("`Node::pop_back()` - node is empty!");
        let value = self.values.pop().expect("`Node::pop_back()` - node is empty!");
        let child = self.children.pop().zip(self.child_sizes.pop());
        self.size -= 1 + child.as_ref().map_or(0, |(_, size)| *size);
        (key, value, child)
    }

    /// Pops the first entry, along with the first child if this node is internal.
    pub(crate) fn pop_front(&mut self) -> (K, V, Option<(Arc<Node<K, V>>, usize)>) {
        assert!(!self.keys.is_empty(), "`Node::pop_front()` - node is empty!");
        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        let child = if self.is_leaf() {
            None
        } else {
            Some((self.children.remove(0), self.child_sizes.remove(0)))
        };
        self.size -= 1 + child.as_ref().map_or(0, |(_, size)| *size);
        (key, value, child)
    }

    /// Pushes an entry (and, for internal nodes, a child) to the front.
    pub(crate) fn push_front(&mut self, key: K, value: V, child: Option<(Arc<Node<K, V>>, usize)>) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
        self.size += 1;
        if let Some((child, child_size)) = child {
            self.children.insert(0, child);
            self.child_sizes.insert(0, child_size);
            self.size += child_size;
        }
    }

    /// Pushes an entry (and, for internal nodes, a child) to the back.
    pub(crate) fn push_back(&mut self, key: K, value: V, child: Option<(Arc<Node<K, V>>, usize)>) {
        self.keys.push(key);
        self.values.push(value);
        self.size += 1;
        if let Some((child, child_size)) = child {
            self.children.push(child);
            self.child_sizes.push(child_size);
            self.size += child_size;
        }
    }

    /// Pushes an entry to a node being assembled by a bulk build.
    pub(crate) fn push_entry(&mut self, key: K, value: V) {
        self.keys.push(key);
        self.values.push(value);
        self.size += 1;
    }

    /// Pushes a child to a node being assembled by a bulk build.
    pub(crate) fn push_child(&mut self, child: Node<K, V>) {
        let child_size = child.size();
        self.children.push(Arc::new(child));
        self.child_sizes.push(child_size);
        self.size += child_size;
    }

    /// Splits this overflowing node around its median entry.
    ///
    /// Returns the median and the new right sibling, which receives every entry
    /// (and child) after the median.
    pub(crate) fn split(&mut self) -> (K, V, Node<K, V>) {
        let mid = self.keys.len() / 2;

        let mut right = Node::new_leaf();
        right.keys = self.keys.drain(mid + 1..).collect();
        right.values = self.values.drain(mid + 1..).collect();
        if !self.is_leaf() {
            right.children = self.children.drain(mid + 1..).collect();
            right.child_sizes = self.child_sizes.drain(mid + 1..).collect();
        }

        let key = self.keys.pop().expect("`Node::split()` - node is empty!");
        let value = self.values.pop().expect("`Node::split()` - node is empty!");

        self.update_size();
        right.update_size();

        (key, value, right)
    }

    /// Merges with a right sibling, given the separator entry from the parent.
    pub(crate) fn merge_with_right(&mut self, key: K, value: V, mut right: Node<K, V>) {
        self.keys.push(key);
        self.values.push(value);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.children.append(&mut right.children);
        self.child_sizes.append(&mut right.child_sizes);
        self.size += 1 + right.size;
    }
}

impl<K: Ord, V> Node<K, V> {
    /// Searches for a key in this node.
    #[inline]
    pub(crate) fn search<Q>(&self, key: &Q) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.keys.binary_search_by(|k| k.borrow().cmp(key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Number of keys strictly less than `key`.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() < key)
    }

    /// Number of keys less than or equal to `key`.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() <= key)
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Returns `children[index]` mutably, cloning it first if it is shared.
    pub(crate) fn child_mut(&mut self, index: usize) -> &mut Node<K, V> {
        Arc::make_mut(&mut self.children[index])
    }
}
