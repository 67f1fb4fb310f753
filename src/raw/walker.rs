use alloc::sync::Arc;

use smallvec::SmallVec;

use super::node::{Node, RankPosition};

/// A way of holding on to a node while walking the tree.
///
/// Borrowed iteration walks `&Node`; snapshot cursors walk `Arc<Node>` so that
/// every node they may still visit stays alive after the tree lets go of it.
pub(crate) trait NodePtr: Clone {
    type Key;
    type Value;

    fn node(&self) -> &Node<Self::Key, Self::Value>;

    /// Returns a pointer to `children[index]` of this node.
    fn descend(&self, index: usize) -> Self;
}

impl<'a, K, V> NodePtr for &'a Node<K, V> {
    type Key = K;
    type Value = V;

    fn node(&self) -> &Node<K, V> {
        self
    }

    fn descend(&self, index: usize) -> Self {
        let node: &'a Node<K, V> = *self;
        &**node.child(index)
    }
}

impl<K, V> NodePtr for Arc<Node<K, V>> {
    type Key = K;
    type Value = V;

    fn node(&self) -> &Node<K, V> {
        self
    }

    fn descend(&self, index: usize) -> Self {
        Arc::clone(self.child(index))
    }
}

#[derive(Clone)]
struct Frame<P> {
    node: P,
    // Front stack: the next entry to yield from `node` once the subtree to its
    // left is exhausted. Back stack: one past the next entry to yield.
    index: usize,
}

type Stack<P> = SmallVec<[Frame<P>; 16]>;

/// Double-ended in-order traversal over a rank range of the tree.
///
/// Each end keeps an explicit stack from the root to its current position, so
/// no parent links are needed and a step costs amortized O(1).
#[derive(Clone)]
pub(crate) struct Walker<P> {
    front: Stack<P>,
    back: Stack<P>,
    remaining: usize,
}

impl<P: NodePtr> Walker<P> {
    pub(crate) fn empty() -> Self {
        Self {
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining: 0,
        }
    }

    /// Positions a walker over the entries with ranks in `start..end`.
    pub(crate) fn new(root: Option<P>, start: usize, end: usize) -> Self {
        let Some(root) = root else {
            return Self::empty();
        };
        if start >= end {
            return Self::empty();
        }
        debug_assert!(end <= root.node().size(), "Walker::new: range exceeds tree size");

        Self {
            front: Self::seek(root.clone(), start, false),
            back: Self::seek(root, end - 1, true),
            remaining: end - start,
        }
    }

    /// Builds the stack leading to the entry at `rank`.
    fn seek(root: P, mut rank: usize, back: bool) -> Stack<P> {
        let mut stack = Stack::new();
        let mut node = root;
        loop {
            match node.node().locate(rank) {
                RankPosition::Entry(index) => {
                    let index = if back { index + 1 } else { index };
                    stack.push(Frame { node, index });
                    return stack;
                }
                RankPosition::Child(index, child_rank) => {
                    let child = node.descend(index);
                    stack.push(Frame { node, index });
                    node = child;
                    rank = child_rank;
                }
            }
        }
    }

    /// Number of entries not yet yielded from either end.
    pub(crate) fn len(&self) -> usize {
        self.remaining
    }

    /// Yields the next entry from the front, mapped through `f`.
    pub(crate) fn next_with<R>(&mut self, f: impl FnOnce(&P, usize) -> R) -> Option<R> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let frame = self.front.last_mut().expect("Walker::next_with: front stack exhausted early");
        let item = f(&frame.node, frame.index);
        frame.index += 1;

        if frame.node.node().is_leaf() {
            while self.front.last().is_some_and(|top| top.index >= top.node.node().key_count()) {
                self.front.pop();
            }
        } else {
            // Continue with the leftmost entry of the subtree right of the yielded entry.
            let mut node = frame.node.descend(frame.index);
            loop {
                let next = (!node.node().is_leaf()).then(|| node.descend(0));
                self.front.push(Frame { node, index: 0 });
                match next {
                    Some(child) => node = child,
                    None => break,
                }
            }
        }

        Some(item)
    }

    /// Yields the next entry from the back, mapped through `f`.
    pub(crate) fn next_back_with<R>(&mut self, f: impl FnOnce(&P, usize) -> R) -> Option<R> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let frame = self.back.last_mut().expect("Walker::next_back_with: back stack exhausted early");
        frame.index -= 1;
        let item = f(&frame.node, frame.index);

        if frame.node.node().is_leaf() {
            while self.back.last().is_some_and(|top| top.index == 0) {
                self.back.pop();
            }
        } else {
            // Continue with the rightmost entry of the subtree left of the yielded entry.
            let mut node = frame.node.descend(frame.index);
            loop {
                let index = node.node().key_count();
                let next = (!node.node().is_leaf()).then(|| node.descend(index));
                self.back.push(Frame { node, index });
                match next {
                    Some(child) => node = child,
                    None => break,
                }
            }
        }

        Some(item)
    }
}
