//! Tree nodes: leaf variants, interior nodes, and the write barrier.
//!
//! # Ownership
//!
//! Every node is held through a [`NodePtr`] (`Arc<Node>`). A node with
//! refcount 1 is *exclusive* and may be mutated directly; a shared node
//! is cloned first. [`writable`] wraps `Arc::make_mut` so that rule
//! lives in exactly one place: a mutation along a root-to-leaf path
//! clones at most the nodes on that path, and cloning an interior node
//! is shallow (children are shared by refcount bump).
//!
//! Leaves carry one of four payloads: an owned [`TextBuffer`], a
//! borrowed `'static` view, a lazy repetition, or a [`SliceRef`] into
//! another leaf's owned buffer. A `SliceRef` only ever targets a text
//! leaf; it is how substrings share storage instead of copying.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::text::{RepeatedTextView, TextBuffer, TextView};

/// Fewest children a non-root interior node may hold.
pub const MIN_CHILDREN: usize = 4;

/// Most children any interior node may hold.
pub const MAX_CHILDREN: usize = 8;

/// Largest combined size for which an insertion may grow an exclusive
/// text leaf in place instead of adding a node to the tree.
pub const TEXT_INSERT_MAX: usize = 512;

/// Upper bound on tree height assumed by the bounded descent stacks.
///
/// With a fanout of at least [`MIN_CHILDREN`] this covers trees far
/// beyond addressable memory.
pub const MAX_DEPTH: usize = 24;

/// Shared-ownership handle to a node.
pub(crate) type NodePtr = Arc<Node>;

/// The write barrier: an exclusive reference into `ptr`, cloning the
/// node first when it is shared.
#[inline]
pub(crate) fn writable(ptr: &mut NodePtr) -> &mut Node {
    Arc::make_mut(ptr)
}

/// A tree node: terminal segment or interior fan-out.
#[derive(Debug, Clone)]
pub(crate) enum Node {
    Leaf(Leaf),
    Interior(Interior),
}

impl Node {
    /// Logical byte length of the subtree.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.len(),
            Self::Interior(int) => int.len(),
        }
    }

    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Distance to the leaf level; 0 for leaves.
    ///
    /// All children of a node share one height, so following the first
    /// child is enough.
    pub(crate) fn height(&self) -> usize {
        let mut h = 0;
        let mut node = self;
        while let Self::Interior(int) = node {
            h += 1;
            node = &int.children()[0];
        }
        h
    }

}

/// A leaf payload.
#[derive(Debug, Clone)]
pub(crate) enum Leaf {
    /// Owned text; mutable in place while exclusive.
    Text(TextBuffer),
    /// Borrowed bytes with `'static` lifetime.
    View(TextView<'static>),
    /// A lazy repetition of a borrowed view.
    Repeated(RepeatedTextView<'static>),
    /// A read-only window into another leaf's owned text.
    Slice(SliceRef),
}

impl Leaf {
    /// Logical byte length, normalized across variants.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Text(buf) => buf.len(),
            Self::View(view) => view.len(),
            Self::Repeated(rv) => rv.len(),
            Self::Slice(slice) => slice.len(),
        }
    }

    /// Byte at payload offset `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()` (internal callers have validated).
    pub(crate) fn byte(&self, i: usize) -> u8 {
        match self {
            Self::Text(buf) => buf.as_bytes()[i],
            Self::View(view) => view.as_bytes()[i],
            Self::Repeated(rv) => rv.get(i).expect("leaf offset in range"),
            Self::Slice(slice) => slice.bytes()[i],
        }
    }

    /// The payload for segment-wise consumption.
    pub(crate) fn chunk(&self) -> LeafChunk<'_> {
        match self {
            Self::Text(buf) => LeafChunk::Bytes(buf.as_bytes()),
            Self::View(view) => LeafChunk::Bytes(view.as_bytes()),
            Self::Repeated(rv) => LeafChunk::Repeated {
                unit: rv.view().as_bytes(),
                count: rv.count(),
            },
            Self::Slice(slice) => LeafChunk::Bytes(slice.bytes()),
        }
    }

    /// Wraps the leaf into a fresh exclusive node.
    pub(crate) fn into_node(self) -> NodePtr {
        Arc::new(Node::Leaf(self))
    }
}

/// A leaf payload presented as contiguous chunks.
#[derive(Debug, Clone, Copy)]
pub(crate) enum LeafChunk<'a> {
    Bytes(&'a [u8]),
    Repeated { unit: &'a [u8], count: usize },
}

/// A strong reference to a text leaf plus a byte window into it.
///
/// The reference keeps the target alive, so the window can never
/// dangle; the target's buffer is immutable for as long as this slice
/// shares it (the write barrier sees refcount > 1).
#[derive(Debug, Clone)]
pub(crate) struct SliceRef {
    target: NodePtr,
    lo: usize,
    hi: usize,
}

impl SliceRef {
    /// Window `lo..hi` into `target`, which must be a text leaf.
    pub(crate) fn new(target: NodePtr, lo: usize, hi: usize) -> Self {
        debug_assert!(matches!(&*target, Node::Leaf(Leaf::Text(_))));
        debug_assert!(lo < hi && hi <= target.len());
        Self { target, lo, hi }
    }

    pub(crate) const fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// The referenced bytes.
    pub(crate) fn bytes(&self) -> &[u8] {
        match &*self.target {
            Node::Leaf(Leaf::Text(buf)) => &buf.as_bytes()[self.lo..self.hi],
            _ => unreachable!("slice leaf targets a text leaf"),
        }
    }

    /// Narrows the window to `lo..hi` of its current extent.
    pub(crate) fn narrowed(&self, lo: usize, hi: usize) -> Self {
        debug_assert!(lo < hi && hi <= self.len());
        Self {
            target: Arc::clone(&self.target),
            lo: self.lo + lo,
            hi: self.lo + hi,
        }
    }

    /// Narrows in place (used when the leaf holding this slice is
    /// already exclusive).
    pub(crate) fn narrow_in_place(&mut self, lo: usize, hi: usize) {
        debug_assert!(lo < hi && hi <= self.len());
        self.hi = self.lo + hi;
        self.lo += lo;
    }
}

/// A fixed-fanout interior node.
///
/// `keys[i]` is the cumulative byte length of `children[0..=i]`, so
/// `keys.last()` is the subtree length and child `i` starts at
/// `keys[i - 1]` (0 for the first child).
#[derive(Debug, Clone, Default)]
pub(crate) struct Interior {
    keys: ArrayVec<usize, MAX_CHILDREN>,
    children: ArrayVec<NodePtr, MAX_CHILDREN>,
}

impl Interior {
    /// Builds a node over `children`, computing the keys.
    ///
    /// # Panics
    ///
    /// Panics if `children` is empty or exceeds [`MAX_CHILDREN`].
    pub(crate) fn from_children<I>(children: I) -> Self
    where
        I: IntoIterator<Item = NodePtr>,
    {
        let mut node = Self::default();
        for child in children {
            node.children.push(child);
        }
        assert!(!node.children.is_empty());
        node.rebuild_keys();
        node
    }

    /// Subtree length in bytes.
    pub(crate) fn len(&self) -> usize {
        self.keys.last().copied().unwrap_or(0)
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn children(&self) -> &[NodePtr] {
        &self.children
    }

    pub(crate) fn child_mut(&mut self, i: usize) -> &mut NodePtr {
        &mut self.children[i]
    }

    /// Byte offset at which child `i` starts.
    pub(crate) fn offset(&self, i: usize) -> usize {
        if i == 0 {
            0
        } else {
            self.keys[i - 1]
        }
    }

    /// Index of the child containing byte offset `n`.
    ///
    /// The smallest `i` with `keys[i] > n`; `n` equal to the subtree
    /// length maps to the last child, so an end-of-rope position still
    /// resolves.
    pub(crate) fn find_child(&self, n: usize) -> usize {
        debug_assert!(n <= self.len());
        self.keys
            .iter()
            .position(|&k| k > n)
            .unwrap_or(self.child_count() - 1)
    }

    /// Removes and returns the child at `i`, leaving keys stale until
    /// the caller finishes restructuring.
    pub(crate) fn remove_child(&mut self, i: usize) -> NodePtr {
        let child = self.children.remove(i);
        self.keys.truncate(self.children.len());
        child
    }

    /// Recomputes the cumulative keys from the children.
    pub(crate) fn rebuild_keys(&mut self) {
        self.keys.clear();
        let mut acc = 0;
        for child in &self.children {
            acc += child.len();
            self.keys.push(acc);
        }
    }

    /// Shifts `keys[i..]` by the signed size delta of child `i`.
    pub(crate) fn adjust_keys_from(&mut self, i: usize, delta: isize) {
        for key in &mut self.keys[i..] {
            *key = key.checked_add_signed(delta).expect("key underflow");
        }
    }

    /// Inserts `pieces` at child position `i`, splitting the node when
    /// the result would exceed [`MAX_CHILDREN`].
    ///
    /// On a split, `self` keeps the left half and the right half is
    /// returned for the caller to hand upward; both halves hold at
    /// least [`MIN_CHILDREN`] children.
    pub(crate) fn splice_children<I>(&mut self, i: usize, pieces: I) -> Option<Interior>
    where
        I: IntoIterator<Item = NodePtr>,
    {
        // A caller inserts at most 3 pieces (left half, new leaf,
        // right half), so the transient total is bounded by 11.
        let mut all: ArrayVec<NodePtr, { MAX_CHILDREN + 3 }> = ArrayVec::new();
        all.extend(self.children.drain(..i));
        all.extend(pieces);
        all.extend(self.children.drain(..));
        if all.len() <= MAX_CHILDREN {
            self.children.extend(all);
            self.rebuild_keys();
            None
        } else {
            let left_count = all.len() - all.len() / 2;
            let mut drain = all.into_iter();
            *self = Self::from_children(drain.by_ref().take(left_count));
            Some(Self::from_children(drain))
        }
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[usize] {
        &self.keys
    }

    /// Wraps the node into a fresh exclusive pointer.
    pub(crate) fn into_node(self) -> NodePtr {
        Arc::new(Node::Interior(self))
    }
}
