//! Tree algorithms: descent, leaf slicing, insertion, erasure, concat.
//!
//! Everything here works on [`NodePtr`]s and goes through the write
//! barrier before touching a node, so unchanged subtrees stay shared
//! between rope versions. The algorithms assume their offsets were
//! validated at the public boundary.
//!
//! Balance discipline: all leaves sit at one depth; interior nodes hold
//! [`MIN_CHILDREN`]..=[`MAX_CHILDREN`] children (the root may hold
//! fewer). Insertion restores it by propagating split-off right halves
//! upward; erasure by merging an underfull child with a sibling and
//! redistributing when the union would overflow; concatenation by
//! merging along the taller tree's edge.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::error::Result;
use crate::rope::node::{
    writable, Interior, Leaf, Node, NodePtr, SliceRef, MAX_CHILDREN, MIN_CHILDREN, TEXT_INSERT_MAX,
};
use crate::text::{RepeatedTextView, TextBuffer, TextView};

/// Byte at offset `n` of the subtree. `O(log n)`.
pub(crate) fn byte_at(node: &Node, mut n: usize) -> u8 {
    debug_assert!(n < node.len());
    let mut node = node;
    loop {
        match node {
            Node::Leaf(leaf) => return leaf.byte(n),
            Node::Interior(int) => {
                let i = int.find_child(n);
                n -= int.offset(i);
                node = &int.children()[i];
            }
        }
    }
}

/// The leaf containing offset `n` and the offset at which it starts.
///
/// `n` equal to the subtree length resolves to the last leaf.
pub(crate) fn find_leaf(node: &Node, mut n: usize) -> (&Leaf, usize) {
    let mut start = 0;
    let mut node = node;
    loop {
        match node {
            Node::Leaf(leaf) => return (leaf, start),
            Node::Interior(int) => {
                let i = int.find_child(n);
                let offset = int.offset(i);
                start += offset;
                n -= offset;
                node = &int.children()[i];
            }
        }
    }
}

/// Like [`find_leaf`], but resolves to the leaf's shared handle so the
/// caller can alias it.
pub(crate) fn find_leaf_ptr<'a>(mut node: &'a NodePtr, mut n: usize) -> (&'a NodePtr, usize) {
    let mut start = 0;
    loop {
        match &**node {
            Node::Leaf(_) => return (node, start),
            Node::Interior(int) => {
                let i = int.find_child(n);
                let offset = int.offset(i);
                start += offset;
                n -= offset;
                node = &int.children()[i];
            }
        }
    }
}

/// Collects the subtree's leaves left to right, sharing each by
/// refcount bump.
pub(crate) fn collect_leaves(node: &NodePtr, out: &mut Vec<NodePtr>) {
    match &**node {
        Node::Leaf(_) => out.push(Arc::clone(node)),
        Node::Interior(int) => {
            for child in int.children() {
                collect_leaves(child, out);
            }
        }
    }
}

/// Collects leaves covering `[lo, hi)` of the subtree, slicing the
/// boundary leaves zero-copy where the variant permits.
pub(crate) fn collect_range(node: &NodePtr, lo: usize, hi: usize, out: &mut Vec<NodePtr>) {
    if lo >= hi {
        return;
    }
    match &**node {
        Node::Leaf(_) => out.push(slice_leaf(Arc::clone(node), lo, hi, true)),
        Node::Interior(int) => {
            for (i, child) in int.children().iter().enumerate() {
                let start = int.offset(i);
                let end = start + child.len();
                if end <= lo {
                    continue;
                }
                if start >= hi {
                    break;
                }
                collect_range(child, lo.max(start) - start, hi.min(end) - start, out);
            }
        }
    }
}

/// A leaf logically equal to `leaf[lo..hi]`.
///
/// Zero-copy wherever the variant permits: an exclusive text leaf is
/// trimmed in place (unless `force_ref`), a shared one is aliased
/// through a [`SliceRef`], views narrow, and repetitions adjust their
/// count when the cut aligns with the unit. Only a misaligned cut of a
/// repetition materializes bytes.
pub(crate) fn slice_leaf(mut ptr: NodePtr, lo: usize, hi: usize, force_ref: bool) -> NodePtr {
    let len = ptr.len();
    debug_assert!(lo < hi && hi <= len);
    if lo == 0 && hi == len {
        return ptr;
    }

    if !force_ref {
        if let Some(Node::Leaf(leaf)) = Arc::get_mut(&mut ptr) {
            match leaf {
                Leaf::Text(buf) => {
                    buf.remove_range(hi, len);
                    buf.remove_range(0, lo);
                }
                Leaf::View(view) => *view = narrow_view(*view, lo, hi),
                Leaf::Repeated(rv) => {
                    let sliced = repeated_slice(*rv, lo, hi);
                    *leaf = sliced;
                }
                Leaf::Slice(slice) => slice.narrow_in_place(lo, hi),
            }
            return ptr;
        }
    }

    match &*ptr {
        Node::Leaf(Leaf::Text(_)) => Leaf::Slice(SliceRef::new(ptr, lo, hi)).into_node(),
        Node::Leaf(Leaf::View(view)) => Leaf::View(narrow_view(*view, lo, hi)).into_node(),
        Node::Leaf(Leaf::Repeated(rv)) => repeated_slice(*rv, lo, hi).into_node(),
        Node::Leaf(Leaf::Slice(slice)) => Leaf::Slice(slice.narrowed(lo, hi)).into_node(),
        Node::Interior(_) => unreachable!("slice_leaf takes a leaf"),
    }
}

fn narrow_view(view: TextView<'static>, lo: usize, hi: usize) -> TextView<'static> {
    TextView::from_bytes(&view.as_bytes()[lo..hi])
}

fn repeated_slice(rv: RepeatedTextView<'static>, lo: usize, hi: usize) -> Leaf {
    let unit = rv.view().len();
    if unit > 0 && lo % unit == 0 && hi % unit == 0 {
        Leaf::Repeated(RepeatedTextView::new(rv.view(), (hi - lo) / unit))
    } else {
        let bytes: Vec<u8> = (lo..hi).map(|i| rv.view().as_bytes()[i % unit]).collect();
        Leaf::Text(TextBuffer::from_raw(bytes))
    }
}

/// Inserts the leaf node `new` at byte offset `at`, returning the new
/// root. Clones at most the nodes on the descent path.
pub(crate) fn btree_insert(root: NodePtr, at: usize, new: NodePtr) -> NodePtr {
    debug_assert!(new.is_leaf() && new.len() > 0 && at <= root.len());
    if root.is_leaf() {
        let len = root.len();
        let pieces: Vec<NodePtr> = if at == 0 {
            vec![new, root]
        } else if at == len {
            vec![root, new]
        } else {
            let left = slice_leaf(Arc::clone(&root), 0, at, true);
            let right = slice_leaf(root, at, len, true);
            vec![left, new, right]
        };
        return Interior::from_children(pieces).into_node();
    }
    let mut root = root;
    match insert_rec(&mut root, at, new) {
        None => root,
        Some(residual) => Interior::from_children([root, residual]).into_node(),
    }
}

fn insert_rec(ptr: &mut NodePtr, at: usize, new: NodePtr) -> Option<NodePtr> {
    let Node::Interior(int) = writable(ptr) else {
        unreachable!("insert descends through interior nodes");
    };
    let i = int.find_child(at);
    let local = at - int.offset(i);

    let residual = if int.children()[i].is_leaf() {
        let old = int.remove_child(i);
        let len = old.len();
        let pieces: Vec<NodePtr> = if local == 0 {
            vec![new, old]
        } else if local == len {
            vec![old, new]
        } else {
            let left = slice_leaf(Arc::clone(&old), 0, local, true);
            let right = slice_leaf(old, local, len, true);
            vec![left, new, right]
        };
        int.splice_children(i, pieces)
    } else {
        match insert_rec(int.child_mut(i), local, new) {
            None => {
                // The child grew without splitting; refresh the keys.
                int.rebuild_keys();
                None
            }
            Some(child_residual) => int.splice_children(i + 1, [child_residual]),
        }
    };
    residual.map(Interior::into_node)
}

/// Makes `at` a whole-leaf boundary by splitting the leaf containing
/// it, returning the (possibly regrown) root.
pub(crate) fn btree_split_at(root: NodePtr, at: usize) -> NodePtr {
    if at == 0 || at == root.len() {
        return root;
    }
    debug_assert!(!root.is_leaf(), "leaf roots are split by the caller");
    let mut root = root;
    match split_rec(&mut root, at) {
        None => root,
        Some(residual) => Interior::from_children([root, residual]).into_node(),
    }
}

fn split_rec(ptr: &mut NodePtr, at: usize) -> Option<NodePtr> {
    let Node::Interior(int) = writable(ptr) else {
        unreachable!("split descends through interior nodes");
    };
    let i = int.find_child(at);
    let local = at - int.offset(i);
    if local == 0 {
        return None;
    }

    let residual = if int.children()[i].is_leaf() {
        let old = int.remove_child(i);
        let len = old.len();
        debug_assert!(local < len);
        let left = slice_leaf(Arc::clone(&old), 0, local, true);
        let right = slice_leaf(old, local, len, true);
        int.splice_children(i, [left, right])
    } else {
        let child_residual = split_rec(int.child_mut(i), local)?;
        int.splice_children(i + 1, [child_residual])
    };
    residual.map(Interior::into_node)
}

/// Erases `[lo, hi)` from the tree, returning the new root (`None`
/// when everything was erased).
pub(crate) fn btree_erase(root: NodePtr, lo: usize, hi: usize) -> Option<NodePtr> {
    let len = root.len();
    debug_assert!(lo <= hi && hi <= len);
    if lo == hi {
        return Some(root);
    }
    if lo == 0 && hi == len {
        return None;
    }
    if root.is_leaf() {
        return Some(erase_in_leaf(root, lo, hi));
    }

    // Align the range with whole-leaf boundaries, then peel the
    // covered leaves off one at a time, rebalancing on the way out.
    let mut root = btree_split_at(root, lo);
    root = btree_split_at(root, hi);
    let mut remaining = hi - lo;
    while remaining > 0 {
        debug_assert!(!root.is_leaf());
        remaining -= erase_leaf_rec(&mut root, lo);
        root = collapse_root(root);
    }
    Some(root)
}

/// Root-is-a-leaf erase: zero, one, or two remainders; two remainders
/// get a fresh interior root above them.
fn erase_in_leaf(leaf: NodePtr, lo: usize, hi: usize) -> NodePtr {
    let len = leaf.len();
    if lo == 0 {
        slice_leaf(leaf, hi, len, false)
    } else if hi == len {
        slice_leaf(leaf, 0, lo, false)
    } else {
        let left = slice_leaf(Arc::clone(&leaf), 0, lo, true);
        let right = slice_leaf(leaf, hi, len, true);
        Interior::from_children([left, right]).into_node()
    }
}

/// Removes the whole leaf starting at offset `at`, returning its size.
fn erase_leaf_rec(ptr: &mut NodePtr, at: usize) -> usize {
    let Node::Interior(int) = writable(ptr) else {
        unreachable!("erase descends through interior nodes");
    };
    let i = int.find_child(at);
    let local = at - int.offset(i);

    let removed;
    if int.children()[i].is_leaf() {
        debug_assert_eq!(local, 0, "range was pre-split to leaf boundaries");
        removed = int.children()[i].len();
        int.remove_child(i);
        int.rebuild_keys();
    } else {
        removed = erase_leaf_rec(int.child_mut(i), local);
        int.rebuild_keys();
        if needs_rebalance(&int.children()[i]) {
            rebalance_child(int, i);
        }
    }
    removed
}

fn needs_rebalance(node: &NodePtr) -> bool {
    match &**node {
        Node::Leaf(_) => false,
        Node::Interior(int) => int.child_count() < MIN_CHILDREN,
    }
}

/// Combines the underfull child `i` with an adjacent sibling: one node
/// when the union fits, otherwise an even redistribution across two.
fn rebalance_child(int: &mut Interior, i: usize) {
    if int.child_count() < 2 {
        // No sibling; an ancestor (or the root collapse) resolves it.
        return;
    }
    let (a, b) = if i == 0 { (0, 1) } else { (i - 1, i) };
    let right = int.remove_child(b);
    let left = int.remove_child(a);

    let merged: Vec<NodePtr> = children_of(&left)
        .iter()
        .chain(children_of(&right))
        .cloned()
        .collect();
    if merged.len() <= MAX_CHILDREN {
        int.splice_children(a, [Interior::from_children(merged).into_node()]);
    } else {
        let left_count = merged.len() - merged.len() / 2;
        let mut drain = merged.into_iter();
        let new_left = Interior::from_children(drain.by_ref().take(left_count)).into_node();
        let new_right = Interior::from_children(drain).into_node();
        int.splice_children(a, [new_left, new_right]);
    }
}

/// Replaces a single-child root chain with its lone descendant.
fn collapse_root(mut root: NodePtr) -> NodePtr {
    loop {
        let next = match &*root {
            Node::Interior(int) if int.child_count() == 1 => Arc::clone(&int.children()[0]),
            _ => return root,
        };
        root = next;
    }
}

/// Concatenates two trees, sharing both wholesale where possible.
///
/// Runs in time proportional to the height difference: the shorter
/// tree is merged into the taller one's edge, splitting any child
/// array that overflows.
pub(crate) fn concat(a: NodePtr, b: NodePtr) -> NodePtr {
    let (h1, h2) = (a.height(), b.height());
    match h1.cmp(&h2) {
        Ordering::Less => {
            if h1 == h2 - 1 && is_ok_child(&a) {
                return merge_nodes(&[a], children_of(&b));
            }
            let merged = concat(a, Arc::clone(&children_of(&b)[0]));
            if merged.height() == h2 - 1 {
                merge_nodes(&[merged], &children_of(&b)[1..])
            } else {
                merge_nodes(children_of(&merged), &children_of(&b)[1..])
            }
        }
        Ordering::Equal => {
            if is_ok_child(&a) && is_ok_child(&b) {
                return Interior::from_children([a, b]).into_node();
            }
            merge_nodes(children_of(&a), children_of(&b))
        }
        Ordering::Greater => {
            if h2 == h1 - 1 && is_ok_child(&b) {
                return merge_nodes(children_of(&a), &[b]);
            }
            let last = children_of(&a).len() - 1;
            let merged = concat(Arc::clone(&children_of(&a)[last]), b);
            if merged.height() == h1 - 1 {
                merge_nodes(&children_of(&a)[..last], &[merged])
            } else {
                merge_nodes(&children_of(&a)[..last], children_of(&merged))
            }
        }
    }
}

/// Whether `node` may sit under an interior parent as-is.
fn is_ok_child(node: &NodePtr) -> bool {
    match &**node {
        Node::Leaf(_) => true,
        Node::Interior(int) => int.child_count() >= MIN_CHILDREN,
    }
}

fn children_of(node: &NodePtr) -> &[NodePtr] {
    match &**node {
        Node::Interior(int) => int.children(),
        Node::Leaf(_) => unreachable!("leaf has no children"),
    }
}

/// One node over `c1 ++ c2` when that fits, else two with at least
/// [`MIN_CHILDREN`] each (leaning left), under a fresh parent.
fn merge_nodes(c1: &[NodePtr], c2: &[NodePtr]) -> NodePtr {
    let total = c1.len() + c2.len();
    let mut all = c1.iter().chain(c2).cloned();
    if total <= MAX_CHILDREN {
        Interior::from_children(all).into_node()
    } else {
        let split = MAX_CHILDREN.min(total - MIN_CHILDREN);
        let left = Interior::from_children(all.by_ref().take(split)).into_node();
        let right = Interior::from_children(all).into_node();
        Interior::from_children([left, right]).into_node()
    }
}

/// The in-place insertion fast path.
///
/// Descends to the leaf containing `at` while every node on the path
/// is exclusive. When that leaf is owned text and either has spare
/// capacity for `extra` bytes or (`would_allocate`) stays within
/// [`TEXT_INSERT_MAX`], `apply` folds the payload straight into the
/// buffer at the in-leaf offset and the cumulative keys on the path
/// are adjusted. Returns `None` when the fast path does not apply.
pub(crate) fn fold_into_text<F>(
    ptr: &mut NodePtr,
    at: usize,
    extra: usize,
    would_allocate: bool,
    apply: F,
) -> Option<Result<()>>
where
    F: FnOnce(&mut TextBuffer, usize) -> Result<()>,
{
    let node = Arc::get_mut(ptr)?;
    match node {
        Node::Leaf(Leaf::Text(buf)) => {
            let fits = buf.fits_without_alloc(extra)
                || (would_allocate && buf.len() + extra <= TEXT_INSERT_MAX);
            fits.then(|| apply(buf, at))
        }
        Node::Leaf(_) => None,
        Node::Interior(int) => {
            let i = int.find_child(at);
            let local = at - int.offset(i);
            let result = fold_into_text(int.child_mut(i), local, extra, would_allocate, apply)?;
            if result.is_ok() {
                let delta = isize::try_from(extra).expect("payload fits isize");
                int.adjust_keys_from(i, delta);
            }
            Some(result)
        }
    }
}

/// Structural self-check used by the test suites: fanout bounds, key
/// sums, equal leaf depth, non-empty leaves without trailing zeros.
#[cfg(test)]
pub(crate) fn assert_invariants(root: Option<&NodePtr>) {
    use crate::rope::node::LeafChunk;

    fn check(node: &NodePtr, is_root: bool) -> (usize, usize) {
        match &**node {
            Node::Leaf(leaf) => {
                assert!(leaf.len() > 0, "empty leaf");
                match leaf.chunk() {
                    LeafChunk::Bytes(bytes) => {
                        assert_ne!(bytes.last(), Some(&0), "leaf ends with zero byte");
                    }
                    LeafChunk::Repeated { unit, count } => {
                        assert!(!unit.is_empty() && count > 0);
                        assert_ne!(unit.last(), Some(&0), "unit ends with zero byte");
                    }
                }
                (0, leaf.len())
            }
            Node::Interior(int) => {
                let count = int.child_count();
                assert!(count >= 1 && count <= MAX_CHILDREN);
                assert!(is_root || count >= MIN_CHILDREN, "underfull interior");
                assert_eq!(int.keys().len(), count);
                let mut acc = 0;
                let mut depth = None;
                for (i, child) in int.children().iter().enumerate() {
                    let (h, len) = check(child, false);
                    assert_eq!(*depth.get_or_insert(h), h, "uneven leaf depth");
                    acc += len;
                    assert_eq!(int.keys()[i], acc, "stale cumulative key");
                }
                (depth.unwrap() + 1, acc)
            }
        }
    }

    if let Some(root) = root {
        check(root, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rope::node::LeafChunk;

    fn text_leaf(s: &str) -> NodePtr {
        Leaf::Text(TextBuffer::from(s)).into_node()
    }

    fn flatten(node: &NodePtr) -> Vec<u8> {
        fn walk(node: &Node, out: &mut Vec<u8>) {
            match node {
                Node::Leaf(leaf) => match leaf.chunk() {
                    LeafChunk::Bytes(bytes) => out.extend_from_slice(bytes),
                    LeafChunk::Repeated { unit, count } => {
                        for _ in 0..count {
                            out.extend_from_slice(unit);
                        }
                    }
                },
                Node::Interior(int) => {
                    for child in int.children() {
                        walk(child, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(node, &mut out);
        out
    }

    /// Builds a tree by inserting one leaf per word, always at the end.
    fn build(words: &[&str]) -> NodePtr {
        let mut root = text_leaf(words[0]);
        for word in &words[1..] {
            let at = root.len();
            root = btree_insert(root, at, text_leaf(word));
        }
        root
    }

    #[test]
    fn test_byte_at_and_find_leaf() {
        let root = build(&["ab", "cde", "f"]);
        let content = flatten(&root);
        assert_eq!(content, b"abcdef");
        for (i, &b) in content.iter().enumerate() {
            assert_eq!(byte_at(&root, i), b);
        }
        let (leaf, start) = find_leaf(&root, 3);
        assert_eq!(start, 2);
        assert_eq!(leaf.len(), 3);
        // End offset resolves to the last leaf.
        let (leaf, start) = find_leaf(&root, 6);
        assert_eq!(start, 5);
        assert_eq!(leaf.len(), 1);
    }

    #[test]
    fn test_insert_splits_and_stays_balanced() {
        let mut root = text_leaf("0");
        for i in 1..100usize {
            let at = if i % 3 == 0 { 0 } else { root.len() / 2 };
            root = btree_insert(root, at, text_leaf(&i.to_string()));
            assert_invariants(Some(&root));
        }
        let total: usize = (0..100).map(|i| i.to_string().len()).sum();
        assert_eq!(root.len(), total);
    }

    #[test]
    fn test_insert_mid_leaf_produces_slices() {
        let root = text_leaf("hello world");
        let root = btree_insert(root, 5, text_leaf(","));
        assert_eq!(flatten(&root), b"hello, world");
        assert_invariants(Some(&root));
    }

    #[test]
    fn test_slice_leaf_shared_text_aliases() {
        let target = text_leaf("abcdef");
        let slice = slice_leaf(Arc::clone(&target), 1, 4, false);
        match &*slice {
            Node::Leaf(Leaf::Slice(s)) => assert_eq!(s.bytes(), b"bcd"),
            other => panic!("expected slice leaf, got {other:?}"),
        }
    }

    #[test]
    fn test_slice_leaf_exclusive_text_trims_in_place() {
        let target = text_leaf("abcdef");
        let addr = Arc::as_ptr(&target);
        let sliced = slice_leaf(target, 1, 4, false);
        assert_eq!(Arc::as_ptr(&sliced), addr);
        assert_eq!(flatten(&sliced), b"bcd");
    }

    #[test]
    fn test_slice_leaf_repeated_alignment() {
        let rv = crate::text::repeat(TextView::new("ab"), 4);
        let leaf = Leaf::Repeated(rv).into_node();
        // Aligned: stays a repetition.
        let aligned = slice_leaf(Arc::clone(&leaf), 2, 6, true);
        match &*aligned {
            Node::Leaf(Leaf::Repeated(rv)) => assert_eq!(rv.count(), 2),
            other => panic!("expected repetition, got {other:?}"),
        }
        // Misaligned: materializes.
        let cut = slice_leaf(leaf, 1, 4, true);
        assert_eq!(flatten(&cut), b"bab");
    }

    #[test]
    fn test_erase_whole_middle_leaves() {
        let root = build(&["aa", "bb", "cc", "dd", "ee"]);
        let erased = btree_erase(root, 2, 8).expect("non-empty");
        assert_eq!(flatten(&erased), b"aaee");
        assert_invariants(Some(&erased));
    }

    #[test]
    fn test_erase_misaligned_range_pre_splits() {
        let root = build(&["aaa", "bbb", "ccc"]);
        let erased = btree_erase(root, 1, 8).expect("non-empty");
        assert_eq!(flatten(&erased), b"ac");
        assert_invariants(Some(&erased));
    }

    #[test]
    fn test_erase_everything() {
        let root = build(&["aa", "bb"]);
        assert!(btree_erase(root, 0, 4).is_none());
    }

    #[test]
    fn test_erase_in_root_leaf_middle() {
        let root = text_leaf("abcdef");
        let erased = btree_erase(root, 2, 4).expect("non-empty");
        assert_eq!(flatten(&erased), b"abef");
        // Two remainders under a fresh root.
        match &*erased {
            Node::Interior(int) => assert_eq!(int.child_count(), 2),
            other => panic!("expected interior root, got {other:?}"),
        }
        assert_invariants(Some(&erased));
    }

    #[test]
    fn test_erase_rebalances_deep_trees() {
        let words: Vec<String> = (0..200).map(|i| format!("w{i:03}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let mut root = build(&refs);
        let mut model = flatten(&root);
        // Chew ranges out of the middle until little is left.
        while root.len() > 10 {
            let lo = root.len() / 4;
            let hi = lo + (root.len() / 3).max(1);
            let hi = hi.min(root.len());
            root = btree_erase(root, lo, hi).expect("partial erase");
            model.drain(lo..hi);
            assert_eq!(flatten(&root), model);
            assert_invariants(Some(&root));
        }
    }

    #[test]
    fn test_concat_shares_and_balances() {
        let a = build(&["aa", "bb", "cc", "dd", "ee", "ff", "gg", "hh", "ii"]);
        let b = build(&["xx", "yy"]);
        let joined = concat(Arc::clone(&a), Arc::clone(&b));
        let mut expected = flatten(&a);
        expected.extend(flatten(&b));
        assert_eq!(flatten(&joined), expected);
        assert_invariants(Some(&joined));
    }

    #[test]
    fn test_concat_leaf_cases() {
        let joined = concat(text_leaf("ab"), text_leaf("cd"));
        assert_eq!(flatten(&joined), b"abcd");
        assert_invariants(Some(&joined));
        let tall = build(&["11", "22", "33", "44", "55"]);
        let joined = concat(text_leaf("00"), tall);
        assert_eq!(&flatten(&joined)[..4], b"0011");
        assert_invariants(Some(&joined));
    }

    #[test]
    fn test_fold_into_text_exclusive_path() {
        let mut root = build(&["hello", " world"]);
        let folded = fold_into_text(&mut root, 5, 1, true, |buf, at| {
            buf.insert(at, TextView::new(",")).map(|_| ())
        });
        assert_eq!(folded, Some(Ok(())));
        assert_eq!(flatten(&root), b"hello, world");
        assert_invariants(Some(&root));
    }

    #[test]
    fn test_fold_into_text_refuses_shared_path() {
        let mut root = build(&["hello", " world"]);
        let pin = Arc::clone(&root);
        let folded = fold_into_text(&mut root, 5, 1, true, |buf, at| {
            buf.insert(at, TextView::new(",")).map(|_| ())
        });
        assert!(folded.is_none());
        assert_eq!(flatten(&pin), b"hello world");
    }

    #[test]
    fn test_fold_into_text_respects_insert_max() {
        let mut root = text_leaf("seed");
        let big = TEXT_INSERT_MAX; // combined size exceeds the cap
        let folded = fold_into_text(&mut root, 4, big, true, |_, _| unreachable!());
        assert!(folded.is_none());
    }
}
