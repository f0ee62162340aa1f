//! The rope façade: construction, indexed access, splicing, ordering.
//!
//! A [`Rope`] is a handle to an immutable-by-default tree. Cloning a
//! rope clones one `Arc`; the clones then share every node until a
//! mutation, which copies only the touched root-to-leaf path. Small
//! edits into a uniquely-owned text leaf skip tree surgery entirely
//! (the insertion fast path).

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Range};
use std::sync::Arc;

use crate::encoding;
use crate::error::{check_offset, check_range, Result, TextError};
use crate::rope::iter::{compare_chunks, Bytes, Segments};
use crate::rope::node::{Leaf, NodePtr};
use crate::rope::tree;
use crate::rope::view::RopeView;
use crate::text::{RepeatedTextView, TextBuffer, TextView};

/// A copy-on-write rope over UTF-8 text.
#[derive(Clone, Default)]
pub struct Rope {
    pub(crate) root: Option<NodePtr>,
}

impl Rope {
    /// An empty rope.
    #[inline]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// A rope adopting a `'static` view as a single borrowed leaf,
    /// without copying. Trailing zero sentinels are stripped.
    pub fn from_static(text: &'static str) -> Self {
        let view = TextView::new(text).strip_null();
        Self {
            root: (!view.is_empty()).then(|| Leaf::View(view).into_node()),
        }
    }

    /// A rope over explicit-length bytes, validated as UTF-8.
    ///
    /// Trailing zeros are treated as sentinels and stripped first.
    ///
    /// # Errors
    ///
    /// [`TextError::MalformedPayload`] when the stripped bytes are not
    /// well-formed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let view = TextView::from_bytes(bytes).strip_null();
        if !encoding::encoded(view.as_bytes()) {
            return Err(TextError::MalformedPayload);
        }
        Ok(Self::from_raw_bytes(view.as_bytes()))
    }

    /// A rope over explicit-length bytes with no validation.
    ///
    /// Trailing zeros are still stripped. The result may fail
    /// [`encoding::checked_encoding`].
    pub fn from_bytes_unchecked(bytes: &[u8]) -> Self {
        let view = TextView::from_bytes(bytes).strip_null();
        Self::from_raw_bytes(view.as_bytes())
    }

    fn from_raw_bytes(bytes: &[u8]) -> Self {
        Self {
            root: (!bytes.is_empty())
                .then(|| Leaf::Text(TextBuffer::from_raw(bytes.to_vec())).into_node()),
        }
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.len())
    }

    /// Whether the rope is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Byte at offset `n`, descending in `O(log n)`.
    pub fn get(&self, n: usize) -> Option<u8> {
        let root = self.root.as_ref()?;
        (n < root.len()).then(|| tree::byte_at(root, n))
    }

    /// Drops the content.
    pub fn clear(&mut self) {
        self.root = None;
    }

    /// Whether two ropes share one root (the cheap dirty check); both
    /// empty counts as sharing.
    pub fn ptr_eq(&self, other: &Rope) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// An owning rope over `[lo, hi)`.
    ///
    /// When the range falls inside one leaf, the result is a single
    /// leaf aliasing it; otherwise the root is cloned and the prefix
    /// and suffix erased, sharing every untouched subtree.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] for a bad range,
    /// [`TextError::BisectsCodePoint`] when an endpoint is not a code
    /// point boundary.
    pub fn substr(&self, lo: usize, hi: usize) -> Result<Rope> {
        check_range(lo, hi, self.len())?;
        self.check_boundary(lo)?;
        self.check_boundary(hi)?;
        Ok(self.substr_inner(lo, hi))
    }

    pub(crate) fn substr_inner(&self, lo: usize, hi: usize) -> Rope {
        if lo == hi {
            return Rope::new();
        }
        let root = self.root.as_ref().expect("non-empty range implies a root");

        // Fast path: the whole range lives in one leaf.
        let (leaf, start) = tree::find_leaf_ptr(root, lo);
        if hi - start <= leaf.len() {
            let piece = tree::slice_leaf(Arc::clone(leaf), lo - start, hi - start, true);
            return Rope { root: Some(piece) };
        }

        // The clone forces the erasures below to copy their descent
        // paths instead of touching this rope's tree.
        let mut sub = Some(Arc::clone(root));
        if hi < self.len() {
            sub = tree::btree_erase(sub.take().expect("suffix erase keeps a prefix"), hi, self.len());
        }
        if lo > 0 {
            sub = tree::btree_erase(sub.take().expect("prefix erase keeps a suffix"), 0, lo);
        }
        Rope { root: sub }
    }

    /// A borrowing-by-refcount view over `[lo, hi)`.
    ///
    /// # Errors
    ///
    /// As [`Rope::substr`].
    pub fn view(&self, lo: usize, hi: usize) -> Result<RopeView> {
        check_range(lo, hi, self.len())?;
        self.check_boundary(lo)?;
        self.check_boundary(hi)?;
        Ok(RopeView::new_unchecked(self.clone(), lo, hi))
    }

    /// A view over `[lo, hi)` without boundary validation.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] for a bad range.
    pub fn view_unchecked(&self, lo: usize, hi: usize) -> Result<RopeView> {
        check_range(lo, hi, self.len())?;
        Ok(RopeView::new_unchecked(self.clone(), lo, hi))
    }

    /// Inserts a string at byte offset `at`.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] for a bad offset,
    /// [`TextError::BisectsCodePoint`] when `at` is not a code point
    /// boundary, [`TextError::AllocationFailed`] from the in-place
    /// path.
    pub fn insert(&mut self, at: usize, text: &str) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        let view = TextView::new(text).strip_null();
        if view.is_empty() {
            return Ok(self);
        }
        self.check_boundary(at)?;
        self.insert_owned(at, view.as_bytes(), true)?;
        Ok(self)
    }

    /// Inserts an owned buffer at `at`, moving it into a text leaf
    /// unless the fast path folds it into an existing one.
    ///
    /// # Errors
    ///
    /// As [`Rope::insert`], plus [`TextError::MalformedPayload`] when
    /// the buffer's content is ill-formed at either end.
    pub fn insert_text(&mut self, at: usize, buf: TextBuffer) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        if buf.is_empty() {
            return Ok(self);
        }
        self.check_boundary(at)?;
        check_payload_ends(buf.as_bytes())?;
        let folded = self.try_fold(at, buf.as_bytes(), false)?;
        if !folded {
            self.tree_insert(at, Leaf::Text(buf).into_node());
        }
        Ok(self)
    }

    /// Inserts a `'static` view at `at`, adopting it zero-copy unless
    /// the fast path folds it into an adjacent text leaf.
    ///
    /// # Errors
    ///
    /// As [`Rope::insert_text`].
    pub fn insert_view(&mut self, at: usize, view: TextView<'static>) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        let view = view.strip_null();
        if view.is_empty() {
            return Ok(self);
        }
        self.check_boundary(at)?;
        check_payload_ends(view.as_bytes())?;
        let folded = self.try_fold(at, view.as_bytes(), false)?;
        if !folded {
            self.tree_insert(at, Leaf::View(view).into_node());
        }
        Ok(self)
    }

    /// Inserts a repetition at `at` as one lazy leaf.
    ///
    /// # Errors
    ///
    /// As [`Rope::insert_text`], checking the unit view's ends.
    pub fn insert_repeated(&mut self, at: usize, rv: RepeatedTextView<'static>) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        if rv.is_empty() {
            return Ok(self);
        }
        self.check_boundary(at)?;
        check_payload_ends(rv.view().as_bytes())?;
        let folded = match self.root.as_mut() {
            None => false,
            Some(root) => {
                match tree::fold_into_text(root, at, rv.len(), false, |buf, off| {
                    buf.insert_repeated(off, rv).map(|_| ())
                }) {
                    Some(result) => {
                        result?;
                        true
                    }
                    None => false,
                }
            }
        };
        if !folded {
            self.tree_insert(at, Leaf::Repeated(rv).into_node());
        }
        Ok(self)
    }

    /// Inserts another rope's content at `at`, sharing its leaves by
    /// refcount instead of copying.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] / [`TextError::BisectsCodePoint`] as
    /// for [`Rope::insert`].
    pub fn insert_rope(&mut self, at: usize, other: &Rope) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        let Some(other_root) = &other.root else {
            return Ok(self);
        };
        self.check_boundary(at)?;
        let mut leaves = Vec::new();
        tree::collect_leaves(other_root, &mut leaves);
        self.insert_leaves(at, leaves);
        Ok(self)
    }

    /// Inserts a view's content at `at`.
    ///
    /// The view owns a snapshot of its source rope, so a view into
    /// `self` stays valid throughout: text under the view is shared
    /// through slice leaves, not copied.
    ///
    /// # Errors
    ///
    /// As [`Rope::insert_rope`].
    pub fn insert_slice(&mut self, at: usize, view: &RopeView) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        if view.is_empty() {
            return Ok(self);
        }
        self.check_boundary(at)?;
        let mut leaves = Vec::new();
        let source = view.rope();
        let root = source.root.as_ref().expect("non-empty view has a root");
        tree::collect_range(root, view.start(), view.end(), &mut leaves);
        self.insert_leaves(at, leaves);
        Ok(self)
    }

    /// Inserts the characters yielded by `chars` at `at` (staged into
    /// one owned leaf; strong guarantee on the in-place path).
    ///
    /// # Errors
    ///
    /// As [`Rope::insert`].
    pub fn insert_chars<I>(&mut self, at: usize, chars: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = char>,
    {
        check_offset(at, self.len())?;
        self.check_boundary(at)?;
        let staged: String = chars.into_iter().collect();
        let view = TextView::new(&staged).strip_null();
        if view.is_empty() {
            return Ok(self);
        }
        self.insert_owned(at, view.as_bytes(), true)?;
        Ok(self)
    }

    /// Inserts raw bytes at `at` with no UTF-8 validation, for callers
    /// feeding pre-validated or deliberately raw data.
    ///
    /// Trailing zeros are still stripped, and the offset is still
    /// range-checked; [`encoding::checked_encoding`] reports any
    /// breakage afterwards.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] or [`TextError::AllocationFailed`].
    pub fn insert_bytes_unchecked(&mut self, at: usize, bytes: &[u8]) -> Result<&mut Self> {
        check_offset(at, self.len())?;
        let view = TextView::from_bytes(bytes).strip_null();
        if view.is_empty() {
            return Ok(self);
        }
        self.insert_owned(at, view.as_bytes(), true)?;
        Ok(self)
    }

    /// Erases the byte range `lo..hi`.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] for a bad range,
    /// [`TextError::BisectsCodePoint`] when an endpoint is not a code
    /// point boundary.
    pub fn erase(&mut self, range: Range<usize>) -> Result<&mut Self> {
        check_range(range.start, range.end, self.len())?;
        self.check_boundary(range.start)?;
        self.check_boundary(range.end)?;
        self.erase_inner(range);
        Ok(self)
    }

    /// Erases `lo..hi` without boundary validation.
    ///
    /// # Errors
    ///
    /// [`TextError::OutOfRange`] for a bad range.
    pub fn erase_unchecked(&mut self, range: Range<usize>) -> Result<&mut Self> {
        check_range(range.start, range.end, self.len())?;
        self.erase_inner(range);
        Ok(self)
    }

    fn erase_inner(&mut self, range: Range<usize>) {
        if range.start == range.end {
            return;
        }
        let root = self.root.take().expect("non-empty range implies a root");
        self.root = tree::btree_erase(root, range.start, range.end);
    }

    /// Replaces `lo..hi` with a string: erase, then insert at `lo`.
    ///
    /// # Errors
    ///
    /// As [`Rope::erase`] and [`Rope::insert`].
    pub fn replace(&mut self, range: Range<usize>, text: &str) -> Result<&mut Self> {
        let lo = range.start;
        self.erase(range)?;
        self.insert(lo, text)
    }

    /// Replaces `lo..hi` with a repetition.
    ///
    /// # Errors
    ///
    /// As [`Rope::erase`] and [`Rope::insert_repeated`].
    pub fn replace_repeated(
        &mut self,
        range: Range<usize>,
        rv: RepeatedTextView<'static>,
    ) -> Result<&mut Self> {
        let lo = range.start;
        self.erase(range)?;
        self.insert_repeated(lo, rv)
    }

    /// Replaces `lo..hi` with a view's content; a view into `self`
    /// reads its pre-erase snapshot.
    ///
    /// # Errors
    ///
    /// As [`Rope::erase`] and [`Rope::insert_slice`].
    pub fn replace_slice(&mut self, range: Range<usize>, view: &RopeView) -> Result<&mut Self> {
        let lo = range.start;
        self.erase(range)?;
        self.insert_slice(lo, view)
    }

    /// Replaces `lo..hi` with the characters yielded by `chars`.
    ///
    /// # Errors
    ///
    /// As [`Rope::erase`] and [`Rope::insert_chars`].
    pub fn replace_chars<I>(&mut self, range: Range<usize>, chars: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = char>,
    {
        let lo = range.start;
        self.erase(range)?;
        self.insert_chars(lo, chars)
    }

    /// Appends another rope, sharing both trees' nodes. The merge runs
    /// in time proportional to the height difference.
    pub fn append(&mut self, other: Rope) {
        self.root = match (self.root.take(), other.root) {
            (None, root) | (root, None) => root,
            (Some(left), Some(right)) => Some(tree::concat(left, right)),
        };
    }

    /// Lexicographic comparison by content, advancing segment-wise.
    pub fn compare(&self, rhs: &Rope) -> Ordering {
        compare_chunks(self.segments(), rhs.segments())
    }

    /// In-order iterator over contiguous payload chunks.
    pub fn segments(&self) -> Segments<'_> {
        Segments::new(self.root.as_deref())
    }

    /// Random-access byte cursor over the whole rope.
    pub fn bytes(&self) -> Bytes<'_> {
        Bytes::with_range(self.root.as_deref(), 0, self.len())
    }

    /// `Err(BisectsCodePoint)` unless `at` is a code point boundary.
    fn check_boundary(&self, at: usize) -> Result<()> {
        debug_assert!(at <= self.len());
        if at == self.len() {
            return Ok(());
        }
        let root = self.root.as_ref().expect("at < len implies a root");
        let mut probe = [0u8; 4];
        let n = (self.len() - at).min(4);
        for (k, slot) in probe[..n].iter_mut().enumerate() {
            *slot = tree::byte_at(root, at + k);
        }
        if encoding::starts_encoded(&probe[..n]) {
            Ok(())
        } else {
            Err(TextError::BisectsCodePoint { at })
        }
    }

    /// Inserts pre-validated bytes, preferring the in-place fold.
    fn insert_owned(&mut self, at: usize, bytes: &[u8], would_allocate: bool) -> Result<()> {
        let folded = self.try_fold(at, bytes, would_allocate)?;
        if !folded {
            let leaf = Leaf::Text(TextBuffer::from_raw(bytes.to_vec())).into_node();
            self.tree_insert(at, leaf);
        }
        Ok(())
    }

    /// Attempts the insertion fast path; `Ok(false)` means the tree
    /// path must run instead.
    fn try_fold(&mut self, at: usize, bytes: &[u8], would_allocate: bool) -> Result<bool> {
        let Some(root) = self.root.as_mut() else {
            return Ok(false);
        };
        match tree::fold_into_text(root, at, bytes.len(), would_allocate, |buf, off| {
            buf.insert_bytes_unchecked(off, bytes).map(|_| ())
        }) {
            Some(result) => result.map(|()| true),
            None => Ok(false),
        }
    }

    /// Tree-inserts a prepared leaf node at `at`.
    fn tree_insert(&mut self, at: usize, leaf: NodePtr) {
        self.root = Some(match self.root.take() {
            None => leaf,
            Some(root) => tree::btree_insert(root, at, leaf),
        });
    }

    /// Tree-inserts a run of leaves starting at `at`, left to right.
    fn insert_leaves(&mut self, at: usize, leaves: Vec<NodePtr>) {
        let mut pos = at;
        for leaf in leaves {
            let len = leaf.len();
            self.tree_insert(pos, leaf);
            pos += len;
        }
    }
}

fn check_payload_ends(bytes: &[u8]) -> Result<()> {
    if encoding::starts_encoded(bytes) && encoding::ends_encoded(bytes) {
        Ok(())
    } else {
        Err(TextError::MalformedPayload)
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Self::from_raw_bytes(TextView::new(text).strip_null().as_bytes())
    }
}

impl From<String> for Rope {
    fn from(text: String) -> Self {
        let buf = TextBuffer::from(text);
        Self::from(buf)
    }
}

impl From<TextBuffer> for Rope {
    fn from(buf: TextBuffer) -> Self {
        Self {
            root: (!buf.is_empty()).then(|| Leaf::Text(buf).into_node()),
        }
    }
}

impl From<RepeatedTextView<'static>> for Rope {
    fn from(rv: RepeatedTextView<'static>) -> Self {
        Self {
            root: (!rv.is_empty()).then(|| Leaf::Repeated(rv).into_node()),
        }
    }
}

impl FromIterator<char> for Rope {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let staged: String = iter.into_iter().collect();
        Self::from(staged)
    }
}

impl Add for Rope {
    type Output = Rope;

    fn add(mut self, rhs: Rope) -> Rope {
        self.append(rhs);
        self
    }
}

impl AddAssign for Rope {
    fn add_assign(&mut self, rhs: Rope) {
        self.append(rhs);
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Rope {}

impl PartialOrd for Rope {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rope {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialEq<&str> for Rope {
    fn eq(&self, other: &&str) -> bool {
        compare_chunks(self.segments(), std::iter::once(other.as_bytes())) == Ordering::Equal
    }
}

impl PartialEq<Rope> for &str {
    fn eq(&self, other: &Rope) -> bool {
        other == self
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat: Vec<u8> = self.segments().flatten().copied().collect();
        write!(f, "Rope({:?})", String::from_utf8_lossy(&flat))
    }
}
