//! `RopeView`: a half-open window into a rope.
//!
//! A view holds its source rope by root refcount rather than borrowing
//! it. That one decision carries two guarantees: an operation that
//! feeds a rope a view of itself can never free the aliased leaves
//! mid-flight, and a view keeps reading the snapshot it was taken from
//! even after the source mutates (mutation copies the touched path and
//! leaves the shared version alone).

use std::cmp::Ordering;
use std::fmt;

use crate::error::Result;
use crate::rope::iter::{compare_chunks, Bytes, Segments};
use crate::rope::rope::Rope;
use crate::text::resolve_range;

/// A validated window `[lo, hi)` over a rope snapshot.
#[derive(Clone)]
pub struct RopeView {
    rope: Rope,
    lo: usize,
    hi: usize,
}

impl RopeView {
    /// Internal constructor; the public paths are [`Rope::view`] and
    /// [`Rope::view_unchecked`], which range-check (and validate).
    pub(crate) fn new_unchecked(rope: Rope, lo: usize, hi: usize) -> Self {
        debug_assert!(lo <= hi && hi <= rope.len());
        Self { rope, lo, hi }
    }

    /// The snapshot this view reads.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Window start, in rope byte offsets.
    pub fn start(&self) -> usize {
        self.lo
    }

    /// Window end (exclusive), in rope byte offsets.
    pub fn end(&self) -> usize {
        self.hi
    }

    /// Window length in bytes.
    pub fn len(&self) -> usize {
        self.hi - self.lo
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.lo == self.hi
    }

    /// Byte at window offset `i`.
    pub fn get(&self, i: usize) -> Option<u8> {
        (i < self.len()).then(|| {
            self.rope
                .get(self.lo + i)
                .expect("window offsets are in range")
        })
    }

    /// Sub-window `[lo, hi)` of this window; negative indices count
    /// from the window's end.
    ///
    /// # Errors
    ///
    /// [`TextError::BisectsCodePoint`](crate::TextError) when an
    /// endpoint is not a code point boundary.
    ///
    /// # Panics
    ///
    /// Panics if the resolved range is out of bounds or inverted.
    pub fn slice(&self, lo: isize, hi: isize) -> Result<RopeView> {
        let (lo, hi) = resolve_range(lo, hi, self.len());
        self.rope.view(self.lo + lo, self.lo + hi)
    }

    /// Unary cut: `cut(n)` is the first `n` bytes of the window,
    /// `cut(-n)` the last.
    ///
    /// # Errors
    ///
    /// As [`RopeView::slice`].
    ///
    /// # Panics
    ///
    /// Panics if `|n|` exceeds the window length.
    pub fn cut(&self, n: isize) -> Result<RopeView> {
        if n < 0 {
            self.slice(n, self.len() as isize)
        } else {
            self.slice(0, n)
        }
    }

    /// An owning rope over the window, sharing leaves with the
    /// snapshot.
    pub fn to_rope(&self) -> Rope {
        self.rope.substr_inner(self.lo, self.hi)
    }

    /// In-order iterator over the window's contiguous payload chunks.
    pub fn segments(&self) -> Segments<'_> {
        Segments::with_range(self.rope.root.as_deref(), self.lo, self.hi)
    }

    /// Random-access byte cursor over the window.
    pub fn bytes(&self) -> Bytes<'_> {
        Bytes::with_range(self.rope.root.as_deref(), self.lo, self.hi)
    }

    /// Lexicographic comparison by window content.
    pub fn compare(&self, rhs: &RopeView) -> Ordering {
        compare_chunks(self.segments(), rhs.segments())
    }
}

impl From<&Rope> for RopeView {
    /// A view over the whole rope (boundaries are trivially valid).
    fn from(rope: &Rope) -> Self {
        Self::new_unchecked(rope.clone(), 0, rope.len())
    }
}

impl PartialEq for RopeView {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for RopeView {}

impl PartialOrd for RopeView {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RopeView {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialEq<Rope> for RopeView {
    fn eq(&self, other: &Rope) -> bool {
        compare_chunks(self.segments(), other.segments()) == Ordering::Equal
    }
}

impl PartialEq<RopeView> for Rope {
    fn eq(&self, other: &RopeView) -> bool {
        other == self
    }
}

impl PartialEq<&str> for RopeView {
    fn eq(&self, other: &&str) -> bool {
        compare_chunks(self.segments(), std::iter::once(other.as_bytes())) == Ordering::Equal
    }
}

impl fmt::Debug for RopeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flat: Vec<u8> = self.segments().flatten().copied().collect();
        write!(
            f,
            "RopeView({:?}, {}..{})",
            String::from_utf8_lossy(&flat),
            self.lo,
            self.hi
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TextError;

    #[test]
    fn test_whole_rope_view() {
        let rope = Rope::from("a");
        let view = RopeView::from(&rope);
        assert_eq!(view.len(), 1);
        assert_eq!(view, rope);
        assert_eq!(view, "a");
    }

    #[test]
    fn test_window_accessors() {
        let rope = Rope::from("some text");
        let view = rope.view(5, 9).unwrap();
        assert_eq!(view.len(), 4);
        assert_eq!(view.get(0), Some(b't'));
        assert_eq!(view.get(4), None);
        assert_eq!(view, "text");
        assert_eq!(view.start(), 5);
        assert_eq!(view.end(), 9);
    }

    #[test]
    fn test_slice_with_negative_indices() {
        let rope = Rope::from("some text");
        let view = RopeView::from(&rope);
        assert_eq!(view.slice(0, 4).unwrap(), "some");
        assert_eq!(view.slice(-3, -1).unwrap(), "ex");
        assert_eq!(view.cut(4).unwrap(), "some");
        assert_eq!(view.cut(-4).unwrap(), "text");
    }

    #[test]
    fn test_slice_validates_boundaries() {
        // One U+10302; every interior offset bisects it.
        let rope = Rope::from("𐌂");
        let view = RopeView::from(&rope);
        for cut in 1..4 {
            assert_eq!(
                view.cut(cut).unwrap_err(),
                TextError::BisectsCodePoint { at: cut as usize }
            );
            assert!(view.cut(-cut).is_err());
        }
        assert!(view.cut(4).is_ok());
        assert!(view.cut(0).is_ok());
    }

    #[test]
    fn test_view_survives_source_mutation() {
        let mut rope = Rope::from("persistent snapshot");
        let view = rope.view(0, 10).unwrap();
        rope.erase(0..rope.len()).unwrap();
        assert_eq!(rope, "");
        assert_eq!(view, "persistent");
        assert_eq!(view.to_rope(), "persistent");
    }

    #[test]
    fn test_to_rope_shares_content() {
        let rope = Rope::from("shared content");
        let sub = rope.view(0, 6).unwrap().to_rope();
        assert_eq!(sub, "shared");
    }

    #[test]
    fn test_view_ordering() {
        let rope = Rope::from("ab");
        let a = rope.view(0, 1).unwrap();
        let ab = RopeView::from(&rope);
        assert_eq!(a.compare(&ab), Ordering::Less);
        assert!(a < ab);
        assert_eq!(ab.compare(&RopeView::from(&rope)), Ordering::Equal);
    }
}
