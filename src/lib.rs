//! # Strand
//!
//! A persistent, copy-on-write rope for editors and large text buffers.
//!
//! A [`Rope`] is a balanced B-tree whose leaves hold heterogeneous
//! string segments and whose interior nodes carry cumulative length
//! keys: indexed access, insertion, erasure, and substring all run in
//! logarithmic time, and cloning a rope is one refcount bump, with the
//! clones sharing every unchanged subtree.
//!
//! ## Core Concepts
//!
//! - **Variant leaves**: owned text buffers, borrowed `'static` views,
//!   lazy repetitions, and zero-copy slices into owned text
//! - **Write barrier**: mutation clones only the touched root-to-leaf
//!   path; everything else stays shared between versions
//! - **Insertion fast path**: small edits fold straight into a
//!   uniquely-owned text leaf without touching the tree
//! - **Checked UTF-8**: mutations validate at the touched boundaries;
//!   `_unchecked` entry points trade validation away, detectably
//!
//! ## Example
//!
//! ```rust
//! use strand::Rope;
//!
//! let mut rope = Rope::from("string");
//! let head = rope.view(0, 3)?;
//! rope.insert_slice(6, &head)?;
//! assert_eq!(rope, "stringstr");
//!
//! let snapshot = rope.clone(); // shares every node
//! rope.erase(0..6)?;
//! assert_eq!(rope, "str");
//! assert_eq!(snapshot, "stringstr");
//! # Ok::<(), strand::TextError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![forbid(unsafe_code)]

pub mod encoding;
pub mod error;
pub mod rope;
pub mod stream;
pub mod text;

// Re-exports for convenience
pub use encoding::checked_encoding;
pub use error::{Result, TextError};
pub use rope::{
    Bytes, Rope, RopeView, Segments, MAX_CHILDREN, MAX_DEPTH, MIN_CHILDREN, TEXT_INSERT_MAX,
};
pub use stream::write_to;
pub use text::{repeat, RepeatedTextView, TextBuffer, TextView};
