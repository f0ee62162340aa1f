//! Rope module: the copy-on-write tree and its public faces.
//!
//! This module contains:
//! - [`Rope`]: the façade over the B-tree of string segments
//! - [`RopeView`]: a validated window holding its source by refcount
//! - [`Segments`], [`Bytes`]: in-order chunk and byte iteration
//! - the fanout and fast-path tuning constants

mod iter;
mod node;
#[allow(clippy::module_inception)]
mod rope;
mod tree;
mod view;

pub use iter::{Bytes, Segments};
pub use node::{MAX_CHILDREN, MAX_DEPTH, MIN_CHILDREN, TEXT_INSERT_MAX};
pub use rope::Rope;
pub use view::RopeView;
