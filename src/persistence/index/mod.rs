//! The B+tree behind the primary key of a [`super::Table`].
//!
//! - `node.rs`    : leaf and internal node types, addressed by arena id.
//! - `tree.rs`    : [`BPlusTree`], split on insert, borrow/merge on remove,
//!                  range iteration over the leaf sibling chain.
//! - `primary.rs` : [`PrimaryIndex`], one tree per key type so the table
//!                  can key on the column's native type.

mod node;
mod primary;
mod tree;

pub use primary::FloatKey;
pub(crate) use primary::PrimaryIndex;
pub use tree::{BPlusTree, DEFAULT_ORDER, MIN_ORDER, Range};

#[cfg(test)]
mod tests;
