//! # arena-sets
//!
//! Three set containers sharing one capability contract:
//!
//! - [`OrderedTreeSet`]: an unbalanced binary search tree with live,
//!   bounded range views ([`RangeView`], [`RangeViewMut`]) and
//!   remove-while-iterating cursors.
//! - [`Trie`]: a character trie over strings, iterated in lexicographic
//!   order.
//! - [`OpenAddressingSet`]: a fixed-capacity hash set with linear probing
//!   and tombstone deletion.
//!
//! All three implement [`Set`] and [`SetMut`]; the tree and its views also
//! implement [`SortedSet`]. Failures are reported as [`SetError`], each
//! mapping to a coarse [`ErrorKind`].
//!
//! ## Example
//!
//! ```rust
//! use arena_sets::{OpenAddressingSet, OrderedTreeSet, SetMut, Trie};
//!
//! fn fill<S: SetMut<String>>(set: &mut S) {
//!     for word in ["pear", "fig", "plum"] {
//!         set.add(word.to_string()).unwrap();
//!     }
//! }
//!
//! let mut tree = OrderedTreeSet::new();
//! let mut trie = Trie::new();
//! let mut table = OpenAddressingSet::new(3).unwrap();
//! fill(&mut tree);
//! fill(&mut trie);
//! fill(&mut table);
//!
//! assert_eq!(tree.iter().cloned().collect::<Vec<_>>(), trie.iter().collect::<Vec<_>>());
//! assert_eq!(table.len(), 3);
//! ```

pub mod error;
pub mod open_addressing;
pub mod set;
pub mod tree;
pub mod trie;

pub use error::{ErrorKind, Result, SetError};
pub use open_addressing::OpenAddressingSet;
pub use set::{Set, SetMut, SortedSet};
pub use tree::{Bounds, OrderedTreeSet, RangeView, RangeViewMut};
pub use trie::Trie;

#[cfg(test)]
mod proptests;
