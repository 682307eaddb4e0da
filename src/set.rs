//! The capability contract shared by every container.
//!
//! Containers also expose the same operations as inherent methods with
//! signatures tuned to each structure (e.g. infallible `add` on the tree,
//! `&str` arguments on the trie). The traits exist so code can be written
//! once against any of them.

use crate::error::Result;

/// Read-only membership queries.
pub trait Set<T> {
    /// Number of elements.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `value` is a member.
    fn contains(&self, value: &T) -> bool;
}

/// Membership changes.
///
/// Both operations return `Ok(true)` iff the set changed.
pub trait SetMut<T>: Set<T> {
    fn add(&mut self, value: T) -> Result<bool>;

    fn remove(&mut self, value: &T) -> Result<bool>;
}

/// Sets with a total order over their members.
pub trait SortedSet<T>: Set<T> {
    /// Smallest member, or [`SetError::NoSuchElement`](crate::SetError::NoSuchElement).
    fn first(&self) -> Result<&T>;

    /// Largest member, or [`SetError::NoSuchElement`](crate::SetError::NoSuchElement).
    fn last(&self) -> Result<&T>;
}
