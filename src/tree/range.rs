//! Half-open range views over an [`OrderedTreeSet`].
//!
//! A view is a borrow of the tree plus a [`Bounds`] value. It owns no nodes
//! and caches nothing: every query walks the live tree, so the view always
//! reflects the tree's current contents. [`RangeView`] borrows the tree
//! shared, [`RangeViewMut`] exclusively; the borrow checker is what keeps a
//! tree from being mutated underneath a view that is in use.

use std::fmt;
use std::iter::FusedIterator;

use super::{Cursor, NodeId, OrderedTreeSet};
use crate::error::{Result, SetError};
use crate::set::{Set, SetMut, SortedSet};

/// Half-open interval `[lower, upper)`; a missing side is unbounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounds<T> {
    lower: Option<T>,
    upper: Option<T>,
}

impl<T> Bounds<T> {
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// `(-inf, upper)`
    pub fn below(upper: T) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// `[lower, +inf)`
    pub fn at_or_above(lower: T) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    /// Inclusive lower bound.
    pub fn lower(&self) -> Option<&T> {
        self.lower.as_ref()
    }

    /// Exclusive upper bound.
    pub fn upper(&self) -> Option<&T> {
        self.upper.as_ref()
    }
}

impl<T: Ord> Bounds<T> {
    /// Fails with [`SetError::InvertedBounds`] when `lower > upper`.
    /// Equal bounds are accepted and describe an empty range.
    pub fn new(lower: Option<T>, upper: Option<T>) -> Result<Self> {
        if let (Some(lower), Some(upper)) = (&lower, &upper) {
            if lower > upper {
                return Err(SetError::InvertedBounds);
            }
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, value: &T) -> bool {
        !self.is_below_lower(value) && !self.reaches_upper(value)
    }

    #[inline]
    fn is_below_lower(&self, value: &T) -> bool {
        self.lower.as_ref().is_some_and(|lower| value < lower)
    }

    #[inline]
    fn reaches_upper(&self, value: &T) -> bool {
        self.upper.as_ref().is_some_and(|upper| value >= upper)
    }

    /// True if `value` may serve as either end of a narrower range.
    fn admits_endpoint(&self, value: &T) -> bool {
        !self.is_below_lower(value) && self.upper.as_ref().map_or(true, |upper| value <= upper)
    }

    /// Builds bounds for a sub-range. A side left as `None` inherits this
    /// range's bound; a given side must lie within this range.
    fn narrow(&self, lower: Option<T>, upper: Option<T>) -> Result<Self>
    where
        T: Clone,
    {
        for endpoint in lower.iter().chain(upper.iter()) {
            if !self.admits_endpoint(endpoint) {
                return Err(SetError::BoundsExceeded);
            }
        }
        Self::new(
            lower.or_else(|| self.lower.clone()),
            upper.or_else(|| self.upper.clone()),
        )
    }

    /// Smallest in-range node. Probes for the lower bound and steps past the
    /// probe result when it landed on a predecessor.
    fn first_node(&self, tree: &OrderedTreeSet<T>) -> Option<NodeId> {
        let start = match &self.lower {
            None => tree.first_node(),
            Some(lower) => {
                let closest = tree.find(lower)?;
                if tree.value(closest) < lower {
                    tree.successor(closest)
                } else {
                    Some(closest)
                }
            }
        }?;
        (!self.reaches_upper(tree.value(start))).then_some(start)
    }

    /// Largest in-range node, found symmetrically from the upper bound.
    fn last_node(&self, tree: &OrderedTreeSet<T>) -> Option<NodeId> {
        let end = match &self.upper {
            None => tree.last_node(),
            Some(upper) => {
                let closest = tree.find(upper)?;
                if tree.value(closest) < upper {
                    Some(closest)
                } else {
                    tree.predecessor(closest)
                }
            }
        }?;
        (!self.is_below_lower(tree.value(end))).then_some(end)
    }

    fn iter<'a>(&'a self, tree: &'a OrderedTreeSet<T>) -> RangeIter<'a, T> {
        RangeIter {
            tree,
            upper: self.upper.as_ref(),
            next: self.first_node(tree),
        }
    }
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self::unbounded()
    }
}

// =============================================================================
// Shared view
// =============================================================================

/// Read-only view of the values of a tree that fall within [`Bounds`].
pub struct RangeView<'a, T> {
    tree: &'a OrderedTreeSet<T>,
    bounds: Bounds<T>,
}

impl<'a, T: Ord> RangeView<'a, T> {
    pub(super) fn new(tree: &'a OrderedTreeSet<T>, bounds: Bounds<T>) -> Self {
        Self { tree, bounds }
    }

    pub fn bounds(&self) -> &Bounds<T> {
        &self.bounds
    }

    /// Counts the in-range values by walking them; O(k + log n) on a
    /// balanced tree.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.first_node(self.tree).is_none()
    }

    /// False for out-of-range values; otherwise asks the tree.
    pub fn contains(&self, value: &T) -> bool {
        self.bounds.contains(value) && self.tree.contains(value)
    }

    pub fn first(&self) -> Result<&'a T> {
        let tree = self.tree;
        self.bounds
            .first_node(tree)
            .map(|id| tree.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    pub fn last(&self) -> Result<&'a T> {
        let tree = self.tree;
        self.bounds
            .last_node(tree)
            .map(|id| tree.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    pub fn iter(&self) -> RangeIter<'_, T> {
        self.bounds.iter(self.tree)
    }
}

impl<'a, T: Ord + Clone> RangeView<'a, T> {
    /// Narrows to values below `to`, keeping this view's lower bound.
    pub fn head_set(&self, to: T) -> Result<RangeView<'a, T>> {
        Ok(RangeView::new(self.tree, self.bounds.narrow(None, Some(to))?))
    }

    /// Narrows to values at or above `from`, keeping this view's upper bound.
    pub fn tail_set(&self, from: T) -> Result<RangeView<'a, T>> {
        Ok(RangeView::new(self.tree, self.bounds.narrow(Some(from), None)?))
    }

    pub fn sub_set(&self, from: T, to: T) -> Result<RangeView<'a, T>> {
        Ok(RangeView::new(
            self.tree,
            self.bounds.narrow(Some(from), Some(to))?,
        ))
    }
}

impl<T: Clone> Clone for RangeView<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            bounds: self.bounds.clone(),
        }
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for RangeView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'v, T: Ord> IntoIterator for &'v RangeView<'_, T> {
    type Item = &'v T;
    type IntoIter = RangeIter<'v, T>;

    fn into_iter(self) -> RangeIter<'v, T> {
        self.iter()
    }
}

impl<T: Ord> Set<T> for RangeView<'_, T> {
    fn len(&self) -> usize {
        RangeView::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        RangeView::contains(self, value)
    }
}

impl<T: Ord> SortedSet<T> for RangeView<'_, T> {
    fn first(&self) -> Result<&T> {
        RangeView::first(self)
    }

    fn last(&self) -> Result<&T> {
        RangeView::last(self)
    }
}

// =============================================================================
// Mutable view
// =============================================================================

/// View that can also add and remove values, forwarding them to the tree
/// after a bound check.
pub struct RangeViewMut<'a, T> {
    tree: &'a mut OrderedTreeSet<T>,
    bounds: Bounds<T>,
}

impl<'a, T: Ord> RangeViewMut<'a, T> {
    pub(super) fn new(tree: &'a mut OrderedTreeSet<T>, bounds: Bounds<T>) -> Self {
        Self { tree, bounds }
    }

    pub fn bounds(&self) -> &Bounds<T> {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.first_node(&*self.tree).is_none()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.bounds.contains(value) && self.tree.contains(value)
    }

    pub fn first(&self) -> Result<&T> {
        self.bounds
            .first_node(&*self.tree)
            .map(|id| self.tree.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    pub fn last(&self) -> Result<&T> {
        self.bounds
            .last_node(&*self.tree)
            .map(|id| self.tree.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    pub fn iter(&self) -> RangeIter<'_, T> {
        self.bounds.iter(&*self.tree)
    }

    /// Adds `value` to the backing tree. Fails with [`SetError::OutOfRange`]
    /// when `value` is outside the view.
    pub fn add(&mut self, value: T) -> Result<bool> {
        if !self.bounds.contains(&value) {
            return Err(SetError::OutOfRange);
        }
        Ok(self.tree.add(value))
    }

    /// Removes `value` from the backing tree. Fails with
    /// [`SetError::OutOfRange`] when `value` is outside the view.
    pub fn remove(&mut self, value: &T) -> Result<bool> {
        if !self.bounds.contains(value) {
            return Err(SetError::OutOfRange);
        }
        Ok(self.tree.remove(value))
    }

    /// Bounded cursor whose `remove` splices nodes out of the backing tree.
    pub fn cursor(&mut self) -> RangeCursor<'_, T> {
        let start = self.bounds.first_node(&*self.tree);
        RangeCursor {
            inner: Cursor::starting_at(self.tree, start),
            upper: self.bounds.upper.as_ref(),
        }
    }

    /// Gives up mutable access, keeping the bounds.
    pub fn into_view(self) -> RangeView<'a, T> {
        let Self { tree, bounds } = self;
        RangeView::new(tree, bounds)
    }
}

impl<'a, T: Ord + Clone> RangeViewMut<'a, T> {
    pub fn head_set(&self, to: T) -> Result<RangeView<'_, T>> {
        Ok(RangeView::new(&*self.tree, self.bounds.narrow(None, Some(to))?))
    }

    pub fn tail_set(&self, from: T) -> Result<RangeView<'_, T>> {
        Ok(RangeView::new(&*self.tree, self.bounds.narrow(Some(from), None)?))
    }

    pub fn sub_set(&self, from: T, to: T) -> Result<RangeView<'_, T>> {
        Ok(RangeView::new(
            &*self.tree,
            self.bounds.narrow(Some(from), Some(to))?,
        ))
    }

    pub fn head_set_mut(&mut self, to: T) -> Result<RangeViewMut<'_, T>> {
        let bounds = self.bounds.narrow(None, Some(to))?;
        Ok(RangeViewMut::new(self.tree, bounds))
    }

    pub fn tail_set_mut(&mut self, from: T) -> Result<RangeViewMut<'_, T>> {
        let bounds = self.bounds.narrow(Some(from), None)?;
        Ok(RangeViewMut::new(self.tree, bounds))
    }

    pub fn sub_set_mut(&mut self, from: T, to: T) -> Result<RangeViewMut<'_, T>> {
        let bounds = self.bounds.narrow(Some(from), Some(to))?;
        Ok(RangeViewMut::new(self.tree, bounds))
    }
}

impl<T: Ord + fmt::Debug> fmt::Debug for RangeViewMut<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> Set<T> for RangeViewMut<'_, T> {
    fn len(&self) -> usize {
        RangeViewMut::len(self)
    }

    fn contains(&self, value: &T) -> bool {
        RangeViewMut::contains(self, value)
    }
}

impl<T: Ord> SetMut<T> for RangeViewMut<'_, T> {
    fn add(&mut self, value: T) -> Result<bool> {
        RangeViewMut::add(self, value)
    }

    fn remove(&mut self, value: &T) -> Result<bool> {
        RangeViewMut::remove(self, value)
    }
}

impl<T: Ord> SortedSet<T> for RangeViewMut<'_, T> {
    fn first(&self) -> Result<&T> {
        RangeViewMut::first(self)
    }

    fn last(&self) -> Result<&T> {
        RangeViewMut::last(self)
    }
}

// =============================================================================
// Bounded traversal
// =============================================================================

/// In-order iterator over a view. Stops at the first value reaching the
/// upper bound instead of scanning the rest of the tree.
pub struct RangeIter<'a, T> {
    tree: &'a OrderedTreeSet<T>,
    upper: Option<&'a T>,
    next: Option<NodeId>,
}

impl<'a, T: Ord> Iterator for RangeIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.next?;
        let value = self.tree.value(id);
        if self.upper.is_some_and(|upper| value >= upper) {
            self.next = None;
            return None;
        }
        self.next = self.tree.successor(id);
        Some(value)
    }
}

impl<T: Ord> FusedIterator for RangeIter<'_, T> {}

/// Bounded counterpart of the tree's [`Cursor`].
pub struct RangeCursor<'a, T> {
    inner: Cursor<'a, T>,
    upper: Option<&'a T>,
}

impl<T: Ord> RangeCursor<'_, T> {
    pub fn has_next(&self) -> bool {
        match self.inner.peek() {
            Some(value) => !self.upper.is_some_and(|upper| value >= upper),
            None => false,
        }
    }

    pub fn advance(&mut self) -> Result<&T> {
        if !self.has_next() {
            return Err(SetError::NoSuchElement);
        }
        self.inner.advance()
    }

    pub fn remove(&mut self) -> Result<T> {
        self.inner.remove()
    }
}
