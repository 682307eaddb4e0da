//! Unbalanced binary search tree set with live range views.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. The parent
//! link is a plain index, so in-order successor/predecessor walks climb the
//! tree without recursion or an auxiliary stack.
//!
//! There is no rebalancing: inserting sorted input yields a linear tree and
//! every operation degrades to O(n).
//!
//! ```rust
//! use arena_sets::OrderedTreeSet;
//!
//! let mut tree = OrderedTreeSet::new();
//! for v in [8, 3, 10, 1, 6, 14] {
//!     tree.add(v);
//! }
//!
//! let mut view = tree.sub_set_mut(3, 10).unwrap();
//! assert_eq!(view.iter().copied().collect::<Vec<_>>(), vec![3, 6, 8]);
//! assert!(view.add(7).unwrap());
//! assert!(view.add(12).is_err());
//!
//! assert!(tree.contains(&7));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use crate::error::{Result, SetError};
use crate::set::{Set, SetMut, SortedSet};

mod range;

pub use range::{Bounds, RangeCursor, RangeIter, RangeView, RangeViewMut};

// =============================================================================
// Node arena
// =============================================================================

/// Stable index of a node inside a tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

#[derive(Clone, Debug)]
struct TreeNode<T> {
    value: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl<T> TreeNode<T> {
    fn new(value: T, parent: Option<NodeId>) -> Self {
        Self {
            value,
            left: None,
            right: None,
            parent,
        }
    }
}

/// Slot arena with a free list. Freed slots are reused by later allocations,
/// so a live node keeps its index until it is itself freed.
#[derive(Clone)]
struct NodeArena<T> {
    slots: Vec<Option<TreeNode<T>>>,
    free: Vec<NodeId>,
}

impl<T> NodeArena<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, node: TreeNode<T>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.0] = Some(node);
            return id;
        }
        self.slots.push(Some(node));
        NodeId(self.slots.len() - 1)
    }

    fn free(&mut self, id: NodeId) -> TreeNode<T> {
        match self.slots[id.0].take() {
            Some(node) => {
                self.free.push(id);
                node
            }
            None => panic!("tree node {id:?} freed twice"),
        }
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    fn shrink_to_fit(&mut self) {
        // Trailing vacant slots can go; interior ones are still addressed by index.
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        let live_len = self.slots.len();
        self.free.retain(|id| id.0 < live_len);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }
}

impl<T> Index<NodeId> for NodeArena<T> {
    type Output = TreeNode<T>;

    #[inline]
    fn index(&self, id: NodeId) -> &TreeNode<T> {
        match &self.slots[id.0] {
            Some(node) => node,
            None => panic!("dangling tree node {id:?}"),
        }
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut TreeNode<T> {
        match &mut self.slots[id.0] {
            Some(node) => node,
            None => panic!("dangling tree node {id:?}"),
        }
    }
}

// =============================================================================
// OrderedTreeSet
// =============================================================================

/// A set ordered by `T: Ord`, stored as an unbalanced binary search tree.
#[derive(Clone)]
pub struct OrderedTreeSet<T> {
    nodes: NodeArena<T>,
    root: Option<NodeId>,
    len: usize,
}

impl<T> OrderedTreeSet<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree whose arena can hold `capacity` nodes without
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        log::debug!("clearing tree set of {} values", self.len);
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    /// Smallest value, or [`SetError::NoSuchElement`] when empty.
    pub fn first(&self) -> Result<&T> {
        self.first_node()
            .map(|id| self.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    /// Largest value, or [`SetError::NoSuchElement`] when empty.
    pub fn last(&self) -> Result<&T> {
        self.last_node()
            .map(|id| self.value(id))
            .ok_or(SetError::NoSuchElement)
    }

    /// Number of nodes on the longest root-to-leaf path (0 when empty).
    pub fn height(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut stack = vec![(root, 1usize)];
        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            for child in [node.left, node.right].into_iter().flatten() {
                stack.push((child, depth + 1));
            }
        }
        height
    }

    /// In-order iterator over the values.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            next: self.first_node(),
            remaining: self.len,
        }
    }

    /// In-order cursor that can remove the value it just yielded.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        let start = self.first_node();
        Cursor::starting_at(self, start)
    }

    #[inline]
    fn value(&self, id: NodeId) -> &T {
        &self.nodes[id].value
    }

    fn first_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.leftmost(root))
    }

    fn last_node(&self) -> Option<NodeId> {
        self.root.map(|root| self.rightmost(root))
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.nodes[id].left {
            id = left;
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.nodes[id].right {
            id = right;
        }
        id
    }

    /// Next node in order: the right subtree's leftmost node, or the nearest
    /// ancestor reached from its left subtree.
    fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.nodes[id].right {
            return Some(self.leftmost(right));
        }
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[parent].left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.nodes[id].left {
            return Some(self.rightmost(left));
        }
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[parent].right == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// Points `parent`'s link to `old` (or the root, for `None`) at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent = &mut self.nodes[parent];
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }

    /// Detaches `id` from the tree without freeing it.
    ///
    /// The replacement is the leftmost node of the right subtree when there
    /// is one, else the left child. The replacement keeps its own arena
    /// index, so a cursor pointing at the in-order successor stays valid.
    fn unlink(&mut self, id: NodeId) {
        let (left, right, parent) = {
            let node = &self.nodes[id];
            (node.left, node.right, node.parent)
        };

        let replacement = match (left, right) {
            (None, None) => {
                log::trace!("tree remove: detaching leaf {id:?}");
                self.replace_child(parent, id, None);
                return;
            }
            (_, Some(right)) => self.leftmost(right),
            (Some(left), None) => left,
        };
        log::trace!("tree remove: {id:?} replaced by {replacement:?}");

        // A successor deeper than the immediate right child has no left
        // child; hand its right subtree to its parent before it moves.
        let replacement_parent = self.nodes[replacement].parent;
        if replacement_parent != Some(id) {
            let orphan = self.nodes[replacement].right;
            if let Some(orphan) = orphan {
                self.nodes[orphan].parent = replacement_parent;
            }
            if let Some(replacement_parent) = replacement_parent {
                self.nodes[replacement_parent].left = orphan;
            }
        }

        if left != Some(replacement) {
            // An immediate right child keeps its own right subtree.
            if right != Some(replacement) {
                self.nodes[replacement].right = right;
                if let Some(right) = right {
                    self.nodes[right].parent = Some(replacement);
                }
            }
            self.nodes[replacement].left = left;
            if let Some(left) = left {
                self.nodes[left].parent = Some(replacement);
            }
        }

        self.nodes[replacement].parent = parent;
        self.replace_child(parent, id, Some(replacement));
    }

    fn remove_node(&mut self, id: NodeId) -> T {
        self.unlink(id);
        self.len -= 1;
        self.nodes.free(id).value
    }
}

impl<T: Ord> OrderedTreeSet<T> {
    /// Returns the node holding `value`, or the node under which `value`
    /// would be inserted. `None` only for an empty tree.
    fn find(&self, value: &T) -> Option<NodeId> {
        let mut current = self.root?;
        loop {
            let node = &self.nodes[current];
            let next = match value.cmp(&node.value) {
                Ordering::Equal => return Some(current),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
            match next {
                Some(child) => current = child,
                None => return Some(current),
            }
        }
    }

    fn find_exact(&self, value: &T) -> Option<NodeId> {
        self.find(value).filter(|&id| self.value(id) == value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find_exact(value).is_some()
    }

    /// Inserts `value`. Returns false if an equal value was already present.
    pub fn add(&mut self, value: T) -> bool {
        let Some(closest) = self.find(&value) else {
            self.root = Some(self.nodes.alloc(TreeNode::new(value, None)));
            self.len = 1;
            return true;
        };

        let ordering = value.cmp(self.value(closest));
        if ordering == Ordering::Equal {
            return false;
        }

        let id = self.nodes.alloc(TreeNode::new(value, Some(closest)));
        let parent = &mut self.nodes[closest];
        if ordering == Ordering::Less {
            debug_assert!(parent.left.is_none());
            parent.left = Some(id);
        } else {
            debug_assert!(parent.right.is_none());
            parent.right = Some(id);
        }
        self.len += 1;
        true
    }

    /// Removes `value`. Returns false if it was not present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.take(value).is_some()
    }

    /// Removes `value` and returns the stored instance.
    pub fn take(&mut self, value: &T) -> Option<T> {
        let id = self.find_exact(value)?;
        Some(self.remove_node(id))
    }

    /// Verifies the ordering invariant, parent links and the cached length.
    pub fn check_invariant(&self) -> bool {
        let Some(root) = self.root else {
            return self.len == 0;
        };
        if self.nodes[root].parent.is_some() {
            return false;
        }

        // (node, exclusive lower bound, exclusive upper bound)
        let mut stack: Vec<(NodeId, Option<&T>, Option<&T>)> = vec![(root, None, None)];
        let mut count = 0usize;
        while let Some((id, lower, upper)) = stack.pop() {
            count += 1;
            let node = &self.nodes[id];
            if lower.is_some_and(|lower| node.value <= *lower)
                || upper.is_some_and(|upper| node.value >= *upper)
            {
                return false;
            }
            if let Some(left) = node.left {
                if self.nodes[left].parent != Some(id) {
                    return false;
                }
                stack.push((left, lower, Some(&node.value)));
            }
            if let Some(right) = node.right {
                if self.nodes[right].parent != Some(id) {
                    return false;
                }
                stack.push((right, Some(&node.value), upper));
            }
        }
        count == self.len
    }

    /// Shared view of every value strictly less than `to`.
    pub fn head_set(&self, to: T) -> RangeView<'_, T> {
        self.view(Bounds::below(to))
    }

    /// Shared view of every value greater than or equal to `from`.
    pub fn tail_set(&self, from: T) -> RangeView<'_, T> {
        self.view(Bounds::at_or_above(from))
    }

    /// Shared view of `[from, to)`. Fails with [`SetError::InvertedBounds`]
    /// when `from > to`.
    pub fn sub_set(&self, from: T, to: T) -> Result<RangeView<'_, T>> {
        Ok(self.view(Bounds::new(Some(from), Some(to))?))
    }

    pub fn head_set_mut(&mut self, to: T) -> RangeViewMut<'_, T> {
        self.view_mut(Bounds::below(to))
    }

    pub fn tail_set_mut(&mut self, from: T) -> RangeViewMut<'_, T> {
        self.view_mut(Bounds::at_or_above(from))
    }

    pub fn sub_set_mut(&mut self, from: T, to: T) -> Result<RangeViewMut<'_, T>> {
        Ok(self.view_mut(Bounds::new(Some(from), Some(to))?))
    }

    /// Applies previously built bounds to this tree.
    pub fn view(&self, bounds: Bounds<T>) -> RangeView<'_, T> {
        RangeView::new(self, bounds)
    }

    pub fn view_mut(&mut self, bounds: Bounds<T>) -> RangeViewMut<'_, T> {
        RangeViewMut::new(self, bounds)
    }
}

impl<T> Default for OrderedTreeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for OrderedTreeSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: Ord> Extend<T> for OrderedTreeSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: Ord> FromIterator<T> for OrderedTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T> IntoIterator for &'a OrderedTreeSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T: Ord> Set<T> for OrderedTreeSet<T> {
    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, value: &T) -> bool {
        OrderedTreeSet::contains(self, value)
    }
}

impl<T: Ord> SetMut<T> for OrderedTreeSet<T> {
    fn add(&mut self, value: T) -> Result<bool> {
        Ok(OrderedTreeSet::add(self, value))
    }

    fn remove(&mut self, value: &T) -> Result<bool> {
        Ok(OrderedTreeSet::remove(self, value))
    }
}

impl<T: Ord> SortedSet<T> for OrderedTreeSet<T> {
    fn first(&self) -> Result<&T> {
        OrderedTreeSet::first(self)
    }

    fn last(&self) -> Result<&T> {
        OrderedTreeSet::last(self)
    }
}

// =============================================================================
// Traversal
// =============================================================================

pub struct Iter<'a, T> {
    tree: &'a OrderedTreeSet<T>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.next?;
        self.next = self.tree.successor(id);
        self.remaining -= 1;
        Some(self.tree.value(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// In-order cursor holding the tree exclusively.
///
/// [`Cursor::remove`] removes the value most recently returned by
/// [`Cursor::advance`] using the same splice as [`OrderedTreeSet::remove`].
pub struct Cursor<'a, T> {
    tree: &'a mut OrderedTreeSet<T>,
    next: Option<NodeId>,
    last: Option<NodeId>,
}

impl<'a, T> Cursor<'a, T> {
    fn starting_at(tree: &'a mut OrderedTreeSet<T>, next: Option<NodeId>) -> Self {
        Self {
            tree,
            next,
            last: None,
        }
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// The value the next `advance` would return.
    pub fn peek(&self) -> Option<&T> {
        self.next.map(|id| self.tree.value(id))
    }

    /// Moves past the next value and returns it, or fails with
    /// [`SetError::NoSuchElement`] once the traversal is exhausted.
    pub fn advance(&mut self) -> Result<&T> {
        let id = self.next.ok_or(SetError::NoSuchElement)?;
        self.next = self.tree.successor(id);
        self.last = Some(id);
        Ok(self.tree.value(id))
    }

    /// Removes the value last returned by `advance`.
    ///
    /// Fails with [`SetError::IllegalState`] before the first `advance` or
    /// when called twice without advancing in between.
    pub fn remove(&mut self) -> Result<T> {
        let id = self.last.take().ok_or(SetError::IllegalState)?;
        Ok(self.tree.remove_node(id))
    }
}
