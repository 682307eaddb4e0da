//! Prefix trie over strings.
//!
//! Every node stands for the string spelled by the `char` labels on its path
//! from the root. Children are kept in a `BTreeMap`, so a pre-order walk
//! visits strings in lexicographic order without any sorting.
//!
//! `remove` only clears a node's terminal flag; the branch stays in the
//! arena until [`Trie::compact`] is called.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Bound;

use crate::error::{Result, SetError};
use crate::set::{Set, SetMut};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

#[derive(Clone, Debug, Default)]
struct TrieNode {
    /// `None` only for the root.
    label: Option<char>,
    parent: Option<NodeId>,
    children: BTreeMap<char, NodeId>,
    /// Marks the end of a stored string.
    terminal: bool,
}

/// A set of strings stored as shared character paths.
#[derive(Clone)]
pub struct Trie {
    /// `nodes[0]` is the root. A child is always appended after its parent.
    nodes: Vec<TrieNode>,
    len: usize,
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
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

    /// Nodes held in the arena, including the root and dead branches.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn clear(&mut self) {
        log::debug!(
            "clearing trie of {} strings ({} nodes)",
            self.len,
            self.nodes.len()
        );
        self.nodes.clear();
        self.nodes.push(TrieNode::default());
        self.len = 0;
    }

    pub fn shrink_to_fit(&mut self) {
        self.nodes.shrink_to_fit();
    }

    #[inline]
    fn child(&self, id: NodeId, c: char) -> Option<NodeId> {
        self.nodes[id.0].children.get(&c).copied()
    }

    fn find_node(&self, s: &str) -> Option<NodeId> {
        s.chars().try_fold(ROOT, |id, c| self.child(id, c))
    }

    pub fn contains(&self, s: &str) -> bool {
        self.find_node(s).is_some_and(|id| self.nodes[id.0].terminal)
    }

    /// Adds `s`, extending its path as needed. Returns false if `s` was
    /// already present.
    pub fn add(&mut self, s: &str) -> bool {
        let mut current = ROOT;
        for c in s.chars() {
            current = match self.child(current, c) {
                Some(child) => child,
                None => {
                    let child = NodeId(self.nodes.len());
                    self.nodes.push(TrieNode {
                        label: Some(c),
                        parent: Some(current),
                        ..TrieNode::default()
                    });
                    self.nodes[current.0].children.insert(c, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[current.0];
        if node.terminal {
            return false;
        }
        node.terminal = true;
        self.len += 1;
        true
    }

    /// Removes `s` by clearing its terminal flag. Returns false if `s` was
    /// not present. The path itself is left in place.
    pub fn remove(&mut self, s: &str) -> bool {
        let Some(id) = self.find_node(s) else {
            return false;
        };
        let node = &mut self.nodes[id.0];
        if !node.terminal {
            return false;
        }
        node.terminal = false;
        self.len -= 1;
        true
    }

    /// Drops every node that no longer leads to a stored string and
    /// returns how many were reclaimed.
    pub fn compact(&mut self) -> usize {
        let old = std::mem::take(&mut self.nodes);

        // Children sit after their parents, so one reverse pass settles
        // liveness bottom-up.
        let mut live = vec![false; old.len()];
        for (i, node) in old.iter().enumerate().rev() {
            live[i] |= node.terminal;
            if live[i] {
                if let Some(parent) = node.parent {
                    live[parent.0] = true;
                }
            }
        }
        live[ROOT.0] = true;

        let mut remap: Vec<Option<NodeId>> = vec![None; old.len()];
        let mut nodes: Vec<TrieNode> = Vec::with_capacity(live.iter().filter(|&&l| l).count());
        let old_len = old.len();
        for (i, node) in old.into_iter().enumerate() {
            if !live[i] {
                continue;
            }
            let id = NodeId(nodes.len());
            remap[i] = Some(id);
            let parent = node.parent.and_then(|p| remap[p.0]);
            if let (Some(parent), Some(label)) = (parent, node.label) {
                nodes[parent.0].children.insert(label, id);
            }
            nodes.push(TrieNode {
                label: node.label,
                parent,
                children: BTreeMap::new(),
                terminal: node.terminal,
            });
        }

        let reclaimed = old_len - nodes.len();
        log::debug!(
            "trie compact: {} nodes kept, {} reclaimed",
            nodes.len(),
            reclaimed
        );
        self.nodes = nodes;
        reclaimed
    }

    /// Rebuilds the string a node stands for by climbing to the root.
    fn key_of(&self, id: NodeId) -> String {
        let mut chars: Vec<char> = std::iter::successors(Some(id), |id| self.nodes[id.0].parent)
            .filter_map(|id| self.nodes[id.0].label)
            .collect();
        chars.reverse();
        chars.into_iter().collect()
    }

    /// Next node in pre-order: the first child, else the next sibling of the
    /// nearest ancestor (or of the node itself) that has one.
    fn next_in_preorder(&self, id: NodeId) -> Option<NodeId> {
        if let Some(&first) = self.nodes[id.0].children.values().next() {
            return Some(first);
        }
        let mut current = id;
        loop {
            let node = &self.nodes[current.0];
            let (Some(parent), Some(label)) = (node.parent, node.label) else {
                return None;
            };
            let mut later = self.nodes[parent.0]
                .children
                .range((Bound::Excluded(label), Bound::Unbounded));
            if let Some((_, &sibling)) = later.next() {
                return Some(sibling);
            }
            current = parent;
        }
    }

    fn next_terminal(&self, mut id: NodeId) -> Option<NodeId> {
        loop {
            id = self.next_in_preorder(id)?;
            if self.nodes[id.0].terminal {
                return Some(id);
            }
        }
    }

    fn first_terminal(&self) -> Option<NodeId> {
        if self.nodes[ROOT.0].terminal {
            Some(ROOT)
        } else {
            self.next_terminal(ROOT)
        }
    }

    /// Iterates the stored strings in lexicographic order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            trie: self,
            next: self.first_terminal(),
        }
    }

    pub fn cursor(&mut self) -> Cursor<'_> {
        let next = self.first_terminal();
        Cursor {
            trie: self,
            next,
            last: None,
        }
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<S: AsRef<str>> Extend<S> for Trie {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for s in iter {
            self.add(s.as_ref());
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<'a> IntoIterator for &'a Trie {
    type Item = String;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

impl Set<String> for Trie {
    fn len(&self) -> usize {
        self.len
    }

    fn contains(&self, value: &String) -> bool {
        Trie::contains(self, value)
    }
}

impl SetMut<String> for Trie {
    fn add(&mut self, value: String) -> Result<bool> {
        Ok(Trie::add(self, &value))
    }

    fn remove(&mut self, value: &String) -> Result<bool> {
        Ok(Trie::remove(self, value))
    }
}

pub struct Iter<'a> {
    trie: &'a Trie,
    next: Option<NodeId>,
}

impl Iterator for Iter<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let id = self.next?;
        self.next = self.trie.next_terminal(id);
        Some(self.trie.key_of(id))
    }
}

impl FusedIterator for Iter<'_> {}

/// Lexicographic cursor that can remove the string it just yielded.
///
/// Removal only clears a terminal flag, so the cursor's position in the
/// arena stays valid.
pub struct Cursor<'a> {
    trie: &'a mut Trie,
    next: Option<NodeId>,
    last: Option<String>,
}

impl Cursor<'_> {
    #[inline]
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn advance(&mut self) -> Result<String> {
        let id = self.next.ok_or(SetError::NoSuchElement)?;
        self.next = self.trie.next_terminal(id);
        let key = self.trie.key_of(id);
        self.last = Some(key.clone());
        Ok(key)
    }

    /// Removes the string last returned by `advance`.
    pub fn remove(&mut self) -> Result<()> {
        let key = self.last.take().ok_or(SetError::IllegalState)?;
        self.trie.remove(&key);
        Ok(())
    }
}
