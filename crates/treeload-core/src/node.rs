//! Tree node types.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;
use indexmap::map::{IntoIter, Iter};
use serde::{Serialize, Serializer};

/// A node in a loaded tree: a file's payload or a directory's mapping.
pub enum Node<T> {
    /// Payload of one loaded file. Shared with the loader's cache.
    Leaf(Arc<T>),
    /// Mapping representing a directory.
    Branch(Branch<T>),
}

impl<T> Node<T> {
    /// Create a leaf owning a fresh payload.
    pub fn leaf(payload: T) -> Self {
        Self::Leaf(Arc::new(payload))
    }

    /// Check if this is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Check if this is a branch.
    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    /// Get the payload of a leaf.
    pub fn as_leaf(&self) -> Option<&Arc<T>> {
        match self {
            Node::Leaf(payload) => Some(payload),
            Node::Branch(_) => None,
        }
    }

    /// Get the mapping of a branch.
    pub fn as_branch(&self) -> Option<&Branch<T>> {
        match self {
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    /// Consume the node, returning the branch if it is one.
    pub fn into_branch(self) -> Option<Branch<T>> {
        match self {
            Node::Branch(branch) => Some(branch),
            Node::Leaf(_) => None,
        }
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(branch) => branch.leaf_count(),
        }
    }
}

impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        match self {
            Node::Leaf(payload) => Node::Leaf(Arc::clone(payload)),
            Node::Branch(branch) => Node::Branch(branch.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(payload) => f.debug_tuple("Leaf").field(payload).finish(),
            Node::Branch(branch) => fmt::Debug::fmt(branch, f),
        }
    }
}

impl<T> From<Branch<T>> for Node<T> {
    fn from(branch: Branch<T>) -> Self {
        Node::Branch(branch)
    }
}

impl<T> From<Arc<T>> for Node<T> {
    fn from(payload: Arc<T>) -> Self {
        Node::Leaf(payload)
    }
}

impl<T: Serialize> Serialize for Node<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Leaf(payload) => (**payload).serialize(serializer),
            Node::Branch(branch) => branch.serialize(serializer),
        }
    }
}

/// Mapping from tree key to child node for one directory level.
///
/// Keys are used exactly as derived from the filesystem: `dir.a.b.c` is a
/// single key, never a nested path. Insertion order is preserved.
pub struct Branch<T> {
    entries: IndexMap<CompactString, Node<T>>,
}

impl<T> Branch<T> {
    /// Create an empty branch.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Insert a child, returning the node it replaced under the same key.
    pub fn insert(&mut self, key: impl Into<CompactString>, node: Node<T>) -> Option<Node<T>> {
        self.entries.insert(key.into(), node)
    }

    /// Get a direct child.
    pub fn get(&self, key: &str) -> Option<&Node<T>> {
        self.entries.get(key)
    }

    /// Get a direct child's payload, if it is a leaf.
    pub fn leaf(&self, key: &str) -> Option<&Arc<T>> {
        self.get(key).and_then(Node::as_leaf)
    }

    /// Get a direct child's mapping, if it is a branch.
    pub fn branch(&self, key: &str) -> Option<&Branch<T>> {
        self.get(key).and_then(Node::as_branch)
    }

    /// Follow a sequence of keys down the tree.
    pub fn lookup<I, K>(&self, keys: I) -> Option<&Node<T>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut keys = keys.into_iter();
        let mut node = self.get(keys.next()?.as_ref())?;
        for key in keys {
            node = node.as_branch()?.get(key.as_ref())?;
        }
        Some(node)
    }

    /// Check whether a direct child exists under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a direct child, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Node<T>> {
        self.entries.shift_remove(key)
    }

    /// Keys at this level, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(CompactString::as_str)
    }

    /// Iterate over direct children.
    pub fn iter(&self) -> Iter<'_, CompactString, Node<T>> {
        self.entries.iter()
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        self.entries.values().map(Node::leaf_count).sum()
    }
}

impl<T> Default for Branch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Branch<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Branch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<T> Index<&str> for Branch<T> {
    type Output = Node<T>;

    fn index(&self, key: &str) -> &Self::Output {
        match self.entries.get(key) {
            Some(node) => node,
            None => panic!("no entry `{key}` in branch"),
        }
    }
}

impl<T> IntoIterator for Branch<T> {
    type Item = (CompactString, Node<T>);
    type IntoIter = IntoIter<CompactString, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Branch<T> {
    type Item = (&'a CompactString, &'a Node<T>);
    type IntoIter = Iter<'a, CompactString, Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<T, K: Into<CompactString>> FromIterator<(K, Node<T>)> for Branch<T> {
    fn from_iter<I: IntoIterator<Item = (K, Node<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<T: Serialize> Serialize for Branch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, v)| (k.as_str(), v)))
    }
}
