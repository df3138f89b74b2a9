//! Node representation of the [`super::BPlusTree`].
//!
//! Nodes live in the tree's arena and refer to each other by [`NodeId`]:
//! an internal node lists the ids of the children it owns, and a leaf keeps
//! the id of its right-hand sibling for range scans. The sibling link does
//! not own anything.

pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    pub keys: Vec<K>,
    pub values: Vec<V>,
    pub next: Option<NodeId>,
}

/// `children.len() == keys.len() + 1` always holds.
#[derive(Debug, Clone)]
pub struct InternalNode<K> {
    pub keys: Vec<K>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K>),
}

impl<K, V> LeafNode<K, V> {
    pub fn new() -> Self {
        LeafNode {
            keys: Vec::new(),
            values: Vec::new(),
            next: None,
        }
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    pub fn search(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search(key)
    }

    /// Index of the first key that is `>= key`.
    pub fn lower_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }
}

impl<K: Ord> InternalNode<K> {
    /// Child to descend into for `key`: the number of separators `<= key`.
    ///
    /// A key equal to a separator goes right, which is where a leaf split
    /// puts it.
    pub fn child_index(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }
}

impl<K, V> Node<K, V> {
    pub fn key_count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.keys.len(),
            Node::Internal(node) => node.keys.len(),
        }
    }
}
