use log::trace;

use super::node::{InternalNode, LeafNode, Node, NodeId};

/// Fanout used when no order is configured.
pub const DEFAULT_ORDER: usize = 4;

/// Smallest order for which splits and merges keep every non-root node
/// at or above the minimum occupancy.
pub const MIN_ORDER: usize = 3;

/// An ordered map from `K` to `V` with all entries held in the leaves.
///
/// `order` is the maximum number of keys a node holds; inserting one more
/// splits the node. Every node other than the root keeps at least
/// `order / 2` keys, which removals restore by borrowing from or merging
/// with a sibling.
///
/// Nodes are stored in an arena (`nodes`) and addressed by index. Slots of
/// merged-away nodes are recycled through `free`.
///
/// # Issues
/// - Not thread safe, callers serialize access (the owning
///   [`crate::persistence::Table`] is never shared).
#[derive(Debug, Clone)]
pub struct BPlusTree<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
    root: NodeId,
    order: usize,
    len: usize,
}

impl<K: Ord + Clone, V> Default for BPlusTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V> BPlusTree<K, V> {
    pub fn new() -> Self {
        Self::empty(DEFAULT_ORDER)
    }

    /// Create an empty tree with the given fanout.
    ///
    /// Fails if `order` is below [`MIN_ORDER`].
    pub fn with_order(order: usize) -> Result<Self, String> {
        if order < MIN_ORDER {
            return Err(format!(
                "invalid b+tree order {}: must be at least {}",
                order, MIN_ORDER
            ));
        }
        Ok(Self::empty(order))
    }

    fn empty(order: usize) -> Self {
        BPlusTree {
            nodes: vec![Node::Leaf(LeafNode::new())],
            free: Vec::new(),
            root: 0,
            order,
            len: 0,
        }
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, a lone root leaf counts as 1.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[0];
            height += 1;
        }
        height
    }

    pub fn clear(&mut self) {
        *self = Self::empty(self.order);
    }

    pub fn find(&self, key: &K) -> Option<&V> {
        let (_, leaf) = self.leaf_for(key);
        leaf.search(key).ok().map(|index| &leaf.values[index])
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Insert or overwrite. Returns the previous value when `key` was
    /// already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let root = self.root;
        let (previous, split) = self.insert_into(root, key, value);

        if let Some((separator, right)) = split {
            self.root = self.alloc(Node::Internal(InternalNode {
                keys: vec![separator],
                children: vec![root, right],
            }));
            trace!("b+tree root split, height is now {}", self.height());
        }

        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Overwrite the value of an existing key. Never inserts.
    pub fn update(&mut self, key: &K, value: V) -> bool {
        let (leaf_id, _) = self.leaf_for(key);
        if let Node::Leaf(leaf) = &mut self.nodes[leaf_id] {
            if let Ok(index) = leaf.search(key) {
                leaf.values[index] = value;
                return true;
            }
        }
        false
    }

    /// Remove `key`, rebalancing on the way back up. Returns the value
    /// that was stored under it.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root;
        let removed = self.remove_from(root, key)?;
        self.len -= 1;

        let collapse = match &self.nodes[root] {
            Node::Internal(node) if node.keys.is_empty() => Some(node.children[0]),
            _ => None,
        };
        if let Some(child) = collapse {
            self.release(root);
            self.root = child;
            trace!("b+tree root collapsed, height is now {}", self.height());
        }

        Some(removed)
    }

    /// Ascending iterator over the keys in `[start, end]`.
    pub fn range(&self, start: &K, end: &K) -> Range<'_, K, V> {
        let (leaf_id, leaf) = self.leaf_for(start);
        Range {
            nodes: &self.nodes,
            leaf: if start > end { None } else { Some(leaf_id) },
            position: leaf.lower_bound(start),
            end: Some(end.clone()),
        }
    }

    /// Visit every entry with a key in `[start, end]`, in ascending order.
    pub fn range_scan<F>(&self, start: &K, end: &K, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.range(start, end) {
            visit(key, value);
        }
    }

    pub fn first_key(&self) -> Option<&K> {
        self.iter().next().map(|(key, _)| key)
    }

    /// Ascending iterator over every entry.
    pub fn iter(&self) -> Range<'_, K, V> {
        let mut id = self.root;
        while let Node::Internal(node) = &self.nodes[id] {
            id = node.children[0];
        }
        Range {
            nodes: &self.nodes,
            leaf: Some(id),
            position: 0,
            end: None,
        }
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        //! Walk the whole tree and verify its structure:
        //!
        //! - keys are strictly ascending in every node and fall inside the
        //!   bounds given by the parent's separators
        //! - no node holds more than `order` keys and no non-root node
        //!   fewer than `order / 2`
        //! - internal nodes have one child more than they have keys
        //! - all leaves sit at the same depth and the sibling chain links
        //!   them left to right
        //!
        //! Returns a description of the first violation found.

        let mut leaves = Vec::new();
        let mut leaf_depth = None;
        let count = self.check_node(self.root, None, None, 1, &mut leaf_depth, &mut leaves)?;

        if count != self.len {
            return Err(format!(
                "tree reports {} entries but holds {}",
                self.len, count
            ));
        }

        for pair in leaves.windows(2) {
            match &self.nodes[pair[0]] {
                Node::Leaf(leaf) if leaf.next == Some(pair[1]) => {}
                _ => return Err(format!("leaf {} is not linked to leaf {}", pair[0], pair[1])),
            }
        }
        if let Some(&last) = leaves.last() {
            if let Node::Leaf(leaf) = &self.nodes[last] {
                if leaf.next.is_some() {
                    return Err(format!("last leaf {} has a sibling link", last));
                }
            }
        }

        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        leaves: &mut Vec<NodeId>,
    ) -> Result<usize, String> {
        let node = &self.nodes[id];
        let keys = match node {
            Node::Leaf(leaf) => &leaf.keys,
            Node::Internal(internal) => &internal.keys,
        };

        if keys.len() > self.order {
            return Err(format!("node {} holds {} keys, order is {}", id, keys.len(), self.order));
        }
        if id != self.root && keys.len() < self.min_keys() {
            return Err(format!("node {} is underfull with {} keys", id, keys.len()));
        }
        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(format!("node {} keys are not strictly ascending", id));
        }
        if let (Some(lower), Some(first)) = (lower, keys.first()) {
            if first < lower {
                return Err(format!("node {} has a key below its separator", id));
            }
        }
        if let (Some(upper), Some(last)) = (upper, keys.last()) {
            if last >= upper {
                return Err(format!("node {} has a key at or above its separator", id));
            }
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.values.len() != leaf.keys.len() {
                    return Err(format!("leaf {} has unpaired keys and values", id));
                }
                match *leaf_depth {
                    Some(expected) if expected != depth => {
                        return Err(format!(
                            "leaf {} is at depth {}, expected {}",
                            id, depth, expected
                        ));
                    }
                    Some(_) => {}
                    None => *leaf_depth = Some(depth),
                }
                leaves.push(id);
                Ok(leaf.keys.len())
            }
            Node::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(format!(
                        "internal node {} has {} keys and {} children",
                        id,
                        internal.keys.len(),
                        internal.children.len()
                    ));
                }
                if internal.keys.is_empty() {
                    return Err(format!("internal node {} has no keys", id));
                }

                let mut count = 0;
                for (index, &child) in internal.children.iter().enumerate() {
                    let child_lower = if index == 0 {
                        lower
                    } else {
                        Some(&internal.keys[index - 1])
                    };
                    let child_upper = internal.keys.get(index).or(upper);
                    count += self.check_node(
                        child,
                        child_lower,
                        child_upper,
                        depth + 1,
                        leaf_depth,
                        leaves,
                    )?;
                }
                Ok(count)
            }
        }
    }

    fn min_keys(&self) -> usize {
        self.order / 2
    }

    fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = Node::Leaf(LeafNode::new());
        self.free.push(id);
    }

    /// Move a node out of its slot so it can be edited while the rest of
    /// the arena is borrowed. The slot must be written back.
    fn take(&mut self, id: NodeId) -> Node<K, V> {
        std::mem::replace(&mut self.nodes[id], Node::Leaf(LeafNode::new()))
    }

    fn pair_mut(&mut self, a: NodeId, b: NodeId) -> (&mut Node<K, V>, &mut Node<K, V>) {
        if a < b {
            let (low, high) = self.nodes.split_at_mut(b);
            (&mut low[a], &mut high[0])
        } else {
            let (low, high) = self.nodes.split_at_mut(a);
            (&mut high[0], &mut low[b])
        }
    }

    fn leaf_for(&self, key: &K) -> (NodeId, &LeafNode<K, V>) {
        let mut id = self.root;
        loop {
            match &self.nodes[id] {
                Node::Internal(node) => id = node.children[node.child_index(key)],
                Node::Leaf(leaf) => return (id, leaf),
            }
        }
    }

    fn insert_into(&mut self, id: NodeId, key: K, value: V) -> (Option<V>, Option<(K, NodeId)>) {
        let mut node = self.take(id);
        let outcome = match &mut node {
            Node::Leaf(leaf) => self.insert_into_leaf(leaf, key, value),
            Node::Internal(internal) => self.insert_into_internal(internal, key, value),
        };
        self.nodes[id] = node;
        outcome
    }

    fn insert_into_leaf(
        &mut self,
        leaf: &mut LeafNode<K, V>,
        key: K,
        value: V,
    ) -> (Option<V>, Option<(K, NodeId)>) {
        match leaf.search(&key) {
            Ok(index) => return (Some(std::mem::replace(&mut leaf.values[index], value)), None),
            Err(index) => {
                leaf.keys.insert(index, key);
                leaf.values.insert(index, value);
            }
        }

        if leaf.keys.len() <= self.order {
            return (None, None);
        }

        // upper half moves to a new right sibling, its first key is copied up
        let mid = leaf.keys.len() / 2;
        let sibling = LeafNode {
            keys: leaf.keys.split_off(mid),
            values: leaf.values.split_off(mid),
            next: leaf.next,
        };
        let separator = sibling.keys[0].clone();
        let sibling_id = self.alloc(Node::Leaf(sibling));
        leaf.next = Some(sibling_id);
        trace!("b+tree leaf split into new leaf {}", sibling_id);

        (None, Some((separator, sibling_id)))
    }

    fn insert_into_internal(
        &mut self,
        node: &mut InternalNode<K>,
        key: K,
        value: V,
    ) -> (Option<V>, Option<(K, NodeId)>) {
        let index = node.child_index(&key);
        let (previous, split) = self.insert_into(node.children[index], key, value);

        let Some((separator, right)) = split else {
            return (previous, None);
        };
        node.keys.insert(index, separator);
        node.children.insert(index + 1, right);

        if node.keys.len() <= self.order {
            return (previous, None);
        }

        // the middle key moves up and is kept in neither half
        let mid = node.keys.len() / 2;
        let right_keys = node.keys.split_off(mid + 1);
        let right_children = node.children.split_off(mid + 1);
        let promoted = node.keys.remove(mid);
        let sibling_id = self.alloc(Node::Internal(InternalNode {
            keys: right_keys,
            children: right_children,
        }));
        trace!("b+tree internal split into new node {}", sibling_id);

        (previous, Some((promoted, sibling_id)))
    }

    fn remove_from(&mut self, id: NodeId, key: &K) -> Option<V> {
        let mut node = self.take(id);
        let removed = match &mut node {
            Node::Leaf(leaf) => leaf.search(key).ok().map(|index| {
                leaf.keys.remove(index);
                leaf.values.remove(index)
            }),
            Node::Internal(internal) => {
                let index = internal.child_index(key);
                let child = internal.children[index];
                let removed = self.remove_from(child, key);
                if removed.is_some() && self.nodes[child].key_count() < self.min_keys() {
                    self.rebalance(internal, index);
                }
                removed
            }
        };
        self.nodes[id] = node;
        removed
    }

    fn rebalance(&mut self, parent: &mut InternalNode<K>, index: usize) {
        let min = self.min_keys();
        let has_left = index > 0;
        let has_right = index + 1 < parent.children.len();

        if has_left && self.nodes[parent.children[index - 1]].key_count() > min {
            self.borrow_from_left(parent, index);
        } else if has_right && self.nodes[parent.children[index + 1]].key_count() > min {
            self.borrow_from_right(parent, index);
        } else if has_left {
            self.merge(parent, index - 1);
        } else {
            self.merge(parent, index);
        }
    }

    fn borrow_from_left(&mut self, parent: &mut InternalNode<K>, index: usize) {
        let (left, child) = self.pair_mut(parent.children[index - 1], parent.children[index]);

        match (left, child) {
            (Node::Leaf(left), Node::Leaf(child)) => {
                if let (Some(key), Some(value)) = (left.keys.pop(), left.values.pop()) {
                    child.keys.insert(0, key);
                    child.values.insert(0, value);
                    parent.keys[index - 1] = child.keys[0].clone();
                }
            }
            (Node::Internal(left), Node::Internal(child)) => {
                if let (Some(key), Some(grandchild)) = (left.keys.pop(), left.children.pop()) {
                    let separator = std::mem::replace(&mut parent.keys[index - 1], key);
                    child.keys.insert(0, separator);
                    child.children.insert(0, grandchild);
                }
            }
            // siblings always sit at the same depth
            _ => {}
        }
        trace!("b+tree node borrowed from its left sibling");
    }

    fn borrow_from_right(&mut self, parent: &mut InternalNode<K>, index: usize) {
        let (child, right) = self.pair_mut(parent.children[index], parent.children[index + 1]);

        match (child, right) {
            (Node::Leaf(child), Node::Leaf(right)) if right.keys.len() > 1 => {
                child.keys.push(right.keys.remove(0));
                child.values.push(right.values.remove(0));
                parent.keys[index] = right.keys[0].clone();
            }
            (Node::Internal(child), Node::Internal(right)) if !right.keys.is_empty() => {
                let key = right.keys.remove(0);
                let grandchild = right.children.remove(0);
                let separator = std::mem::replace(&mut parent.keys[index], key);
                child.keys.push(separator);
                child.children.push(grandchild);
            }
            _ => {}
        }
        trace!("b+tree node borrowed from its right sibling");
    }

    /// Fold `children[index + 1]` into `children[index]` and drop the
    /// separator between them.
    fn merge(&mut self, parent: &mut InternalNode<K>, index: usize) {
        let left_id = parent.children[index];
        let right_id = parent.children.remove(index + 1);
        let separator = parent.keys.remove(index);
        let right = self.take(right_id);

        match (&mut self.nodes[left_id], right) {
            (Node::Leaf(left), Node::Leaf(mut right)) => {
                left.keys.append(&mut right.keys);
                left.values.append(&mut right.values);
                left.next = right.next;
            }
            (Node::Internal(left), Node::Internal(mut right)) => {
                left.keys.push(separator);
                left.keys.append(&mut right.keys);
                left.children.append(&mut right.children);
            }
            _ => {}
        }
        self.free.push(right_id);
        trace!("b+tree merged node {} into node {}", right_id, left_id);
    }
}

/// Ascending iterator over a [`BPlusTree`], following the leaf sibling
/// chain. Bounded above by `end` when set.
pub struct Range<'a, K, V> {
    nodes: &'a [Node<K, V>],
    leaf: Option<NodeId>,
    position: usize,
    end: Option<K>,
}

impl<'a, K: Ord, V> Iterator for Range<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let Node::Leaf(leaf) = &nodes[self.leaf?] else {
                return None;
            };

            if self.position < leaf.keys.len() {
                let key = &leaf.keys[self.position];
                if self.end.as_ref().is_some_and(|end| key > end) {
                    self.leaf = None;
                    return None;
                }
                let value = &leaf.values[self.position];
                self.position += 1;
                return Some((key, value));
            }

            self.leaf = leaf.next;
            self.position = 0;
        }
    }
}
