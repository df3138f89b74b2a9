use std::cmp::Ordering;

use crate::persistence::value::{DataType, Value};

use super::tree::BPlusTree;

/// A float that can be used as a B+tree key.
///
/// NaN is refused and `-0.0` is stored as `0.0`, so that the key order
/// agrees with `==` on every accepted value.
#[derive(Debug, Clone, Copy)]
pub struct FloatKey(f64);

impl FloatKey {
    pub fn new(value: f64) -> Option<FloatKey> {
        if value.is_nan() {
            None
        } else if value == 0.0 {
            Some(FloatKey(0.0))
        } else {
            Some(FloatKey(value))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl PartialEq for FloatKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatKey {}

impl PartialOrd for FloatKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// The primary key index of a [`crate::persistence::Table`], keyed on the
/// native type of the primary key column and mapping each key to the
/// position of its row.
///
/// Every method takes the key as a [`Value`]. A value of the wrong variant
/// for this index is never found and never stored.
#[derive(Debug, Clone)]
pub(crate) enum PrimaryIndex {
    Int(BPlusTree<i64, usize>),
    Float(BPlusTree<FloatKey, usize>),
    Text(BPlusTree<String, usize>),
}

impl PrimaryIndex {
    pub fn for_type(data_type: DataType, order: usize) -> Result<Option<PrimaryIndex>, String> {
        //! An empty index for keys of `data_type`, or `None` when that type
        //! cannot be keyed on. Fails on an order below the tree's minimum.

        Ok(match data_type {
            DataType::Int => Some(PrimaryIndex::Int(BPlusTree::with_order(order)?)),
            DataType::Float => Some(PrimaryIndex::Float(BPlusTree::with_order(order)?)),
            DataType::Text => Some(PrimaryIndex::Text(BPlusTree::with_order(order)?)),
            DataType::Null => None,
        })
    }

    pub fn accepts(&self, key: &Value) -> bool {
        //! Whether `key` can be stored in this index at all.

        match (self, key) {
            (PrimaryIndex::Int(_), Value::Int(_)) => true,
            (PrimaryIndex::Float(_), Value::Float(value)) => FloatKey::new(*value).is_some(),
            (PrimaryIndex::Text(_), Value::Text(_)) => true,
            _ => false,
        }
    }

    pub fn find(&self, key: &Value) -> Option<usize> {
        match (self, key) {
            (PrimaryIndex::Int(tree), Value::Int(value)) => tree.find(value).copied(),
            (PrimaryIndex::Float(tree), Value::Float(value)) => {
                FloatKey::new(*value).and_then(|key| tree.find(&key).copied())
            }
            (PrimaryIndex::Text(tree), Value::Text(value)) => tree.find(value).copied(),
            _ => None,
        }
    }

    pub fn insert(&mut self, key: &Value, position: usize) -> bool {
        match (self, key) {
            (PrimaryIndex::Int(tree), Value::Int(value)) => {
                tree.insert(*value, position);
                true
            }
            (PrimaryIndex::Float(tree), Value::Float(value)) => match FloatKey::new(*value) {
                Some(key) => {
                    tree.insert(key, position);
                    true
                }
                None => false,
            },
            (PrimaryIndex::Text(tree), Value::Text(value)) => {
                tree.insert(value.clone(), position);
                true
            }
            _ => false,
        }
    }

    pub fn update(&mut self, key: &Value, position: usize) -> bool {
        match (self, key) {
            (PrimaryIndex::Int(tree), Value::Int(value)) => tree.update(value, position),
            (PrimaryIndex::Float(tree), Value::Float(value)) => {
                FloatKey::new(*value).is_some_and(|key| tree.update(&key, position))
            }
            (PrimaryIndex::Text(tree), Value::Text(value)) => tree.update(value, position),
            _ => false,
        }
    }

    pub fn remove(&mut self, key: &Value) -> Option<usize> {
        match (self, key) {
            (PrimaryIndex::Int(tree), Value::Int(value)) => tree.remove(value),
            (PrimaryIndex::Float(tree), Value::Float(value)) => {
                FloatKey::new(*value).and_then(|key| tree.remove(&key))
            }
            (PrimaryIndex::Text(tree), Value::Text(value)) => tree.remove(value),
            _ => None,
        }
    }

    pub fn positions_in_range(&self, start: &Value, end: &Value) -> Vec<usize> {
        //! Row positions of every key in `[start, end]`, in key order.
        //!
        //! Bounds of the wrong variant give an empty result.

        let mut positions = Vec::new();
        match (self, start, end) {
            (PrimaryIndex::Int(tree), Value::Int(start), Value::Int(end)) => {
                tree.range_scan(start, end, |_, position| positions.push(*position));
            }
            (PrimaryIndex::Float(tree), Value::Float(start), Value::Float(end)) => {
                if let (Some(start), Some(end)) = (FloatKey::new(*start), FloatKey::new(*end)) {
                    tree.range_scan(&start, &end, |_, position| positions.push(*position));
                }
            }
            (PrimaryIndex::Text(tree), Value::Text(start), Value::Text(end)) => {
                tree.range_scan(start, end, |_, position| positions.push(*position));
            }
            _ => {}
        }
        positions
    }

    pub fn len(&self) -> usize {
        match self {
            PrimaryIndex::Int(tree) => tree.len(),
            PrimaryIndex::Float(tree) => tree.len(),
            PrimaryIndex::Text(tree) => tree.len(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), String> {
        match self {
            PrimaryIndex::Int(tree) => tree.check_invariants(),
            PrimaryIndex::Float(tree) => tree.check_invariants(),
            PrimaryIndex::Text(tree) => tree.check_invariants(),
        }
    }
}
