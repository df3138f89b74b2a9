use std::collections::BTreeMap;

use super::{BPlusTree, FloatKey, MIN_ORDER, PrimaryIndex};
use crate::persistence::value::{DataType, Value};

/// Small deterministic generator so the shuffled workloads are repeatable.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, bound: u64) -> i64 {
        (self.next() % bound) as i64
    }
}

fn _keys(tree: &BPlusTree<i64, usize>) -> Vec<i64> {
    tree.iter().map(|(key, _)| *key).collect()
}

#[test]
fn test_empty_tree() {
    let tree: BPlusTree<i64, usize> = BPlusTree::new();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);
    assert_eq!(tree.find(&1), None);
    assert_eq!(tree.iter().count(), 0);
    tree.check_invariants().unwrap();
}

#[test]
fn test_order_below_minimum_is_rejected() {
    let tree: Result<BPlusTree<i64, usize>, String> = BPlusTree::with_order(MIN_ORDER - 1);
    assert!(tree.is_err());
    assert!(PrimaryIndex::for_type(DataType::Int, 1).is_err());

    let tree: BPlusTree<i64, usize> = BPlusTree::with_order(MIN_ORDER).unwrap();
    assert_eq!(tree.order(), MIN_ORDER);
}

#[test]
fn test_insert_and_find() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    for key in [5, 1, 9, 3, 7] {
        assert_eq!(tree.insert(key, key as usize * 10), None);
    }

    assert_eq!(tree.len(), 5);
    assert_eq!(tree.find(&3), Some(&30));
    assert_eq!(tree.find(&4), None);
    assert_eq!(_keys(&tree), vec![1, 3, 5, 7, 9]);
    tree.check_invariants().unwrap();
}

#[test]
fn test_insert_overwrites_existing_key() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for key in 0..20 {
        tree.insert(key, 0usize);
    }

    assert_eq!(tree.insert(7, 70), Some(0));
    assert_eq!(tree.find(&7), Some(&70));
    assert_eq!(tree.len(), 20);
    tree.check_invariants().unwrap();
}

#[test]
fn test_leaf_split_grows_height() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    for key in 0..4 {
        tree.insert(key, key as usize);
    }
    assert_eq!(tree.height(), 1);

    // the fifth key overflows the root leaf
    tree.insert(4, 4);
    assert_eq!(tree.height(), 2);
    tree.check_invariants().unwrap();

    for key in 5..100 {
        tree.insert(key, key as usize);
        tree.check_invariants().unwrap();
    }
    assert!(tree.height() >= 3);
    assert_eq!(_keys(&tree), (0..100).collect::<Vec<i64>>());
}

#[test]
fn test_update_only_touches_existing_keys() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for key in 0..10 {
        tree.insert(key, key as usize);
    }

    assert!(tree.update(&4, 400));
    assert!(!tree.update(&40, 400));
    assert_eq!(tree.find(&4), Some(&400));
    assert_eq!(tree.find(&40), None);
    assert_eq!(tree.len(), 10);
}

#[test]
fn test_remove_rebalances() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for key in 0..64 {
        tree.insert(key, key as usize);
    }
    let full_height = tree.height();

    for key in (0..64).step_by(2) {
        assert_eq!(tree.remove(&key), Some(key as usize));
        tree.check_invariants().unwrap();
    }
    assert_eq!(tree.remove(&0), None);
    assert_eq!(tree.len(), 32);
    assert_eq!(_keys(&tree), (1..64).step_by(2).collect::<Vec<i64>>());

    for key in (1..64).step_by(2) {
        tree.remove(&key);
        tree.check_invariants().unwrap();
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);
    assert!(full_height > 1);
}

#[test]
fn test_remove_from_the_right_edge() {
    let mut tree = BPlusTree::with_order(4).unwrap();
    for key in 0..50 {
        tree.insert(key, key as usize);
    }

    for key in (0..50).rev() {
        tree.remove(&key);
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), key as usize);
    }
}

#[test]
fn test_tree_reuses_slots_after_merges() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for round in 0..5 {
        for key in 0..40 {
            tree.insert(key, round);
        }
        for key in 0..40 {
            tree.remove(&key);
        }
        tree.check_invariants().unwrap();
    }

    tree.insert(1, 1);
    assert_eq!(tree.find(&1), Some(&1));
}

#[test]
fn test_range_scan_is_inclusive_and_ascending() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for key in (0..100).rev() {
        tree.insert(key * 2, key as usize);
    }

    let mut visited = Vec::new();
    tree.range_scan(&10, &20, |key, _| visited.push(*key));
    assert_eq!(visited, vec![10, 12, 14, 16, 18, 20]);

    // bounds that are not keys themselves
    let visited: Vec<i64> = tree.range(&11, &19).map(|(key, _)| *key).collect();
    assert_eq!(visited, vec![12, 14, 16, 18]);

    assert_eq!(tree.range(&30, &10).count(), 0);
    assert_eq!(tree.range(&1000, &2000).count(), 0);
    assert_eq!(tree.range(&-50, &2).count(), 2);
}

#[test]
fn test_clear() {
    let mut tree = BPlusTree::with_order(5).unwrap();
    for key in 0..30 {
        tree.insert(key, key as usize);
    }
    tree.clear();

    assert!(tree.is_empty());
    assert_eq!(tree.order(), 5);
    tree.check_invariants().unwrap();
}

#[test]
fn test_text_keys() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for name in ["pear", "apple", "fig", "kiwi", "banana", "cherry"] {
        tree.insert(name.to_string(), name.len());
    }

    let names: Vec<&str> = tree.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(names, vec!["apple", "banana", "cherry", "fig", "kiwi", "pear"]);

    let middle: Vec<&str> = tree
        .range(&"c".to_string(), &"g".to_string())
        .map(|(key, _)| key.as_str())
        .collect();
    assert_eq!(middle, vec!["cherry", "fig"]);
}

#[test]
fn test_first_key_follows_removals() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    assert_eq!(tree.first_key(), None);

    for key in [8, 3, 11, 5, 1] {
        tree.insert(key, 0);
    }
    assert_eq!(tree.first_key(), Some(&1));

    tree.remove(&1);
    tree.remove(&3);
    assert_eq!(tree.first_key(), Some(&5));
}

#[test]
fn test_range_outlives_its_bounds() {
    let mut tree = BPlusTree::with_order(3).unwrap();
    for key in 0..30 {
        tree.insert(key, key as usize);
    }

    let range = {
        let start = 12;
        let end = 15;
        tree.range(&start, &end)
    };
    let keys: Vec<i64> = range.map(|(key, _)| *key).collect();
    assert_eq!(keys, vec![12, 13, 14, 15]);
}

#[test]
fn test_random_workload_matches_btreemap() {
    for order in [3, 4, 7] {
        let mut tree = BPlusTree::with_order(order).unwrap();
        let mut model = BTreeMap::new();
        let mut rng = Lcg(order as u64);

        for step in 0..2000 {
            let key = rng.below(300);
            if rng.below(3) == 0 {
                assert_eq!(tree.remove(&key), model.remove(&key));
            } else {
                assert_eq!(tree.insert(key, step), model.insert(key, step));
            }

            if step % 100 == 0 {
                tree.check_invariants().unwrap();
            }
        }

        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), model.len());
        for (key, value) in model.iter() {
            assert_eq!(tree.find(key), Some(value));
        }

        let expected: Vec<(i64, usize)> = model.range(50..=150).map(|(k, v)| (*k, *v)).collect();
        let mut actual = Vec::new();
        tree.range_scan(&50, &150, |key, value| actual.push((*key, *value)));
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_float_key_normalizes_zero_and_rejects_nan() {
    assert!(FloatKey::new(f64::NAN).is_none());
    assert_eq!(FloatKey::new(-0.0), FloatKey::new(0.0));
    assert!(FloatKey::new(-1.5) < FloatKey::new(0.0));
}

#[test]
fn test_primary_index_per_type() {
    assert!(PrimaryIndex::for_type(DataType::Null, 4).unwrap().is_none());

    let mut index = PrimaryIndex::for_type(DataType::Int, 4).unwrap().unwrap();
    assert!(index.insert(&Value::Int(7), 0));
    assert!(!index.insert(&Value::Text("7".into()), 1));
    assert_eq!(index.find(&Value::Int(7)), Some(0));
    assert_eq!(index.find(&Value::Float(7.0)), None);
    assert!(index.update(&Value::Int(7), 3));
    assert_eq!(index.remove(&Value::Int(7)), Some(3));
    assert_eq!(index.len(), 0);

    let mut index = PrimaryIndex::for_type(DataType::Float, 4).unwrap().unwrap();
    assert!(!index.accepts(&Value::Float(f64::NAN)));
    assert!(index.insert(&Value::Float(-0.0), 2));
    assert_eq!(index.find(&Value::Float(0.0)), Some(2));
}

#[test]
fn test_primary_index_range() {
    let mut index = PrimaryIndex::for_type(DataType::Text, 3).unwrap().unwrap();
    for (position, name) in ["d", "a", "c", "b", "e"].iter().enumerate() {
        index.insert(&Value::from(*name), position);
    }

    assert_eq!(
        index.positions_in_range(&Value::from("b"), &Value::from("d")),
        vec![3, 2, 0]
    );
    assert!(
        index
            .positions_in_range(&Value::Int(0), &Value::Int(10))
            .is_empty()
    );
    index.check_invariants().unwrap();
}
