use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tree_collections::{Degree, Error, Key, OrderedContainer, Rank, TreeMap};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

fn key_strategy() -> impl Strategy<Value = i64> {
    // Narrower than TEST_SIZE so keys collide.
    -1_000i64..1_000i64
}

fn degree_strategy() -> impl Strategy<Value = Degree> {
    (2usize..8).prop_map(|t| Degree::new(t).unwrap())
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    Get(i64),
    Rank(i64),
    Nth(isize),
    RemoveNth(isize),
    PopFirst,
    PopLast,
}

fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), any::<i64>()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::Rank),
        1 => (-3_000isize..3_000).prop_map(MapOp::Nth),
        1 => (-3_000isize..3_000).prop_map(MapOp::RemoveNth),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

/// Resolves a signed index against a model the same way the map does.
fn resolve(index: isize, len: usize) -> Option<usize> {
    let rank = if index < 0 { len.checked_sub(index.unsigned_abs())? } else { index.unsigned_abs() };
    (rank < len).then_some(rank)
}

// ─── Core operations ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations on both TreeMap and BTreeMap
    /// and asserts identical results at every step.
    #[test]
    fn map_ops_match_btreemap(
        degree in degree_strategy(),
        ops in proptest::collection::vec(map_op_strategy(), TEST_SIZE),
    ) {
        let mut tree_map: TreeMap<i64, i64> = TreeMap::with_degree(degree);
        let mut bt_map: BTreeMap<i64, i64> = BTreeMap::new();

        for op in &ops {
            match *op {
                MapOp::Insert(k, v) => {
                    prop_assert_eq!(tree_map.insert(k, v), Ok(bt_map.insert(k, v)), "insert({}, {})", k, v);
                }
                MapOp::Remove(k) => {
                    prop_assert_eq!(tree_map.remove(&k), bt_map.remove(&k), "remove({})", k);
                }
                MapOp::Get(k) => {
                    prop_assert_eq!(tree_map.get(&k), bt_map.get(&k), "get({})", k);
                }
                MapOp::Rank(k) => {
                    prop_assert_eq!(tree_map.rank(&k), bt_map.range(..k).count(), "rank({})", k);
                }
                MapOp::Nth(index) => {
                    let expected = resolve(index, bt_map.len()).and_then(|rank| bt_map.iter().nth(rank));
                    prop_assert_eq!(tree_map.nth(index).ok(), expected, "nth({})", index);
                }
                MapOp::RemoveNth(index) => {
                    let expected = resolve(index, bt_map.len())
                        .and_then(|rank| bt_map.keys().nth(rank).copied())
                        .map(|k| (k, bt_map.remove(&k).unwrap()));
                    let len = tree_map.len();
                    let expected = expected.ok_or(Error::IndexOutOfRange { index, len });
                    prop_assert_eq!(tree_map.remove_nth(index), expected, "remove_nth({})", index);
                }
                MapOp::PopFirst => {
                    prop_assert_eq!(tree_map.pop_first().ok(), bt_map.pop_first());
                }
                MapOp::PopLast => {
                    prop_assert_eq!(tree_map.pop_last().ok(), bt_map.pop_last());
                }
            }
            prop_assert_eq!(tree_map.len(), bt_map.len());
        }

        prop_assert!(tree_map.iter().eq(bt_map.iter()));
    }

    #[test]
    fn bulk_build_matches_incremental(
        degree in degree_strategy(),
        entries in proptest::collection::vec((key_strategy(), any::<i64>()), 0..TEST_SIZE),
    ) {
        let built = TreeMap::from_entries_with_degree(entries.clone(), degree).unwrap();
        let mut incremental = TreeMap::with_degree(degree);
        let mut bt_map = BTreeMap::new();
        for &(k, v) in &entries {
            incremental.insert(k, v).unwrap();
            bt_map.insert(k, v);
        }

        prop_assert_eq!(&built, &incremental);
        prop_assert!(built.iter().eq(bt_map.iter()));
    }

    #[test]
    fn range_matches_btreemap(
        entries in proptest::collection::vec((key_strategy(), any::<i64>()), 0..TEST_SIZE),
        a in key_strategy(),
        b in key_strategy(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let tree_map = TreeMap::from_entries(entries.clone()).unwrap();
        let bt_map: BTreeMap<i64, i64> = entries.into_iter().collect();

        prop_assert!(tree_map.range(lo..hi).eq(bt_map.range(lo..hi)));
        prop_assert!(tree_map.range(lo..=hi).rev().eq(bt_map.range(lo..=hi).rev()));
        prop_assert!(tree_map.range(..hi).eq(bt_map.range(..hi)));
        prop_assert_eq!(tree_map.range(lo..).len(), bt_map.range(lo..).count());
    }

    #[test]
    fn rank_and_nth_are_inverse(entries in proptest::collection::vec((key_strategy(), any::<i64>()), 1..TEST_SIZE)) {
        let tree_map = TreeMap::from_entries(entries).unwrap();
        let len = isize::try_from(tree_map.len()).unwrap();
        for index in 0..len {
            let (k, _) = tree_map.nth(index).unwrap();
            prop_assert_eq!(tree_map.rank(k), usize::try_from(index).unwrap());
            prop_assert_eq!(tree_map.nth(index - len).unwrap().0, k);
        }
    }

    #[test]
    fn cursor_is_a_snapshot(
        entries in proptest::collection::vec((key_strategy(), any::<i64>()), 0..TEST_SIZE),
        ops in proptest::collection::vec(map_op_strategy(), 0..500),
    ) {
        let mut tree_map = TreeMap::with_degree(Degree::new(2).unwrap());
        tree_map.extend_entries(entries).unwrap();
        let before: Vec<(i64, i64)> = tree_map.iter().map(|(k, v)| (*k, *v)).collect();
        let cursor = tree_map.cursor();
        let keys = tree_map.keys();

        for op in ops {
            match op {
                MapOp::Insert(k, v) => {
                    tree_map.insert(k, v).unwrap();
                }
                MapOp::Remove(k) => {
                    tree_map.remove(&k);
                }
                MapOp::PopFirst => {
                    let _ = tree_map.pop_first();
                }
                _ => tree_map.clear(),
            }
        }

        prop_assert_eq!(cursor.collect::<Vec<_>>(), before.clone());
        prop_assert!(keys.rev().eq(before.iter().rev().map(|(k, _)| *k)));
    }
}

// ─── Examples ────────────────────────────────────────────────────────────────

#[test]
fn mixed_keys_sort_numbers_then_text_then_tuples() {
    let mut map = TreeMap::new();
    map.insert(Key::from((1, "b")), "tuple").unwrap();
    map.insert(Key::from("a"), "text").unwrap();
    map.insert(Key::from(2.5), "float").unwrap();
    map.insert(Key::from(-7), "int").unwrap();

    let values: Vec<&str> = map.values().collect();
    assert_eq!(values, ["int", "float", "text", "tuple"]);
    assert_eq!(map.rank(&Key::from("zzz")), 3);
}

#[test]
fn replacing_keeps_the_first_key() {
    let mut map = TreeMap::new();
    assert_eq!(map.insert(Key::Int(2), 'a'), Ok(None));
    assert_eq!(map.insert(Key::Float(2.0), 'b'), Ok(Some('a')));

    assert_eq!(map.len(), 1);
    assert!(matches!(map.get_key_value(&Key::Float(2.0)), Some((Key::Int(2), 'b'))));
}

#[test]
fn positional_access() {
    let map = TreeMap::from_entries([(10, 'a'), (20, 'b'), (30, 'c')]).unwrap();

    assert_eq!(map.nth(0), Ok((&10, &'a')));
    assert_eq!(map.nth(-1), Ok((&30, &'c')));
    assert_eq!(map.nth(-3), Ok((&10, &'a')));
    assert_eq!(map.nth(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    assert_eq!(map.nth(-4), Err(Error::IndexOutOfRange { index: -4, len: 3 }));
    assert_eq!(map[Rank(1)], 'b');
    assert_eq!(map[&30], 'c');
}

#[test]
fn cursor_survives_drop_and_keeps_its_position() {
    let mut map = TreeMap::with_degree(Degree::new(2).unwrap());
    map.extend_entries((0..100).map(|i| (i, i * i))).unwrap();

    let mut cursor = map.cursor();
    assert_eq!(cursor.next(), Some((0, 0)));
    assert_eq!(cursor.next_back(), Some((99, 9801)));

    map.clear();
    drop(map);

    assert_eq!(cursor.len(), 98);
    assert_eq!(cursor.next(), Some((1, 1)));
}

#[test]
fn iteration_after_incremental_root_splits() {
    let mut map = TreeMap::new();
    for i in 0..5_000 {
        map.insert(Key::Int(i), i).unwrap();
    }

    assert_eq!(map.cursor().len(), 5_000);
    assert!(map.values().eq(0..5_000));
    assert_eq!(map.range(Key::Int(100)..Key::Int(200)).count(), 100);
    for i in (0..5_000).step_by(7) {
        map.remove(&Key::Int(i));
    }
    assert_eq!(map.iter().count(), map.len());
}

#[test]
fn keys_values_and_items_are_independent() {
    let map = TreeMap::from_entries([("x", 1), ("y", 2)]).unwrap();
    let mut keys = map.keys();
    let mut values = map.values();
    let mut items = map.items();

    assert_eq!(keys.next(), Some("x"));
    assert_eq!(keys.next(), Some("y"));
    assert_eq!(values.next_back(), Some(2));
    assert_eq!(items.next(), Some(("x", 1)));
    assert_eq!(values.next(), Some(1));
    assert_eq!(keys.next(), None);
}

#[test]
fn unorderable_keys_are_rejected_without_changes() {
    let mut map = TreeMap::from_entries([(Key::from(1), 1)]).unwrap();

    assert_eq!(map.insert(Key::Float(f64::NAN), 2), Err(Error::UnorderableKey("float")));
    assert_eq!(
        map.extend_entries([(Key::from(5), 5), (Key::from((1.0, f64::NAN)), 6)]),
        Err(Error::UnorderableKey("float"))
    );
    assert_eq!(map.len(), 1);
    assert!(!map.contains_key(&Key::Float(f64::NAN)));
}

#[test]
fn errors_on_missing_and_empty() {
    let mut map: TreeMap<i32, i32> = TreeMap::new();
    assert_eq!(map.try_get(&1), Err(Error::KeyNotFound));
    assert_eq!(map.try_remove(&1), Err(Error::KeyNotFound));
    assert_eq!(map.pop_first(), Err(Error::EmptyContainer));
    assert_eq!(map.pop_last(), Err(Error::EmptyContainer));
    assert_eq!(map.remove_nth(0), Err(Error::IndexOutOfRange { index: 0, len: 0 }));
    assert_eq!(map.iter().next(), None);
}

#[test]
fn capability_trait_matches_inherent_methods() {
    let mut map = TreeMap::from_entries([(3, ()), (1, ())]).unwrap();
    assert!(OrderedContainer::contains(&map, &3));
    assert_eq!(OrderedContainer::nth(&map, -1), Ok((&3, &())));
    OrderedContainer::clear(&mut map);
    assert!(OrderedContainer::is_empty(&map));
}

#[test]
fn debug_lists_entries_in_order() {
    let map = TreeMap::from_entries([(2, "b"), (1, "a")]).unwrap();
    assert_eq!(format!("{map:?}"), r#"{1: "a", 2: "b"}"#);
}
