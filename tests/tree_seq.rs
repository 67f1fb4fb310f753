use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tree_collections::{Degree, Error, Key, Rank, TreeSeq};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 2_000;

#[derive(Debug, Clone)]
enum SeqOp {
    Insert(i8),
    Remove(i8),
    RemoveAt(isize),
    Count(i8),
    IndexOf(i8),
}

fn seq_op_strategy() -> impl Strategy<Value = SeqOp> {
    prop_oneof![
        5 => any::<i8>().prop_map(SeqOp::Insert),
        2 => any::<i8>().prop_map(SeqOp::Remove),
        1 => (-3_000isize..3_000).prop_map(SeqOp::RemoveAt),
        1 => any::<i8>().prop_map(SeqOp::Count),
        1 => any::<i8>().prop_map(SeqOp::IndexOf),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Elements carry their insertion number, so the model also checks that
    /// equal elements stay in insertion order and `remove` takes the earliest.
    #[test]
    fn seq_ops_match_sorted_vec(
        t in 2usize..6,
        ops in proptest::collection::vec(seq_op_strategy(), TEST_SIZE),
    ) {
        let mut seq = TreeSeq::with_degree(Degree::new(t).unwrap());
        let mut model: Vec<i8> = Vec::new();

        for op in &ops {
            match *op {
                SeqOp::Insert(v) => {
                    seq.insert(v).unwrap();
                    let at = model.partition_point(|&m| m <= v);
                    model.insert(at, v);
                }
                SeqOp::Remove(v) => {
                    let at = model.partition_point(|&m| m < v);
                    let present = model.get(at) == Some(&v);
                    if present {
                        model.remove(at);
                    }
                    prop_assert_eq!(seq.remove(&v), present, "remove({})", v);
                }
                SeqOp::RemoveAt(index) => {
                    let len = model.len();
                    let rank = if index < 0 { len.checked_sub(index.unsigned_abs()) } else { Some(index.unsigned_abs()) };
                    let expected = rank
                        .filter(|&rank| rank < len)
                        .map(|rank| model.remove(rank))
                        .ok_or(Error::IndexOutOfRange { index, len });
                    prop_assert_eq!(seq.remove_at(index), expected, "remove_at({})", index);
                }
                SeqOp::Count(v) => {
                    prop_assert_eq!(seq.count(&v), model.iter().filter(|&&m| m == v).count());
                }
                SeqOp::IndexOf(v) => {
                    prop_assert_eq!(seq.index_of(&v), model.iter().position(|&m| m == v));
                }
            }
            prop_assert_eq!(seq.len(), model.len());
        }

        prop_assert!(seq.iter().eq(model.iter()));
    }

    #[test]
    fn equal_elements_keep_insertion_order(values in proptest::collection::vec((0u8..8, any::<u16>()), 0..TEST_SIZE)) {
        let mut seq = TreeSeq::with_degree(Degree::new(2).unwrap());
        for (i, &(group, _)) in values.iter().enumerate() {
            seq.insert(Tagged { group, id: i }).unwrap();
        }

        let built = TreeSeq::from_values(values.iter().enumerate().map(|(id, &(group, _))| Tagged { group, id })).unwrap();

        let mut expected: Vec<(u8, usize)> = values.iter().enumerate().map(|(id, &(group, _))| (group, id)).collect();
        expected.sort();
        prop_assert!(seq.iter().map(|t| (t.group, t.id)).eq(expected.iter().copied()));
        prop_assert!(built.iter().map(|t| (t.group, t.id)).eq(expected.iter().copied()));
    }
}

/// Ordered by `group` alone; `id` records insertion order.
#[derive(Clone, Debug)]
struct Tagged {
    group: u8,
    id: usize,
}

impl PartialEq for Tagged {
    fn eq(&self, other: &Self) -> bool {
        self.group == other.group
    }
}

impl Eq for Tagged {}

impl PartialOrd for Tagged {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Tagged {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.group.cmp(&other.group)
    }
}

impl tree_collections::Orderable for Tagged {}

#[test]
fn duplicates_are_kept_sorted() {
    let mut seq = TreeSeq::new();
    for value in [1, 2, 1, 2, 3, 1, 0, -1, 1] {
        seq.insert(value).unwrap();
    }

    assert_eq!(seq.iter().copied().collect::<Vec<_>>(), [-1, 0, 1, 1, 1, 1, 2, 2, 3]);
    assert_eq!(seq.len(), 9);
    assert_eq!(seq.nth(0), Ok(&-1));
    assert_eq!(seq.nth(-1), Ok(&3));
    assert_eq!(seq[Rank(2)], 1);
    assert_eq!(seq.count(&1), 4);
    assert_eq!(seq.rank(&2), 6);
    assert_eq!(seq.upper_rank(&2), 8);
    assert_eq!(seq.index_of(&3), Some(8));
    assert_eq!(seq.index_of(&7), None);
}

#[test]
fn remove_takes_the_earliest_equal_element() {
    let mut seq = TreeSeq::new();
    seq.insert(Key::Float(1.0)).unwrap();
    seq.insert(Key::Int(1)).unwrap();
    seq.insert(Key::Float(1.0)).unwrap();

    assert!(seq.remove(&Key::Int(1)));
    let rest: Vec<Key> = seq.cursor().collect();
    assert!(matches!(rest.as_slice(), [Key::Int(1), Key::Float(_)]));
    assert!(!seq.remove(&Key::from("absent")));
}

#[test]
fn positional_errors() {
    let mut seq = TreeSeq::from_values([5, 5, 5]).unwrap();
    assert_eq!(seq.nth(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
    assert_eq!(seq.nth(-4), Err(Error::IndexOutOfRange { index: -4, len: 3 }));
    assert_eq!(seq.remove_at(-1), Ok(5));
    assert_eq!(seq.pop_first(), Ok(5));
    assert_eq!(seq.pop_last(), Ok(5));
    assert_eq!(seq.pop_last(), Err(Error::EmptyContainer));
}

#[test]
fn unorderable_values_are_rejected() {
    let mut seq = TreeSeq::from_values([Key::from(1)]).unwrap();
    assert_eq!(seq.insert(Key::Float(f64::NAN)), Err(Error::UnorderableKey("float")));
    assert_eq!(
        TreeSeq::from_values([Key::from(1), Key::Float(f64::NAN)]).unwrap_err(),
        Error::UnorderableKey("float")
    );
    assert_eq!(seq.len(), 1);
}

#[test]
fn cursor_survives_clear() {
    let mut seq = TreeSeq::from_values((0..100).map(|i| i % 10)).unwrap();
    let cursor = seq.cursor();
    seq.clear();
    seq.insert(42).unwrap();

    assert_eq!(cursor.len(), 100);
    assert_eq!(cursor.filter(|&v| v == 3).count(), 10);
    assert_eq!(seq.iter().collect::<Vec<_>>(), [&42]);
}

#[test]
fn range_counts_duplicates() {
    let seq = TreeSeq::from_values([1, 3, 3, 3, 5, 7]).unwrap();
    assert_eq!(seq.range(3..=5).count(), 4);
    assert_eq!(seq.range(3..3).count(), 0);
    assert_eq!(format!("{seq:?}"), "[1, 3, 3, 3, 5, 7]");
}
