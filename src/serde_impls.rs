//! Serialization for the tree collections, behind the `serde` feature.
//!
//! Maps serialize as maps and sets and sequences as sequences, in sorted
//! order. Deserialization gathers every entry and bulk-builds the tree, so keys
//! that cannot be ordered surface as a deserialization error.

use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::key::Orderable;
use crate::{TreeMap, TreeSeq, TreeSet};

// Untrusted size hints must not trigger huge allocations up front.
const MAX_PREALLOCATED: usize = 4096;

impl<K: Serialize, V: Serialize> Serialize for TreeMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<T: Serialize> Serialize for TreeSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<T: Serialize> Serialize for TreeSeq<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

struct TreeMapVisitor<K, V> {
    marker: PhantomData<fn() -> TreeMap<K, V>>,
}

impl<'de, K, V> Visitor<'de> for TreeMapVisitor<K, V>
where
    K: Deserialize<'de> + Orderable + Clone,
    V: Deserialize<'de> + Clone,
{
    type Value = TreeMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED));
        while let Some(entry) = access.next_entry()? {
            entries.push(entry);
        }
        TreeMap::from_entries(entries).map_err(de::Error::custom)
    }
}

impl<'de, K, V> Deserialize<'de> for TreeMap<K, V>
where
    K: Deserialize<'de> + Orderable + Clone,
    V: Deserialize<'de> + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TreeMapVisitor { marker: PhantomData })
    }
}

/// Reads a sequence into a `Vec`, leaving the tree building to the caller.
struct ElementsVisitor<T> {
    expecting: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for ElementsVisitor<T> {
    type Value = Vec<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.expecting)
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut elements = Vec::with_capacity(access.size_hint().unwrap_or(0).min(MAX_PREALLOCATED));
        while let Some(element) = access.next_element()? {
            elements.push(element);
        }
        Ok(elements)
    }
}

impl<'de, T> Deserialize<'de> for TreeSet<T>
where
    T: Deserialize<'de> + Orderable + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = deserializer.deserialize_seq(ElementsVisitor {
            expecting: "a sequence of set elements",
            marker: PhantomData,
        })?;
        TreeSet::from_values(elements).map_err(de::Error::custom)
    }
}

impl<'de, T> Deserialize<'de> for TreeSeq<T>
where
    T: Deserialize<'de> + Orderable + Clone,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = deserializer.deserialize_seq(ElementsVisitor {
            expecting: "a sequence",
            marker: PhantomData,
        })?;
        TreeSeq::from_values(elements).map_err(de::Error::custom)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::Key;
    use alloc::string::{String, ToString};
    use alloc::vec;

    #[test]
    fn map_round_trips_through_json() {
        let map = TreeMap::from_entries([(String::from("b"), 2), (String::from("a"), 1)]).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"a":1,"b":2}"#);

        let back: TreeMap<String, i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn keys_deserialize_untagged() {
        let set: TreeSet<Key> = serde_json::from_str(r#"["x", 2.5, 1, [1, "y"]]"#).unwrap();
        let expected = [
            Key::Int(1),
            Key::Float(2.5),
            Key::from("x"),
            Key::Tuple(vec![Key::Int(1), Key::from("y")]),
        ];
        assert!(set.iter().eq(expected.iter()));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"[1,2.5,"x",[1,"y"]]"#);
    }

    #[test]
    fn seq_keeps_duplicates() {
        let seq: TreeSeq<i32> = serde_json::from_str("[3, 1, 3, 2]").unwrap();
        assert_eq!(serde_json::to_string(&seq).unwrap(), "[1,2,3,3]");
    }

    #[test]
    fn map_rejects_non_maps() {
        let error = serde_json::from_str::<TreeMap<String, i32>>("[1]").unwrap_err();
        assert!(error.to_string().contains("a map"));
    }
}
