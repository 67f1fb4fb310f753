//! Order-statistic B-tree collections for Rust.
//!
//! This crate provides three ordered collections over one balanced B-tree:
//!
//! - [`TreeMap`] - a map with unique keys
//! - [`TreeSet`] - a set
//! - [`TreeSeq`] - a sorted sequence that keeps duplicates in insertion order
//!
//! Besides lookups, all three answer order-statistic queries in O(log n):
//!
//! - `nth(index)` - the element at a sorted position, with negative indices
//!   counting from the end
//! - `rank(key)` - how many elements sort strictly before `key`
//! - Indexing by [`Rank`] - e.g. `map[Rank(0)]` for the first value
//!
//! # Example
//!
//! ```
//! use tree_collections::{Key, Rank, TreeMap};
//!
//! let mut scores = TreeMap::new();
//! scores.insert("Alice", 100).unwrap();
//! scores.insert("Bob", 85).unwrap();
//! scores.insert("Carol", 92).unwrap();
//!
//! assert_eq!(scores.get("Bob"), Some(&85));
//! assert_eq!(scores.nth(1).unwrap(), (&"Bob", &85));
//! assert_eq!(scores.nth(-1).unwrap(), (&"Carol", &92));
//! assert_eq!(scores.rank_of("Carol"), Some(2));
//! assert_eq!(scores[Rank(0)], 100);
//!
//! // Keys of different kinds share one total order.
//! let mut mixed = TreeMap::new();
//! mixed.insert(Key::from("text"), ()).unwrap();
//! mixed.insert(Key::from(1.5), ()).unwrap();
//! mixed.insert(Key::from(1), ()).unwrap();
//! assert_eq!(mixed.keys().collect::<Vec<_>>(), [Key::Int(1), Key::Float(1.5), Key::from("text")]);
//! ```
//!
//! # Snapshots
//!
//! Nodes are reference counted and copied on write. Cloning a collection is
//! O(1), and a [`Cursor`] keeps yielding the contents it was opened on no matter
//! what happens to the collection afterwards.
//!
//! # Features
//!
//! - **`no_std` compatible** - only requires `alloc`
//! - **`serde`** - `Serialize`/`Deserialize` for the collections and [`Key`]
//!
//! # Logging
//!
//! Structural events are reported through the [`log`](https://docs.rs/log)
//! facade: root splits and collapses at `trace`, bulk builds and clears at
//! `debug`. No logger is installed by the crate.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
extern crate std;

mod config;
mod container;
mod error;
mod key;
mod order_statistic;
mod raw;
#[cfg(feature = "serde")]
mod serde_impls;

pub mod cursor;
pub mod tree_map;
pub mod tree_seq;
pub mod tree_set;

pub use config::Degree;
pub use container::OrderedContainer;
pub use cursor::Cursor;
pub use error::{Error, Result};
pub use key::{Key, KeyKind, Orderable};
pub use order_statistic::Rank;
pub use tree_map::TreeMap;
pub use tree_seq::TreeSeq;
pub use tree_set::TreeSet;
