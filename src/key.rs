//! Keys with a total order across runtime kinds.
//!
//! [`Key`] lets one collection hold integers, floats, strings and tuples at the
//! same time. Kinds are ordered by a fixed priority (numbers, then strings, then
//! tuples) and numbers compare by value regardless of representation, so
//! `Key::Int(2)` and `Key::Float(2.0)` are the same key.

use alloc::string::String;
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use crate::error::{Error, Result};

/// A type whose values can be placed in a tree collection.
///
/// `Ord` supplies the comparison. [`check_orderable`](Orderable::check_orderable)
/// is consulted before any mutation and lets a type reject values that have no
/// meaningful position in the order; the default accepts everything.
pub trait Orderable: Ord {
    /// Returns an error if `self` must not be stored in a collection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnorderableKey`] for values without a place in the order.
    fn check_orderable(&self) -> Result<()> {
        Ok(())
    }
}

macro_rules! impl_orderable {
    ($($t:ty),* $(,)?) => {
        $(impl Orderable for $t {})*
    };
}

impl_orderable!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, (), String, &str);

impl<T: Orderable> Orderable for Vec<T> {
    fn check_orderable(&self) -> Result<()> {
        self.iter().try_for_each(Orderable::check_orderable)
    }
}

impl<T: Orderable> Orderable for Option<T> {
    fn check_orderable(&self) -> Result<()> {
        self.as_ref().map_or(Ok(()), Orderable::check_orderable)
    }
}

impl<A: Orderable, B: Orderable> Orderable for (A, B) {
    fn check_orderable(&self) -> Result<()> {
        self.0.check_orderable()?;
        self.1.check_orderable()
    }
}

impl<A: Orderable, B: Orderable, C: Orderable> Orderable for (A, B, C) {
    fn check_orderable(&self) -> Result<()> {
        self.0.check_orderable()?;
        self.1.check_orderable()?;
        self.2.check_orderable()
    }
}

/// The runtime kind of a [`Key`].
///
/// Kinds are declared in their ordering priority: every number sorts before
/// every string, and every string before every tuple.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum KeyKind {
    Int,
    Float,
    Str,
    Tuple,
}

impl KeyKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            KeyKind::Int => "int",
            KeyKind::Float => "float",
            KeyKind::Str => "str",
            KeyKind::Tuple => "tuple",
        }
    }

    // Int and Float share a rank so numbers compare by value.
    const fn priority(self) -> u8 {
        match self {
            KeyKind::Int | KeyKind::Float => 0,
            KeyKind::Str => 1,
            KeyKind::Tuple => 2,
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dynamically typed key.
///
/// # Examples
///
/// ```
/// use tree_collections::{Key, TreeMap};
///
/// let mut map = TreeMap::new();
/// map.insert(Key::from("text"), 0).unwrap();
/// map.insert(Key::from(2.5), 1).unwrap();
/// map.insert(Key::from(-3), 2).unwrap();
///
/// let keys: Vec<Key> = map.keys().collect();
/// assert_eq!(keys, [Key::Int(-3), Key::Float(2.5), Key::from("text")]);
///
/// // Numbers compare by value, so 2 and 2.0 are the same key.
/// assert_eq!(Key::Int(2), Key::Float(2.0));
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Key>),
}

impl Key {
    #[must_use]
    pub const fn kind(&self) -> KeyKind {
        match self {
            Key::Int(_) => KeyKind::Int,
            Key::Float(_) => KeyKind::Float,
            Key::Str(_) => KeyKind::Str,
            Key::Tuple(_) => KeyKind::Tuple,
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Key::Int(_) | Key::Float(_))
    }

    /// Returns the integer, or a float that holds an exact `i64` value.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Key::Int(i) => Some(i),
            Key::Float(f) if cmp_int_float(f as i64, f) == Ordering::Equal => Some(f as i64),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Key::Int(i) => Some(i as f64),
            Key::Float(f) => Some(f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_tuple(&self) -> Option<&[Key]> {
        match self {
            Key::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl Orderable for Key {
    fn check_orderable(&self) -> Result<()> {
        match self {
            Key::Float(f) if f.is_nan() => Err(Error::UnorderableKey(KeyKind::Float.name())),
            Key::Tuple(items) => items.iter().try_for_each(Orderable::check_orderable),
            _ => Ok(()),
        }
    }
}

/// Compares two floats, placing NaN above every number.
fn cmp_float(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.is_nan().cmp(&b.is_nan()))
}

/// Compares an integer with a float exactly.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn cmp_int_float(i: i64, f: f64) -> Ordering {
    // 2^63: the first float above every i64.
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() || f >= TWO_POW_63 {
        return Ordering::Less;
    }
    if f < -TWO_POW_63 {
        return Ordering::Greater;
    }
    // `f` is within i64 range, so the cast only drops the fraction. Floats at or
    // above 2^53 are integral, which keeps `truncated as f64` exact.
    let truncated = f as i64;
    i.cmp(&truncated).then_with(|| cmp_float(truncated as f64, f))
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Float(a), Key::Float(b)) => cmp_float(*a, *b),
            (Key::Int(a), Key::Float(b)) => cmp_int_float(*a, *b),
            (Key::Float(a), Key::Int(b)) => cmp_int_float(*b, *a).reverse(),
            (Key::Str(a), Key::Str(b)) => a.cmp(b),
            (Key::Tuple(a), Key::Tuple(b)) => a.cmp(b),
            (a, b) => a.kind().priority().cmp(&b.kind().priority()),
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Key {}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Float(x) => write!(f, "{x:?}"),
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Key {
            fn from(value: $t) -> Self {
                Key::Int(i64::from(value))
            }
        })*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32, bool);

impl From<f32> for Key {
    fn from(value: f32) -> Self {
        Key::Float(f64::from(value))
    }
}

impl From<f64> for Key {
    fn from(value: f64) -> Self {
        Key::Float(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(String::from(value))
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<char> for Key {
    fn from(value: char) -> Self {
        let mut s = String::new();
        s.push(value);
        Key::Str(s)
    }
}

impl From<Vec<Key>> for Key {
    fn from(items: Vec<Key>) -> Self {
        Key::Tuple(items)
    }
}

impl<A: Into<Key>, B: Into<Key>> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Key::Tuple(alloc::vec![a.into(), b.into()])
    }
}

impl<A: Into<Key>, B: Into<Key>, C: Into<Key>> From<(A, B, C)> for Key {
    fn from((a, b, c): (A, B, C)) -> Self {
        Key::Tuple(alloc::vec![a.into(), b.into(), c.into()])
    }
}
